//! Image resources.
//!
//! An [`Image`] is a shared handle to a pixel source: its intrinsic size
//! plus a detached prototype node in the tree that the canvas clones when it
//! needs a fresh image element. Decoding and loading pixels is the host's
//! concern; this crate only tracks identity and size.

use crate::geometry::Size;
use crate::tree::{ElementKind, NodeId, NodeTree};
use std::sync::Arc;

#[derive(Debug)]
struct ImageData {
    source: String,
    size: Size,
    prototype: NodeId,
}

/// A shared, cheaply clonable image resource.
#[derive(Debug, Clone)]
pub struct Image {
    inner: Arc<ImageData>,
}

impl Image {
    /// Register an image with the tree, creating its detached prototype
    /// node.
    pub fn new(tree: &mut NodeTree, source: &str, size: Size) -> Self {
        let prototype = tree.create(ElementKind::Image);
        tree.set_image_source(prototype, source);
        tree.set_intrinsic_size(prototype, size);
        Self {
            inner: Arc::new(ImageData {
                source: source.to_owned(),
                size,
                prototype,
            }),
        }
    }

    /// The pixel source name.
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// The underlying pixel size.
    pub fn size(&self) -> Size {
        self.inner.size
    }

    /// The detached prototype node cloned for each drawn instance.
    pub fn prototype(&self) -> NodeId {
        self.inner.prototype
    }

    /// Whether the image has no pixels; empty images skip the draw.
    pub fn is_empty(&self) -> bool {
        self.inner.size.is_empty()
    }
}
