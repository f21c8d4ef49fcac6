//! boxel: a retained-mode canvas that reconciles drawing calls onto
//! reusable host elements.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌─────────────┐    ┌──────────────┐    ┌──────────┐
//! │ Drawing  │ -> │   Canvas    │ -> │   NodeTree   │ -> │   Host   │
//! │  client  │    │ (reconcile) │    │  (elements)  │    │ surface  │
//! └──────────┘    └─────────────┘    └──────────────┘    └──────────┘
//!                        │
//!                        v
//!                ┌───────────────┐
//!                │ VectorRenderer│
//!                │  (fallback)   │
//!                └───────────────┘
//! ```
//!
//! A drawing client issues primitives (rects, circles, text, images,
//! clipped/transformed/shadowed scopes) against a [`canvas::Canvas`]. Each
//! call either configures a plain styled box in the [`tree::NodeTree`],
//! reusing the node the previous frame left at the same position, or is
//! delegated to a [`vector::VectorRenderer`] for anything a styled box
//! cannot express. Calling [`canvas::Canvas::clear`] rewinds the reuse
//! cursor for the next frame and [`canvas::Canvas::flush`] prunes trailing
//! nodes a shorter frame no longer needs, so repeated frames converge to
//! zero structural churn.
//!
//! The tree is an in-process arena: there is no real DOM or GPU here. A
//! host embedding mirrors the tree onto its own display system; tests read
//! the tree directly.
//!
//! # Quick start
//!
//! ```
//! use boxel::prelude::*;
//!
//! let mut canvas = Canvas::new(Size::new(200.0, 100.0));
//!
//! canvas.clear();
//! canvas.rect(Rect::new(10.0, 10.0, 50.0, 30.0), &Fill::solid(Color::BLUE));
//! canvas.text("hello", None, Point::new(10.0, 50.0), &Fill::solid(Color::BLACK));
//! canvas.flush();
//!
//! assert_eq!(canvas.tree().num_children(canvas.render_parent()), 2);
//! ```

// Compiled-out tracing shim: call sites stay clean, release builds carry
// nothing unless the `tracing` feature is on.
#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($t:tt)*) => { tracing::trace!($($t)*) };
}
#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($t:tt)*) => {};
}
pub(crate) use trace;

pub mod canvas;
pub mod factory;
pub mod geometry;
pub mod image;
pub mod style;
pub mod text;
pub mod transform;
pub mod tree;
pub mod vector;

/// Commonly used types, re-exported for convenient glob import.
pub mod prelude {
    pub use crate::canvas::Canvas;
    pub use crate::geometry::{
        Circle, Ellipse, FillRule, Path, PathSegment, Point, Polygon, Rect, Size,
    };
    pub use crate::image::Image;
    pub use crate::style::{Color, Fill, LineCap, LineJoin, Shadow, Stroke};
    pub use crate::text::{Font, StyledText, TextDecoration, TextStyle};
    pub use crate::transform::AffineTransform;
    pub use crate::tree::{ElementKind, NodeId, NodeTree};
    pub use crate::vector::{VectorNodeRenderer, VectorRenderer};
}
