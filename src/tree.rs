//! The host element tree.
//!
//! [`NodeTree`] is an arena of display elements with ordered children, the
//! retained structure the canvas reconciles drawing calls onto. It is the
//! whole host capability: creation, cloning, structural splicing, and the
//! observable visual state ([`NodeStyle`]) the reconciler writes. A real
//! rendering surface mirrors this tree; tests read it directly.
//!
//! Structural misuse (attaching a node under its own subtree, touching a
//! node that was already removed) is a programming error and panics.
//! Everything else (stale candidates, kind mismatches) degrades to
//! fallback paths, never to an error.

use crate::geometry::{Point, Size};
use crate::style::Color;
use crate::text::Font;
use crate::transform::AffineTransform;
use crate::vector::VectorData;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use smartstring::alias::String as SmartString;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type alias for per-node child lists.
/// The first 8 ids are stored inline, spilling to heap only for larger fan-out.
pub type NodeChildren = SmallVec<[NodeId; 8]>;

/// Unique identifier for nodes in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        NodeId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// What kind of display element a node is.
///
/// Reuse is kind-gated: the reconciler only adopts a candidate node whose
/// kind matches the element it is about to configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// A plain styled box (background, border, radius).
    Box,
    /// A measured text element.
    Text,
    /// An image element backed by a pixel source.
    Image,
    /// A vector-renderer element (path/shape payload).
    Vector,
}

/// A solid border, the only border the box fast path emits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    /// Border thickness.
    pub width: f64,
    /// Border color.
    pub color: Color,
}

/// Per-axis corner radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderRadius {
    /// Horizontal radius.
    pub x: f64,
    /// Vertical radius.
    pub y: f64,
}

impl BorderRadius {
    /// A uniform radius.
    pub fn uniform(radius: f64) -> Self {
        Self {
            x: radius,
            y: radius,
        }
    }
}

/// Whether children may paint outside the node's bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overflow {
    /// Children are clipped to the node's bounds.
    #[default]
    Hidden,
    /// Children paint unclipped; used by transform sub-frames, which must
    /// not clip rotated or scaled content.
    Visible,
}

/// One layered shadow effect attached to a node.
///
/// Box nodes carry these on the filter channel, text nodes on the
/// text-shadow channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowEffect {
    /// Whether the shadow is drawn inside the boundary.
    pub inset: bool,
    /// Horizontal offset.
    pub horizontal: f64,
    /// Vertical offset.
    pub vertical: f64,
    /// Blur radius (inset shadows arrive with the source's −1 compensation
    /// already applied).
    pub blur: f64,
    /// Shadow color.
    pub color: Color,
}

/// The observable visual and bound state of a node.
///
/// Split into two halves that clear independently: *bound* styles place the
/// node (position, size, transform), *visual* styles paint it. Reused nodes
/// always start a frame with both halves reset, so a reused node is
/// indistinguishable from a fresh one.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    /// Left offset within the parent.
    pub left: f64,
    /// Top offset within the parent.
    pub top: f64,
    /// Explicit size, `None` for content-sized.
    pub size: Option<Size>,
    /// Affine transform; boxes are positioned through this channel.
    pub transform: Option<AffineTransform>,
    /// Background color.
    pub background: Option<Color>,
    /// Solid border.
    pub border: Option<Border>,
    /// Corner radius.
    pub border_radius: Option<BorderRadius>,
    /// Foreground (text) color.
    pub color: Option<Color>,
    /// Node opacity in `[0, 1]`.
    pub opacity: f32,
    /// Child clipping behavior.
    pub overflow: Overflow,
    /// Clip path vertices in percent of the node's size.
    pub clip_path: Option<Vec<Point>>,
    /// Layered drop-shadow effects (box channel).
    pub filters: Vec<ShadowEffect>,
    /// Layered text-shadow effects (text channel).
    pub text_shadows: Vec<ShadowEffect>,
    /// First-line indent for wrapped text.
    pub text_indent: f64,
    /// Wrap width for wrapped text, `None` for a single line.
    pub wrap_width: Option<f64>,
    /// Font request for text nodes.
    pub font: Option<Font>,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            size: None,
            transform: None,
            background: None,
            border: None,
            border_radius: None,
            color: None,
            opacity: 1.0,
            overflow: Overflow::default(),
            clip_path: None,
            filters: Vec::new(),
            text_shadows: Vec::new(),
            text_indent: 0.0,
            wrap_width: None,
            font: None,
        }
    }
}

impl NodeStyle {
    /// Reset position, size, and transform.
    pub fn clear_bound_styles(&mut self) {
        self.left = 0.0;
        self.top = 0.0;
        self.size = None;
        self.transform = None;
    }

    /// Reset everything that paints: colors, border, radius, opacity,
    /// shadows, clipping, text metrics.
    pub fn clear_visual_styles(&mut self) {
        self.background = None;
        self.border = None;
        self.border_radius = None;
        self.color = None;
        self.opacity = 1.0;
        self.overflow = Overflow::default();
        self.clip_path = None;
        self.filters.clear();
        self.text_shadows.clear();
        self.text_indent = 0.0;
        self.wrap_width = None;
        self.font = None;
    }
}

/// One node of the tree: kind, links, style, and content payload.
#[derive(Debug, Clone)]
struct NodeData {
    kind: ElementKind,
    parent: Option<NodeId>,
    children: NodeChildren,
    style: NodeStyle,
    /// Text payload for `Text` nodes.
    text: Option<SmartString>,
    /// Pixel-source name for `Image` nodes.
    image_source: Option<SmartString>,
    /// Intrinsic pixel size for `Image` nodes.
    intrinsic_size: Option<Size>,
    /// Recorded primitive for `Vector` nodes.
    vector: Option<VectorData>,
}

impl NodeData {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            parent: None,
            children: SmallVec::new(),
            style: NodeStyle::default(),
            text: None,
            image_source: None,
            intrinsic_size: None,
            vector: None,
        }
    }
}

type NodeMap = IndexMap<NodeId, NodeData, FxBuildHasher>;

/// An arena-backed retained element tree with ordered children.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: NodeMap,
}

impl NodeTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the id refers to a live node.
    pub fn exists(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn node(&self, id: NodeId) -> &NodeData {
        self.nodes
            .get(&id)
            .unwrap_or_else(|| panic!("no such node: {id:?}"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("no such node: {id:?}"))
    }

    /// Create a new detached node of the given kind.
    pub fn create(&mut self, kind: ElementKind) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(id, NodeData::new(kind));
        crate::trace!(?id, ?kind, "created node");
        id
    }

    /// Clone a node into a new detached node with a fresh id.
    ///
    /// Copies kind, style, and content payload; with `deep` the whole
    /// subtree is cloned, otherwise children are left behind.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let source = self.node(id).clone();
        let clone_id = NodeId::new();
        let mut data = NodeData {
            parent: None,
            children: SmallVec::new(),
            ..source
        };
        if deep {
            let child_ids: NodeChildren = self.node(id).children.clone();
            for child in child_ids {
                let child_clone = self.clone_node(child, true);
                self.node_mut(child_clone).parent = Some(clone_id);
                data.children.push(child_clone);
            }
        }
        self.nodes.insert(clone_id, data);
        clone_id
    }

    /// The node's element kind.
    pub fn kind(&self, id: NodeId) -> ElementKind {
        self.node(id).kind
    }

    /// The node's parent, `None` when detached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// The node's children in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The node's first child.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    /// The sibling immediately after the node, `None` for the last child or
    /// a detached node.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let siblings = &self.node(parent).children;
        let index = siblings.iter().position(|c| *c == id)?;
        siblings.get(index + 1).copied()
    }

    /// The child at the given index.
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).children.get(index).copied()
    }

    /// Number of children.
    pub fn num_children(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    /// Index of `child` within `parent`'s children.
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.node(parent).children.iter().position(|c| *c == child)
    }

    /// Whether `descendant` sits somewhere under `ancestor` (or is it).
    pub fn contains(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut current = Some(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// current parent first.
    ///
    /// # Panics
    ///
    /// Panics if `parent` lies inside `child`'s subtree: self-referential
    /// containment is an illegal state, not a recoverable condition.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            !self.contains(child, parent),
            "cannot attach {child:?} under its own subtree"
        );
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Replace `old` with `new` in place, preserving sibling order.
    ///
    /// `old`'s subtree is dropped from the arena; `new` is detached from any
    /// current parent first. A detached `old` is a programming error.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        let parent = self
            .node(old)
            .parent
            .unwrap_or_else(|| panic!("replace_child: {old:?} has no parent"));
        assert!(
            !self.contains(new, parent),
            "cannot attach {new:?} under its own subtree"
        );
        self.detach(new);
        let index = self.index_of(parent, old).expect("old is a child of parent");
        self.node_mut(parent).children[index] = new;
        self.node_mut(new).parent = Some(parent);
        self.node_mut(old).parent = None;
        self.drop_subtree(old);
    }

    /// Detach a node from its parent, keeping it (and its subtree) alive.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
            self.node_mut(id).parent = None;
        }
    }

    /// Detach a node and drop its whole subtree from the arena.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        self.drop_subtree(id);
        crate::trace!(?id, "removed node");
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let children: NodeChildren = self.node(id).children.clone();
        for child in children {
            self.drop_subtree(child);
        }
        self.nodes.swap_remove(&id);
    }

    /// Remove all children, then reset both style halves: the "fresh node"
    /// guarantee for reuse.
    pub fn clear(&mut self, id: NodeId) {
        let children: NodeChildren = self.node(id).children.clone();
        for child in children {
            self.node_mut(child).parent = None;
            self.drop_subtree(child);
        }
        let node = self.node_mut(id);
        node.children.clear();
        node.style.clear_bound_styles();
        node.style.clear_visual_styles();
    }

    /// Reset both style halves, leaving children attached.
    ///
    /// Used when adopting container nodes, whose existing children are the
    /// next frame's reuse candidates.
    pub fn clear_styles(&mut self, id: NodeId) {
        let style = &mut self.node_mut(id).style;
        style.clear_bound_styles();
        style.clear_visual_styles();
    }

    /// The node's style.
    pub fn style(&self, id: NodeId) -> &NodeStyle {
        &self.node(id).style
    }

    /// Mutable access to the node's style.
    pub fn style_mut(&mut self, id: NodeId) -> &mut NodeStyle {
        &mut self.node_mut(id).style
    }

    /// Text payload, if any.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    /// Set the text payload.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.node_mut(id).text = Some(text.into());
    }

    /// Image source name, if any.
    pub fn image_source(&self, id: NodeId) -> Option<&str> {
        self.node(id).image_source.as_deref()
    }

    /// Set the image source name.
    pub fn set_image_source(&mut self, id: NodeId, source: &str) {
        self.node_mut(id).image_source = Some(source.into());
    }

    /// Intrinsic pixel size for image nodes.
    pub fn intrinsic_size(&self, id: NodeId) -> Option<Size> {
        self.node(id).intrinsic_size
    }

    /// Set the intrinsic pixel size.
    pub fn set_intrinsic_size(&mut self, id: NodeId, size: Size) {
        self.node_mut(id).intrinsic_size = Some(size);
    }

    /// Recorded vector primitive for vector nodes.
    pub fn vector_data(&self, id: NodeId) -> Option<&VectorData> {
        self.node(id).vector.as_ref()
    }

    /// Set the recorded vector primitive.
    pub fn set_vector_data(&mut self, id: NodeId, data: VectorData) {
        self.node_mut(id).vector = Some(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_order() {
        let mut tree = NodeTree::new();
        let root = tree.create(ElementKind::Box);
        let a = tree.create(ElementKind::Box);
        let b = tree.create(ElementKind::Text);
        tree.append(root, a);
        tree.append(root, b);

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.first_child(root), Some(a));
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.next_sibling(b), None);
        assert_eq!(tree.parent(a), Some(root));
    }

    #[test]
    fn test_reparenting_detaches_first() {
        let mut tree = NodeTree::new();
        let p1 = tree.create(ElementKind::Box);
        let p2 = tree.create(ElementKind::Box);
        let child = tree.create(ElementKind::Box);
        tree.append(p1, child);
        tree.append(p2, child);

        assert_eq!(tree.num_children(p1), 0);
        assert_eq!(tree.children(p2), &[child]);
    }

    #[test]
    fn test_replace_child_preserves_order_and_drops_old() {
        let mut tree = NodeTree::new();
        let root = tree.create(ElementKind::Box);
        let a = tree.create(ElementKind::Box);
        let b = tree.create(ElementKind::Box);
        let c = tree.create(ElementKind::Box);
        tree.append(root, a);
        tree.append(root, b);
        tree.append(root, c);

        let replacement = tree.create(ElementKind::Text);
        tree.replace_child(b, replacement);

        assert_eq!(tree.children(root), &[a, replacement, c]);
        assert!(!tree.exists(b));
    }

    #[test]
    #[should_panic(expected = "own subtree")]
    fn test_self_containment_panics() {
        let mut tree = NodeTree::new();
        let outer = tree.create(ElementKind::Box);
        let inner = tree.create(ElementKind::Box);
        tree.append(outer, inner);
        tree.append(inner, outer);
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut tree = NodeTree::new();
        let root = tree.create(ElementKind::Box);
        let mid = tree.create(ElementKind::Box);
        let leaf = tree.create(ElementKind::Text);
        tree.append(root, mid);
        tree.append(mid, leaf);

        tree.remove(mid);
        assert!(!tree.exists(mid));
        assert!(!tree.exists(leaf));
        assert_eq!(tree.num_children(root), 0);
    }

    #[test]
    fn test_clear_resets_styles_and_children() {
        let mut tree = NodeTree::new();
        let node = tree.create(ElementKind::Box);
        let child = tree.create(ElementKind::Box);
        tree.append(node, child);
        {
            let style = tree.style_mut(node);
            style.background = Some(Color::RED);
            style.left = 5.0;
            style.opacity = 0.5;
        }

        tree.clear(node);
        assert_eq!(tree.num_children(node), 0);
        assert!(!tree.exists(child));
        assert_eq!(*tree.style(node), NodeStyle::default());
    }

    #[test]
    fn test_clone_node_shallow_and_deep() {
        let mut tree = NodeTree::new();
        let node = tree.create(ElementKind::Image);
        tree.set_image_source(node, "cat.png");
        tree.set_intrinsic_size(node, Size::new(32.0, 16.0));
        let child = tree.create(ElementKind::Box);
        tree.append(node, child);

        let shallow = tree.clone_node(node, false);
        assert_eq!(tree.kind(shallow), ElementKind::Image);
        assert_eq!(tree.image_source(shallow), Some("cat.png"));
        assert_eq!(tree.num_children(shallow), 0);
        assert_eq!(tree.parent(shallow), None);

        let deep = tree.clone_node(node, true);
        assert_eq!(tree.num_children(deep), 1);
        let cloned_child = tree.first_child(deep).expect("has child");
        assert_ne!(cloned_child, child);
        assert_eq!(tree.kind(cloned_child), ElementKind::Box);
    }

    #[test]
    fn test_index_of() {
        let mut tree = NodeTree::new();
        let root = tree.create(ElementKind::Box);
        let a = tree.create(ElementKind::Box);
        let b = tree.create(ElementKind::Box);
        tree.append(root, a);
        tree.append(root, b);
        assert_eq!(tree.index_of(root, b), Some(1));
        assert_eq!(tree.index_of(root, root), None);
    }
}
