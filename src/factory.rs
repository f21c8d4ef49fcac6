//! Element and text creation collaborators.
//!
//! The canvas never constructs nodes directly; it asks an
//! [`ElementFactory`] for boxes and clones, and a [`TextFactory`] for
//! measured text elements. Both receive the candidate node at the render
//! cursor and may adopt it instead of creating; the canvas guarantees an
//! adopted node is cleared before use, so adoption is invisible to callers.
//!
//! The in-crate defaults measure text with a monospace estimate
//! (`unicode-width` columns × a per-size advance); real shaping belongs to
//! the host.

use crate::geometry::Size;
use crate::text::{Font, StyledText};
use crate::tree::{ElementKind, NodeId, NodeTree};
use crate::style::Fill;
use unicode_width::UnicodeWidthStr;

/// Creates or adapts plain display elements.
pub trait ElementFactory {
    /// Return the candidate when its kind matches, otherwise a fresh
    /// detached node of the requested kind.
    fn create_or_use(
        &mut self,
        tree: &mut NodeTree,
        kind: ElementKind,
        candidate: Option<NodeId>,
    ) -> NodeId;

    /// Clone a node into a fresh detached node.
    fn clone_node(&mut self, tree: &mut NodeTree, node: NodeId, deep: bool) -> NodeId;
}

/// The default element factory: kind-gated adoption, plain creation
/// otherwise.
#[derive(Debug, Default)]
pub struct BoxFactory;

impl ElementFactory for BoxFactory {
    fn create_or_use(
        &mut self,
        tree: &mut NodeTree,
        kind: ElementKind,
        candidate: Option<NodeId>,
    ) -> NodeId {
        match candidate {
            Some(node) if tree.kind(node) == kind => node,
            _ => tree.create(kind),
        }
    }

    fn clone_node(&mut self, tree: &mut NodeTree, node: NodeId, deep: bool) -> NodeId {
        tree.clone_node(node, deep)
    }
}

/// Creates measured text elements.
///
/// Measurement is the factory's concern; the canvas positions whatever
/// comes back without inspecting it.
pub trait TextFactory {
    /// A single-line text element.
    fn create(
        &mut self,
        tree: &mut NodeTree,
        text: &str,
        font: Option<&Font>,
        candidate: Option<NodeId>,
    ) -> NodeId;

    /// A wrapped text element constrained to `width`, first line indented
    /// by `indent`.
    fn wrapped(
        &mut self,
        tree: &mut NodeTree,
        text: &str,
        font: Option<&Font>,
        width: f64,
        indent: f64,
        candidate: Option<NodeId>,
    ) -> NodeId;

    /// A single-line styled text element (one child per run when more than
    /// one style is present).
    fn create_styled(
        &mut self,
        tree: &mut NodeTree,
        text: &StyledText,
        candidate: Option<NodeId>,
    ) -> NodeId;

    /// A wrapped styled text element.
    fn wrapped_styled(
        &mut self,
        tree: &mut NodeTree,
        text: &StyledText,
        width: f64,
        indent: f64,
        candidate: Option<NodeId>,
    ) -> NodeId;
}

/// Font size assumed when a run carries no font.
const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Advance per text column as a fraction of the font size.
const ADVANCE_RATIO: f64 = 0.6;
/// Line height as a fraction of the font size.
const LINE_HEIGHT_RATIO: f64 = 1.2;

fn font_size(font: Option<&Font>) -> f64 {
    font.map_or(DEFAULT_FONT_SIZE, |f| f.size)
}

fn measure(text: &str, font: Option<&Font>) -> Size {
    let size = font_size(font);
    let cols = UnicodeWidthStr::width(text) as f64;
    Size::new(cols * size * ADVANCE_RATIO, size * LINE_HEIGHT_RATIO)
}

/// The default text factory: monospace-estimate measurement, no shaping.
#[derive(Debug, Default)]
pub struct SimpleTextFactory;

impl SimpleTextFactory {
    fn adopt_or_create(
        tree: &mut NodeTree,
        kind: ElementKind,
        candidate: Option<NodeId>,
    ) -> NodeId {
        match candidate {
            Some(node) if tree.kind(node) == kind => {
                tree.clear(node);
                node
            }
            _ => tree.create(kind),
        }
    }

    fn text_node(
        tree: &mut NodeTree,
        text: &str,
        font: Option<&Font>,
        candidate: Option<NodeId>,
    ) -> NodeId {
        let node = Self::adopt_or_create(tree, ElementKind::Text, candidate);
        tree.set_text(node, text);
        let measured = measure(text, font);
        let style = tree.style_mut(node);
        style.size = Some(measured);
        style.font = font.cloned();
        node
    }

    fn apply_run_style(tree: &mut NodeTree, node: NodeId, style: &crate::text::TextStyle) {
        let node_style = tree.style_mut(node);
        if let Some(Fill::Solid(color)) = &style.foreground {
            node_style.color = Some(*color);
        }
        if let Some(Fill::Solid(color)) = &style.background {
            node_style.background = Some(*color);
        }
    }
}

impl TextFactory for SimpleTextFactory {
    fn create(
        &mut self,
        tree: &mut NodeTree,
        text: &str,
        font: Option<&Font>,
        candidate: Option<NodeId>,
    ) -> NodeId {
        Self::text_node(tree, text, font, candidate)
    }

    fn wrapped(
        &mut self,
        tree: &mut NodeTree,
        text: &str,
        font: Option<&Font>,
        width: f64,
        indent: f64,
        candidate: Option<NodeId>,
    ) -> NodeId {
        let node = Self::text_node(tree, text, font, candidate);
        let single_line = measure(text, font);
        let lines = if width > 0.0 {
            ((single_line.width + indent) / width).ceil().max(1.0)
        } else {
            1.0
        };
        let style = tree.style_mut(node);
        style.wrap_width = Some(width);
        style.text_indent = indent;
        style.size = Some(Size::new(width, lines * single_line.height));
        node
    }

    fn create_styled(
        &mut self,
        tree: &mut NodeTree,
        text: &StyledText,
        candidate: Option<NodeId>,
    ) -> NodeId {
        if text.count() == 1 {
            let run = &text.runs()[0];
            let node = Self::text_node(tree, run.text(), run.style().font.as_ref(), candidate);
            Self::apply_run_style(tree, node, run.style());
            return node;
        }

        // Multiple styles: a box container with one text child per run,
        // laid out by accumulated advance. Existing run children are reused
        // in sibling order, same as the canvas does with its own cursor.
        let container = match candidate {
            Some(node) if tree.kind(node) == ElementKind::Box => {
                tree.clear_styles(node);
                node
            }
            _ => tree.create(ElementKind::Box),
        };

        let mut cursor = tree.first_child(container);
        let mut offset = 0.0;
        let mut height = 0.0f64;
        for run in text.runs() {
            let child = Self::text_node(tree, run.text(), run.style().font.as_ref(), cursor);
            match cursor {
                Some(current) if current != child => tree.replace_child(current, child),
                Some(_) => {}
                None => tree.append(container, child),
            }
            cursor = tree.next_sibling(child);

            Self::apply_run_style(tree, child, run.style());
            let run_size = measure(run.text(), run.style().font.as_ref());
            tree.style_mut(child).left = offset;
            offset += run_size.width;
            height = height.max(run_size.height);
        }

        // Fewer runs than last time: drop the stale tail.
        while let Some(stale) = cursor {
            cursor = tree.next_sibling(stale);
            tree.remove(stale);
        }

        tree.style_mut(container).size = Some(Size::new(offset, height));
        container
    }

    fn wrapped_styled(
        &mut self,
        tree: &mut NodeTree,
        text: &StyledText,
        width: f64,
        indent: f64,
        candidate: Option<NodeId>,
    ) -> NodeId {
        let node = self.create_styled(tree, text, candidate);
        let measured = tree.style(node).size.unwrap_or(Size::EMPTY);
        let lines = if width > 0.0 {
            ((measured.width + indent) / width).ceil().max(1.0)
        } else {
            1.0
        };
        let style = tree.style_mut(node);
        style.wrap_width = Some(width);
        style.text_indent = indent;
        style.size = Some(Size::new(width, lines * measured.height));
        node
    }
}
