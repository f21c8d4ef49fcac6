//! The vector-renderer collaborator.
//!
//! Anything the canvas cannot express as a plain styled box (structured
//! strokes, paths, polygons, arcs, gradient fills, styled text with
//! non-simple runs) is forwarded here. The canvas lends the renderer its
//! tree, render region, and cursor through [`RenderContext`] for the
//! duration of one call, so vector output participates in the same
//! positional reuse as box output.

use crate::geometry::{Circle, Ellipse, FillRule, Path, Point, Polygon, Rect, Size};
use crate::style::{Fill, Shadow, Stroke};
use crate::text::{Font, StyledText, TextStyle};
use crate::tree::{ElementKind, NodeId, NodeTree, ShadowEffect};
use smallvec::SmallVec;

/// Mutable view of the canvas's reconciliation state, lent to the vector
/// renderer for one primitive.
pub struct RenderContext<'a> {
    /// The element tree.
    pub tree: &'a mut NodeTree,
    /// The subtree root currently receiving nodes.
    pub region: NodeId,
    /// The render cursor: next reusable sibling, `None` to append.
    pub position: &'a mut Option<NodeId>,
    /// Current canvas size.
    pub size: Size,
    /// Shadows active on the canvas, outermost first.
    pub shadows: &'a [Shadow],
}

/// Wrap margins for wrapped text primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextWrap {
    /// Left wrap margin.
    pub left_margin: f64,
    /// Right wrap margin.
    pub right_margin: f64,
}

/// The recorded payload of one vector primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorData {
    /// Rectangle, optionally rounded, stroked, filled.
    Rect {
        /// Bounds.
        rect: Rect,
        /// Per-axis corner radius.
        radius: Option<(f64, f64)>,
        /// Outline.
        stroke: Option<Stroke>,
        /// Interior.
        fill: Option<Fill>,
    },
    /// Circle.
    Circle {
        /// Shape.
        circle: Circle,
        /// Outline.
        stroke: Option<Stroke>,
        /// Interior.
        fill: Option<Fill>,
    },
    /// Ellipse.
    Ellipse {
        /// Shape.
        ellipse: Ellipse,
        /// Outline.
        stroke: Option<Stroke>,
        /// Interior.
        fill: Option<Fill>,
    },
    /// Straight line segment.
    Line {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
        /// Outline.
        stroke: Stroke,
    },
    /// Arbitrary path.
    Path {
        /// Segments.
        path: Path,
        /// Outline.
        stroke: Option<Stroke>,
        /// Interior.
        fill: Option<Fill>,
        /// Interior winding rule.
        rule: FillRule,
    },
    /// Closed polygon.
    Polygon {
        /// Shape.
        polygon: Polygon,
        /// Outline.
        stroke: Option<Stroke>,
        /// Interior.
        fill: Option<Fill>,
    },
    /// Circular arc; `closed` draws the pie wedge to the center.
    Arc {
        /// Center point.
        center: Point,
        /// Radius.
        radius: f64,
        /// Sweep angle in radians.
        sweep: f64,
        /// Start rotation in radians.
        rotation: f64,
        /// Whether the arc closes into a wedge.
        closed: bool,
        /// Outline.
        stroke: Option<Stroke>,
        /// Interior.
        fill: Option<Fill>,
    },
    /// Text with per-run styling.
    Text {
        /// Runs.
        text: StyledText,
        /// Baseline-left anchor.
        at: Point,
        /// Wrap margins, `None` for a single line.
        wrap: Option<TextWrap>,
    },
}

/// Renders the primitives the box fast path cannot express.
///
/// Implementations splice their output into the lent region at the lent
/// cursor, following the same replace-or-append discipline as the canvas, so
/// box and vector nodes interleave freely within one frame.
#[allow(missing_docs)]
pub trait VectorRenderer {
    fn rect(&mut self, ctx: &mut RenderContext<'_>, rect: Rect, fill: &Fill);
    fn rect_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        rect: Rect,
        stroke: &Stroke,
        fill: Option<&Fill>,
    );
    fn rounded_rect(&mut self, ctx: &mut RenderContext<'_>, rect: Rect, radius: f64, fill: &Fill);
    fn rounded_rect_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        rect: Rect,
        radius: f64,
        stroke: &Stroke,
        fill: Option<&Fill>,
    );
    fn circle(&mut self, ctx: &mut RenderContext<'_>, circle: Circle, fill: &Fill);
    fn circle_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        circle: Circle,
        stroke: &Stroke,
        fill: Option<&Fill>,
    );
    fn ellipse(&mut self, ctx: &mut RenderContext<'_>, ellipse: Ellipse, fill: &Fill);
    fn ellipse_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        ellipse: Ellipse,
        stroke: &Stroke,
        fill: Option<&Fill>,
    );
    fn line(&mut self, ctx: &mut RenderContext<'_>, start: Point, end: Point, stroke: &Stroke);
    fn path(&mut self, ctx: &mut RenderContext<'_>, path: &Path, stroke: &Stroke);
    fn path_filled(
        &mut self,
        ctx: &mut RenderContext<'_>,
        path: &Path,
        fill: &Fill,
        rule: FillRule,
    );
    fn path_stroked_filled(
        &mut self,
        ctx: &mut RenderContext<'_>,
        path: &Path,
        stroke: &Stroke,
        fill: &Fill,
        rule: FillRule,
    );
    fn poly(&mut self, ctx: &mut RenderContext<'_>, polygon: &Polygon, fill: &Fill);
    fn poly_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        polygon: &Polygon,
        stroke: &Stroke,
        fill: Option<&Fill>,
    );
    fn arc(
        &mut self,
        ctx: &mut RenderContext<'_>,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        fill: &Fill,
    );
    fn arc_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        stroke: &Stroke,
        fill: Option<&Fill>,
    );
    fn wedge(
        &mut self,
        ctx: &mut RenderContext<'_>,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        fill: &Fill,
    );
    fn wedge_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        stroke: &Stroke,
        fill: Option<&Fill>,
    );
    fn text(
        &mut self,
        ctx: &mut RenderContext<'_>,
        text: &str,
        font: Option<&Font>,
        at: Point,
        fill: &Fill,
    );
    fn styled_text(&mut self, ctx: &mut RenderContext<'_>, text: &StyledText, at: Point);
    fn wrapped_text(
        &mut self,
        ctx: &mut RenderContext<'_>,
        text: &str,
        font: Option<&Font>,
        at: Point,
        left_margin: f64,
        right_margin: f64,
        fill: &Fill,
    );
    fn wrapped_styled_text(
        &mut self,
        ctx: &mut RenderContext<'_>,
        text: &StyledText,
        at: Point,
        left_margin: f64,
        right_margin: f64,
    );

    /// A shadow scope opened on the canvas.
    fn add_shadow(&mut self, shadow: Shadow);
    /// A shadow scope closed on the canvas.
    fn remove_shadow(&mut self, shadow: Shadow);
    /// Frame start: drop retained per-frame state.
    fn clear(&mut self);
    /// Frame end.
    fn flush(&mut self);
}

/// Reference [`VectorRenderer`]: materializes one `Vector` node per
/// primitive, reusing vector nodes at the cursor.
///
/// Retained state lives entirely in the node tree, so `clear`/`flush` have
/// nothing to drop; the hooks matter for renderers with caches of their own.
#[derive(Debug, Default)]
pub struct VectorNodeRenderer {
    shadows: SmallVec<[Shadow; 2]>,
}

impl VectorNodeRenderer {
    /// Create a renderer with no active shadows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether either paint would change any pixels.
    fn visible(stroke: Option<&Stroke>, fill: Option<&Fill>) -> bool {
        stroke.is_some_and(|s| s.visible()) || fill.is_some_and(|f| f.visible())
    }

    /// Create or adopt a vector node, record its payload, attach shadows,
    /// and splice it at the cursor.
    fn emit(&self, ctx: &mut RenderContext<'_>, data: VectorData) {
        let node = match *ctx.position {
            Some(candidate) if ctx.tree.kind(candidate) == ElementKind::Vector => {
                ctx.tree.clear(candidate);
                candidate
            }
            _ => ctx.tree.create(ElementKind::Vector),
        };
        ctx.tree.set_vector_data(node, data);

        let effects: Vec<ShadowEffect> = self
            .shadows
            .iter()
            .map(|shadow| ShadowEffect {
                inset: shadow.is_inner(),
                horizontal: shadow.horizontal,
                vertical: shadow.vertical,
                blur: shadow.blur_radius - if shadow.is_inner() { 1.0 } else { 0.0 },
                color: shadow.color,
            })
            .collect();
        ctx.tree.style_mut(node).filters = effects;

        match *ctx.position {
            None => ctx.tree.append(ctx.region, node),
            Some(current) => {
                if current != node {
                    ctx.tree.replace_child(current, node);
                }
                *ctx.position = ctx.tree.next_sibling(node);
            }
        }
    }

    fn plain_run(text: &str, font: Option<&Font>, fill: &Fill) -> StyledText {
        let mut style = TextStyle::new().foreground(fill.clone());
        if let Some(font) = font {
            style = style.font(font.clone());
        }
        StyledText::styled(text, style)
    }
}

impl VectorRenderer for VectorNodeRenderer {
    fn rect(&mut self, ctx: &mut RenderContext<'_>, rect: Rect, fill: &Fill) {
        if !Self::visible(None, Some(fill)) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Rect {
                rect,
                radius: None,
                stroke: None,
                fill: Some(fill.clone()),
            },
        );
    }

    fn rect_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        rect: Rect,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        if !Self::visible(Some(stroke), fill) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Rect {
                rect,
                radius: None,
                stroke: Some(stroke.clone()),
                fill: fill.cloned(),
            },
        );
    }

    fn rounded_rect(&mut self, ctx: &mut RenderContext<'_>, rect: Rect, radius: f64, fill: &Fill) {
        if !Self::visible(None, Some(fill)) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Rect {
                rect,
                radius: Some((radius, radius)),
                stroke: None,
                fill: Some(fill.clone()),
            },
        );
    }

    fn rounded_rect_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        rect: Rect,
        radius: f64,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        if !Self::visible(Some(stroke), fill) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Rect {
                rect,
                radius: Some((radius, radius)),
                stroke: Some(stroke.clone()),
                fill: fill.cloned(),
            },
        );
    }

    fn circle(&mut self, ctx: &mut RenderContext<'_>, circle: Circle, fill: &Fill) {
        if !Self::visible(None, Some(fill)) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Circle {
                circle,
                stroke: None,
                fill: Some(fill.clone()),
            },
        );
    }

    fn circle_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        circle: Circle,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        if !Self::visible(Some(stroke), fill) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Circle {
                circle,
                stroke: Some(stroke.clone()),
                fill: fill.cloned(),
            },
        );
    }

    fn ellipse(&mut self, ctx: &mut RenderContext<'_>, ellipse: Ellipse, fill: &Fill) {
        if !Self::visible(None, Some(fill)) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Ellipse {
                ellipse,
                stroke: None,
                fill: Some(fill.clone()),
            },
        );
    }

    fn ellipse_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        ellipse: Ellipse,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        if !Self::visible(Some(stroke), fill) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Ellipse {
                ellipse,
                stroke: Some(stroke.clone()),
                fill: fill.cloned(),
            },
        );
    }

    fn line(&mut self, ctx: &mut RenderContext<'_>, start: Point, end: Point, stroke: &Stroke) {
        if !stroke.visible() {
            return;
        }
        self.emit(
            ctx,
            VectorData::Line {
                start,
                end,
                stroke: stroke.clone(),
            },
        );
    }

    fn path(&mut self, ctx: &mut RenderContext<'_>, path: &Path, stroke: &Stroke) {
        if path.is_empty() || !stroke.visible() {
            return;
        }
        self.emit(
            ctx,
            VectorData::Path {
                path: path.clone(),
                stroke: Some(stroke.clone()),
                fill: None,
                rule: FillRule::default(),
            },
        );
    }

    fn path_filled(
        &mut self,
        ctx: &mut RenderContext<'_>,
        path: &Path,
        fill: &Fill,
        rule: FillRule,
    ) {
        if path.is_empty() || !fill.visible() {
            return;
        }
        self.emit(
            ctx,
            VectorData::Path {
                path: path.clone(),
                stroke: None,
                fill: Some(fill.clone()),
                rule,
            },
        );
    }

    fn path_stroked_filled(
        &mut self,
        ctx: &mut RenderContext<'_>,
        path: &Path,
        stroke: &Stroke,
        fill: &Fill,
        rule: FillRule,
    ) {
        if path.is_empty() || !Self::visible(Some(stroke), Some(fill)) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Path {
                path: path.clone(),
                stroke: Some(stroke.clone()),
                fill: Some(fill.clone()),
                rule,
            },
        );
    }

    fn poly(&mut self, ctx: &mut RenderContext<'_>, polygon: &Polygon, fill: &Fill) {
        if !Self::visible(None, Some(fill)) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Polygon {
                polygon: polygon.clone(),
                stroke: None,
                fill: Some(fill.clone()),
            },
        );
    }

    fn poly_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        polygon: &Polygon,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        if !Self::visible(Some(stroke), fill) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Polygon {
                polygon: polygon.clone(),
                stroke: Some(stroke.clone()),
                fill: fill.cloned(),
            },
        );
    }

    fn arc(
        &mut self,
        ctx: &mut RenderContext<'_>,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        fill: &Fill,
    ) {
        if !Self::visible(None, Some(fill)) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Arc {
                center,
                radius,
                sweep,
                rotation,
                closed: false,
                stroke: None,
                fill: Some(fill.clone()),
            },
        );
    }

    fn arc_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        if !Self::visible(Some(stroke), fill) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Arc {
                center,
                radius,
                sweep,
                rotation,
                closed: false,
                stroke: Some(stroke.clone()),
                fill: fill.cloned(),
            },
        );
    }

    fn wedge(
        &mut self,
        ctx: &mut RenderContext<'_>,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        fill: &Fill,
    ) {
        if !Self::visible(None, Some(fill)) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Arc {
                center,
                radius,
                sweep,
                rotation,
                closed: true,
                stroke: None,
                fill: Some(fill.clone()),
            },
        );
    }

    fn wedge_stroked(
        &mut self,
        ctx: &mut RenderContext<'_>,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        if !Self::visible(Some(stroke), fill) {
            return;
        }
        self.emit(
            ctx,
            VectorData::Arc {
                center,
                radius,
                sweep,
                rotation,
                closed: true,
                stroke: Some(stroke.clone()),
                fill: fill.cloned(),
            },
        );
    }

    fn text(
        &mut self,
        ctx: &mut RenderContext<'_>,
        text: &str,
        font: Option<&Font>,
        at: Point,
        fill: &Fill,
    ) {
        if text.is_empty() || !fill.visible() {
            return;
        }
        self.emit(
            ctx,
            VectorData::Text {
                text: Self::plain_run(text, font, fill),
                at,
                wrap: None,
            },
        );
    }

    fn styled_text(&mut self, ctx: &mut RenderContext<'_>, text: &StyledText, at: Point) {
        self.emit(
            ctx,
            VectorData::Text {
                text: text.clone(),
                at,
                wrap: None,
            },
        );
    }

    fn wrapped_text(
        &mut self,
        ctx: &mut RenderContext<'_>,
        text: &str,
        font: Option<&Font>,
        at: Point,
        left_margin: f64,
        right_margin: f64,
        fill: &Fill,
    ) {
        if text.is_empty() || !fill.visible() {
            return;
        }
        self.emit(
            ctx,
            VectorData::Text {
                text: Self::plain_run(text, font, fill),
                at,
                wrap: Some(TextWrap {
                    left_margin,
                    right_margin,
                }),
            },
        );
    }

    fn wrapped_styled_text(
        &mut self,
        ctx: &mut RenderContext<'_>,
        text: &StyledText,
        at: Point,
        left_margin: f64,
        right_margin: f64,
    ) {
        self.emit(
            ctx,
            VectorData::Text {
                text: text.clone(),
                at,
                wrap: Some(TextWrap {
                    left_margin,
                    right_margin,
                }),
            },
        );
    }

    fn add_shadow(&mut self, shadow: Shadow) {
        self.shadows.push(shadow);
    }

    fn remove_shadow(&mut self, shadow: Shadow) {
        if let Some(index) = self.shadows.iter().rposition(|s| *s == shadow) {
            self.shadows.remove(index);
        }
    }

    fn clear(&mut self) {}

    fn flush(&mut self) {}
}
