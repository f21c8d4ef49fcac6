//! The canvas reconciliation engine.
//!
//! A [`Canvas`] exposes the full drawing surface and reconciles every call
//! against the element tree left behind by the previous frame. Each
//! primitive is classified: a *simple* primitive (flat color, no structured
//! stroke, no active inset shadow) becomes a plain styled box or text node;
//! anything else is forwarded to the vector renderer. In both cases the
//! engine walks a cursor through the current region's existing children,
//! adopting nodes in place so a repeated frame touches no structure at all.
//!
//! # Frame protocol
//!
//! ```
//! use boxel::canvas::Canvas;
//! use boxel::geometry::{Rect, Size};
//! use boxel::style::{Color, Fill};
//!
//! let mut canvas = Canvas::new(Size::new(100.0, 100.0));
//! canvas.clear();
//! canvas.rect(Rect::new(0.0, 0.0, 10.0, 10.0), &Fill::solid(Color::RED));
//! canvas.flush();
//! ```
//!
//! `clear` rewinds the cursor to the first existing child; `flush` prunes
//! whatever trailing children the new frame did not claim.
//!
//! # Cursor invariants
//!
//! The cursor only moves forward within one frame pass, and always points
//! one past the most recently completed node. A `None` cursor means the
//! previous frame has no more nodes to offer and new output is appended.

use crate::factory::{BoxFactory, ElementFactory, SimpleTextFactory, TextFactory};
use crate::geometry::{Circle, Ellipse, FillRule, Path, Point, Polygon, Rect, Size};
use crate::image::Image;
use crate::style::{Fill, Shadow, Stroke};
use crate::text::{Font, StyledText};
use crate::transform::AffineTransform;
use crate::tree::{Border, BorderRadius, ElementKind, NodeId, NodeTree, Overflow, ShadowEffect};
use crate::vector::{RenderContext, VectorNodeRenderer, VectorRenderer};
use smallvec::SmallVec;

/// A retained-mode drawing surface with incremental node reuse.
pub struct Canvas {
    tree: NodeTree,
    render_parent: NodeId,
    region: NodeId,
    position: Option<NodeId>,
    size: Size,
    shadows: SmallVec<[Shadow; 2]>,
    inner_shadow_count: usize,
    elements: Box<dyn ElementFactory>,
    text_factory: Box<dyn TextFactory>,
    renderer: Box<dyn VectorRenderer>,
}

impl Canvas {
    /// Create a canvas with the default collaborators.
    pub fn new(size: Size) -> Self {
        Self::with_collaborators(
            size,
            Box::new(BoxFactory),
            Box::new(SimpleTextFactory),
            Box::new(VectorNodeRenderer::new()),
        )
    }

    /// Create a canvas with explicit collaborators.
    ///
    /// Everything is constructed up front; there is no deferred
    /// initialization to reason about.
    pub fn with_collaborators(
        size: Size,
        elements: Box<dyn ElementFactory>,
        text_factory: Box<dyn TextFactory>,
        renderer: Box<dyn VectorRenderer>,
    ) -> Self {
        let mut tree = NodeTree::new();
        let render_parent = tree.create(ElementKind::Box);
        tree.style_mut(render_parent).size = Some(size);
        Self {
            tree,
            render_parent,
            region: render_parent,
            position: None,
            size,
            shadows: SmallVec::new(),
            inner_shadow_count: 0,
            elements,
            text_factory,
            renderer,
        }
    }

    /// The canvas size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize the canvas.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.tree.style_mut(self.render_parent).size = Some(size);
    }

    /// The element tree the canvas renders into.
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Mutable access to the element tree, e.g. for registering [`Image`]
    /// resources or building external elements for [`Canvas::add_nodes`].
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    /// The node all frame output lands under.
    pub fn render_parent(&self) -> NodeId {
        self.render_parent
    }

    // === Classification ===

    /// Whether a fill can be rendered as a plain styled box.
    fn is_simple(&self, fill: &Fill) -> bool {
        if !fill.visible() {
            return true;
        }
        matches!(fill, Fill::Solid(_)) && self.inner_shadow_count == 0
    }

    /// Whether every run of a styled text is box/text-renderable.
    fn is_simple_text(&self, text: &StyledText) -> bool {
        text.runs().iter().all(|run| {
            let style = run.style();
            let fg = style.foreground.as_ref().map_or(true, |f| self.is_simple(f));
            let bg = style.background.as_ref().map_or(true, |f| self.is_simple(f));
            fg && bg
        })
    }

    // === Vector delegation ===

    fn vector<R>(
        &mut self,
        f: impl FnOnce(&mut dyn VectorRenderer, &mut RenderContext<'_>) -> R,
    ) -> R {
        let Canvas {
            tree,
            region,
            position,
            size,
            shadows,
            renderer,
            ..
        } = self;
        let mut ctx = RenderContext {
            tree,
            region: *region,
            position,
            size: *size,
            shadows: &shadows[..],
        };
        f(renderer.as_mut(), &mut ctx)
    }

    // === Node acquisition ===

    /// Create or adopt a box node at the cursor, with no residual styling.
    fn rect_element(&mut self) -> NodeId {
        let candidate = self.position;
        let node = self
            .elements
            .create_or_use(&mut self.tree, ElementKind::Box, candidate);
        self.tree.clear_styles(node);
        crate::trace!(?node, reused = (Some(node) == candidate), "acquired box element");
        node
    }

    /// A box node sized and positioned for the rectangle.
    ///
    /// Dimensions below one device pixel collapse to nothing in some
    /// rasterizers, so a sub-pixel dimension is doubled and compensated with
    /// a 0.5 scale on that axis. Size and transform are always set together.
    fn sized_rect(&mut self, rect: Rect) -> NodeId {
        let node = self.rect_element();

        let mut transform = AffineTransform::IDENTITY.translate(rect.x, rect.y);
        let mut width = rect.width;
        let mut height = rect.height;

        if rect.height < 1.0 {
            height *= 2.0;
            transform = transform.scale_xy(1.0, 0.5);
        }

        if rect.width < 1.0 {
            width *= 2.0;
            transform = transform.scale_xy(0.5, 1.0);
        }

        let style = self.tree.style_mut(node);
        style.size = Some(Size::new(width, height));
        style.transform = Some(transform);
        node
    }

    fn rounded_rect_node(&mut self, rect: Rect, x_radius: f64, y_radius: f64) -> NodeId {
        let node = self.sized_rect(rect);
        self.tree.style_mut(node).border_radius = Some(BorderRadius {
            x: x_radius,
            y: y_radius,
        });
        node
    }

    // === Completion ===

    /// Attach active shadow effects and splice the node in at the cursor.
    ///
    /// Text nodes take shadows on the text-shadow channel, everything else
    /// on the filter channel; inner shadows get the inset qualifier and the
    /// blur − 1 compensation. The splice preserves sibling order: append
    /// when the cursor is exhausted, replace in place otherwise, then
    /// advance the cursor past the completed node.
    fn complete_operation(&mut self, node: NodeId) -> NodeId {
        let is_text = self.tree.kind(node) == ElementKind::Text;
        for shadow in &self.shadows {
            let inset = shadow.is_inner();
            let effect = ShadowEffect {
                inset,
                horizontal: shadow.horizontal,
                vertical: shadow.vertical,
                blur: shadow.blur_radius - if inset { 1.0 } else { 0.0 },
                color: shadow.color,
            };
            let style = self.tree.style_mut(node);
            if is_text {
                style.text_shadows.push(effect);
            } else {
                style.filters.push(effect);
            }
        }

        match self.position {
            None => self.tree.append(self.region, node),
            Some(current) => {
                if current != node {
                    self.tree.replace_child(current, node);
                }
                self.position = self.tree.next_sibling(node);
            }
        }
        node
    }

    /// Style and complete a simple filled (and optionally bordered) node.
    fn present(
        &mut self,
        stroke: Option<&Stroke>,
        fill: &Fill,
        build: impl FnOnce(&mut Self) -> NodeId,
    ) {
        let visible = stroke.is_some_and(|s| s.visible()) || fill.visible();
        if !visible {
            return;
        }
        let node = build(self);
        if let Fill::Solid(color) = fill {
            self.tree.style_mut(node).background = Some(*color);
        }
        if let Some(stroke) = stroke {
            self.tree.style_mut(node).border = Some(Border {
                width: stroke.thickness,
                color: stroke.color,
            });
        }
        self.complete_operation(node);
    }

    // === Rectangles, circles, ellipses ===

    /// Fill a rectangle.
    pub fn rect(&mut self, rect: Rect, fill: &Fill) {
        if self.is_simple(fill) {
            self.present(None, fill, |canvas| canvas.sized_rect(rect));
        } else {
            self.vector(|r, ctx| r.rect(ctx, rect, fill));
        }
    }

    /// Stroke (and optionally fill) a rectangle. Structured strokes always
    /// render through the vector renderer.
    pub fn rect_stroked(&mut self, rect: Rect, stroke: &Stroke, fill: Option<&Fill>) {
        self.vector(|r, ctx| r.rect_stroked(ctx, rect, stroke, fill));
    }

    /// Fill a rounded rectangle.
    pub fn rounded_rect(&mut self, rect: Rect, radius: f64, fill: &Fill) {
        if self.is_simple(fill) {
            self.present(None, fill, |canvas| {
                canvas.rounded_rect_node(rect, radius, radius)
            });
        } else {
            self.vector(|r, ctx| r.rounded_rect(ctx, rect, radius, fill));
        }
    }

    /// Stroke (and optionally fill) a rounded rectangle.
    pub fn rounded_rect_stroked(
        &mut self,
        rect: Rect,
        radius: f64,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        self.vector(|r, ctx| r.rounded_rect_stroked(ctx, rect, radius, stroke, fill));
    }

    /// Fill a circle. The simple path renders it as a rounded box over the
    /// bounding rectangle.
    pub fn circle(&mut self, circle: Circle, fill: &Fill) {
        if self.is_simple(fill) {
            self.present(None, fill, |canvas| {
                canvas.rounded_rect_node(circle.bounding_rect(), circle.radius, circle.radius)
            });
        } else {
            self.vector(|r, ctx| r.circle(ctx, circle, fill));
        }
    }

    /// Stroke (and optionally fill) a circle.
    pub fn circle_stroked(&mut self, circle: Circle, stroke: &Stroke, fill: Option<&Fill>) {
        self.vector(|r, ctx| r.circle_stroked(ctx, circle, stroke, fill));
    }

    /// Fill an ellipse.
    pub fn ellipse(&mut self, ellipse: Ellipse, fill: &Fill) {
        if self.is_simple(fill) {
            self.present(None, fill, |canvas| {
                canvas.rounded_rect_node(ellipse.bounding_rect(), ellipse.x_radius, ellipse.y_radius)
            });
        } else {
            self.vector(|r, ctx| r.ellipse(ctx, ellipse, fill));
        }
    }

    /// Stroke (and optionally fill) an ellipse.
    pub fn ellipse_stroked(&mut self, ellipse: Ellipse, stroke: &Stroke, fill: Option<&Fill>) {
        self.vector(|r, ctx| r.ellipse_stroked(ctx, ellipse, stroke, fill));
    }

    // === Vector-only primitives ===

    /// Draw a line segment.
    pub fn line(&mut self, start: Point, end: Point, stroke: &Stroke) {
        self.vector(|r, ctx| r.line(ctx, start, end, stroke));
    }

    /// Stroke a path. Point lists become paths via
    /// [`Path::from_points`].
    pub fn path(&mut self, path: &Path, stroke: &Stroke) {
        self.vector(|r, ctx| r.path(ctx, path, stroke));
    }

    /// Fill a path.
    pub fn path_filled(&mut self, path: &Path, fill: &Fill, rule: FillRule) {
        self.vector(|r, ctx| r.path_filled(ctx, path, fill, rule));
    }

    /// Stroke and fill a path.
    pub fn path_stroked_filled(
        &mut self,
        path: &Path,
        stroke: &Stroke,
        fill: &Fill,
        rule: FillRule,
    ) {
        self.vector(|r, ctx| r.path_stroked_filled(ctx, path, stroke, fill, rule));
    }

    /// Fill a polygon.
    pub fn poly(&mut self, polygon: &Polygon, fill: &Fill) {
        self.vector(|r, ctx| r.poly(ctx, polygon, fill));
    }

    /// Stroke (and optionally fill) a polygon.
    pub fn poly_stroked(&mut self, polygon: &Polygon, stroke: &Stroke, fill: Option<&Fill>) {
        self.vector(|r, ctx| r.poly_stroked(ctx, polygon, stroke, fill));
    }

    /// Fill an arc. Angles are radians.
    pub fn arc(&mut self, center: Point, radius: f64, sweep: f64, rotation: f64, fill: &Fill) {
        self.vector(|r, ctx| r.arc(ctx, center, radius, sweep, rotation, fill));
    }

    /// Stroke (and optionally fill) an arc.
    pub fn arc_stroked(
        &mut self,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        self.vector(|r, ctx| r.arc_stroked(ctx, center, radius, sweep, rotation, stroke, fill));
    }

    /// Fill a pie wedge.
    pub fn wedge(&mut self, center: Point, radius: f64, sweep: f64, rotation: f64, fill: &Fill) {
        self.vector(|r, ctx| r.wedge(ctx, center, radius, sweep, rotation, fill));
    }

    /// Stroke (and optionally fill) a pie wedge.
    pub fn wedge_stroked(
        &mut self,
        center: Point,
        radius: f64,
        sweep: f64,
        rotation: f64,
        stroke: &Stroke,
        fill: Option<&Fill>,
    ) {
        self.vector(|r, ctx| r.wedge_stroked(ctx, center, radius, sweep, rotation, stroke, fill));
    }

    // === Text ===

    /// Draw a single-style text run.
    pub fn text(&mut self, text: &str, font: Option<&Font>, at: Point, fill: &Fill) {
        if text.is_empty() || !fill.visible() {
            return;
        }
        if let Fill::Solid(color) = fill {
            let candidate = self.position;
            let node = self
                .text_factory
                .create(&mut self.tree, text, font, candidate);
            let style = self.tree.style_mut(node);
            style.left = at.x;
            style.top = at.y;
            style.color = Some(*color);
            style.opacity = color.opacity;
            self.complete_operation(node);
        } else {
            self.vector(|r, ctx| r.text(ctx, text, font, at, fill));
        }
    }

    /// Draw a wrapped single-style text run between the given margins.
    pub fn wrapped_text(
        &mut self,
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
        if let Fill::Solid(color) = fill {
            let indent = (at.x - left_margin).max(0.0);
            let candidate = self.position;
            let node = self.text_factory.wrapped(
                &mut self.tree,
                text,
                font,
                right_margin - left_margin,
                indent,
                candidate,
            );
            let style = self.tree.style_mut(node);
            style.left = at.x;
            style.top = at.y;
            style.color = Some(*color);
            style.opacity = color.opacity;
            self.complete_operation(node);
        } else {
            self.vector(|r, ctx| {
                r.wrapped_text(ctx, text, font, at, left_margin, right_margin, fill)
            });
        }
    }

    /// Draw styled text; simple when every run's fills are simple.
    pub fn styled_text(&mut self, text: &StyledText, at: Point) {
        if self.is_simple_text(text) {
            let candidate = self.position;
            let node = self
                .text_factory
                .create_styled(&mut self.tree, text, candidate);
            let style = self.tree.style_mut(node);
            style.left = at.x;
            style.top = at.y;
            self.complete_operation(node);
        } else {
            self.vector(|r, ctx| r.styled_text(ctx, text, at));
        }
    }

    /// Draw wrapped styled text between the given margins.
    pub fn wrapped_styled_text(
        &mut self,
        text: &StyledText,
        at: Point,
        left_margin: f64,
        right_margin: f64,
    ) {
        if self.is_simple_text(text) {
            let indent = (at.x - left_margin).max(0.0);
            let candidate = self.position;
            let node = self.text_factory.wrapped_styled(
                &mut self.tree,
                text,
                right_margin - left_margin,
                indent,
                candidate,
            );
            let style = self.tree.style_mut(node);
            style.left = at.x;
            style.top = at.y;
            self.complete_operation(node);
        } else {
            self.vector(|r, ctx| r.wrapped_styled_text(ctx, text, at, left_margin, right_margin));
        }
    }

    // === Images ===

    /// Draw an image into `destination`, optionally rounding corners and
    /// cropping to a `source` sub-rectangle of the pixel data.
    ///
    /// A zero opacity, empty image, or empty source/destination skips the
    /// draw entirely.
    pub fn image(&mut self, image: &Image, destination: Rect, opacity: f32, radius: f64, source: Rect) {
        if opacity <= 0.0 || image.is_empty() || source.is_empty() || destination.is_empty() {
            return;
        }

        if source.size() == image.size() && source.position() == Point::ORIGIN {
            let node = self.image_node(image, destination, radius, opacity);
            self.complete_operation(node);
        } else {
            // Crop: clip box at the destination, image child scaled so the
            // source window lands exactly on the box.
            let clip = self.sized_rect(destination);
            let saved_position = self.position;
            self.position = self.tree.first_child(clip);

            let x_ratio = destination.width / source.width;
            let y_ratio = destination.height / source.height;

            let scaled = Rect::new(
                -x_ratio * source.x,
                -y_ratio * source.y,
                x_ratio * image.size().width,
                y_ratio * image.size().height,
            );
            let node = self.image_node(image, scaled, 0.0, opacity);

            if self.position != Some(node) {
                self.tree.append(clip, node);
            }

            self.position = saved_position;
            self.complete_operation(clip);
        }
    }

    /// Create or adopt an image node and configure its placement.
    fn image_node(&mut self, image: &Image, rect: Rect, radius: f64, opacity: f32) -> NodeId {
        let node = self.pick_image_node(image);
        let style = self.tree.style_mut(node);
        style.left = rect.x;
        style.top = rect.y;
        style.size = Some(rect.size());
        style.opacity = opacity;
        if radius > 0.0 {
            style.border_radius = Some(BorderRadius::uniform(radius));
        }
        node
    }

    /// Adopt the cursor node when it is an image element, otherwise clone a
    /// fresh instance from the image's prototype.
    fn pick_image_node(&mut self, image: &Image) -> NodeId {
        match self.position {
            Some(candidate) if self.tree.kind(candidate) == ElementKind::Image => {
                self.tree.clear_styles(candidate);
                self.tree.set_image_source(candidate, image.source());
                self.tree.set_intrinsic_size(candidate, image.size());
                candidate
            }
            _ => self
                .elements
                .clone_node(&mut self.tree, image.prototype(), false),
        }
    }

    // === Sub-frames ===

    /// Run a drawing block inside a dedicated container node, preserving
    /// cursor reuse on both sides of the scope.
    fn sub_frame(&mut self, configure: impl FnOnce(&mut Self, NodeId), block: impl FnOnce(&mut Self)) {
        let container = self.rect_element();

        if self.tree.parent(container).is_none() {
            match self.position {
                Some(current) => self.tree.replace_child(current, container),
                None => self.tree.append(self.region, container),
            }
        }

        self.tree.style_mut(container).size = Some(self.size);
        configure(self, container);

        self.region = container;
        self.position = self.tree.first_child(container);

        block(self);

        self.region = self.tree.parent(container).expect("container is attached");
        self.position = self.tree.next_sibling(container);
    }

    /// Run a drawing block under an affine transform.
    ///
    /// The identity bypasses the sub-frame machinery entirely. Any other
    /// transform is recentered so rotation and scale pivot at the canvas
    /// midpoint, and the container lets children overflow: the scope's box
    /// must not clip rotated content.
    pub fn transform(&mut self, transform: AffineTransform, block: impl FnOnce(&mut Self)) {
        if transform.is_identity() {
            block(self);
            return;
        }

        let center = Point::new(self.size.width / 2.0, self.size.height / 2.0);
        self.sub_frame(
            move |canvas, container| {
                let centered = (AffineTransform::IDENTITY.translate(-center.x, -center.y)
                    * transform)
                    .translate(center.x, center.y);
                let style = canvas.tree.style_mut(container);
                style.transform = Some(centered);
                style.overflow = Overflow::Visible;
            },
            block,
        );
    }

    /// Clip a drawing block to a rectangle with a corner radius.
    pub fn clip_rect(&mut self, rect: Rect, radius: f64, block: impl FnOnce(&mut Self)) {
        let offset = rect.position();
        self.sub_frame(
            move |canvas, container| {
                let style = canvas.tree.style_mut(container);
                style.left = rect.x;
                style.top = rect.y;
                style.size = Some(rect.size());
                if radius > 0.0 {
                    style.border_radius = Some(BorderRadius::uniform(radius));
                }
            },
            move |canvas| {
                canvas.transform(AffineTransform::translation(-offset.x, -offset.y), block);
            },
        );
    }

    /// Clip a drawing block to a polygon.
    pub fn clip_polygon(&mut self, polygon: &Polygon, block: impl FnOnce(&mut Self)) {
        let size = self.size;
        let percents: Vec<Point> = polygon
            .points()
            .iter()
            .map(|p| Point::new(p.x / size.width * 100.0, p.y / size.height * 100.0))
            .collect();
        self.sub_frame(
            move |canvas, container| {
                canvas.tree.style_mut(container).clip_path = Some(percents);
            },
            block,
        );
    }

    // === Shadows ===

    /// Run a drawing block with an additional active shadow.
    ///
    /// Shadow scopes nest: every primitive completed while N shadows are
    /// active receives all N layered effects. The descriptor is mirrored to
    /// the vector renderer for its own primitives.
    pub fn shadow(&mut self, shadow: Shadow, block: impl FnOnce(&mut Self)) {
        self.shadows.push(shadow);
        if shadow.is_inner() {
            self.inner_shadow_count += 1;
        }
        self.renderer.add_shadow(shadow);

        block(self);

        self.renderer.remove_shadow(shadow);
        if shadow.is_inner() {
            self.inner_shadow_count -= 1;
        }
        if let Some(index) = self.shadows.iter().rposition(|s| *s == shadow) {
            self.shadows.remove(index);
        }
    }

    // === External elements ===

    /// Splice externally built elements in at the cursor, offset by `at`.
    ///
    /// Injected elements occupy sibling slots the vector renderer may be
    /// tracking for positional reuse, so its positional state is dropped
    /// afterwards; canvas-scoped shadows are unaffected.
    pub fn add_nodes(&mut self, nodes: &[NodeId], at: Point) {
        for &node in nodes {
            if at.y != 0.0 {
                self.tree.style_mut(node).top += at.y;
            }
            if at.x != 0.0 {
                self.tree.style_mut(node).left += at.x;
            }

            match self.position {
                Some(current) => {
                    let next = self.tree.next_sibling(current);
                    if node != current {
                        self.tree.replace_child(current, node);
                    }
                    self.position = next;
                }
                None => self.tree.append(self.region, node),
            }
        }

        self.renderer.clear();
    }

    // === Frame lifecycle ===

    /// Begin a frame: rewind the cursor to the first existing child so the
    /// new pass reuses nodes top to bottom.
    pub fn clear(&mut self) {
        self.position = self.tree.first_child(self.render_parent);
        self.renderer.clear();
    }

    /// End a frame: prune every sibling from the cursor position to the end
    /// of the render parent's children, i.e. leftovers from a longer
    /// previous frame.
    pub fn flush(&mut self) {
        if let Some(position) = self.position {
            if let Some(index) = self.tree.index_of(self.render_parent, position) {
                crate::trace!(stale_from = index, "flush pruning trailing nodes");
                while self.tree.num_children(self.render_parent) > index {
                    let child = self
                        .tree
                        .child_at(self.render_parent, index)
                        .expect("child at a valid index");
                    self.tree.remove(child);
                }
            }
            // The cursor pointed into the pruned tail; park it so stray
            // output after flush appends instead of touching dropped nodes.
            self.position = None;
        }

        self.renderer.flush();
    }
}
