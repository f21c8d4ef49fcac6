//! Style definitions for how shapes are painted.
//!
//! Fills, strokes, and shadows are immutable descriptors created per drawing
//! call. The canvas only inspects them to pick a rendering strategy; the
//! actual pixels are the host's or the vector renderer's concern.

use crate::geometry::Point;
use std::hash::{Hash, Hasher};

// === Color ===

/// A 24-bit RGB color with a fractional opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Opacity in `[0, 1]`; 0 is fully transparent.
    pub opacity: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Color = Color::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    /// Create an opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Create a color with explicit opacity.
    pub const fn rgba(red: u8, green: u8, blue: u8, opacity: f32) -> Self {
        Self {
            red,
            green,
            blue,
            opacity,
        }
    }

    /// Create a color from a hex string (e.g., "#ff0000" or "ff0000").
    pub fn hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }

    /// The same color with a different opacity.
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self { opacity, ..self }
    }

    /// Whether the color contributes anything when painted.
    pub fn visible(&self) -> bool {
        self.opacity > 0.0
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.red.hash(state);
        self.green.hash(state);
        self.blue.hash(state);
        self.opacity.to_bits().hash(state);
    }
}

// === Fill ===

/// One stop of a [`Gradient`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient axis in `[0, 1]`.
    pub offset: f64,
    /// Color at this stop.
    pub color: Color,
}

/// A linear gradient between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    /// Gradient axis start.
    pub start: Point,
    /// Gradient axis end.
    pub end: Point,
    /// Ordered color stops.
    pub stops: Vec<GradientStop>,
}

/// How a shape's interior is painted.
///
/// A closed set of variants: the canvas classifies fills exhaustively when
/// deciding between the box fast path and the vector renderer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fill {
    /// Paint nothing; the draw is a no-op.
    #[default]
    Invisible,
    /// A flat color.
    Solid(Color),
    /// A linear gradient, always rendered by the vector renderer.
    LinearGradient(Gradient),
}

impl Fill {
    /// A solid fill, or [`Fill::Invisible`] when the color is transparent.
    pub fn solid(color: Color) -> Self {
        if color.visible() {
            Fill::Solid(color)
        } else {
            Fill::Invisible
        }
    }

    /// Whether painting this fill changes any pixels.
    pub fn visible(&self) -> bool {
        match self {
            Fill::Invisible => false,
            Fill::Solid(color) => color.visible(),
            Fill::LinearGradient(gradient) => gradient.stops.iter().any(|s| s.color.visible()),
        }
    }
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Fill::solid(color)
    }
}

impl Eq for Fill {}

impl Hash for Fill {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Fill::Invisible => 0u8.hash(state),
            Fill::Solid(color) => {
                1u8.hash(state);
                color.hash(state);
            }
            Fill::LinearGradient(gradient) => {
                2u8.hash(state);
                gradient.start.x.to_bits().hash(state);
                gradient.start.y.to_bits().hash(state);
                gradient.end.x.to_bits().hash(state);
                gradient.end.y.to_bits().hash(state);
                for stop in &gradient.stops {
                    stop.offset.to_bits().hash(state);
                    stop.color.hash(state);
                }
            }
        }
    }
}

// === Stroke ===

/// Line ending style for open strokes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineCap {
    /// Flat edge at the endpoint.
    #[default]
    Butt,
    /// Semicircular cap.
    Round,
    /// Square cap extending half the thickness.
    Square,
}

/// Corner style where stroke segments meet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Flattened corner.
    Bevel,
}

/// How a shape's outline is painted.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Outline color.
    pub color: Color,
    /// Outline thickness.
    pub thickness: f64,
    /// Endpoint style.
    pub cap: LineCap,
    /// Corner style.
    pub join: LineJoin,
    /// Dash pattern lengths, `None` for a solid line.
    pub dash: Option<Vec<f64>>,
}

impl Stroke {
    /// A solid stroke with default thickness 1.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            thickness: 1.0,
            cap: LineCap::default(),
            join: LineJoin::default(),
            dash: None,
        }
    }

    /// Set the thickness.
    pub fn thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Set the endpoint cap.
    pub fn cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    /// Set the corner join.
    pub fn join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    /// Set a dash pattern.
    pub fn dash(mut self, pattern: Vec<f64>) -> Self {
        self.dash = Some(pattern);
        self
    }

    /// Whether painting this stroke changes any pixels.
    pub fn visible(&self) -> bool {
        self.thickness > 0.0 && self.color.visible()
    }
}

// === Shadow ===

/// Which side of the shape boundary a shadow is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowKind {
    /// Drawn inside the shape. Disqualifies otherwise-simple fills from the
    /// box fast path.
    Inner,
    /// Drawn outside the shape.
    Outer,
}

/// A drop or inset shadow descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Horizontal offset.
    pub horizontal: f64,
    /// Vertical offset.
    pub vertical: f64,
    /// Blur radius.
    pub blur_radius: f64,
    /// Shadow color.
    pub color: Color,
    /// Inside or outside the shape boundary.
    pub kind: ShadowKind,
}

impl Shadow {
    /// An outer (drop) shadow.
    pub fn outer(horizontal: f64, vertical: f64, blur_radius: f64, color: Color) -> Self {
        Self {
            horizontal,
            vertical,
            blur_radius,
            color,
            kind: ShadowKind::Outer,
        }
    }

    /// An inner (inset) shadow.
    pub fn inner(horizontal: f64, vertical: f64, blur_radius: f64, color: Color) -> Self {
        Self {
            horizontal,
            vertical,
            blur_radius,
            color,
            kind: ShadowKind::Inner,
        }
    }

    /// Whether the shadow is drawn inside the shape.
    pub fn is_inner(&self) -> bool {
        self.kind == ShadowKind::Inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::hex("#ff0000"), Some(Color::RED));
        assert_eq!(Color::hex("00ff00"), Some(Color::GREEN));
        assert_eq!(Color::hex("#nope"), None);
    }

    #[test]
    fn test_transparent_color_is_invisible() {
        assert!(!Color::TRANSPARENT.visible());
        assert!(!Color::RED.with_opacity(0.0).visible());
        assert!(Color::RED.visible());
    }

    #[test]
    fn test_fill_solid_collapses_transparent() {
        assert_eq!(Fill::solid(Color::TRANSPARENT), Fill::Invisible);
        assert!(matches!(Fill::solid(Color::RED), Fill::Solid(_)));
    }

    #[test]
    fn test_fill_visibility() {
        assert!(!Fill::Invisible.visible());
        assert!(Fill::Solid(Color::BLUE).visible());
        let gradient = Fill::LinearGradient(Gradient {
            start: Point::ORIGIN,
            end: Point::new(1.0, 0.0),
            stops: vec![GradientStop {
                offset: 0.0,
                color: Color::TRANSPARENT,
            }],
        });
        assert!(!gradient.visible());
    }

    #[test]
    fn test_stroke_visibility() {
        assert!(Stroke::new(Color::BLACK).visible());
        assert!(!Stroke::new(Color::BLACK).thickness(0.0).visible());
        assert!(!Stroke::new(Color::TRANSPARENT).visible());
    }
}
