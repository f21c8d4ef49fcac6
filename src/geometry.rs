//! Geometric primitives used throughout the drawing surface.
//!
//! All scalar geometry is `f64`. The types here are plain immutable values;
//! the canvas and vector renderer consume them without mutating.

use smallvec::SmallVec;

/// Error type for geometry construction.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// A polygon needs at least three vertices.
    #[error("polygon requires at least 3 points, got {0}")]
    DegeneratePolygon(usize),
}

/// A point in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// The origin, `(0, 0)`.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// The empty size, `0 × 0`.
    pub const EMPTY: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero or negative.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and size.
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin with the given size.
    #[inline]
    pub fn sized(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// The top-left corner.
    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The rectangle's extent.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether a point falls inside the rectangle (edges inclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// The four corners in clockwise order starting at the top-left.
    pub fn points(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

/// A circle described by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center point.
    pub center: Point,
    /// Radius.
    pub radius: f64,
}

impl Circle {
    /// Create a new circle.
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// The smallest rectangle enclosing the circle.
    pub fn bounding_rect(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// An axis-aligned ellipse described by center and per-axis radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    /// Center point.
    pub center: Point,
    /// Horizontal radius.
    pub x_radius: f64,
    /// Vertical radius.
    pub y_radius: f64,
}

impl Ellipse {
    /// Create a new ellipse.
    pub fn new(center: Point, x_radius: f64, y_radius: f64) -> Self {
        Self {
            center,
            x_radius,
            y_radius,
        }
    }

    /// The smallest rectangle enclosing the ellipse.
    pub fn bounding_rect(&self) -> Rect {
        Rect::new(
            self.center.x - self.x_radius,
            self.center.y - self.y_radius,
            self.x_radius * 2.0,
            self.y_radius * 2.0,
        )
    }
}

/// A closed polygon with at least three vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Create a polygon from its vertices.
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::DegeneratePolygon(points.len()));
        }
        Ok(Self { points })
    }

    /// The polygon's vertices in order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The smallest rectangle enclosing all vertices.
    pub fn bounding_rect(&self) -> Rect {
        let mut min = self.points[0];
        let mut max = self.points[0];
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }
}

impl From<Rect> for Polygon {
    fn from(rect: Rect) -> Self {
        Self {
            points: rect.points().to_vec(),
        }
    }
}

impl From<[Point; 4]> for Polygon {
    fn from(corners: [Point; 4]) -> Self {
        Self {
            points: corners.to_vec(),
        }
    }
}

/// One segment of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Start a new sub-path at the point.
    MoveTo(Point),
    /// Straight line to the point.
    LineTo(Point),
    /// Quadratic Bézier through one control point.
    QuadTo(Point, Point),
    /// Cubic Bézier through two control points.
    CubicTo(Point, Point, Point),
    /// Close the current sub-path.
    Close,
}

/// An arbitrary vector path, consumed by the vector renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: SmallVec<[PathSegment; 8]>,
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an open polyline through the given points.
    ///
    /// Fewer than two points yields an empty path, which every drawing
    /// operation treats as a no-op.
    pub fn from_points(points: &[Point]) -> Self {
        let mut segments = SmallVec::new();
        if points.len() >= 2 {
            segments.push(PathSegment::MoveTo(points[0]));
            for p in &points[1..] {
                segments.push(PathSegment::LineTo(*p));
            }
        }
        Self { segments }
    }

    /// Append a segment.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// The path's segments in order.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// How self-intersecting fills resolve interior regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillRule {
    /// Non-zero winding rule.
    #[default]
    NonZero,
    /// Even-odd rule.
    EvenOdd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 30.0)));
        assert!(!r.contains(Point::new(30.1, 30.0)));
    }

    #[test]
    fn test_circle_bounding_rect() {
        let c = Circle::new(Point::new(50.0, 50.0), 10.0);
        assert_eq!(c.bounding_rect(), Rect::new(40.0, 40.0, 20.0, 20.0));
    }

    #[test]
    fn test_ellipse_bounding_rect() {
        let e = Ellipse::new(Point::new(0.0, 0.0), 4.0, 2.0);
        assert_eq!(e.bounding_rect(), Rect::new(-4.0, -2.0, 8.0, 4.0));
    }

    #[test]
    fn test_polygon_requires_three_points() {
        let err = Polygon::new(vec![Point::ORIGIN, Point::new(1.0, 1.0)]);
        assert!(matches!(err, Err(GeometryError::DegeneratePolygon(2))));
    }

    #[test]
    fn test_polygon_bounding_rect() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 8.0),
        ])
        .expect("valid polygon");
        assert_eq!(poly.bounding_rect(), Rect::new(0.0, 0.0, 10.0, 8.0));
    }

    #[test]
    fn test_path_from_points() {
        let path = Path::from_points(&[Point::ORIGIN, Point::new(1.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(path.segments().len(), 3);
        assert!(matches!(path.segments()[0], PathSegment::MoveTo(_)));

        assert!(Path::from_points(&[Point::ORIGIN]).is_empty());
    }

    #[test]
    fn test_empty_sizes() {
        assert!(Size::EMPTY.is_empty());
        assert!(Rect::new(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 5.0, 1.0).is_empty());
    }
}
