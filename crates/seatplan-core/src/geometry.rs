use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Signed areas below this are treated as zero.
const AREA_EPSILON: f64 = 1e-9;

/// A 2D point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn offset_by(&self, delta: Point) -> Self {
        self.translate(delta.x, delta.y)
    }

    pub fn approx_eq(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < 1e-9 && (self.y - other.y).abs() < 1e-9
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Bounding box of a point cloud. `None` when there is no content.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        Self::enclosing(points.iter().copied())
    }

    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first, first);
        for p in iter {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn union(&self, other: &BBox) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

// ── Polygon math ─────────────────────────────────────────────────────

/// Close a ring by appending its start point, unless it is already closed.
pub fn close_ring(mut points: Vec<Point>) -> Vec<Point> {
    if let (Some(first), Some(last)) = (points.first().copied(), points.last()) {
        if !first.approx_eq(last) {
            points.push(first);
        }
    }
    points
}

/// The ring without its closing point.
pub fn open_ring(points: &[Point]) -> &[Point] {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 && first.approx_eq(last) => {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

/// Number of distinct vertices in a ring, ignoring consecutive duplicates
/// and the closing point.
pub fn distinct_vertex_count(points: &[Point]) -> usize {
    let open = open_ring(points);
    let mut count = 0;
    let mut prev: Option<&Point> = None;
    for p in open {
        if prev.map_or(true, |q| !q.approx_eq(p)) {
            count += 1;
        }
        prev = Some(p);
    }
    count
}

/// Shoelace signed area. Positive for counter-clockwise rings in a y-up frame.
pub fn polygon_signed_area(points: &[Point]) -> f64 {
    let open = open_ring(points);
    if open.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, p) in open.iter().enumerate() {
        let q = &open[(i + 1) % open.len()];
        sum += p.x * q.y - q.x * p.y;
    }
    sum / 2.0
}

/// Area centroid of a simple polygon (shoelace formula).
///
/// Fails with [`GeometryError::Degenerate`] when the signed area is zero, as
/// for collinear rings or fewer than three vertices.
pub fn polygon_centroid(points: &[Point]) -> Result<Point, GeometryError> {
    let open = open_ring(points);
    let area = polygon_signed_area(open);
    if area.abs() < AREA_EPSILON || !area.is_finite() {
        return Err(GeometryError::Degenerate {
            vertices: open.len(),
        });
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, p) in open.iter().enumerate() {
        let q = &open[(i + 1) % open.len()];
        let cross = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    let factor = 1.0 / (6.0 * area);
    Ok(Point::new(cx * factor, cy * factor))
}

/// Even-odd ray casting test. Works for open or closed rings.
pub fn point_in_polygon(point: &Point, ring: &[Point]) -> bool {
    let open = open_ring(ring);
    if open.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = open.len() - 1;
    for i in 0..open.len() {
        let a = &open[i];
        let b = &open[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
