use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Point};

/// A 2D affine matrix in SVG order: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            e: dx,
            f: dy,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `degrees` about the origin.
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Rotation by `degrees` about `pivot`.
    pub fn rotate_about(degrees: f64, pivot: Point) -> Self {
        Self::translate(pivot.x, pivot.y)
            .then(&Self::rotate(degrees))
            .then(&Self::translate(-pivot.x, -pivot.y))
    }

    pub fn scale(factor: f64) -> Self {
        Self {
            a: factor,
            d: factor,
            ..Self::IDENTITY
        }
    }

    /// Horizontal shear by `degrees`.
    pub fn skew_x(degrees: f64) -> Self {
        Self {
            c: degrees.to_radians().tan(),
            ..Self::IDENTITY
        }
    }

    /// Matrix product `self * inner`: `inner` is applied to a point first.
    ///
    /// Chaining `outer.then(&inner)` reads left to right like an SVG
    /// `transform` attribute.
    pub fn then(&self, inner: &Affine) -> Affine {
        Affine {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn apply(&self, p: &Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse matrix, `None` when singular (zero scale or a 90° skew).
    pub fn inverse(&self) -> Option<Affine> {
        let det = self.determinant();
        if det.abs() < 1e-12 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    /// World-space bounding box of a local rectangle under this transform.
    pub fn map_bbox(&self, local: &BBox) -> BBox {
        let corners = [
            local.min,
            Point::new(local.max.x, local.min.y),
            local.max,
            Point::new(local.min.x, local.max.y),
        ];
        // Four corners always produce a box.
        BBox::enclosing(corners.iter().map(|c| self.apply(c))).unwrap_or(*local)
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

/// Compose an entity transform in the canonical order
/// `translate(position) → rotate(rotation, pivot) → scale(scale) → skewX(skew)`.
///
/// The pivot is expressed in the translated frame, so an entity rotates about
/// its own center when `pivot` is half its scaled extent. Renderers and the
/// inverse mapping used for hit-testing must both go through this function.
pub fn compose_transform(
    position: Point,
    rotation: f64,
    skew: f64,
    scale: f64,
    pivot: Point,
) -> Affine {
    Affine::translate(position.x, position.y)
        .then(&Affine::rotate_about(rotation, pivot))
        .then(&Affine::scale(scale))
        .then(&Affine::skew_x(skew))
}

/// Normalize an angle into the display range `[-180, 180)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped.is_finite() {
        wrapped
    } else {
        0.0
    }
}

/// Position, rotation, skew and scale of a placed entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Point,
    pub rotation: f64,
    pub skew: f64,
    pub scale: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Point::default(),
            rotation: 0.0,
            skew: 0.0,
            scale: 1.0,
        }
    }
}

/// A partial update of rotation, skew and scale. `None` leaves a field as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformPatch {
    pub rotation: Option<f64>,
    pub skew: Option<f64>,
    pub scale: Option<f64>,
}

impl TransformPatch {
    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Default::default()
        }
    }

    pub fn skew(degrees: f64) -> Self {
        Self {
            skew: Some(degrees),
            ..Default::default()
        }
    }

    pub fn scale(factor: f64) -> Self {
        Self {
            scale: Some(factor),
            ..Default::default()
        }
    }
}

/// Capability shared by every entity that sits at a world position.
///
/// Entities that do not support a transform component keep the default
/// (no rotation, no skew, unit scale) and ignore patches for it.
pub trait Positioned {
    fn position(&self) -> Point;

    fn set_position(&mut self, position: Point);

    /// Unscaled local extent, used for the default pivot and hit-testing.
    fn local_size(&self) -> (f64, f64);

    fn placement(&self) -> Placement {
        Placement {
            position: self.position(),
            ..Placement::default()
        }
    }

    /// Apply the supported parts of `patch`.
    fn apply_patch(&mut self, _patch: &TransformPatch) {}

    fn translate_by(&mut self, delta: Point) {
        let moved = self.position().offset_by(delta);
        self.set_position(moved);
    }

    /// The entity's geometric center in its translated frame.
    fn pivot(&self) -> Point {
        let (w, h) = self.local_size();
        let scale = self.placement().scale;
        Point::new(w * scale / 2.0, h * scale / 2.0)
    }

    fn transform(&self) -> Affine {
        let p = self.placement();
        compose_transform(p.position, p.rotation, p.skew, p.scale, self.pivot())
    }

    /// Map a world point into the entity's unscaled local frame.
    fn to_local(&self, world: &Point) -> Option<Point> {
        self.transform().inverse().map(|inv| inv.apply(world))
    }

    /// Whether `world` falls inside the entity's local bounds.
    fn hit(&self, world: &Point) -> bool {
        let (w, h) = self.local_size();
        match self.to_local(world) {
            Some(local) => local.x >= 0.0 && local.x <= w && local.y >= 0.0 && local.y <= h,
            None => false,
        }
    }

    fn world_bbox(&self) -> BBox {
        let (w, h) = self.local_size();
        self.transform()
            .map_bbox(&BBox::new(Point::new(0.0, 0.0), Point::new(w, h)))
    }
}
