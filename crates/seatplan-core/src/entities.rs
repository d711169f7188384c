use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GeometryError, SceneError};
use crate::geometry::{self, BBox, Point};
use crate::indexer;
use crate::layout;
use crate::transform::{Placement, Positioned, TransformPatch};

pub const DEFAULT_AREA_COLOR: &str = "#cbd5e1";
pub const DEFAULT_TEXT_COLOR: &str = "#111827";
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_ICON_COLOR: &str = "#374151";
pub const ICON_SIZE: f64 = 24.0;

/// Grid, text and shape identifiers, unique within their owning area.
pub type GridId = u32;
pub type TextId = u32;
pub type ShapeId = u32;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// A fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Area identifier (free-form string in documents, UUID text when generated).
    AreaId
);
string_id!(
    /// Identifier of a loose icon marker.
    IconId
);

// ── Grid ─────────────────────────────────────────────────────────────

/// Seat block dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: u32,
    pub cols: u32,
}

impl GridSize {
    /// Both dimensions are clamped to at least one.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }

    /// Saturates at `u32::MAX`; scenes never hold more than
    /// [`indexer::MAX_SEAT_NUMBER`] seats per area.
    pub fn seat_count(&self) -> u32 {
        self.rows.saturating_mul(self.cols)
    }
}

/// Pricing category attached to a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub acronym: String,
    pub color: String,
    pub price: f64,
}

impl Category {
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.name.trim().is_empty() {
            return Err(SceneError::EmptyCategoryField("name"));
        }
        if self.acronym.trim().is_empty() {
            return Err(SceneError::EmptyCategoryField("acronym"));
        }
        Ok(())
    }
}

/// Location of a seat inside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatHit {
    pub row: u32,
    pub col: u32,
    pub number: u32,
}

/// A rectangular block of seats placed inside an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub id: GridId,
    pub size: GridSize,
    /// Top-left anchor.
    pub position: Point,
    pub rotation: f64,
    pub skew: f64,
    pub scale: f64,
    pub hide_labels: bool,
    /// First seat number contributed by this grid.
    pub seat_start_index: u32,
    pub category: Option<Category>,
}

impl Grid {
    pub fn new(id: GridId, size: GridSize, position: Point) -> Self {
        Self {
            id,
            size,
            position,
            rotation: 0.0,
            skew: 0.0,
            scale: 1.0,
            hide_labels: false,
            seat_start_index: 1,
            category: None,
        }
    }

    pub fn seat_count(&self) -> u32 {
        self.size.seat_count()
    }

    /// Half-open range of seat numbers owned by this grid.
    pub fn seat_range(&self) -> Range<u32> {
        self.seat_start_index..self.seat_start_index.saturating_add(self.seat_count())
    }

    pub fn last_seat(&self) -> u32 {
        self.seat_range().end.saturating_sub(1)
    }

    /// Row-major seat number: `seat_start_index + row * cols + col`.
    pub fn seat_number(&self, row: u32, col: u32) -> u32 {
        self.seat_start_index
            .saturating_add(row.saturating_mul(self.size.cols))
            .saturating_add(col)
    }

    /// Inverse of [`Grid::seat_number`].
    pub fn seat_position(&self, number: u32) -> Option<(u32, u32)> {
        if !self.seat_range().contains(&number) {
            return None;
        }
        let index = number - self.seat_start_index;
        Some((index / self.size.cols, index % self.size.cols))
    }

    pub fn seat_label(&self, number: u32) -> String {
        match &self.category {
            Some(category) => format!("{}-{}", category.acronym, number),
            None => number.to_string(),
        }
    }

    /// Hit-test a world point against the seats, honoring rotation, skew and scale.
    pub fn seat_at(&self, world: &Point) -> Option<SeatHit> {
        let local = self.to_local(world)?;
        let (row, col) = layout::seat_at(&local, self.size.rows, self.size.cols)?;
        Some(SeatHit {
            row,
            col,
            number: self.seat_number(row, col),
        })
    }
}

impl Positioned for Grid {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn local_size(&self) -> (f64, f64) {
        layout::grid_extent(self.size.rows, self.size.cols)
    }

    fn placement(&self) -> Placement {
        Placement {
            position: self.position,
            rotation: self.rotation,
            skew: self.skew,
            scale: self.scale,
        }
    }

    fn apply_patch(&mut self, patch: &TransformPatch) {
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(skew) = patch.skew {
            self.skew = skew;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
    }
}

// ── Annotations ──────────────────────────────────────────────────────

/// Free-form text drawn inside an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub id: TextId,
    pub content: String,
    pub position: Point,
    pub rotation: f64,
    pub font_size: f64,
    pub font_family: String,
    pub color: String,
    pub scale: Option<f64>,
}

impl TextAnnotation {
    pub fn new(id: TextId, content: &str, position: Point) -> Self {
        Self {
            id,
            content: content.to_string(),
            position,
            rotation: 0.0,
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            color: DEFAULT_TEXT_COLOR.to_string(),
            scale: None,
        }
    }
}

impl Positioned for TextAnnotation {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Approximate box: average glyph advance of 0.6em.
    fn local_size(&self) -> (f64, f64) {
        let chars = self.content.chars().count().max(1) as f64;
        (chars * self.font_size * 0.6, self.font_size)
    }

    fn placement(&self) -> Placement {
        Placement {
            position: self.position,
            rotation: self.rotation,
            skew: 0.0,
            scale: self.scale.unwrap_or(1.0),
        }
    }

    fn apply_patch(&mut self, patch: &TransformPatch) {
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            self.scale = Some(scale);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeSize {
    pub width: f64,
    pub height: f64,
}

/// Decorative shape (stage, bar, walkway outline, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorShape {
    pub id: ShapeId,
    /// Free-form tag, e.g. `rectangle`.
    pub kind: String,
    pub position: Point,
    pub size: ShapeSize,
    pub rotation: f64,
    pub skew: f64,
    pub color: String,
}

impl Positioned for DecorShape {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn local_size(&self) -> (f64, f64) {
        (self.size.width, self.size.height)
    }

    fn placement(&self) -> Placement {
        Placement {
            position: self.position,
            rotation: self.rotation,
            skew: self.skew,
            scale: 1.0,
        }
    }

    fn apply_patch(&mut self, patch: &TransformPatch) {
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(skew) = patch.skew {
            self.skew = skew;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    Stairs,
    Gate,
}

/// A loose marker not owned by any area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconMarker {
    pub id: IconId,
    pub kind: IconKind,
    pub position: Point,
    pub scale: f64,
    pub color: String,
}

impl IconMarker {
    pub fn new(kind: IconKind, position: Point) -> Self {
        Self {
            id: IconId::generate(),
            kind,
            position,
            scale: 1.0,
            color: DEFAULT_ICON_COLOR.to_string(),
        }
    }
}

impl Positioned for IconMarker {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn local_size(&self) -> (f64, f64) {
        (ICON_SIZE, ICON_SIZE)
    }

    fn placement(&self) -> Placement {
        Placement {
            position: self.position,
            scale: self.scale,
            ..Placement::default()
        }
    }

    fn apply_patch(&mut self, patch: &TransformPatch) {
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
    }
}

// ── Area ─────────────────────────────────────────────────────────────

/// A polygonal region of the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    /// Closed ring: the last point repeats the first.
    pub points: Vec<Point>,
    pub name: Option<String>,
    pub price: f64,
    /// Structural region (stage, walkway). Never seated or priced.
    pub is_layout: bool,
    pub color: String,
    pub grids: Vec<Grid>,
    pub texts: Vec<TextAnnotation>,
    pub shapes: Vec<DecorShape>,
}

impl Area {
    pub fn new(id: AreaId, points: Vec<Point>) -> Self {
        Self {
            id,
            points: geometry::close_ring(points),
            name: None,
            price: 0.0,
            is_layout: false,
            color: DEFAULT_AREA_COLOR.to_string(),
            grids: Vec::new(),
            texts: Vec::new(),
            shapes: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.points)
    }

    /// Label anchor; degenerate rings have none.
    pub fn centroid(&self) -> Result<Point, GeometryError> {
        geometry::polygon_centroid(&self.points)
    }

    pub fn contains(&self, world: &Point) -> bool {
        geometry::point_in_polygon(world, &self.points)
    }

    pub fn seat_count(&self) -> u32 {
        indexer::total_seats(&self.grids)
    }

    pub fn grid(&self, id: GridId) -> Option<&Grid> {
        self.grids.iter().find(|g| g.id == id)
    }

    pub fn text(&self, id: TextId) -> Option<&TextAnnotation> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn shape(&self, id: ShapeId) -> Option<&DecorShape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// The grid that owns seat `number`.
    pub fn grid_for_seat(&self, number: u32) -> Option<&Grid> {
        self.grids.iter().find(|g| g.seat_range().contains(&number))
    }

    pub fn next_text_id(&self) -> TextId {
        self.texts.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn next_shape_id(&self) -> ShapeId {
        self.shapes.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }

    /// Shift the ring and every child by `delta`.
    pub fn translate(&mut self, delta: Point) {
        for p in &mut self.points {
            *p = p.offset_by(delta);
        }
        for g in &mut self.grids {
            g.translate_by(delta);
        }
        for t in &mut self.texts {
            t.translate_by(delta);
        }
        for s in &mut self.shapes {
            s.translate_by(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_3x4() -> Grid {
        let mut g = Grid::new(1, GridSize::new(3, 4), Point::new(100.0, 50.0));
        g.seat_start_index = 10;
        g
    }

    #[test]
    fn test_grid_size_clamps_to_one() {
        let size = GridSize::new(0, 0);
        assert_eq!(size.rows, 1);
        assert_eq!(size.cols, 1);
    }

    #[test]
    fn test_seat_numbering_is_row_major() {
        let g = grid_3x4();
        assert_eq!(g.seat_number(0, 0), 10);
        assert_eq!(g.seat_number(0, 3), 13);
        assert_eq!(g.seat_number(1, 0), 14);
        assert_eq!(g.last_seat(), 21);
        assert_eq!(g.seat_position(14), Some((1, 0)));
        assert_eq!(g.seat_position(22), None);
    }

    #[test]
    fn test_seat_label_uses_acronym() {
        let mut g = grid_3x4();
        assert_eq!(g.seat_label(12), "12");
        g.category = Some(Category {
            name: "Gold".into(),
            acronym: "G".into(),
            color: "#ffd700".into(),
            price: 80.0,
        });
        assert_eq!(g.seat_label(12), "G-12");
    }

    #[test]
    fn test_seat_hit_unrotated() {
        let g = grid_3x4();
        let world = Point::new(100.0 + layout::SEAT_PITCH + 5.0, 50.0 + 5.0);
        let hit = g.seat_at(&world).unwrap();
        assert_eq!((hit.row, hit.col, hit.number), (0, 1, 11));
    }

    #[test]
    fn test_seat_hit_under_rotation() {
        let mut g = Grid::new(1, GridSize::new(1, 2), Point::new(0.0, 0.0));
        g.rotation = 180.0;
        // Rotating 180° about the center swaps the two seats.
        let (w, h) = g.local_size();
        let left_seat_center = Point::new(layout::SEAT_SIZE / 2.0, h / 2.0);
        let hit = g.seat_at(&left_seat_center).unwrap();
        assert_eq!(hit.col, 1);
        let right_seat_center = Point::new(w - layout::SEAT_SIZE / 2.0, h / 2.0);
        assert_eq!(g.seat_at(&right_seat_center).unwrap().col, 0);
    }

    #[test]
    fn test_seat_hit_under_scale() {
        let mut g = Grid::new(1, GridSize::new(1, 2), Point::new(0.0, 0.0));
        g.scale = 2.0;
        let second = Point::new(2.0 * (layout::SEAT_PITCH + 1.0), 2.0);
        assert_eq!(g.seat_at(&second).unwrap().col, 1);
    }

    #[test]
    fn test_category_validation() {
        let mut c = Category {
            name: "VIP".into(),
            acronym: " ".into(),
            color: "#000".into(),
            price: 10.0,
        };
        assert_eq!(c.validate(), Err(SceneError::EmptyCategoryField("acronym")));
        c.acronym = "V".into();
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_area_ring_is_closed() {
        let area = Area::new(
            AreaId::from("a"),
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
        );
        assert_eq!(area.points.len(), 4);
        assert_eq!(area.points.first(), area.points.last());
        assert_eq!(area.display_name(), "a");
    }
}
