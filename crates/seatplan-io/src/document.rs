use serde::{Deserialize, Serialize};

use seatplan_core::entities::{
    DEFAULT_AREA_COLOR, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_ICON_COLOR,
    DEFAULT_TEXT_COLOR,
};
use seatplan_core::indexer;
use seatplan_core::{
    Area, AreaId, Category, DecorShape, Grid, GridSize, IconId, IconKind, IconMarker, Point,
    Scene, ShapeSize, TextAnnotation,
};

use crate::error::LoadError;

/// Version written by this build. Documents without a version field are
/// legacy (version 0) and still readable.
pub const CURRENT_VERSION: u32 = 1;

fn one() -> f64 {
    1.0
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

fn default_icon_color() -> String {
    DEFAULT_ICON_COLOR.to_string()
}

/// The persisted venue configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, alias = "areas")]
    pub polygons: Vec<AreaDoc>,
    #[serde(default)]
    pub icons: Vec<IconDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaDoc {
    pub id: String,
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub is_layout: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub grids: Vec<GridDoc>,
    #[serde(default, rename = "text")]
    pub texts: Vec<TextDoc>,
    #[serde(default)]
    pub shapes: Vec<ShapeDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDoc {
    pub id: u32,
    pub size: GridSize,
    pub position: Point,
    #[serde(default)]
    pub category: Option<CategoryDoc>,
    /// Absent in documents written before seat numbering was stored.
    #[serde(default)]
    pub seat_start_index: Option<u32>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub skew: f64,
    #[serde(default)]
    pub hide_labels: bool,
    #[serde(default = "one")]
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDoc {
    pub name: String,
    pub acronym: String,
    pub color: String,
    /// Derived from the grid size on save, ignored on load.
    #[serde(default)]
    pub seat_count: u32,
    #[serde(default)]
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDoc {
    pub id: u32,
    pub content: String,
    pub position: Point,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_text_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeDoc {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Point,
    pub size: ShapeSize,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub skew: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconDoc {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IconKind,
    pub position: [f64; 2],
    #[serde(default = "one")]
    pub scale: f64,
    #[serde(default = "default_icon_color")]
    pub color: String,
}

impl VenueDocument {
    /// Snapshot a scene in the current document version.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            version: Some(CURRENT_VERSION),
            polygons: scene.areas().map(AreaDoc::from_area).collect(),
            icons: scene.icons().iter().map(IconDoc::from_icon).collect(),
        }
    }

    /// The version this document claims; missing means legacy 0.
    pub fn effective_version(&self) -> u32 {
        self.version.unwrap_or(0)
    }

    /// Build the scene. Areas whose grids lack stored seat numbering are
    /// renumbered from the first seat.
    pub fn into_scene(self) -> Result<Scene, LoadError> {
        let version = self.effective_version();
        if version > CURRENT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: version,
                supported: CURRENT_VERSION,
            });
        }
        if version == 0 {
            log::info!("Reading legacy unversioned venue document");
        }

        let areas = self
            .polygons
            .into_iter()
            .map(AreaDoc::into_area)
            .collect::<Result<Vec<_>, _>>()?;
        let icons = self.icons.into_iter().map(IconDoc::into_icon).collect();
        Ok(Scene::from_parts(areas, icons))
    }
}

impl AreaDoc {
    fn from_area(area: &Area) -> Self {
        Self {
            id: area.id.to_string(),
            points: area.points.iter().map(|p| [p.x, p.y]).collect(),
            name: area.name.clone(),
            price: area.price,
            is_layout: area.is_layout,
            color: Some(area.color.clone()),
            grids: area.grids.iter().map(GridDoc::from_grid).collect(),
            texts: area.texts.iter().map(TextDoc::from_text).collect(),
            shapes: area.shapes.iter().map(ShapeDoc::from_shape).collect(),
        }
    }

    fn into_area(self) -> Result<Area, LoadError> {
        let points = self.points.iter().map(|&[x, y]| Point::new(x, y)).collect();
        let mut area = Area::new(AreaId::from(self.id), points);
        area.name = self.name;
        area.price = self.price;
        area.is_layout = self.is_layout;
        let color = self.color.unwrap_or_else(|| DEFAULT_AREA_COLOR.to_string());

        let needs_renumber = self.grids.iter().any(|g| g.seat_start_index.is_none());
        area.grids = self.grids.into_iter().map(GridDoc::into_grid).collect();
        if !indexer::within_seat_limit(&area.grids) {
            return Err(LoadError::SeatLimit {
                area: area.id.to_string(),
                limit: indexer::MAX_SEAT_NUMBER,
            });
        }
        if needs_renumber {
            log::debug!("Area {} has grids without seat numbering, renumbering", area.id);
            indexer::renumber_in_place(&mut area.grids);
        }
        area.texts = self.texts.into_iter().map(TextDoc::into_text).collect();
        area.shapes = self
            .shapes
            .into_iter()
            .map(|s| s.into_shape(&color))
            .collect();
        area.color = color;
        Ok(area)
    }
}

impl GridDoc {
    fn from_grid(grid: &Grid) -> Self {
        Self {
            id: grid.id,
            size: grid.size,
            position: grid.position,
            category: grid.category.as_ref().map(|c| CategoryDoc {
                name: c.name.clone(),
                acronym: c.acronym.clone(),
                color: c.color.clone(),
                seat_count: grid.seat_count(),
                price: c.price,
            }),
            seat_start_index: Some(grid.seat_start_index),
            rotation: grid.rotation,
            skew: grid.skew,
            hide_labels: grid.hide_labels,
            scale: grid.scale,
        }
    }

    fn into_grid(self) -> Grid {
        let mut grid = Grid::new(self.id, GridSize::new(self.size.rows, self.size.cols), self.position);
        grid.category = self.category.map(|c| Category {
            name: c.name,
            acronym: c.acronym,
            color: c.color,
            price: c.price,
        });
        if let Some(start) = self.seat_start_index {
            grid.seat_start_index = start;
        }
        grid.rotation = self.rotation;
        grid.skew = self.skew;
        grid.hide_labels = self.hide_labels;
        grid.scale = self.scale;
        grid
    }
}

impl TextDoc {
    fn from_text(text: &TextAnnotation) -> Self {
        Self {
            id: text.id,
            content: text.content.clone(),
            position: text.position,
            rotation: text.rotation,
            font_size: text.font_size,
            font_family: text.font_family.clone(),
            color: text.color.clone(),
            scale: text.scale,
        }
    }

    fn into_text(self) -> TextAnnotation {
        TextAnnotation {
            id: self.id,
            content: self.content,
            position: self.position,
            rotation: self.rotation,
            font_size: self.font_size,
            font_family: self.font_family,
            color: self.color,
            scale: self.scale,
        }
    }
}

impl ShapeDoc {
    fn from_shape(shape: &DecorShape) -> Self {
        Self {
            id: shape.id,
            kind: shape.kind.clone(),
            position: shape.position,
            size: shape.size,
            rotation: shape.rotation,
            color: Some(shape.color.clone()),
            skew: shape.skew,
        }
    }

    /// Shapes without a stored color take their area's.
    fn into_shape(self, area_color: &str) -> DecorShape {
        DecorShape {
            id: self.id,
            kind: self.kind,
            position: self.position,
            size: self.size,
            rotation: self.rotation,
            skew: self.skew,
            color: self.color.unwrap_or_else(|| area_color.to_string()),
        }
    }
}

impl IconDoc {
    fn from_icon(icon: &IconMarker) -> Self {
        Self {
            id: icon.id.to_string(),
            kind: icon.kind,
            position: [icon.position.x, icon.position.y],
            scale: icon.scale,
            color: icon.color.clone(),
        }
    }

    fn into_icon(self) -> IconMarker {
        let [x, y] = self.position;
        IconMarker {
            id: IconId::from(self.id),
            kind: self.kind,
            position: Point::new(x, y),
            scale: self.scale,
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_document_defaults() {
        let json = r#"{
            "polygons": [{
                "id": "a1",
                "points": [[0,0],[100,0],[100,100],[0,100]],
                "name": "Floor",
                "price": 30,
                "grids": [
                    {"id": 1, "size": {"rows": 2, "cols": 2}, "position": {"x": 5, "y": 5}},
                    {"id": 2, "size": {"rows": 1, "cols": 3}, "position": {"x": 5, "y": 80}}
                ]
            }]
        }"#;
        let doc: VenueDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.effective_version(), 0);

        let scene = doc.into_scene().unwrap();
        let area = scene.area(&AreaId::from("a1")).unwrap();
        assert_eq!(area.points.len(), 5);
        assert_eq!(area.color, DEFAULT_AREA_COLOR);
        assert!(area.texts.is_empty() && area.shapes.is_empty());
        assert_eq!(area.grids[0].seat_start_index, 1);
        assert_eq!(area.grids[1].seat_start_index, 5);
        assert_eq!(area.grids[1].scale, 1.0);
        assert!(scene.icons().is_empty());
    }

    #[test]
    fn test_stored_numbering_is_kept() {
        let json = r#"{"version": 1, "polygons": [{
            "id": "a", "points": [[0,0],[10,0],[10,10]], "price": 5,
            "grids": [{"id": 4, "size": {"rows": 1, "cols": 1}, "position": {"x": 0, "y": 0},
                       "seatStartIndex": 40}]
        }]}"#;
        let scene = serde_json::from_str::<VenueDocument>(json)
            .unwrap()
            .into_scene()
            .unwrap();
        assert_eq!(scene.area(&AreaId::from("a")).unwrap().grids[0].seat_start_index, 40);
    }

    #[test]
    fn test_newer_version_rejected() {
        let doc = VenueDocument {
            version: Some(CURRENT_VERSION + 1),
            polygons: Vec::new(),
            icons: Vec::new(),
        };
        assert!(matches!(
            doc.into_scene(),
            Err(LoadError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn test_category_seat_count_is_derived() {
        let mut grid = Grid::new(1, GridSize::new(3, 4), Point::new(0.0, 0.0));
        grid.category = Some(Category {
            name: "Balcony".to_string(),
            acronym: "BAL".to_string(),
            color: "#0ea5e9".to_string(),
            price: 45.0,
        });
        let doc = GridDoc::from_grid(&grid);
        let category = doc.category.as_ref().unwrap();
        assert_eq!(category.seat_count, 12);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["category"]["seatCount"], 12);
        assert_eq!(json["seatStartIndex"], 1);
        assert_eq!(json["hideLabels"], false);
    }

    #[test]
    fn test_wire_names() {
        let (scene, id) = Scene::new()
            .add_area(vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 50.0),
            ])
            .unwrap();
        let (scene, _) = scene.add_text(&id, "Exit", Point::new(1.0, 2.0)).unwrap();
        let (scene, _) = scene
            .add_shape(&id, "rectangle", Point::new(0.0, 0.0), ShapeSize { width: 4.0, height: 2.0 })
            .unwrap();
        let (scene, _) = scene.add_icon(IconKind::Gate, Point::new(7.0, 8.0));

        let json = serde_json::to_value(VenueDocument::from_scene(&scene)).unwrap();
        assert_eq!(json["version"], 1);
        let polygon = &json["polygons"][0];
        assert_eq!(polygon["isLayout"], false);
        assert_eq!(polygon["text"][0]["fontSize"], DEFAULT_FONT_SIZE);
        assert_eq!(polygon["shapes"][0]["type"], "rectangle");
        assert_eq!(json["icons"][0]["type"], "gate");
        assert_eq!(json["icons"][0]["position"], serde_json::json!([7.0, 8.0]));
    }

    #[test]
    fn test_areas_alias() {
        let doc: VenueDocument =
            serde_json::from_str(r#"{"areas": [{"id": "x", "points": [[0,0],[1,0],[1,1]]}]}"#).unwrap();
        assert_eq!(doc.polygons.len(), 1);
        assert_eq!(doc.polygons[0].price, 0.0);
    }
}
