use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use seatplan_core::layout;
use seatplan_core::{
    Area, AreaId, AreaIndex, EntityRef, Grid, GridId, IconKind, Positioned, Scene, ShapeId, TextId,
};

use crate::viewport::{DetailLevel, Viewport};

/// A seat square in its grid's local frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSeat {
    pub number: u32,
    /// `None` when the grid hides labels or the zoom is too low.
    pub label: Option<String>,
    /// Local rectangle: [min_x, min_y, max_x, max_y]
    pub rect: [f64; 4],
    /// Picked by the current booking session.
    pub chosen: bool,
}

/// A seat grid with its composed transform, ready to draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderGrid {
    pub id: GridId,
    /// SVG-order matrix [a, b, c, d, e, f] mapping local to world.
    pub matrix: [f64; 6],
    pub color: String,
    pub selected: bool,
    pub seats: Vec<RenderSeat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderText {
    pub id: TextId,
    pub content: String,
    pub matrix: [f64; 6],
    pub font_size: f64,
    pub font_family: String,
    pub color: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderShape {
    pub id: ShapeId,
    pub kind: String,
    pub matrix: [f64; 6],
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub selected: bool,
}

/// An area ring with everything drawn inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderArea {
    pub id: AreaId,
    pub name: Option<String>,
    /// Flat ring vertices: [x0, y0, x1, y1, ...]
    pub ring: Vec<f64>,
    pub color: String,
    pub is_layout: bool,
    /// Where the name label goes; absent for degenerate rings.
    pub label_anchor: Option<[f64; 2]>,
    pub selected: bool,
    pub grids: Vec<RenderGrid>,
    pub texts: Vec<RenderText>,
    pub shapes: Vec<RenderShape>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderIcon {
    pub id: String,
    pub kind: IconKind,
    pub matrix: [f64; 6],
    pub color: String,
    pub selected: bool,
}

/// What the frame should highlight.
#[derive(Debug, Clone, Default)]
pub struct FrameOptions {
    pub selected: Option<EntityRef>,
    pub chosen_seats: HashSet<(AreaId, u32)>,
}

/// Complete frame data handed to a renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub detail: DetailLevel,
    pub areas: Vec<RenderArea>,
    pub icons: Vec<RenderIcon>,
    /// World bbox of the selected entity: [min_x, min_y, max_x, max_y]
    pub selection_bbox: Option<[f64; 4]>,
}

impl RenderFrame {
    pub fn empty(viewport: Viewport) -> Self {
        Self {
            viewport,
            detail: viewport.detail_level(),
            areas: Vec::new(),
            icons: Vec::new(),
            selection_bbox: None,
        }
    }

    /// Build the frame for `scene`, culling areas outside the viewport.
    pub fn build(scene: &Scene, index: &AreaIndex, viewport: Viewport, options: &FrameOptions) -> Self {
        let mut frame = Self::empty(viewport);
        let visible = index.query_viewport(&viewport.visible_bounds());
        for entry in visible {
            if let Some(area) = scene.area(&entry.area_id) {
                frame.areas.push(render_area(area, frame.detail, options));
            }
        }
        frame.icons = scene
            .icons()
            .iter()
            .map(|icon| RenderIcon {
                id: icon.id.to_string(),
                kind: icon.kind,
                matrix: icon.transform().to_array(),
                color: icon.color.clone(),
                selected: options.selected == Some(EntityRef::Icon(icon.id.clone())),
            })
            .collect();
        frame.selection_bbox = options.selected.as_ref().and_then(|sel| match sel {
            EntityRef::Area(id) => scene.area(id).and_then(Area::bbox),
            other => scene.positioned(other).map(|p| p.world_bbox()),
        })
        .map(|b| [b.min.x, b.min.y, b.max.x, b.max.y]);
        frame
    }

    pub fn seat_count(&self) -> usize {
        self.areas
            .iter()
            .flat_map(|a| &a.grids)
            .map(|g| g.seats.len())
            .sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn render_area(area: &Area, detail: DetailLevel, options: &FrameOptions) -> RenderArea {
    let selected_here = |entity: EntityRef| options.selected.as_ref() == Some(&entity);
    let grids = if detail == DetailLevel::Outline {
        Vec::new()
    } else {
        area.grids
            .iter()
            .map(|grid| RenderGrid {
                id: grid.id,
                matrix: grid.transform().to_array(),
                color: grid
                    .category
                    .as_ref()
                    .map_or_else(|| area.color.clone(), |c| c.color.clone()),
                selected: selected_here(EntityRef::Grid {
                    area: area.id.clone(),
                    grid: grid.id,
                }),
                seats: render_seats(&area.id, grid, detail, options),
            })
            .collect()
    };

    RenderArea {
        id: area.id.clone(),
        name: area.name.clone(),
        ring: area.points.iter().flat_map(|p| [p.x, p.y]).collect(),
        color: area.color.clone(),
        is_layout: area.is_layout,
        // Degenerate rings simply go unlabeled.
        label_anchor: area.centroid().ok().map(|c| [c.x, c.y]),
        selected: selected_here(EntityRef::Area(area.id.clone())),
        grids,
        texts: area
            .texts
            .iter()
            .map(|text| RenderText {
                id: text.id,
                content: text.content.clone(),
                matrix: text.transform().to_array(),
                font_size: text.font_size,
                font_family: text.font_family.clone(),
                color: text.color.clone(),
                selected: selected_here(EntityRef::Text {
                    area: area.id.clone(),
                    text: text.id,
                }),
            })
            .collect(),
        shapes: area
            .shapes
            .iter()
            .map(|shape| RenderShape {
                id: shape.id,
                kind: shape.kind.clone(),
                matrix: shape.transform().to_array(),
                width: shape.size.width,
                height: shape.size.height,
                color: shape.color.clone(),
                selected: selected_here(EntityRef::Shape {
                    area: area.id.clone(),
                    shape: shape.id,
                }),
            })
            .collect(),
    }
}

fn render_seats(area: &AreaId, grid: &Grid, detail: DetailLevel, options: &FrameOptions) -> Vec<RenderSeat> {
    let show_labels = !grid.hide_labels && detail == DetailLevel::Seats;
    let mut seats = Vec::with_capacity(grid.seat_count() as usize);
    for row in 0..grid.size.rows {
        for col in 0..grid.size.cols {
            let number = grid.seat_number(row, col);
            let rect = layout::seat_rect(row, col);
            seats.push(RenderSeat {
                number,
                label: show_labels.then(|| grid.seat_label(number)),
                rect: [rect.min.x, rect.min.y, rect.max.x, rect.max.y],
                chosen: options.chosen_seats.contains(&(area.clone(), number)),
            });
        }
    }
    seats
}
