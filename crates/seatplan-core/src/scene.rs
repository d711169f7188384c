use std::sync::Arc;

use crate::entities::{
    Area, AreaId, Category, DecorShape, Grid, GridId, GridSize, IconId, IconKind, IconMarker,
    ShapeId, ShapeSize, TextAnnotation, TextId,
};
use crate::error::SceneError;
use crate::geometry::{self, BBox, Point};
use crate::indexer;
use crate::layout;
use crate::transform::{Positioned, TransformPatch};

/// Reference to any selectable entity in a scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Area(AreaId),
    Grid { area: AreaId, grid: GridId },
    Text { area: AreaId, text: TextId },
    Shape { area: AreaId, shape: ShapeId },
    Icon(IconId),
}

impl EntityRef {
    /// The owning area, if the entity lives inside one.
    pub fn area(&self) -> Option<&AreaId> {
        match self {
            EntityRef::Area(area)
            | EntityRef::Grid { area, .. }
            | EntityRef::Text { area, .. }
            | EntityRef::Shape { area, .. } => Some(area),
            EntityRef::Icon(_) => None,
        }
    }
}

/// Font settings for a text annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: String,
    pub color: String,
}

/// The venue scene: ordered areas plus loose icon markers.
///
/// Every mutator leaves `self` untouched and returns the next snapshot.
/// Areas sit behind `Arc`, so areas a mutation did not touch are shared
/// between snapshots and renderers can diff with [`Arc::ptr_eq`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    areas: Vec<Arc<Area>>,
    icons: Vec<IconMarker>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a scene from already-built parts, as done by document loading.
    pub fn from_parts(areas: Vec<Area>, icons: Vec<IconMarker>) -> Self {
        Self {
            areas: areas.into_iter().map(Arc::new).collect(),
            icons,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn areas(&self) -> impl DoubleEndedIterator<Item = &Area> + '_ {
        self.areas.iter().map(|a| a.as_ref())
    }

    pub fn area_handles(&self) -> &[Arc<Area>] {
        &self.areas
    }

    pub fn area(&self, id: &AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| &a.id == id).map(|a| a.as_ref())
    }

    pub fn area_by_name(&self, name: &str) -> Option<&Area> {
        self.areas()
            .find(|a| a.name.as_deref() == Some(name.trim()))
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn icons(&self) -> &[IconMarker] {
        &self.icons
    }

    pub fn icon(&self, id: &IconId) -> Option<&IconMarker> {
        self.icons.iter().find(|i| &i.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty() && self.icons.is_empty()
    }

    pub fn total_seats(&self) -> u32 {
        self.areas().fold(0u32, |total, area| total.saturating_add(area.seat_count()))
    }

    /// Every ring point of every area, the content used for fit-to-viewport.
    pub fn all_ring_points(&self) -> Vec<Point> {
        self.areas()
            .flat_map(|a| a.points.iter().copied())
            .collect()
    }

    /// Bounding box of all area rings; `None` for a scene without areas.
    pub fn content_bbox(&self) -> Option<BBox> {
        BBox::enclosing(self.areas().flat_map(|a| a.points.iter().copied()))
    }

    /// Label anchor of an area. `None` when the ring is degenerate.
    pub fn area_label_anchor(&self, id: &AreaId) -> Option<Point> {
        self.area(id)?.centroid().ok()
    }

    pub fn positioned(&self, entity: &EntityRef) -> Option<&dyn Positioned> {
        match entity {
            EntityRef::Area(_) => None,
            EntityRef::Grid { area, grid } => {
                Some(self.area(area)?.grid(*grid)? as &dyn Positioned)
            }
            EntityRef::Text { area, text } => {
                Some(self.area(area)?.text(*text)? as &dyn Positioned)
            }
            EntityRef::Shape { area, shape } => {
                Some(self.area(area)?.shape(*shape)? as &dyn Positioned)
            }
            EntityRef::Icon(id) => Some(self.icon(id)? as &dyn Positioned),
        }
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        match entity {
            EntityRef::Area(id) => self.area(id).is_some(),
            other => self.positioned(other).is_some(),
        }
    }

    // ── Area mutations ───────────────────────────────────────────────

    /// Create an unnamed area from a drawn outline. The ring is closed here.
    pub fn add_area(&self, points: Vec<Point>) -> Result<(Scene, AreaId), SceneError> {
        let distinct = geometry::distinct_vertex_count(&points);
        if distinct < 3 {
            return Err(SceneError::TooFewPoints(distinct));
        }
        let area = Area::new(AreaId::generate(), points);
        let id = area.id.clone();
        let mut next = self.clone();
        next.areas.push(Arc::new(area));
        Ok((next, id))
    }

    /// Name and price an area. Names are unique across the scene; sellable
    /// areas need a positive price.
    pub fn commit_area_name(
        &self,
        id: &AreaId,
        name: &str,
        price: f64,
    ) -> Result<Scene, SceneError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SceneError::EmptyName);
        }
        if self
            .areas()
            .any(|a| &a.id != id && a.name.as_deref() == Some(name))
        {
            return Err(SceneError::DuplicateName(name.to_string()));
        }
        self.update_area(id, |area| {
            if !area.is_layout {
                validate_price(price)?;
            }
            area.name = Some(name.to_string());
            area.price = if area.is_layout { 0.0 } else { price };
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    pub fn set_area_price(&self, id: &AreaId, price: f64) -> Result<Scene, SceneError> {
        self.update_area(id, |area| {
            if area.is_layout {
                return Ok(());
            }
            validate_price(price)?;
            area.price = price;
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    pub fn set_area_color(&self, id: &AreaId, color: &str) -> Result<Scene, SceneError> {
        self.update_area(id, |area| {
            area.color = color.to_string();
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    /// Turn an area into a structural layout region. Seated areas refuse.
    pub fn mark_layout(&self, id: &AreaId) -> Result<Scene, SceneError> {
        self.update_area(id, |area| {
            if !area.grids.is_empty() {
                return Err(SceneError::LayoutNotSeatable(area.id.clone()));
            }
            area.is_layout = true;
            area.price = 0.0;
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    /// Turn a layout region back into a sellable area at `price`.
    pub fn mark_sellable(&self, id: &AreaId, price: f64) -> Result<Scene, SceneError> {
        validate_price(price)?;
        self.update_area(id, |area| {
            area.is_layout = false;
            area.price = price;
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    pub fn delete_area(&self, id: &AreaId) -> Result<Scene, SceneError> {
        let index = self.area_index(id)?;
        let mut next = self.clone();
        next.areas.remove(index);
        Ok(next)
    }

    // ── Grid mutations ───────────────────────────────────────────────

    /// Append a `rows` x `cols` grid, centered on the area's label anchor.
    ///
    /// The grid inherits the scale of the last grid in the area and the
    /// area's seats are renumbered.
    pub fn add_grid(
        &self,
        area_id: &AreaId,
        rows: u32,
        cols: u32,
    ) -> Result<(Scene, GridId), SceneError> {
        self.update_area(area_id, |area| {
            if area.is_layout {
                return Err(SceneError::LayoutNotSeatable(area.id.clone()));
            }
            let size = GridSize::new(rows, cols);
            let scale = area.grids.last().map_or(1.0, |g| g.scale);
            let (w, h) = layout::grid_extent(size.rows, size.cols);
            let anchor = area
                .centroid()
                .ok()
                .or_else(|| area.bbox().map(|b| b.center()))
                .unwrap_or_default();
            let position = anchor.translate(-w * scale / 2.0, -h * scale / 2.0);

            let id = indexer::next_grid_id(&area.grids);
            let mut grid = Grid::new(id, size, position);
            grid.scale = scale;
            area.grids.push(grid);
            check_seat_limit(area)?;
            indexer::renumber_in_place(&mut area.grids);
            Ok(id)
        })
    }

    /// Change a grid's dimensions (each clamped to at least one) and renumber
    /// the whole area in list order. Grids after the resized one shift.
    pub fn resize_grid(
        &self,
        area_id: &AreaId,
        grid_id: GridId,
        rows: u32,
        cols: u32,
    ) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            let grid = grid_mut(area, grid_id)?;
            grid.size = GridSize::new(rows, cols);
            indexer::renumber_in_place(&mut area.grids);
            check_seat_limit(area)?;
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    /// Remove a grid and renumber the remaining ones from the first seat.
    pub fn delete_grid(&self, area_id: &AreaId, grid_id: GridId) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            let before = area.grids.len();
            area.grids.retain(|g| g.id != grid_id);
            if area.grids.len() == before {
                return Err(SceneError::GridNotFound {
                    area: area.id.clone(),
                    grid: grid_id,
                });
            }
            indexer::renumber_in_place(&mut area.grids);
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    /// Append a copy of `source` shifted by `offset`, with a fresh id and
    /// seat numbers one past the highest seat in use.
    pub fn paste_grid(
        &self,
        area_id: &AreaId,
        source: &Grid,
        offset: Point,
    ) -> Result<(Scene, GridId), SceneError> {
        self.update_area(area_id, |area| {
            if area.is_layout {
                return Err(SceneError::LayoutNotSeatable(area.id.clone()));
            }
            let mut grid = source.clone();
            grid.id = indexer::next_grid_id(&area.grids);
            grid.position = source.position.offset_by(offset);
            grid.seat_start_index = indexer::append_start_index(&area.grids);
            let id = grid.id;
            area.grids.push(grid);
            check_seat_limit(area)?;
            Ok(id)
        })
    }

    pub fn set_grid_hide_labels(
        &self,
        area_id: &AreaId,
        grid_id: GridId,
        hide: bool,
    ) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            grid_mut(area, grid_id)?.hide_labels = hide;
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    pub fn set_grid_category(
        &self,
        area_id: &AreaId,
        grid_id: GridId,
        category: Option<Category>,
    ) -> Result<Scene, SceneError> {
        if let Some(category) = &category {
            category.validate()?;
        }
        self.update_area(area_id, |area| {
            grid_mut(area, grid_id)?.category = category;
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    /// Renumber one area from scratch.
    pub fn renumber_area(&self, area_id: &AreaId) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            indexer::renumber_in_place(&mut area.grids);
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    // ── Text and shape mutations ─────────────────────────────────────

    pub fn add_text(
        &self,
        area_id: &AreaId,
        content: &str,
        position: Point,
    ) -> Result<(Scene, TextId), SceneError> {
        self.update_area(area_id, |area| {
            let id = area.next_text_id();
            area.texts.push(TextAnnotation::new(id, content, position));
            Ok(id)
        })
    }

    pub fn set_text_content(
        &self,
        area_id: &AreaId,
        text_id: TextId,
        content: &str,
    ) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            text_mut(area, text_id)?.content = content.to_string();
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    pub fn set_text_style(
        &self,
        area_id: &AreaId,
        text_id: TextId,
        style: TextStyle,
    ) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            let text = text_mut(area, text_id)?;
            text.font_size = style.font_size.max(1.0);
            text.font_family = style.font_family;
            text.color = style.color;
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    pub fn delete_text(&self, area_id: &AreaId, text_id: TextId) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            text_mut(area, text_id)?;
            area.texts.retain(|t| t.id != text_id);
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    pub fn add_shape(
        &self,
        area_id: &AreaId,
        kind: &str,
        position: Point,
        size: ShapeSize,
    ) -> Result<(Scene, ShapeId), SceneError> {
        self.update_area(area_id, |area| {
            let id = area.next_shape_id();
            area.shapes.push(DecorShape {
                id,
                kind: kind.to_string(),
                position,
                size: ShapeSize {
                    width: size.width.max(1.0),
                    height: size.height.max(1.0),
                },
                rotation: 0.0,
                skew: 0.0,
                color: area.color.clone(),
            });
            Ok(id)
        })
    }

    /// Set a shape's size; each side is clamped to at least one unit.
    pub fn resize_shape(
        &self,
        area_id: &AreaId,
        shape_id: ShapeId,
        width: f64,
        height: f64,
    ) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            shape_mut(area, shape_id)?.size = ShapeSize {
                width: width.max(1.0),
                height: height.max(1.0),
            };
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    pub fn set_shape_color(
        &self,
        area_id: &AreaId,
        shape_id: ShapeId,
        color: &str,
    ) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            shape_mut(area, shape_id)?.color = color.to_string();
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    pub fn delete_shape(&self, area_id: &AreaId, shape_id: ShapeId) -> Result<Scene, SceneError> {
        self.update_area(area_id, |area| {
            shape_mut(area, shape_id)?;
            area.shapes.retain(|s| s.id != shape_id);
            Ok(())
        })
        .map(|(scene, _)| scene)
    }

    // ── Icon mutations ───────────────────────────────────────────────

    pub fn add_icon(&self, kind: IconKind, position: Point) -> (Scene, IconId) {
        let icon = IconMarker::new(kind, position);
        let id = icon.id.clone();
        let mut next = self.clone();
        next.icons.push(icon);
        (next, id)
    }

    pub fn set_icon_color(&self, id: &IconId, color: &str) -> Result<Scene, SceneError> {
        let mut next = self.clone();
        icon_mut(&mut next.icons, id)?.color = color.to_string();
        Ok(next)
    }

    pub fn delete_icon(&self, id: &IconId) -> Result<Scene, SceneError> {
        let mut next = self.clone();
        icon_mut(&mut next.icons, id)?;
        next.icons.retain(|i| &i.id != id);
        Ok(next)
    }

    // ── Generic placement ────────────────────────────────────────────

    /// Move any entity by a world-space delta. Moving an area carries its
    /// grids, texts and shapes along.
    pub fn translate(&self, entity: &EntityRef, delta: Point) -> Result<Scene, SceneError> {
        if let EntityRef::Area(id) = entity {
            return self
                .update_area(id, |area| {
                    area.translate(delta);
                    Ok(())
                })
                .map(|(scene, _)| scene);
        }
        self.update_positioned(entity, |item| item.translate_by(delta))
    }

    /// Move any placed entity to an absolute position.
    pub fn move_to(&self, entity: &EntityRef, position: Point) -> Result<Scene, SceneError> {
        self.update_positioned(entity, |item| item.set_position(position))
    }

    /// Apply a rotation/skew/scale patch. Never renumbers seats.
    pub fn set_transform(
        &self,
        entity: &EntityRef,
        patch: TransformPatch,
    ) -> Result<Scene, SceneError> {
        if let Some(scale) = patch.scale {
            if !(scale > 0.0 && scale.is_finite()) {
                return Err(SceneError::InvalidScale(scale));
            }
        }
        if let EntityRef::Area(_) = entity {
            log::debug!("Ignoring transform patch on area {:?}", entity.area());
            return Ok(self.clone());
        }
        self.update_positioned(entity, |item| item.apply_patch(&patch))
    }

    /// Delete any entity.
    pub fn delete(&self, entity: &EntityRef) -> Result<Scene, SceneError> {
        match entity {
            EntityRef::Area(id) => self.delete_area(id),
            EntityRef::Grid { area, grid } => self.delete_grid(area, *grid),
            EntityRef::Text { area, text } => self.delete_text(area, *text),
            EntityRef::Shape { area, shape } => self.delete_shape(area, *shape),
            EntityRef::Icon(id) => self.delete_icon(id),
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn area_index(&self, id: &AreaId) -> Result<usize, SceneError> {
        self.areas
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| SceneError::AreaNotFound(id.clone()))
    }

    /// Copy-on-write edit of one area. Other areas stay shared.
    fn update_area<T>(
        &self,
        id: &AreaId,
        edit: impl FnOnce(&mut Area) -> Result<T, SceneError>,
    ) -> Result<(Scene, T), SceneError> {
        let index = self.area_index(id)?;
        let mut area = Area::clone(&self.areas[index]);
        let out = edit(&mut area)?;
        let mut next = self.clone();
        next.areas[index] = Arc::new(area);
        Ok((next, out))
    }

    fn update_positioned(
        &self,
        entity: &EntityRef,
        edit: impl FnOnce(&mut dyn Positioned),
    ) -> Result<Scene, SceneError> {
        match entity {
            EntityRef::Area(id) => {
                log::debug!("Area {} has no placement of its own", id);
                Ok(self.clone())
            }
            EntityRef::Grid { area, grid } => self
                .update_area(area, |a| {
                    let item: &mut dyn Positioned = grid_mut(a, *grid)?;
                    edit(item);
                    Ok(())
                })
                .map(|(scene, _)| scene),
            EntityRef::Text { area, text } => self
                .update_area(area, |a| {
                    let item: &mut dyn Positioned = text_mut(a, *text)?;
                    edit(item);
                    Ok(())
                })
                .map(|(scene, _)| scene),
            EntityRef::Shape { area, shape } => self
                .update_area(area, |a| {
                    let item: &mut dyn Positioned = shape_mut(a, *shape)?;
                    edit(item);
                    Ok(())
                })
                .map(|(scene, _)| scene),
            EntityRef::Icon(id) => {
                let mut next = self.clone();
                let item: &mut dyn Positioned = icon_mut(&mut next.icons, id)?;
                edit(item);
                Ok(next)
            }
        }
    }
}

fn validate_price(price: f64) -> Result<(), SceneError> {
    if price > 0.0 && price.is_finite() {
        Ok(())
    } else {
        Err(SceneError::InvalidPrice(price))
    }
}

fn check_seat_limit(area: &Area) -> Result<(), SceneError> {
    if indexer::within_seat_limit(&area.grids) {
        Ok(())
    } else {
        Err(SceneError::SeatLimit {
            area: area.id.clone(),
            limit: indexer::MAX_SEAT_NUMBER,
        })
    }
}

fn grid_mut(area: &mut Area, id: GridId) -> Result<&mut Grid, SceneError> {
    let area_id = area.id.clone();
    area.grids
        .iter_mut()
        .find(|g| g.id == id)
        .ok_or(SceneError::GridNotFound {
            area: area_id,
            grid: id,
        })
}

fn text_mut(area: &mut Area, id: TextId) -> Result<&mut TextAnnotation, SceneError> {
    let area_id = area.id.clone();
    area.texts
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(SceneError::TextNotFound {
            area: area_id,
            text: id,
        })
}

fn shape_mut(area: &mut Area, id: ShapeId) -> Result<&mut DecorShape, SceneError> {
    let area_id = area.id.clone();
    area.shapes
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or(SceneError::ShapeNotFound {
            area: area_id,
            shape: id,
        })
}

fn icon_mut<'a>(icons: &'a mut [IconMarker], id: &IconId) -> Result<&'a mut IconMarker, SceneError> {
    icons
        .iter_mut()
        .find(|i| &i.id == id)
        .ok_or_else(|| SceneError::IconNotFound(id.clone()))
}
