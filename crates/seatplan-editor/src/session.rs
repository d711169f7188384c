use std::time::Instant;

use seatplan_core::{
    AreaId, AreaIndex, EntityRef, Grid, Point, Positioned, Scene, SceneError, ShapeId,
    TransformPatch,
};
use seatplan_io::{VenueLoader, VenueUploader};
use seatplan_renderer::{FrameOptions, RenderFrame, Viewport};

use crate::coalesce::{ResizeIntent, ResizeQueue};
use crate::error::EditorError;
use crate::input::{Gesture, InputRouter, Motion, PointerTarget};
use crate::ledger::SeatSelectionLedger;
use crate::selection::{Selection, SelectionController};
use crate::settings::EditorSettings;

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const COMMAND: Modifiers = Modifiers {
        ctrl: true,
        meta: false,
        shift: false,
    };

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Notifications returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Redraw,
    SelectionChanged,
    SeatToggled { area: AreaId, seat: u32, selected: bool },
    AreaClosed(AreaId),
    /// A drag finished with a non-zero total displacement.
    Moved { entity: EntityRef, delta: Point },
    /// A shape resize drag finished with a non-zero total world delta.
    Resized { entity: EntityRef, delta: Point },
    Deleted(EntityRef),
    Pasted(EntityRef),
}

/// Result of adding a vertex with the area tool.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawStatus {
    /// Still drawing; the outline has this many vertices.
    Open(usize),
    /// The ring closed and became a pending, unnamed area.
    Closed(AreaId),
}

#[derive(Debug, Clone)]
struct Clipboard {
    area: AreaId,
    grid: Grid,
}

/// All editor state in one value: scene snapshot, viewport, selection,
/// gesture, clipboard, pending resizes and the booking ledger.
///
/// Input handlers take explicit timestamps so the session runs without a
/// clock or a rendering surface.
#[derive(Debug)]
pub struct EditorSession {
    scene: Scene,
    index: AreaIndex,
    viewport: Viewport,
    settings: EditorSettings,
    selection: SelectionController,
    input: InputRouter,
    ledger: SeatSelectionLedger,
    clipboard: Option<Clipboard>,
    resizes: ResizeQueue,
    drawing: Option<Vec<Point>>,
    pending_area: Option<AreaId>,
    booking: bool,
}

impl EditorSession {
    pub fn new(settings: EditorSettings, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            scene: Scene::new(),
            index: AreaIndex::new(),
            viewport: Viewport::with_settings(canvas_width, canvas_height, &settings.viewport),
            selection: SelectionController::new(settings.quick_click()),
            input: InputRouter::new(),
            ledger: SeatSelectionLedger::new(),
            clipboard: None,
            resizes: ResizeQueue::new(settings.resize_debounce()),
            drawing: None,
            pending_area: None,
            booking: false,
            settings,
        }
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.reset(scene);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn selection(&self) -> &Selection {
        self.selection.current()
    }

    pub fn control_panel_open(&self) -> bool {
        self.selection.control_panel_open()
    }

    pub fn ledger(&self) -> &SeatSelectionLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut SeatSelectionLedger {
        &mut self.ledger
    }

    pub fn is_booking(&self) -> bool {
        self.booking
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_some()
    }

    pub fn pending_area(&self) -> Option<&AreaId> {
        self.pending_area.as_ref()
    }

    /// Size a grid shows while keyboard resizes are still queued.
    pub fn pending_resize(&self, area: &AreaId, grid: u32) -> Option<(u32, u32)> {
        self.resizes.pending_size(area, grid)
    }

    /// Switch between editing and seat booking. Booking drops any selection
    /// and drawing in progress.
    pub fn set_booking_mode(&mut self, booking: bool) {
        if booking == self.booking {
            return;
        }
        if booking {
            self.flush_resizes();
            self.cancel_drawing();
            self.selection.clear();
        }
        self.input.cancel();
        self.booking = booking;
        log::info!("Booking mode {}", if booking { "on" } else { "off" });
    }

    pub fn resize_canvas(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
    }

    pub fn fit_to_content(&mut self) {
        if let Some(bbox) = self.scene.content_bbox() {
            self.viewport.fit_with_settings(&bbox, &self.settings.viewport);
        }
    }

    pub fn frame(&self) -> RenderFrame {
        let options = FrameOptions {
            selected: self.selection.current().entity(),
            chosen_seats: self
                .ledger
                .entries()
                .iter()
                .map(|e| (e.area_id.clone(), e.seat_number))
                .collect(),
        };
        RenderFrame::build(&self.scene, &self.index, self.viewport, &options)
    }

    // ── Scene edits ──────────────────────────────────────────────────

    /// Apply a scene mutation. On error the scene is left untouched.
    pub fn apply(
        &mut self,
        edit: impl FnOnce(&Scene) -> Result<Scene, SceneError>,
    ) -> Result<(), EditorError> {
        let next = edit(&self.scene)?;
        self.commit(next);
        Ok(())
    }

    /// Rotation/skew/scale from the control panel for the selected entity.
    pub fn transform_selected(&mut self, patch: TransformPatch) -> Result<(), EditorError> {
        let entity = self
            .selection
            .current()
            .entity()
            .ok_or(EditorError::NothingSelected)?;
        self.apply(|scene| scene.set_transform(&entity, patch))
    }

    /// Delete an area, releasing any of its seats held in the ledger.
    pub fn delete_area(&mut self, id: &AreaId) -> Result<(), EditorError> {
        self.apply(|scene| scene.delete_area(id))?;
        self.ledger.remove_area(id);
        if self.pending_area.as_ref() == Some(id) {
            self.pending_area = None;
        }
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<EntityRef, EditorError> {
        let entity = self
            .selection
            .current()
            .entity()
            .ok_or(EditorError::NothingSelected)?;
        self.flush_resizes();
        match &entity {
            EntityRef::Area(id) => self.delete_area(id)?,
            other => self.apply(|scene| scene.delete(other))?,
        }
        self.selection.clear();
        Ok(entity)
    }

    // ── Area drawing ─────────────────────────────────────────────────

    /// Start outlining a new area. An earlier outline that was closed but
    /// never named is discarded.
    pub fn begin_area(&mut self) {
        self.discard_pending_area();
        self.selection.clear();
        self.input.cancel();
        self.drawing = Some(Vec::new());
    }

    /// Add a vertex at a screen position. Landing within the close radius of
    /// the first vertex (with at least three placed) closes the ring.
    pub fn add_vertex(&mut self, screen: Point) -> Result<DrawStatus, EditorError> {
        let radius = self.settings.close_ring_radius;
        let points = self.drawing.as_mut().ok_or(EditorError::NotDrawing)?;
        if let Some(first) = points.first() {
            let first_on_screen = self.viewport.world_to_screen(*first);
            if points.len() >= 3 && first_on_screen.distance_to(&screen) <= radius {
                return self.finish_drawing().map(DrawStatus::Closed);
            }
        }
        points.push(self.viewport.screen_to_world(screen));
        Ok(DrawStatus::Open(points.len()))
    }

    /// Close the outline into a pending, unnamed area and select it.
    pub fn finish_drawing(&mut self) -> Result<AreaId, EditorError> {
        let points = self.drawing.clone().ok_or(EditorError::NotDrawing)?;
        let (next, id) = self.scene.add_area(points)?;
        self.commit(next);
        self.drawing = None;
        self.pending_area = Some(id.clone());
        self.selection.select(EntityRef::Area(id.clone()));
        log::debug!("Closed outline into pending area {}", id);
        Ok(id)
    }

    /// Abandon the outline in progress and any unnamed pending area.
    pub fn cancel_drawing(&mut self) {
        self.drawing = None;
        self.discard_pending_area();
    }

    /// Name and price the pending area. On a validation error the area stays
    /// pending so the operator can correct the input.
    pub fn commit_area(&mut self, name: &str, price: f64) -> Result<AreaId, EditorError> {
        let id = self.pending_area.clone().ok_or(EditorError::NoPendingArea)?;
        self.apply(|scene| scene.commit_area_name(&id, name, price))?;
        self.pending_area = None;
        Ok(id)
    }

    /// Name the pending area as a layout region (stage, walkway).
    pub fn commit_layout_area(&mut self, name: &str) -> Result<AreaId, EditorError> {
        let id = self.pending_area.clone().ok_or(EditorError::NoPendingArea)?;
        self.apply(|scene| scene.mark_layout(&id)?.commit_area_name(&id, name, 0.0))?;
        self.pending_area = None;
        Ok(id)
    }

    /// Toggle a seat into or out of the ledger by number. Returns whether the
    /// seat is now chosen.
    pub fn pick_seat(&mut self, area: &AreaId, seat_number: u32) -> Result<bool, EditorError> {
        if !self.booking {
            return Err(EditorError::NotInBookingMode);
        }
        let a = self
            .scene
            .area(area)
            .ok_or_else(|| SceneError::AreaNotFound(area.clone()))?;
        let name = a.display_name().to_string();
        Ok(self.ledger.toggle(area, seat_number, &name, a.price))
    }

    // ── Clipboard ────────────────────────────────────────────────────

    pub fn copy(&mut self) -> Result<(), EditorError> {
        let (area, grid_id) = self.selected_grid()?;
        self.flush_resizes();
        let grid = self
            .scene
            .area(&area)
            .and_then(|a| a.grid(grid_id))
            .cloned()
            .ok_or(SceneError::GridNotFound {
                area: area.clone(),
                grid: grid_id,
            })?;
        self.clipboard = Some(Clipboard { area, grid });
        Ok(())
    }

    /// Paste the copied grid into its source area, offset from the last
    /// copy, and select it. Successive pastes step further along.
    pub fn paste(&mut self) -> Result<EntityRef, EditorError> {
        let clip = self.clipboard.clone().ok_or(EditorError::ClipboardEmpty)?;
        self.flush_resizes();
        let (next, id) = self
            .scene
            .paste_grid(&clip.area, &clip.grid, self.settings.paste_offset)?;
        self.commit(next);

        if let Some(pasted) = self.scene.area(&clip.area).and_then(|a| a.grid(id)) {
            self.clipboard = Some(Clipboard {
                area: clip.area.clone(),
                grid: pasted.clone(),
            });
        }
        let entity = EntityRef::Grid { area: clip.area, grid: id };
        self.selection.select(entity.clone());
        Ok(entity)
    }

    // ── Pointer input ────────────────────────────────────────────────

    pub fn on_pointer_down(
        &mut self,
        pointer: u32,
        screen: Point,
        on_control_panel: bool,
        now: Instant,
    ) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        if !self.input.pointer_down(pointer, screen) {
            // Second finger: the router switched to pinching.
            events.push(EditorEvent::Redraw);
            return events;
        }

        if self.drawing.is_some() && !self.booking {
            match self.add_vertex(screen) {
                Ok(DrawStatus::Closed(id)) => events.push(EditorEvent::AreaClosed(id)),
                Ok(DrawStatus::Open(_)) => {}
                Err(err) => log::warn!("Could not close outline: {}", err),
            }
            events.push(EditorEvent::Redraw);
            return events;
        }

        let target = if on_control_panel {
            PointerTarget::ControlPanel
        } else {
            InputRouter::resolve_target(&self.scene, &self.index, &self.viewport, screen, self.booking)
        };

        match target {
            PointerTarget::ControlPanel => {}
            PointerTarget::Seat { area, seat } => {
                if let Some(a) = self.scene.area(&area) {
                    let name = a.display_name().to_string();
                    let selected = self.ledger.toggle(&area, seat.number, &name, a.price);
                    events.push(EditorEvent::SeatToggled {
                        area,
                        seat: seat.number,
                        selected,
                    });
                }
            }
            PointerTarget::Background => {
                if !self.booking && self.change_selection(None, now) {
                    events.push(EditorEvent::SelectionChanged);
                }
                self.input.begin_pan(screen);
            }
            PointerTarget::Entity(entity) => {
                if self.change_selection(Some(entity.clone()), now) {
                    events.push(EditorEvent::SelectionChanged);
                }
                if self.selection.can_drag(&entity) {
                    self.input.begin_drag(entity, screen);
                } else if self.selection.can_resize(&entity) {
                    self.input.begin_resize(entity, screen);
                } else {
                    self.input.begin_pan(screen);
                }
            }
        }
        events.push(EditorEvent::Redraw);
        events
    }

    pub fn on_pointer_move(&mut self, pointer: u32, screen: Point) -> Vec<EditorEvent> {
        let Some(motion) = self.input.pointer_move(pointer, screen, self.viewport.zoom) else {
            return Vec::new();
        };
        match motion {
            Motion::Pan { dx, dy } => self.viewport.pan_by_screen(dx, dy),
            Motion::Drag { entity, delta } => {
                if let Err(err) = self.apply(|scene| scene.translate(&entity, delta)) {
                    log::warn!("Drag target vanished: {}", err);
                    self.input.cancel();
                }
            }
            Motion::Resize { entity, delta } => {
                if let Err(err) = self.resize_shape_by(&entity, delta) {
                    log::warn!("Resize target vanished: {}", err);
                    self.input.cancel();
                }
            }
            Motion::Pinch {
                previous,
                distance,
                midpoint,
            } => {
                self.viewport.pinch(previous, distance, midpoint);
            }
        }
        vec![EditorEvent::Redraw]
    }

    pub fn on_pointer_up(&mut self, pointer: u32) -> Vec<EditorEvent> {
        match self.input.pointer_up(pointer) {
            Some(Gesture::Dragging(drag)) => {
                let (entity, delta) = drag.end();
                if delta.x != 0.0 || delta.y != 0.0 {
                    return vec![EditorEvent::Moved { entity, delta }, EditorEvent::Redraw];
                }
                Vec::new()
            }
            Some(Gesture::Resizing(drag)) => {
                let (entity, delta) = drag.end();
                if delta.x != 0.0 || delta.y != 0.0 {
                    return vec![EditorEvent::Resized { entity, delta }, EditorEvent::Redraw];
                }
                Vec::new()
            }
            Some(_) => vec![EditorEvent::Redraw],
            None => Vec::new(),
        }
    }

    /// Wheel zoom about the pointer. Negative `delta_y` zooms in.
    pub fn on_wheel(&mut self, screen: Point, delta_y: f64) -> Vec<EditorEvent> {
        if delta_y == 0.0 {
            return Vec::new();
        }
        let step = self.settings.viewport.wheel_step;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        self.viewport.zoom_at(screen, factor);
        vec![EditorEvent::Redraw]
    }

    // ── Keyboard ─────────────────────────────────────────────────────

    /// Escape and Delete always apply. Arrow resizing and copy/paste only
    /// act while a grid is selected.
    pub fn on_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        now: Instant,
    ) -> Result<Vec<EditorEvent>, EditorError> {
        match key {
            Key::Escape => {
                if self.drawing.is_some() || self.pending_area.is_some() {
                    self.cancel_drawing();
                }
                let changed = self.change_selection(None, now);
                Ok(if changed {
                    vec![EditorEvent::SelectionChanged, EditorEvent::Redraw]
                } else {
                    vec![EditorEvent::Redraw]
                })
            }
            Key::Delete => {
                if self.selection.current().is_idle() || self.booking {
                    return Ok(Vec::new());
                }
                let entity = self.delete_selected()?;
                Ok(vec![EditorEvent::Deleted(entity), EditorEvent::Redraw])
            }
            _ if self.selection.current().grid().is_none() => Ok(Vec::new()),
            Key::ArrowRight => self.resize_step(0, 1, now),
            Key::ArrowLeft => self.resize_step(0, -1, now),
            Key::ArrowDown => self.resize_step(1, 0, now),
            Key::ArrowUp => self.resize_step(-1, 0, now),
            Key::Char(c) if modifiers.command() && c.eq_ignore_ascii_case(&'c') => {
                self.copy()?;
                Ok(Vec::new())
            }
            Key::Char(c) if modifiers.command() && c.eq_ignore_ascii_case(&'v') => {
                let entity = self.paste()?;
                Ok(vec![
                    EditorEvent::Pasted(entity),
                    EditorEvent::SelectionChanged,
                    EditorEvent::Redraw,
                ])
            }
            Key::Char(_) => Ok(Vec::new()),
        }
    }

    /// Apply queued resizes whose interval has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<EditorEvent> {
        let due = self.resizes.take_due(now);
        if due.is_empty() {
            return Vec::new();
        }
        self.apply_resizes(due);
        vec![EditorEvent::Redraw]
    }

    /// Apply every queued resize now.
    pub fn flush_resizes(&mut self) {
        let pending = self.resizes.drain();
        if !pending.is_empty() {
            self.apply_resizes(pending);
        }
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Load the event's venue and fit the view. On failure the session falls
    /// back to an empty scene and the error is returned for display.
    pub fn load(
        &mut self,
        loader: &dyn VenueLoader,
        event_id: &str,
        url: &str,
    ) -> Result<(), EditorError> {
        let mut viewport = self.viewport;
        let loaded = loader
            .fetch(event_id, url)
            .and_then(|json| seatplan_io::load_and_fit(&json, &mut viewport, &self.settings.viewport));
        match loaded {
            Ok(scene) => {
                self.reset(scene);
                self.viewport = viewport;
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to load venue for event {}: {}", event_id, err);
                self.reset(Scene::new());
                Err(err.into())
            }
        }
    }

    /// Flush pending resizes, encode the scene and upload it. The scene is
    /// kept as is whether or not the upload succeeds.
    pub fn save(&mut self, uploader: &dyn VenueUploader, event_id: &str) -> Result<String, EditorError> {
        self.flush_resizes();
        let result = seatplan_io::serialize(&self.scene)
            .and_then(|json| uploader.upload(event_id, &json));
        match result {
            Ok(url) => Ok(url),
            Err(err) => {
                log::error!("Failed to save venue for event {}: {}", event_id, err);
                Err(err.into())
            }
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Grow a shape by a world-space `delta`, measured along the shape's own
    /// axes so rotated shapes follow the pointer.
    fn resize_shape_by(&mut self, entity: &EntityRef, delta: Point) -> Result<(), EditorError> {
        let EntityRef::Shape { area, shape } = entity else {
            return Ok(());
        };
        let shape: ShapeId = *shape;
        let current = self
            .scene
            .area(area)
            .and_then(|a| a.shape(shape))
            .ok_or_else(|| SceneError::ShapeNotFound { area: area.clone(), shape })?;
        let origin = current.position;
        let local = match (current.to_local(&origin), current.to_local(&origin.offset_by(delta))) {
            (Some(from), Some(to)) => Point::new(to.x - from.x, to.y - from.y),
            _ => delta,
        };
        let (width, height) = (current.size.width + local.x, current.size.height + local.y);
        self.apply(|scene| scene.resize_shape(area, shape, width, height))
    }

    fn commit(&mut self, next: Scene) {
        self.scene = next;
        self.index = AreaIndex::build(&self.scene);
        self.selection.retain_existing(&self.scene);
    }

    fn reset(&mut self, scene: Scene) {
        self.commit(scene);
        self.selection.clear();
        self.input.cancel();
        self.ledger.clear();
        self.clipboard = None;
        self.resizes.drain();
        self.drawing = None;
        self.pending_area = None;
    }

    /// Route a click to the selection machine. Leaving a grid flushes its
    /// queued resizes first.
    fn change_selection(&mut self, target: Option<EntityRef>, now: Instant) -> bool {
        let before = self.selection.current().entity();
        if before.is_some() && before != target {
            self.flush_resizes();
        }
        self.selection.click(target, now)
    }

    fn selected_grid(&self) -> Result<(AreaId, u32), EditorError> {
        match self.selection.current() {
            Selection::Idle => Err(EditorError::NothingSelected),
            other => other
                .grid()
                .map(|(area, grid)| (area.clone(), grid))
                .ok_or(EditorError::NotAGrid),
        }
    }

    fn resize_step(&mut self, d_rows: i64, d_cols: i64, now: Instant) -> Result<Vec<EditorEvent>, EditorError> {
        let (area, grid_id) = self.selected_grid()?;
        let (rows, cols) = match self.resizes.pending_size(&area, grid_id) {
            Some(size) => size,
            None => {
                let grid = self
                    .scene
                    .area(&area)
                    .and_then(|a| a.grid(grid_id))
                    .ok_or(SceneError::GridNotFound {
                        area: area.clone(),
                        grid: grid_id,
                    })?;
                (grid.size.rows, grid.size.cols)
            }
        };
        let step = |n: u32, d: i64| (i64::from(n) + d).clamp(1, i64::from(u32::MAX)) as u32;
        self.resizes.push(
            ResizeIntent {
                area,
                grid: grid_id,
                rows: step(rows, d_rows),
                cols: step(cols, d_cols),
            },
            now,
        );
        let mut events = self.tick(now);
        if events.is_empty() {
            events.push(EditorEvent::Redraw);
        }
        Ok(events)
    }

    fn apply_resizes(&mut self, intents: Vec<ResizeIntent>) {
        for intent in intents {
            let result = self.apply(|scene| {
                scene.resize_grid(&intent.area, intent.grid, intent.rows, intent.cols)
            });
            if let Err(err) = result {
                log::debug!("Dropped resize of grid {}: {}", intent.grid, err);
            }
        }
    }

    fn discard_pending_area(&mut self) {
        if let Some(id) = self.pending_area.take() {
            if let Err(err) = self.delete_area(&id) {
                log::debug!("Pending area already gone: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    use seatplan_core::ShapeSize;
    use seatplan_io::{LoadError, SaveError};

    use crate::selection::Mode;

    fn hall() -> (Scene, AreaId) {
        let (scene, area) = Scene::new()
            .add_area(vec![
                Point::new(0.0, 0.0),
                Point::new(400.0, 0.0),
                Point::new(400.0, 400.0),
                Point::new(0.0, 400.0),
            ])
            .unwrap();
        let scene = scene.commit_area_name(&area, "VIP", 50.0).unwrap();
        (scene, area)
    }

    fn session_with(scene: Scene) -> EditorSession {
        EditorSession::new(EditorSettings::default(), 800.0, 600.0).with_scene(scene)
    }

    fn grid_center(session: &EditorSession, area: &AreaId, grid: u32) -> Point {
        let grid = session.scene().area(area).unwrap().grid(grid).unwrap();
        session.viewport().world_to_screen(grid.world_bbox().center())
    }

    #[test]
    fn test_scenario_a_five_by_five() {
        let (scene, area) = hall();
        let mut session = session_with(scene);
        session.apply(|s| s.add_grid(&area, 5, 5).map(|(s, _)| s)).unwrap();
        let grid = &session.scene().area(&area).unwrap().grids[0];
        assert_eq!(grid.seat_start_index, 1);
        assert_eq!(grid.seat_range(), 1..26);
    }

    #[test]
    fn test_scenario_c_booking_click() {
        let (scene, area) = hall();
        let (scene, _) = scene.add_grid(&area, 3, 4).unwrap();
        let mut session = session_with(scene);
        session.set_booking_mode(true);

        // Seat 12 is row 2, col 3.
        let grid = session.scene().area(&area).unwrap().grids[0].clone();
        let seat_world = grid.transform().apply(&Point::new(3.0 * 26.0 + 10.0, 2.0 * 26.0 + 10.0));
        let screen = session.viewport().world_to_screen(seat_world);
        let now = Instant::now();

        let events = session.on_pointer_down(1, screen, false, now);
        session.on_pointer_up(1);
        assert!(events.contains(&EditorEvent::SeatToggled {
            area: area.clone(),
            seat: 12,
            selected: true,
        }));
        assert_eq!(session.ledger().len(), 1);
        assert_eq!(session.ledger().entries()[0].area_name, "VIP");
        assert_eq!(session.ledger().total(), 50.0);
        assert!(session.selection().is_idle());

        session.on_pointer_down(1, screen, false, now + Duration::from_secs(1));
        session.on_pointer_up(1);
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn test_scenario_e_copy_paste() {
        let (scene, area) = hall();
        let (scene, grid) = scene.add_grid(&area, 5, 5).unwrap();
        let mut session = session_with(scene);
        let now = Instant::now();
        let source = session.scene().area(&area).unwrap().grid(grid).unwrap().clone();

        let screen = grid_center(&session, &area, grid);
        session.on_pointer_down(1, screen, false, now);
        session.on_pointer_up(1);
        session.on_key(Key::Char('c'), Modifiers::COMMAND, now).unwrap();
        let events = session.on_key(Key::Char('v'), Modifiers::COMMAND, now).unwrap();

        let pasted_ref = EntityRef::Grid { area: area.clone(), grid: grid + 1 };
        assert_eq!(events[0], EditorEvent::Pasted(pasted_ref.clone()));
        assert_eq!(session.selection().entity(), Some(pasted_ref));
        let pasted = session.scene().area(&area).unwrap().grid(grid + 1).unwrap();
        assert_eq!(pasted.seat_start_index, 26);
        assert_eq!(pasted.position, source.position.translate(20.0, 20.0));
        assert_eq!(pasted.size, source.size);
    }

    #[test]
    fn test_shortcuts_need_a_grid() {
        let (scene, area) = hall();
        let mut session = session_with(scene);
        let now = Instant::now();
        assert!(session.on_key(Key::ArrowRight, Modifiers::default(), now).unwrap().is_empty());
        assert!(matches!(session.copy(), Err(EditorError::NothingSelected)));
        assert!(matches!(session.paste(), Err(EditorError::ClipboardEmpty)));

        let screen = session.viewport().world_to_screen(Point::new(50.0, 50.0));
        session.on_pointer_down(1, screen, false, now);
        session.on_pointer_up(1);
        assert_eq!(session.selection(), &Selection::Area(area));
        assert!(matches!(session.copy(), Err(EditorError::NotAGrid)));
    }

    #[test]
    fn test_drag_moves_grid_in_world_units() {
        let (scene, area) = hall();
        let (scene, grid) = scene.add_grid(&area, 2, 2).unwrap();
        let mut session = session_with(scene);
        session.viewport.zoom = 2.0;
        let before = session.scene().area(&area).unwrap().grid(grid).unwrap().position;
        let start = grid_center(&session, &area, grid);
        let now = Instant::now();

        session.on_pointer_down(1, start, false, now);
        session.on_pointer_move(1, start.translate(30.0, -10.0));
        let events = session.on_pointer_up(1);

        let after = session.scene().area(&area).unwrap().grid(grid).unwrap().position;
        assert_eq!(after, before.translate(15.0, -5.0));
        assert!(matches!(events[0], EditorEvent::Moved { .. }));
    }

    #[test]
    fn test_shape_transform_drag_resizes() {
        let (scene, area) = hall();
        let (scene, shape) = scene
            .add_shape(&area, "rectangle", Point::new(100.0, 100.0), ShapeSize { width: 100.0, height: 40.0 })
            .unwrap();
        let mut session = session_with(scene);
        let pan = session.viewport().pan;
        let entity = EntityRef::Shape { area: area.clone(), shape };
        let on_shape = session.viewport().world_to_screen(Point::new(150.0, 120.0));
        let now = Instant::now();

        session.on_pointer_down(1, on_shape, false, now);
        session.on_pointer_up(1);
        session.on_pointer_down(1, on_shape, false, now + Duration::from_millis(100));
        assert_eq!(session.selection().mode(), Some(Mode::Transform));
        assert!(!session.control_panel_open());

        session.on_pointer_move(1, on_shape.translate(30.0, 20.0));
        let events = session.on_pointer_up(1);

        let resized = session.scene().area(&area).unwrap().shape(shape).unwrap();
        assert_eq!(resized.size, ShapeSize { width: 130.0, height: 60.0 });
        assert_eq!(resized.position, Point::new(100.0, 100.0));
        assert_eq!(session.viewport().pan, pan);
        assert_eq!(
            events[0],
            EditorEvent::Resized { entity, delta: Point::new(30.0, 20.0) }
        );
    }

    #[test]
    fn test_background_drag_pans() {
        let (scene, _) = hall();
        let mut session = session_with(scene);
        let start = session.viewport().world_to_screen(Point::new(600.0, 500.0));
        session.on_pointer_down(1, start, false, Instant::now());
        session.on_pointer_move(1, start.translate(40.0, 0.0));
        session.on_pointer_up(1);
        assert_eq!(session.viewport().pan, Point::new(40.0, 0.0));
    }

    #[test]
    fn test_arrow_resizes_coalesce() {
        let (scene, area) = hall();
        let (scene, grid) = scene.add_grid(&area, 2, 2).unwrap();
        let (scene, second) = scene.add_grid(&area, 1, 1).unwrap();
        let scene = scene
            .translate(&EntityRef::Grid { area: area.clone(), grid: second }, Point::new(150.0, 150.0))
            .unwrap();
        let mut session = session_with(scene);
        let now = Instant::now();
        let screen = grid_center(&session, &area, grid);
        session.on_pointer_down(1, screen, false, now);
        session.on_pointer_up(1);

        session.on_key(Key::ArrowRight, Modifiers::default(), now).unwrap();
        session.on_key(Key::ArrowRight, Modifiers::default(), now + Duration::from_millis(20)).unwrap();
        session.on_key(Key::ArrowDown, Modifiers::default(), now + Duration::from_millis(40)).unwrap();
        assert_eq!(session.pending_resize(&area, grid), Some((3, 4)));
        assert_eq!(session.scene().area(&area).unwrap().grid(grid).unwrap().size.cols, 2);

        assert!(!session.tick(now + Duration::from_millis(150)).is_empty());
        let a = session.scene().area(&area).unwrap();
        assert_eq!(a.grid(grid).unwrap().seat_count(), 12);
        assert_eq!(a.grid(second).unwrap().seat_start_index, 13);
    }

    #[test]
    fn test_deselect_flushes_resizes() {
        let (scene, area) = hall();
        let (scene, grid) = scene.add_grid(&area, 2, 2).unwrap();
        let mut session = session_with(scene);
        let now = Instant::now();
        let screen = grid_center(&session, &area, grid);
        session.on_pointer_down(1, screen, false, now);
        session.on_pointer_up(1);
        session.on_key(Key::ArrowUp, Modifiers::default(), now).unwrap();

        session.on_key(Key::Escape, Modifiers::default(), now).unwrap();
        assert!(session.selection().is_idle());
        assert_eq!(session.scene().area(&area).unwrap().grid(grid).unwrap().size.rows, 1);
    }

    #[test]
    fn test_draw_area_auto_closes() {
        let mut session = EditorSession::new(EditorSettings::default(), 800.0, 600.0);
        let now = Instant::now();
        session.begin_area();
        for (i, p) in [(100.0, 100.0), (300.0, 100.0), (300.0, 300.0)].into_iter().enumerate() {
            session.on_pointer_down(1, Point::new(p.0, p.1), false, now);
            session.on_pointer_up(1);
            assert_eq!(session.drawing.as_ref().map(Vec::len), Some(i + 1));
        }
        let events = session.on_pointer_down(1, Point::new(104.0, 97.0), false, now);
        let id = session.pending_area().cloned().unwrap();
        assert_eq!(events[0], EditorEvent::AreaClosed(id.clone()));
        assert!(!session.is_drawing());
        // Three vertices stored as a closed ring.
        let points = &session.scene().area(&id).unwrap().points;
        assert_eq!(points.len(), 4);
        assert_eq!(points.first(), points.last());

        assert!(matches!(
            session.commit_area("Balcony", 0.0),
            Err(EditorError::Scene(SceneError::InvalidPrice(_)))
        ));
        assert_eq!(session.pending_area(), Some(&id));
        session.commit_area("Balcony", 35.0).unwrap();
        assert!(session.pending_area().is_none());
        assert_eq!(session.scene().area(&id).unwrap().price, 35.0);
    }

    #[test]
    fn test_cancel_drawing_discards_pending_area() {
        let mut session = EditorSession::new(EditorSettings::default(), 800.0, 600.0);
        session.begin_area();
        for p in [(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)] {
            session.add_vertex(Point::new(p.0, p.1)).unwrap();
        }
        session.finish_drawing().unwrap();
        assert_eq!(session.scene().area_count(), 1);
        session.cancel_drawing();
        assert_eq!(session.scene().area_count(), 0);
        assert!(matches!(session.add_vertex(Point::new(1.0, 1.0)), Err(EditorError::NotDrawing)));
    }

    #[test]
    fn test_layout_area_commit() {
        let mut session = EditorSession::new(EditorSettings::default(), 800.0, 600.0);
        session.begin_area();
        for p in [(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)] {
            session.add_vertex(Point::new(p.0, p.1)).unwrap();
        }
        let id = session.finish_drawing().unwrap();
        session.commit_layout_area("Stage").unwrap();
        let area = session.scene().area(&id).unwrap();
        assert!(area.is_layout);
        assert_eq!(area.price, 0.0);
    }

    #[test]
    fn test_delete_area_releases_seats() {
        let (scene, area) = hall();
        let (scene, _) = scene.add_grid(&area, 2, 2).unwrap();
        let mut session = session_with(scene);
        session.ledger_mut().toggle(&area, 1, "VIP", 50.0);
        session.ledger_mut().toggle(&AreaId::from("other"), 1, "Other", 5.0);
        session.delete_area(&area).unwrap();
        assert_eq!(session.ledger().len(), 1);
        assert_eq!(session.ledger().total(), 5.0);
    }

    #[test]
    fn test_delete_key_removes_selected_grid() {
        let (scene, area) = hall();
        let (scene, grid) = scene.add_grid(&area, 2, 2).unwrap();
        let mut session = session_with(scene);
        let now = Instant::now();
        let screen = grid_center(&session, &area, grid);
        session.on_pointer_down(1, screen, false, now);
        session.on_pointer_up(1);
        let events = session.on_key(Key::Delete, Modifiers::default(), now).unwrap();
        assert_eq!(events[0], EditorEvent::Deleted(EntityRef::Grid { area: area.clone(), grid }));
        assert!(session.scene().area(&area).unwrap().grids.is_empty());
        assert!(session.selection().is_idle());
    }

    #[test]
    fn test_control_panel_press_keeps_selection() {
        let (scene, area) = hall();
        let (scene, grid) = scene.add_grid(&area, 2, 2).unwrap();
        let mut session = session_with(scene);
        let now = Instant::now();
        let screen = grid_center(&session, &area, grid);
        session.on_pointer_down(1, screen, false, now);
        session.on_pointer_up(1);
        session.on_pointer_down(1, screen, false, now + Duration::from_millis(100));
        session.on_pointer_up(1);
        assert!(session.control_panel_open());

        session.on_pointer_down(1, Point::new(790.0, 590.0), true, now + Duration::from_millis(500));
        session.on_pointer_up(1);
        assert!(session.control_panel_open());
        session.transform_selected(TransformPatch::rotation(30.0)).unwrap();
        assert_eq!(session.scene().area(&area).unwrap().grid(grid).unwrap().rotation, 30.0);
    }

    #[test]
    fn test_wheel_zoom() {
        let mut session = EditorSession::new(EditorSettings::default(), 800.0, 600.0);
        session.on_wheel(Point::new(400.0, 300.0), -1.0);
        assert!((session.viewport().zoom - 1.1).abs() < 1e-12);
        session.on_wheel(Point::new(400.0, 300.0), 1.0);
        assert!((session.viewport().zoom - 1.0).abs() < 1e-12);
    }

    struct FailingLoader;

    impl VenueLoader for FailingLoader {
        fn fetch(&self, _event_id: &str, url: &str) -> Result<String, LoadError> {
            Err(LoadError::Fetch {
                location: url.to_string(),
                reason: "unreachable".to_string(),
            })
        }
    }

    struct FailingUploader {
        attempts: RefCell<u32>,
    }

    impl VenueUploader for FailingUploader {
        fn upload(&self, _event_id: &str, _document: &str) -> Result<String, SaveError> {
            *self.attempts.borrow_mut() += 1;
            Err(SaveError::Upload("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_load_failure_falls_back_to_empty_scene() {
        let (scene, _) = hall();
        let mut session = session_with(scene);
        let err = session.load(&FailingLoader, "evt", "missing.json").unwrap_err();
        assert!(matches!(err, EditorError::Load(LoadError::Fetch { .. })));
        assert!(session.scene().is_empty());
    }

    #[test]
    fn test_save_failure_keeps_scene() {
        let (scene, area) = hall();
        let (scene, grid) = scene.add_grid(&area, 2, 2).unwrap();
        let mut session = session_with(scene.clone());
        let uploader = FailingUploader { attempts: RefCell::new(0) };

        assert!(matches!(session.save(&uploader, "evt"), Err(EditorError::Save(SaveError::Upload(_)))));
        assert_eq!(session.scene(), &scene);
        assert!(session.scene().area(&area).unwrap().grid(grid).is_some());
        assert!(session.save(&uploader, "evt").is_err());
        assert_eq!(*uploader.attempts.borrow(), 2);
    }
}
