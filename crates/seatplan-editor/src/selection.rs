use std::time::{Duration, Instant};

use serde::Serialize;

use seatplan_core::{AreaId, EntityRef, GridId, IconId, Scene, ShapeId, TextId};

/// Interaction mode of a selected grid, text or shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// Dragging moves the entity.
    Move,
    /// Rotation/scale controls (grids, text) or resize handles (shapes).
    Transform,
}

/// What is selected. At most one entity at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Selection {
    Idle,
    Area(AreaId),
    Grid { area: AreaId, grid: GridId, mode: Mode },
    Text { area: AreaId, text: TextId, mode: Mode },
    Shape { area: AreaId, shape: ShapeId, mode: Mode },
    Icon(IconId),
}

impl Selection {
    /// Fresh selection of `entity`; moded entities start in [`Mode::Move`].
    pub fn of(entity: EntityRef) -> Self {
        match entity {
            EntityRef::Area(id) => Selection::Area(id),
            EntityRef::Grid { area, grid } => Selection::Grid { area, grid, mode: Mode::Move },
            EntityRef::Text { area, text } => Selection::Text { area, text, mode: Mode::Move },
            EntityRef::Shape { area, shape } => Selection::Shape { area, shape, mode: Mode::Move },
            EntityRef::Icon(id) => Selection::Icon(id),
        }
    }

    pub fn entity(&self) -> Option<EntityRef> {
        match self {
            Selection::Idle => None,
            Selection::Area(id) => Some(EntityRef::Area(id.clone())),
            Selection::Grid { area, grid, .. } => Some(EntityRef::Grid {
                area: area.clone(),
                grid: *grid,
            }),
            Selection::Text { area, text, .. } => Some(EntityRef::Text {
                area: area.clone(),
                text: *text,
            }),
            Selection::Shape { area, shape, .. } => Some(EntityRef::Shape {
                area: area.clone(),
                shape: *shape,
            }),
            Selection::Icon(id) => Some(EntityRef::Icon(id.clone())),
        }
    }

    pub fn mode(&self) -> Option<Mode> {
        match self {
            Selection::Grid { mode, .. }
            | Selection::Text { mode, .. }
            | Selection::Shape { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Selection::Idle)
    }

    /// The selected grid, if a grid is selected.
    pub fn grid(&self) -> Option<(&AreaId, GridId)> {
        match self {
            Selection::Grid { area, grid, .. } => Some((area, *grid)),
            _ => None,
        }
    }

    fn set_mode(&mut self, next: Mode) {
        if let Selection::Grid { mode, .. }
        | Selection::Text { mode, .. }
        | Selection::Shape { mode, .. } = self
        {
            *mode = next;
        }
    }
}

/// The selection state machine plus the rotation/scale control panel flag.
#[derive(Debug, Clone)]
pub struct SelectionController {
    state: Selection,
    panel_open: bool,
    last_click: Option<(EntityRef, Instant)>,
    quick_click: Duration,
}

impl SelectionController {
    pub fn new(quick_click: Duration) -> Self {
        Self {
            state: Selection::Idle,
            panel_open: false,
            last_click: None,
            quick_click,
        }
    }

    pub fn current(&self) -> &Selection {
        &self.state
    }

    pub fn control_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Handle a click on `target` (`None` for empty canvas). Returns whether
    /// the selection or its mode changed.
    ///
    /// A different entity replaces the selection in `Move` mode. A quick
    /// re-click on the selected grid or text toggles `Transform` mode with the
    /// control panel; on a shape it toggles resize handles. Re-clicking a
    /// selected area or icon changes nothing.
    pub fn click(&mut self, target: Option<EntityRef>, now: Instant) -> bool {
        let Some(target) = target else {
            self.last_click = None;
            return self.clear();
        };

        let quick = self.last_click.as_ref().is_some_and(|(prev, at)| {
            prev == &target && now.saturating_duration_since(*at) <= self.quick_click
        });
        self.last_click = Some((target.clone(), now));

        if self.state.entity().as_ref() != Some(&target) {
            self.state = Selection::of(target);
            self.panel_open = false;
            return true;
        }

        if !quick {
            return false;
        }
        match self.state.mode() {
            Some(Mode::Move) => {
                self.state.set_mode(Mode::Transform);
                self.panel_open = !matches!(self.state, Selection::Shape { .. });
                // Consumed: a third click starts a new pair.
                self.last_click = None;
                true
            }
            Some(Mode::Transform) => {
                self.state.set_mode(Mode::Move);
                self.panel_open = false;
                self.last_click = None;
                true
            }
            None => false,
        }
    }

    /// Select `entity` directly, as after a paste.
    pub fn select(&mut self, entity: EntityRef) {
        self.state = Selection::of(entity);
        self.panel_open = false;
        self.last_click = None;
    }

    /// Return to `Idle`. Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        let changed = !self.state.is_idle();
        self.state = Selection::Idle;
        self.panel_open = false;
        changed
    }

    /// Whether a pointer-down on `entity` may start a drag.
    ///
    /// Only the selected entity drags, and only in `Move` mode. Icons have
    /// no mode and always drag once selected; areas never drag.
    pub fn can_drag(&self, entity: &EntityRef) -> bool {
        if self.state.entity().as_ref() != Some(entity) {
            return false;
        }
        match &self.state {
            Selection::Area(_) | Selection::Idle => false,
            Selection::Icon(_) => true,
            other => other.mode() == Some(Mode::Move),
        }
    }

    /// Whether a pointer-down on `entity` drags its resize handles: the
    /// selected shape in `Transform` mode.
    pub fn can_resize(&self, entity: &EntityRef) -> bool {
        self.state.entity().as_ref() == Some(entity)
            && matches!(self.state, Selection::Shape { mode: Mode::Transform, .. })
    }

    /// Drop the selection if its entity no longer exists in `scene`.
    pub fn retain_existing(&mut self, scene: &Scene) -> bool {
        match self.state.entity() {
            Some(entity) if !scene.contains(&entity) => self.clear(),
            _ => false,
        }
    }
}
