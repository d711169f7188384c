use std::collections::BTreeMap;

use seatplan_core::{AreaId, AreaIndex, EntityRef, Point, Positioned, Scene, SeatHit};
use seatplan_renderer::Viewport;

use crate::drag::DragSession;

/// What a pointer-down landed on. Resolved once, before any motion.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    Background,
    /// A control-panel surface; never changes the selection.
    ControlPanel,
    Entity(EntityRef),
    Seat { area: AreaId, seat: SeatHit },
}

/// The gesture in progress. Panning, dragging, resizing and pinching exclude
/// each other.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    Panning { last_screen: Point },
    Dragging(DragSession),
    /// Dragging the resize handles of a shape in `Transform` mode.
    Resizing(DragSession),
    Pinching { distance: f64 },
}

/// Pointer motion translated for the session to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    /// Screen-space pan delta.
    Pan { dx: f64, dy: f64 },
    /// World-space delta for the dragged entity.
    Drag { entity: EntityRef, delta: Point },
    /// World-space growth of the resized shape since the last motion.
    Resize { entity: EntityRef, delta: Point },
    Pinch { previous: f64, distance: f64, midpoint: Point },
}

/// Tracks active pointers and owns the single current gesture.
#[derive(Debug, Clone)]
pub struct InputRouter {
    pointers: BTreeMap<u32, Point>,
    gesture: Gesture,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl InputRouter {
    pub fn new() -> Self {
        Self {
            pointers: BTreeMap::new(),
            gesture: Gesture::Idle,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Resolve the topmost target under `screen`.
    ///
    /// Order: icons, then per area from the top: texts, shapes, grids, and
    /// finally the area ring. In booking mode only seats are targets.
    pub fn resolve_target(
        scene: &Scene,
        index: &AreaIndex,
        viewport: &Viewport,
        screen: Point,
        booking: bool,
    ) -> PointerTarget {
        let world = viewport.screen_to_world(screen);

        if booking {
            for area in scene.areas().rev() {
                if area.is_layout {
                    continue;
                }
                for grid in area.grids.iter().rev() {
                    if let Some(seat) = grid.seat_at(&world) {
                        return PointerTarget::Seat {
                            area: area.id.clone(),
                            seat,
                        };
                    }
                }
            }
            return PointerTarget::Background;
        }

        if let Some(icon) = scene.icons().iter().rev().find(|i| i.hit(&world)) {
            return PointerTarget::Entity(EntityRef::Icon(icon.id.clone()));
        }
        for area in scene.areas().rev() {
            if let Some(text) = area.texts.iter().rev().find(|t| t.hit(&world)) {
                return PointerTarget::Entity(EntityRef::Text {
                    area: area.id.clone(),
                    text: text.id,
                });
            }
            if let Some(shape) = area.shapes.iter().rev().find(|s| s.hit(&world)) {
                return PointerTarget::Entity(EntityRef::Shape {
                    area: area.id.clone(),
                    shape: shape.id,
                });
            }
            if let Some(grid) = area.grids.iter().rev().find(|g| g.hit(&world)) {
                return PointerTarget::Entity(EntityRef::Grid {
                    area: area.id.clone(),
                    grid: grid.id,
                });
            }
        }
        match index.area_at(scene, &world) {
            Some(id) => PointerTarget::Entity(EntityRef::Area(id.clone())),
            None => PointerTarget::Background,
        }
    }

    /// Register a pointer. A second pointer turns any gesture into a pinch.
    /// Returns `true` when this pointer is the only one down.
    pub fn pointer_down(&mut self, id: u32, screen: Point) -> bool {
        self.pointers.insert(id, screen);
        if self.pointers.len() == 2 {
            let distance = self.pinch_distance();
            self.gesture = Gesture::Pinching { distance };
        }
        self.pointers.len() == 1
    }

    pub fn begin_pan(&mut self, screen: Point) {
        if self.pointers.len() <= 1 {
            self.gesture = Gesture::Panning { last_screen: screen };
        }
    }

    pub fn begin_drag(&mut self, entity: EntityRef, screen: Point) {
        if self.pointers.len() <= 1 {
            self.gesture = Gesture::Dragging(DragSession::begin(entity, screen));
        }
    }

    pub fn begin_resize(&mut self, entity: EntityRef, screen: Point) {
        if self.pointers.len() <= 1 {
            self.gesture = Gesture::Resizing(DragSession::begin(entity, screen));
        }
    }

    /// Cancel the current gesture without releasing pointers.
    pub fn cancel(&mut self) -> Gesture {
        std::mem::replace(&mut self.gesture, Gesture::Idle)
    }

    pub fn pointer_move(&mut self, id: u32, screen: Point, zoom: f64) -> Option<Motion> {
        let slot = self.pointers.get_mut(&id)?;
        *slot = screen;
        if let Gesture::Pinching { distance: previous } = self.gesture {
            let distance = self.pinch_distance();
            self.gesture = Gesture::Pinching { distance };
            return Some(Motion::Pinch {
                previous,
                distance,
                midpoint: self.pinch_midpoint(),
            });
        }
        match &mut self.gesture {
            Gesture::Idle => None,
            Gesture::Panning { last_screen } => {
                let motion = Motion::Pan {
                    dx: screen.x - last_screen.x,
                    dy: screen.y - last_screen.y,
                };
                *last_screen = screen;
                Some(motion)
            }
            Gesture::Dragging(drag) => {
                let delta = drag.update(screen, zoom);
                Some(Motion::Drag {
                    entity: drag.entity().clone(),
                    delta,
                })
            }
            Gesture::Resizing(drag) => {
                let delta = drag.update(screen, zoom);
                Some(Motion::Resize {
                    entity: drag.entity().clone(),
                    delta,
                })
            }
            Gesture::Pinching { .. } => None,
        }
    }

    /// Release a pointer. Returns the gesture that ended, if any. Lifting one
    /// finger of a pinch ends the pinch without resuming a pan.
    pub fn pointer_up(&mut self, id: u32) -> Option<Gesture> {
        self.pointers.remove(&id)?;
        match self.gesture {
            Gesture::Idle => None,
            Gesture::Pinching { .. } if self.pointers.len() >= 2 => {
                self.gesture = Gesture::Pinching {
                    distance: self.pinch_distance(),
                };
                None
            }
            _ => Some(self.cancel()),
        }
    }

    fn first_two(&self) -> Option<(Point, Point)> {
        let mut it = self.pointers.values();
        Some((*it.next()?, *it.next()?))
    }

    fn pinch_distance(&self) -> f64 {
        self.first_two().map_or(0.0, |(a, b)| a.distance_to(&b))
    }

    fn pinch_midpoint(&self) -> Point {
        self.first_two()
            .map_or_else(Point::default, |(a, b)| Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_core::IconKind;

    fn venue() -> (Scene, AreaId) {
        let (scene, area) = Scene::new()
            .add_area(vec![
                Point::new(0.0, 0.0),
                Point::new(400.0, 0.0),
                Point::new(400.0, 400.0),
                Point::new(0.0, 400.0),
            ])
            .unwrap();
        let scene = scene.commit_area_name(&area, "Hall", 20.0).unwrap();
        let (scene, _) = scene.add_grid(&area, 2, 2).unwrap();
        (scene, area)
    }

    #[test]
    fn test_resolve_order() {
        let (scene, area) = venue();
        let (scene, icon) = scene.add_icon(IconKind::Gate, Point::new(10.0, 10.0));
        let index = AreaIndex::build(&scene);
        let vp = Viewport::new(800.0, 600.0);
        let grid = scene.area(&area).unwrap().grids[0].clone();
        let on_grid = grid.world_bbox().center();

        assert_eq!(
            InputRouter::resolve_target(&scene, &index, &vp, Point::new(15.0, 15.0), false),
            PointerTarget::Entity(EntityRef::Icon(icon))
        );
        assert_eq!(
            InputRouter::resolve_target(&scene, &index, &vp, on_grid, false),
            PointerTarget::Entity(EntityRef::Grid { area: area.clone(), grid: grid.id })
        );
        assert_eq!(
            InputRouter::resolve_target(&scene, &index, &vp, Point::new(390.0, 390.0), false),
            PointerTarget::Entity(EntityRef::Area(area.clone()))
        );
        assert_eq!(
            InputRouter::resolve_target(&scene, &index, &vp, Point::new(700.0, 500.0), false),
            PointerTarget::Background
        );
    }

    #[test]
    fn test_booking_targets_only_seats() {
        let (scene, area) = venue();
        let index = AreaIndex::build(&scene);
        let vp = Viewport::new(800.0, 600.0);
        let grid = &scene.area(&area).unwrap().grids[0];
        // Center of the first seat square.
        let first_seat = grid.transform().apply(&Point::new(10.0, 10.0));

        match InputRouter::resolve_target(&scene, &index, &vp, first_seat, true) {
            PointerTarget::Seat { area: hit_area, seat } => {
                assert_eq!(hit_area, area);
                assert_eq!(seat.number, 1);
            }
            other => panic!("expected a seat, got {other:?}"),
        }
        assert_eq!(
            InputRouter::resolve_target(&scene, &index, &vp, Point::new(390.0, 390.0), true),
            PointerTarget::Background
        );
    }

    #[test]
    fn test_pan_then_pinch_is_exclusive() {
        let mut router = InputRouter::new();
        assert!(router.pointer_down(1, Point::new(0.0, 0.0)));
        router.begin_pan(Point::new(0.0, 0.0));
        assert_eq!(
            router.pointer_move(1, Point::new(5.0, 0.0), 1.0),
            Some(Motion::Pan { dx: 5.0, dy: 0.0 })
        );

        assert!(!router.pointer_down(2, Point::new(105.0, 0.0)));
        assert!(matches!(router.gesture(), Gesture::Pinching { .. }));
        // A drag cannot start while two pointers are down.
        router.begin_drag(EntityRef::Area(AreaId::from("a")), Point::new(5.0, 0.0));
        assert!(matches!(router.gesture(), Gesture::Pinching { .. }));

        match router.pointer_move(2, Point::new(205.0, 0.0), 1.0) {
            Some(Motion::Pinch { previous, distance, midpoint }) => {
                assert_eq!(previous, 100.0);
                assert_eq!(distance, 200.0);
                assert_eq!(midpoint, Point::new(105.0, 0.0));
            }
            other => panic!("expected pinch, got {other:?}"),
        }

        assert!(matches!(router.pointer_up(2), Some(Gesture::Pinching { .. })));
        assert_eq!(router.pointer_move(1, Point::new(50.0, 0.0), 1.0), None);
        assert_eq!(router.pointer_up(1), None);
        assert_eq!(router.active_pointers(), 0);
    }

    #[test]
    fn test_drag_motion_is_in_world_units() {
        let entity = EntityRef::Area(AreaId::from("a"));
        let mut router = InputRouter::new();
        router.pointer_down(7, Point::new(10.0, 10.0));
        router.begin_drag(entity.clone(), Point::new(10.0, 10.0));
        assert_eq!(
            router.pointer_move(7, Point::new(30.0, 10.0), 0.5),
            Some(Motion::Drag { entity, delta: Point::new(40.0, 0.0) })
        );
        assert!(matches!(router.pointer_up(7), Some(Gesture::Dragging(_))));
    }

    #[test]
    fn test_resize_motion_is_incremental() {
        let entity = EntityRef::Shape { area: AreaId::from("a"), shape: 1 };
        let mut router = InputRouter::new();
        router.pointer_down(3, Point::new(0.0, 0.0));
        router.begin_resize(entity.clone(), Point::new(0.0, 0.0));
        assert_eq!(
            router.pointer_move(3, Point::new(10.0, 4.0), 2.0),
            Some(Motion::Resize { entity: entity.clone(), delta: Point::new(5.0, 2.0) })
        );
        assert_eq!(
            router.pointer_move(3, Point::new(12.0, 4.0), 2.0),
            Some(Motion::Resize { entity, delta: Point::new(1.0, 0.0) })
        );
        assert!(matches!(router.pointer_up(3), Some(Gesture::Resizing(_))));
    }
}
