use seatplan_core::{EntityRef, Point};

/// Two-phase drag of one entity, driven by screen-space pointer positions.
///
/// `update` returns the world-space delta since the previous update, so the
/// caller can apply it straight to the entity position.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    entity: EntityRef,
    start_screen: Point,
    last_screen: Point,
    moved: Point,
}

impl DragSession {
    pub fn begin(entity: EntityRef, start_screen: Point) -> Self {
        Self {
            entity,
            start_screen,
            last_screen: start_screen,
            moved: Point::new(0.0, 0.0),
        }
    }

    /// Screen deltas are divided by `zoom` to land in world units.
    pub fn update(&mut self, screen: Point, zoom: f64) -> Point {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        let delta = Point::new(
            (screen.x - self.last_screen.x) / zoom,
            (screen.y - self.last_screen.y) / zoom,
        );
        self.last_screen = screen;
        self.moved = self.moved.offset_by(delta);
        delta
    }

    /// Finish the drag, returning the entity and its total world displacement.
    pub fn end(self) -> (EntityRef, Point) {
        (self.entity, self.moved)
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn start_screen(&self) -> Point {
        self.start_screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_core::AreaId;

    #[test]
    fn test_deltas_scale_with_zoom() {
        let entity = EntityRef::Grid {
            area: AreaId::from("a"),
            grid: 1,
        };
        let mut drag = DragSession::begin(entity.clone(), Point::new(100.0, 100.0));
        let d1 = drag.update(Point::new(120.0, 90.0), 2.0);
        assert_eq!(d1, Point::new(10.0, -5.0));
        let d2 = drag.update(Point::new(120.0, 110.0), 2.0);
        assert_eq!(d2, Point::new(0.0, 10.0));

        let (ended, total) = drag.end();
        assert_eq!(ended, entity);
        assert_eq!(total, Point::new(10.0, 5.0));
    }
}
