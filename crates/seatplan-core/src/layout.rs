//! Seat lattice geometry inside a grid's local frame.
//!
//! Seats are squares of [`SEAT_SIZE`] laid out on a [`SEAT_PITCH`] lattice,
//! row-major from the grid's top-left anchor. Renderers draw these rectangles
//! and hit-testing maps local points back onto them.

use crate::geometry::{BBox, Point};

pub const SEAT_SIZE: f64 = 20.0;
pub const SEAT_GAP: f64 = 6.0;
pub const SEAT_PITCH: f64 = SEAT_SIZE + SEAT_GAP;

/// Unscaled local extent of a `rows` x `cols` grid.
pub fn grid_extent(rows: u32, cols: u32) -> (f64, f64) {
    let w = cols.max(1) as f64 * SEAT_PITCH - SEAT_GAP;
    let h = rows.max(1) as f64 * SEAT_PITCH - SEAT_GAP;
    (w, h)
}

/// Local rectangle of the seat at (`row`, `col`).
pub fn seat_rect(row: u32, col: u32) -> BBox {
    let x = col as f64 * SEAT_PITCH;
    let y = row as f64 * SEAT_PITCH;
    BBox::new(Point::new(x, y), Point::new(x + SEAT_SIZE, y + SEAT_SIZE))
}

/// The (row, col) whose seat square contains `local`. Points in the gaps
/// between seats hit nothing.
pub fn seat_at(local: &Point, rows: u32, cols: u32) -> Option<(u32, u32)> {
    if local.x < 0.0 || local.y < 0.0 || !local.x.is_finite() || !local.y.is_finite() {
        return None;
    }
    let col = (local.x / SEAT_PITCH).floor() as u32;
    let row = (local.y / SEAT_PITCH).floor() as u32;
    if row >= rows || col >= cols {
        return None;
    }
    seat_rect(row, col)
        .contains_point(local)
        .then_some((row, col))
}
