//! Seat numbering across the grids of one area.
//!
//! Seat identity is `(area, seat number)`. Within an area the grids own
//! disjoint ranges `[seat_start_index, seat_start_index + rows * cols)`.
//! After any structural change (grid added, removed or resized) the ranges
//! are reassigned contiguously from [`FIRST_SEAT`] in list order. Cosmetic
//! edits (rotation, skew, scale, color, position, label visibility) never
//! renumber.

use crate::entities::{Grid, GridId};

/// Number of the first seat in an area.
pub const FIRST_SEAT: u32 = 1;

/// Highest seat number an area may hold.
pub const MAX_SEAT_NUMBER: u32 = 1_000_000;

/// Reassign `seat_start_index` for every grid, in list order.
pub fn renumber(grids: &[Grid]) -> Vec<Grid> {
    let mut out = grids.to_vec();
    renumber_in_place(&mut out);
    out
}

pub fn renumber_in_place(grids: &mut [Grid]) {
    let mut next = FIRST_SEAT;
    for grid in grids.iter_mut() {
        grid.seat_start_index = next;
        next = next.saturating_add(grid.seat_count());
    }
    log::debug!(
        "Renumbered {} grids, {} seats",
        grids.len(),
        next - FIRST_SEAT
    );
}

/// Next free grid id: `max(existing ids, 0) + 1`.
pub fn next_grid_id(grids: &[Grid]) -> GridId {
    grids.iter().map(|g| g.id).max().unwrap_or(0) + 1
}

/// Start index for a grid appended without renumbering: one past the highest
/// seat currently in use. Gaps left by earlier deletions are not reused.
pub fn append_start_index(grids: &[Grid]) -> u32 {
    grids
        .iter()
        .map(Grid::last_seat)
        .max()
        .map_or(FIRST_SEAT, |last| last + 1)
}

/// Total number of seats across `grids`.
pub fn total_seats(grids: &[Grid]) -> u32 {
    grids
        .iter()
        .fold(0u32, |total, grid| total.saturating_add(grid.seat_count()))
}

/// Whether every seat number stays within [`MAX_SEAT_NUMBER`], both as the
/// grids are numbered now and after a renumber.
pub fn within_seat_limit(grids: &[Grid]) -> bool {
    let limit = u64::from(MAX_SEAT_NUMBER);
    let count = |g: &Grid| u64::from(g.size.rows) * u64::from(g.size.cols);
    let total: u64 = grids.iter().map(count).sum();
    total <= limit
        && grids
            .iter()
            .all(|g| u64::from(g.seat_start_index) + count(g) <= limit + 1)
}

/// Whether the grids' ranges tile `[FIRST_SEAT, total]` in list order.
pub fn is_contiguous(grids: &[Grid]) -> bool {
    let mut next = FIRST_SEAT;
    for grid in grids {
        if grid.seat_start_index != next {
            return false;
        }
        next = next.saturating_add(grid.seat_count());
    }
    true
}

/// Pairs of grids whose seat ranges overlap.
pub fn overlapping_pairs(grids: &[Grid]) -> Vec<(GridId, GridId)> {
    let mut pairs = Vec::new();
    for (i, a) in grids.iter().enumerate() {
        for b in &grids[i + 1..] {
            let ra = a.seat_range();
            let rb = b.seat_range();
            if ra.start < rb.end && rb.start < ra.end {
                pairs.push((a.id, b.id));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::GridSize;
    use crate::geometry::Point;

    fn grid(id: GridId, rows: u32, cols: u32, start: u32) -> Grid {
        let mut g = Grid::new(id, GridSize::new(rows, cols), Point::new(0.0, 0.0));
        g.seat_start_index = start;
        g
    }

    #[test]
    fn test_single_grid_starts_at_one() {
        let out = renumber(&[grid(1, 5, 5, 40)]);
        assert_eq!(out[0].seat_start_index, 1);
        assert_eq!(out[0].last_seat(), 25);
    }

    #[test]
    fn test_renumber_closes_gaps_in_list_order() {
        let grids = vec![grid(2, 3, 3, 1), grid(1, 2, 2, 30), grid(3, 1, 4, 12)];
        let out = renumber(&grids);
        assert_eq!(out[0].seat_start_index, 1);
        assert_eq!(out[1].seat_start_index, 10);
        assert_eq!(out[2].seat_start_index, 14);
        assert!(is_contiguous(&out));
        assert!(!is_contiguous(&grids));
    }

    #[test]
    fn test_next_grid_id() {
        assert_eq!(next_grid_id(&[]), 1);
        assert_eq!(next_grid_id(&[grid(4, 1, 1, 1), grid(2, 1, 1, 2)]), 5);
    }

    #[test]
    fn test_append_start_index_skips_gaps() {
        assert_eq!(append_start_index(&[]), 1);
        assert_eq!(append_start_index(&[grid(1, 5, 5, 1)]), 26);
        // A gap before the second grid is not reused.
        assert_eq!(append_start_index(&[grid(1, 1, 1, 1), grid(2, 2, 2, 10)]), 14);
    }

    #[test]
    fn test_seat_limit() {
        assert!(within_seat_limit(&[grid(1, 1000, 1000, 1)]));
        assert!(!within_seat_limit(&[grid(1, 1000, 1000, 2)]));
        assert!(!within_seat_limit(&[grid(1, 70_000, 70_000, 1)]));
        assert!(!within_seat_limit(&[grid(1, 1, 1, u32::MAX)]));
        assert!(!within_seat_limit(&[grid(1, 600, 1000, 1), grid(2, 600, 1000, 600_001)]));
    }

    #[test]
    fn test_seat_arithmetic_saturates() {
        let huge = grid(1, 70_000, 70_000, u32::MAX);
        assert_eq!(huge.seat_count(), u32::MAX);
        assert_eq!(huge.seat_range(), u32::MAX..u32::MAX);
        assert_eq!(huge.seat_number(69_999, 69_999), u32::MAX);
        assert_eq!(total_seats(&[huge.clone(), huge]), u32::MAX);
    }

    #[test]
    fn test_overlapping_pairs() {
        let grids = vec![grid(1, 2, 2, 1), grid(2, 2, 2, 4), grid(3, 1, 1, 8)];
        assert_eq!(overlapping_pairs(&grids), vec![(1, 2)]);
    }
}
