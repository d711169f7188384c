use std::collections::HashMap;

use seatplan_core::geometry;
use seatplan_core::indexer::{self, FIRST_SEAT};
use seatplan_core::{Area, Scene};

use crate::violation::{Violation, ViolationKind};

/// Run every check over `scene`. Findings are ordered by area, then by check.
pub fn check_scene(scene: &Scene) -> Vec<Violation> {
    let mut out = Vec::new();
    let mut names: HashMap<&str, usize> = HashMap::new();
    for area in scene.areas() {
        if let Some(name) = area.name.as_deref() {
            *names.entry(name.trim()).or_default() += 1;
        }
    }

    for area in scene.areas() {
        if let Some(name) = area.name.as_deref() {
            if names.get(name.trim()).copied().unwrap_or(0) > 1 {
                out.push(Violation::error(
                    ViolationKind::DuplicateName,
                    &area.id,
                    format!("name '{}' is used by more than one area", name.trim()),
                ));
            }
        }
        check_ring(area, &mut out);
        check_pricing(area, &mut out);
        check_numbering(area, &mut out);
        check_categories(area, &mut out);
        check_scales(area, &mut out);
    }

    let errors = out.iter().filter(|v| v.is_error()).count();
    log::debug!(
        "Audited {} areas: {} errors, {} warnings",
        scene.area_count(),
        errors,
        out.len() - errors
    );
    out
}

fn check_ring(area: &Area, out: &mut Vec<Violation>) {
    let distinct = geometry::distinct_vertex_count(&area.points);
    if distinct < 3 {
        out.push(Violation::error(
            ViolationKind::TooFewPoints,
            &area.id,
            format!("ring has {distinct} distinct points, at least 3 are needed"),
        ));
    } else if area.centroid().is_err() {
        out.push(Violation::warning(
            ViolationKind::DegenerateRing,
            &area.id,
            "ring encloses no area; its label cannot be placed",
        ));
    }
}

fn check_pricing(area: &Area, out: &mut Vec<Violation>) {
    if area.is_layout {
        if !area.grids.is_empty() {
            out.push(Violation::error(
                ViolationKind::SeatedLayout,
                &area.id,
                format!("layout region holds {} grids", area.grids.len()),
            ));
        }
    } else if !(area.price > 0.0) {
        out.push(Violation::error(
            ViolationKind::NonPositivePrice,
            &area.id,
            format!("sellable area has price {}", area.price),
        ));
    }
}

fn check_numbering(area: &Area, out: &mut Vec<Violation>) {
    for (a, b) in indexer::overlapping_pairs(&area.grids) {
        out.push(
            Violation::error(
                ViolationKind::SeatOverlap,
                &area.id,
                format!("seat numbers of grids {a} and {b} overlap"),
            )
            .on_grid(b),
        );
    }

    let mut ranges: Vec<_> = area.grids.iter().map(|g| (g.seat_range(), g.id)).collect();
    ranges.sort_by_key(|(range, _)| range.start);
    let mut expected = FIRST_SEAT;
    for (range, id) in ranges {
        if range.start > expected {
            out.push(
                Violation::warning(
                    ViolationKind::SeatGap,
                    &area.id,
                    format!("seats {}..{} are unassigned", expected, range.start - 1),
                )
                .on_grid(id),
            );
        }
        expected = expected.max(range.end);
    }
}

fn check_categories(area: &Area, out: &mut Vec<Violation>) {
    for grid in &area.grids {
        if let Some(category) = &grid.category {
            if let Err(err) = category.validate() {
                out.push(
                    Violation::error(ViolationKind::EmptyCategory, &area.id, err.to_string())
                        .on_grid(grid.id),
                );
            }
        }
    }
}

fn valid_scale(scale: f64) -> bool {
    scale > 0.0 && scale.is_finite()
}

fn check_scales(area: &Area, out: &mut Vec<Violation>) {
    for grid in area.grids.iter().filter(|g| !valid_scale(g.scale)) {
        out.push(
            Violation::error(
                ViolationKind::InvalidScale,
                &area.id,
                format!("grid scale {} must be positive and finite", grid.scale),
            )
            .on_grid(grid.id),
        );
    }
    for text in &area.texts {
        if let Some(scale) = text.scale.filter(|&s| !valid_scale(s)) {
            out.push(Violation::error(
                ViolationKind::InvalidScale,
                &area.id,
                format!("text {} scale {} must be positive and finite", text.id, scale),
            ));
        }
    }
}
