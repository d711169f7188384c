use std::path::Path;

use anyhow::{Context, Result};

use seatplan_core::{AreaId, Scene};
use seatplan_editor::EditorSettings;
use seatplan_io::FileVenueStore;
use seatplan_renderer::Viewport;

pub fn load_document(path: &Path) -> Result<Scene> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading venue document {}", path.display()))?;
    seatplan_io::deserialize(&json).with_context(|| format!("decoding {}", path.display()))
}

pub fn inspect(scene: &Scene) -> String {
    let mut out = format!(
        "{} areas, {} seats, {} icons\n",
        scene.area_count(),
        scene.total_seats(),
        scene.icons().len()
    );
    for area in scene.areas() {
        let kind = if area.is_layout {
            "layout".to_string()
        } else {
            format!("price {:.2}", area.price)
        };
        out.push_str(&format!(
            "area {} \"{}\" ({}): {} seats in {} grids, {} texts, {} shapes\n",
            area.id,
            area.display_name(),
            kind,
            area.seat_count(),
            area.grids.len(),
            area.texts.len(),
            area.shapes.len()
        ));
        for grid in &area.grids {
            let range = grid.seat_range();
            let category = grid
                .category
                .as_ref()
                .map(|c| format!(" [{}]", c.acronym))
                .unwrap_or_default();
            out.push_str(&format!(
                "  grid {}: {}x{} seats {}..={}{}\n",
                grid.id,
                grid.size.rows,
                grid.size.cols,
                range.start,
                range.end.saturating_sub(1),
                category
            ));
        }
    }
    for icon in scene.icons() {
        out.push_str(&format!(
            "icon {} {:?} at ({:.1}, {:.1})\n",
            icon.id, icon.kind, icon.position.x, icon.position.y
        ));
    }
    out
}

pub struct CheckReport {
    pub text: String,
    pub errors: usize,
    pub warnings: usize,
}

pub fn check(scene: &Scene) -> CheckReport {
    let violations = seatplan_audit::check_scene(scene);
    let errors = violations.iter().filter(|v| v.is_error()).count();
    let warnings = violations.len() - errors;
    let mut text: String = violations.iter().map(|v| format!("{v}\n")).collect();
    text.push_str(&format!("{errors} errors, {warnings} warnings\n"));
    CheckReport {
        text,
        errors,
        warnings,
    }
}

/// Renumber every area of `input` and write the result atomically to `output`.
/// Returns the total seat count.
pub fn renumber(input: &Path, output: &Path) -> Result<u32> {
    let scene = load_document(input)?;
    let ids: Vec<AreaId> = scene.areas().map(|a| a.id.clone()).collect();
    let scene = ids.iter().try_fold(scene, |scene, id| {
        scene
            .renumber_area(id)
            .with_context(|| format!("renumbering area {id}"))
    })?;
    let json = seatplan_io::serialize(&scene).context("encoding venue document")?;
    FileVenueStore::write_atomic(output, &json)
        .with_context(|| format!("writing {}", output.display()))?;
    log::info!("Wrote renumbered venue to {}", output.display());
    Ok(scene.total_seats())
}

pub fn fit(scene: &Scene, width: f64, height: f64, settings: &EditorSettings) -> Viewport {
    let mut viewport = Viewport::with_settings(width, height, &settings.viewport);
    match scene.content_bbox() {
        Some(bbox) => viewport.fit_with_settings(&bbox, &settings.viewport),
        None => log::warn!("Venue has no areas; keeping the default view"),
    }
    viewport
}
