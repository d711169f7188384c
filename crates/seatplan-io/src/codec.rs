use seatplan_core::Scene;
use seatplan_renderer::{Viewport, ViewportSettings};

use crate::document::VenueDocument;
use crate::error::{LoadError, SaveError};

/// Encode a scene as a pretty-printed, current-version document.
pub fn serialize(scene: &Scene) -> Result<String, SaveError> {
    let doc = VenueDocument::from_scene(scene);
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Decode a document of any supported version.
pub fn deserialize(json: &str) -> Result<Scene, LoadError> {
    let doc: VenueDocument = serde_json::from_str(json)?;
    let version = doc.effective_version();
    let scene = doc.into_scene()?;
    log::info!(
        "Loaded venue document v{}: {} areas, {} icons, {} seats",
        version,
        scene.area_count(),
        scene.icons().len(),
        scene.total_seats()
    );
    Ok(scene)
}

/// Decode a document and fit `viewport` to the content.
///
/// Audit findings are logged, not fatal. A scene without areas keeps the
/// viewport as it is.
pub fn load_and_fit(
    json: &str,
    viewport: &mut Viewport,
    settings: &ViewportSettings,
) -> Result<Scene, LoadError> {
    let scene = deserialize(json)?;
    for violation in seatplan_audit::check_scene(&scene) {
        log::warn!("{}", violation);
    }
    match scene.content_bbox() {
        Some(bbox) => viewport.fit_with_settings(&bbox, settings),
        None => log::debug!("Empty scene, skipping fit"),
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_core::{AreaId, Point};

    #[test]
    fn test_empty_scene_skips_fit() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom = 2.5;
        let scene = load_and_fit("{}", &mut vp, &ViewportSettings::default()).unwrap();
        assert!(scene.is_empty());
        assert_eq!(vp.zoom, 2.5);
    }

    #[test]
    fn test_load_fits_ring_points() {
        let json = r#"{"version": 1, "polygons": [
            {"id": "a", "points": [[0,0],[1000,0],[1000,500],[0,500]], "name": "Hall", "price": 10}
        ]}"#;
        let mut vp = Viewport::new(800.0, 600.0);
        let scene = load_and_fit(json, &mut vp, &ViewportSettings::default()).unwrap();
        assert!(scene.area(&AreaId::from("a")).is_some());
        assert!((vp.zoom - 800.0 / 1200.0).abs() < 1e-10);
        let center = vp.world_to_screen(Point::new(500.0, 250.0));
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_document() {
        let mut vp = Viewport::new(800.0, 600.0);
        let err = load_and_fit("{\"polygons\": 3}", &mut vp, &ViewportSettings::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
        assert!(matches!(deserialize("not json"), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_oversize_grid_is_rejected() {
        let json = r#"{"version": 1, "polygons": [{
            "id": "a", "points": [[0,0],[10,0],[10,10]], "price": 5,
            "grids": [{"id": 1, "size": {"rows": 70000, "cols": 70000}, "position": {"x": 0, "y": 0}}]
        }]}"#;
        let err = deserialize(json).unwrap_err();
        assert!(matches!(err, LoadError::SeatLimit { ref area, .. } if area == "a"));
    }

    #[test]
    fn test_seat_start_past_limit_is_rejected() {
        let json = r#"{"version": 1, "polygons": [{
            "id": "a", "points": [[0,0],[10,0],[10,10]], "price": 5,
            "grids": [{"id": 1, "size": {"rows": 1, "cols": 1}, "position": {"x": 0, "y": 0},
                       "seatStartIndex": 4294967295}]
        }]}"#;
        let mut vp = Viewport::new(800.0, 600.0);
        let err = load_and_fit(json, &mut vp, &ViewportSettings::default()).unwrap_err();
        assert!(matches!(err, LoadError::SeatLimit { .. }));
        assert_eq!(vp.zoom, 1.0);
    }

    #[test]
    fn test_serialize_is_versioned() {
        let json = serialize(&Scene::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["polygons"], serde_json::json!([]));
    }
}
