use std::time::Duration;

use serde::{Deserialize, Serialize};

use seatplan_core::Point;
use seatplan_renderer::ViewportSettings;

/// Editor tunables. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub viewport: ViewportSettings,
    /// A second click on the same entity within this window is a quick click.
    pub quick_click_ms: u64,
    /// Keyboard resizes are applied at most once per this interval.
    pub resize_debounce_ms: u64,
    /// World offset of a pasted grid from its source.
    pub paste_offset: Point,
    /// Screen distance from the first vertex that closes a drawn ring.
    pub close_ring_radius: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            viewport: ViewportSettings::default(),
            quick_click_ms: 300,
            resize_debounce_ms: 150,
            paste_offset: Point::new(20.0, 20.0),
            close_ring_radius: 10.0,
        }
    }
}

impl EditorSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn quick_click(&self) -> Duration {
        Duration::from_millis(self.quick_click_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings() {
        let settings =
            EditorSettings::from_json(r#"{"quick_click_ms": 450, "viewport": {"fit_padding": 1.1}}"#)
                .unwrap();
        assert_eq!(settings.quick_click(), Duration::from_millis(450));
        assert_eq!(settings.resize_debounce(), Duration::from_millis(150));
        assert_eq!(settings.viewport.fit_padding, 1.1);
        assert_eq!(settings.viewport.max_zoom, 5.0);
        assert_eq!(settings.paste_offset, Point::new(20.0, 20.0));
    }
}
