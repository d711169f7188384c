use serde::{Deserialize, Serialize};

use seatplan_core::{BBox, Point};

/// Tunables for zooming and fitting. Missing fields fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied to the content box when fitting (1.2 = 20% margin).
    pub fit_padding: f64,
    /// Canvases narrower than this get the extra vertical offset on fit.
    pub small_screen_width: f64,
    /// Screen pixels to push content down on small screens, clearing fixed chrome.
    pub small_screen_offset: f64,
    /// Zoom factor per wheel notch.
    pub wheel_step: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            fit_padding: 1.2,
            small_screen_width: 768.0,
            small_screen_offset: 64.0,
            wheel_step: 1.1,
        }
    }
}

/// Pan/zoom state of the drawing surface.
///
/// `world = screen / zoom - pan`, applied canvas-wide on top of any entity
/// transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    /// Pan in world units.
    pub pan: Point,
    /// Canvas width in pixels.
    pub canvas_width: f64,
    /// Canvas height in pixels.
    pub canvas_height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self::with_settings(canvas_width, canvas_height, &ViewportSettings::default())
    }

    pub fn with_settings(canvas_width: f64, canvas_height: f64, settings: &ViewportSettings) -> Self {
        Self {
            zoom: 1.0,
            pan: Point::new(0.0, 0.0),
            canvas_width,
            canvas_height,
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
        }
    }

    pub fn resize(&mut self, canvas_width: f64, canvas_height: f64) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
    }

    /// Multiply the zoom, clamped to `[min_zoom, max_zoom]`.
    pub fn zoom_by(&mut self, factor: f64) -> f64 {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        }
        self.zoom
    }

    /// Zoom while keeping the world point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) -> f64 {
        let before = self.screen_to_world(screen);
        self.zoom_by(factor);
        let after = self.screen_to_world(screen);
        self.pan.x += after.x - before.x;
        self.pan.y += after.y - before.y;
        self.zoom
    }

    /// Two-finger pinch: the distance ratio drives the zoom around the midpoint.
    pub fn pinch(&mut self, previous_distance: f64, distance: f64, midpoint: Point) -> f64 {
        if previous_distance <= f64::EPSILON {
            return self.zoom;
        }
        self.zoom_at(midpoint, distance / previous_distance)
    }

    /// Translate the pan by a world-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Translate the pan by a screen-space drag so content follows the pointer.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) {
        self.pan_by(dx / self.zoom, dy / self.zoom);
    }

    /// Fit `content` into the canvas: the zoom never exceeds 1 and the box
    /// center lands on the canvas center. Depends only on its inputs, so
    /// repeated calls are idempotent.
    pub fn fit_to_content(&mut self, content: &BBox, padding: f64) {
        let padding = if padding.is_finite() && padding > 0.0 {
            padding
        } else {
            1.0
        };
        let zoom_x = self.canvas_width / (content.width() * padding);
        let zoom_y = self.canvas_height / (content.height() * padding);
        let zoom = zoom_x.min(zoom_y).min(1.0);
        if !(zoom.is_finite() && zoom > 0.0) {
            log::warn!("Skipping fit: degenerate canvas {}x{}", self.canvas_width, self.canvas_height);
            return;
        }
        self.zoom = zoom;

        let center = content.center();
        self.pan = Point::new(
            self.canvas_width / 2.0 / zoom - center.x,
            self.canvas_height / 2.0 / zoom - center.y,
        );
    }

    /// Fit with configured padding, adding the small-screen vertical offset.
    pub fn fit_with_settings(&mut self, content: &BBox, settings: &ViewportSettings) {
        self.fit_to_content(content, settings.fit_padding);
        if self.is_small_screen(settings) {
            self.pan.y += settings.small_screen_offset / self.zoom;
        }
        log::debug!(
            "Fitted viewport: zoom={:.3} pan=({:.1}, {:.1})",
            self.zoom,
            self.pan.x,
            self.pan.y
        );
    }

    pub fn is_small_screen(&self, settings: &ViewportSettings) -> bool {
        self.canvas_width < settings.small_screen_width
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(screen.x / self.zoom - self.pan.x, screen.y / self.zoom - self.pan.y)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new((world.x + self.pan.x) * self.zoom, (world.y + self.pan.y) * self.zoom)
    }

    /// A screen-space drag delta expressed in world units.
    pub fn screen_delta_to_world(&self, dx: f64, dy: f64) -> Point {
        Point::new(dx / self.zoom, dy / self.zoom)
    }

    /// The visible region in world coordinates.
    pub fn visible_bounds(&self) -> BBox {
        BBox::new(
            self.screen_to_world(Point::new(0.0, 0.0)),
            self.screen_to_world(Point::new(self.canvas_width, self.canvas_height)),
        )
    }

    /// How much detail to draw at the current zoom.
    pub fn detail_level(&self) -> DetailLevel {
        if self.zoom >= 0.6 {
            DetailLevel::Seats // Seat squares with number labels
        } else if self.zoom >= 0.25 {
            DetailLevel::Blocks // Seat squares, labels suppressed
        } else {
            DetailLevel::Outline // Area rings and names only
        }
    }
}

/// Level of detail for the venue canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailLevel {
    Seats,
    Blocks,
    Outline,
}
