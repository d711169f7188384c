//! # Seatplan Renderer
//!
//! Viewport math (pan, zoom, fit-to-content) and renderer-neutral frame data
//! for the venue canvas. A canvas, SVG or native renderer consumes
//! [`RenderFrame`] without recomputing any transform.

pub mod viewport;
pub mod render_data;

pub use viewport::{DetailLevel, Viewport, ViewportSettings};
pub use render_data::{FrameOptions, RenderFrame};
