use std::io;

use thiserror::Error;

/// Failure to obtain a scene from a stored document. The caller keeps (or
/// falls back to) an empty scene.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to fetch venue document '{location}': {reason}")]
    Fetch { location: String, reason: String },

    #[error("Malformed venue document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported document version {found}, this build reads up to {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Area {area} numbers seats past {limit}")]
    SeatLimit { area: String, limit: u32 },
}

/// Failure to persist a scene. The in-memory scene is left as it was.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to encode venue document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Upload rejected: {0}")]
    Upload(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
