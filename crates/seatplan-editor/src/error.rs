use thiserror::Error;

use seatplan_core::SceneError;
use seatplan_io::{LoadError, SaveError};

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error("Nothing is selected")]
    NothingSelected,

    #[error("Only seat grids can be copied")]
    NotAGrid,

    #[error("Clipboard is empty")]
    ClipboardEmpty,

    #[error("Seats can only be picked in booking mode")]
    NotInBookingMode,

    #[error("No area outline is being drawn")]
    NotDrawing,

    #[error("No drawn area is waiting for a name")]
    NoPendingArea,
}

impl EditorError {
    /// Whether the error is a user-facing validation message.
    pub fn is_validation(&self) -> bool {
        matches!(self, EditorError::Scene(e) if e.is_validation())
    }
}
