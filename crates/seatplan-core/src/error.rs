use thiserror::Error;

use crate::entities::{AreaId, GridId, IconId, ShapeId, TextId};

/// Errors raised by pure geometry routines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Polygon with {vertices} vertices has zero area")]
    Degenerate { vertices: usize },
}

/// Errors raised by scene mutations. A failed mutation leaves the scene unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("An area needs at least 3 distinct points, got {0}")]
    TooFewPoints(usize),

    #[error("Area name must not be empty")]
    EmptyName,

    #[error("Area name '{0}' is already in use")]
    DuplicateName(String),

    #[error("Price must be greater than zero, got {0}")]
    InvalidPrice(f64),

    #[error("Category {0} must not be empty")]
    EmptyCategoryField(&'static str),

    #[error("Area {0} is a layout region and cannot hold seats")]
    LayoutNotSeatable(AreaId),

    #[error("Area {area} would hold seat numbers past {limit}")]
    SeatLimit { area: AreaId, limit: u32 },

    #[error("Scale must be greater than zero, got {0}")]
    InvalidScale(f64),

    #[error("Area {0} not found")]
    AreaNotFound(AreaId),

    #[error("Grid {grid} not found in area {area}")]
    GridNotFound { area: AreaId, grid: GridId },

    #[error("Text {text} not found in area {area}")]
    TextNotFound { area: AreaId, text: TextId },

    #[error("Shape {shape} not found in area {area}")]
    ShapeNotFound { area: AreaId, shape: ShapeId },

    #[error("Icon {0} not found")]
    IconNotFound(IconId),
}

impl SceneError {
    /// Whether this error is a user-facing validation failure rather than a
    /// stale reference.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SceneError::TooFewPoints(_)
                | SceneError::EmptyName
                | SceneError::DuplicateName(_)
                | SceneError::InvalidPrice(_)
                | SceneError::EmptyCategoryField(_)
                | SceneError::LayoutNotSeatable(_)
                | SceneError::SeatLimit { .. }
                | SceneError::InvalidScale(_)
        )
    }
}
