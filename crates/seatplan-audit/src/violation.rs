use std::fmt;

use serde::{Deserialize, Serialize};

use seatplan_core::{AreaId, GridId};

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    DuplicateName,
    NonPositivePrice,
    SeatedLayout,
    SeatOverlap,
    SeatGap,
    TooFewPoints,
    DegenerateRing,
    EmptyCategory,
    /// A grid or text scale that is zero, negative or not finite.
    InvalidScale,
}

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A single audit finding with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub area: AreaId,
    pub grid: Option<GridId>,
    pub message: String,
}

impl Violation {
    pub fn error(kind: ViolationKind, area: &AreaId, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            area: area.clone(),
            grid: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: ViolationKind, area: &AreaId, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, area, message)
        }
    }

    pub fn on_grid(mut self, grid: GridId) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match self.grid {
            Some(grid) => write!(f, "{level}: area {} grid {grid}: {}", self.area, self.message),
            None => write!(f, "{level}: area {}: {}", self.area, self.message),
        }
    }
}
