//! # Seatplan Editor
//!
//! Interactive editing on top of [`seatplan_core::Scene`]: the selection
//! state machine, pointer and keyboard routing, drag and pinch gestures,
//! coalesced grid resizes, grid copy/paste, area drawing and the seat
//! booking ledger. [`EditorSession`] owns all of it and hands out
//! [`seatplan_renderer::RenderFrame`]s for display.

pub mod settings;
pub mod selection;
pub mod input;
pub mod drag;
pub mod coalesce;
pub mod ledger;
pub mod session;
pub mod error;

pub use error::EditorError;
pub use ledger::{SeatSelection, SeatSelectionLedger};
pub use selection::{Mode, Selection, SelectionController};
pub use session::{DrawStatus, EditorEvent, EditorSession, Key, Modifiers};
pub use settings::EditorSettings;
