//! # Seatplan Audit
//!
//! Whole-scene consistency checks. Scene mutations already reject invalid
//! edits; the audit catches what can still arrive from stored documents
//! (hand-edited files, older versions) and reports it without refusing to load.

pub mod violation;
pub mod check;

pub use check::check_scene;
pub use violation::{Severity, Violation, ViolationKind};
