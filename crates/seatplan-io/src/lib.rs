//! # Seatplan I/O
//!
//! The persisted venue document (versioned JSON), conversion to and from
//! [`seatplan_core::Scene`], load-then-fit, and the loader/uploader seams
//! with a directory-backed store.

pub mod document;
pub mod codec;
pub mod store;
pub mod error;

pub use codec::{deserialize, load_and_fit, serialize};
pub use document::{VenueDocument, CURRENT_VERSION};
pub use error::{LoadError, SaveError};
pub use store::{FileVenueStore, VenueLoader, VenueUploader};
