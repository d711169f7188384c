use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{LoadError, SaveError};

/// Fetches a stored venue document for an event.
pub trait VenueLoader {
    fn fetch(&self, event_id: &str, url: &str) -> Result<String, LoadError>;
}

/// Stores a new venue document for an event and returns where it lives.
pub trait VenueUploader {
    fn upload(&self, event_id: &str, document: &str) -> Result<String, SaveError>;
}

/// Directory-backed store: one `<event_id>.json` per event.
///
/// Uploads go to a temporary file in the same directory and are renamed into
/// place, so an interrupted save leaves the previous document intact.
/// Concurrent editors of one event overwrite each other (last write wins).
#[derive(Debug, Clone)]
pub struct FileVenueStore {
    root: PathBuf,
}

impl FileVenueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, event_id: &str) -> PathBuf {
        self.root.join(format!("{event_id}.json"))
    }

    /// Write `document` to `path` atomically.
    pub fn write_atomic(path: &Path, document: &str) -> Result<(), SaveError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(document.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| SaveError::Io(e.error))?;
        Ok(())
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn valid_event_id(event_id: &str) -> bool {
    !event_id.is_empty()
        && event_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl VenueLoader for FileVenueStore {
    fn fetch(&self, event_id: &str, url: &str) -> Result<String, LoadError> {
        let path = self.resolve(url);
        log::debug!("Fetching venue for event {} from {}", event_id, path.display());
        fs::read_to_string(&path).map_err(|e| LoadError::Fetch {
            location: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl VenueUploader for FileVenueStore {
    fn upload(&self, event_id: &str, document: &str) -> Result<String, SaveError> {
        if !valid_event_id(event_id) {
            return Err(SaveError::Upload(format!("invalid event id '{event_id}'")));
        }
        let path = self.document_path(event_id);
        Self::write_atomic(&path, document)?;
        log::info!("Saved venue for event {} to {}", event_id, path.display());
        Ok(format!("file://{}", path.display()))
    }
}
