//! JSON snapshot persistence for the in-memory stores.
//!
//! Each store keeps its state in memory and writes the whole state to a
//! single JSON file after every mutation. Writes go to a sibling temporary
//! file first and are renamed into place, so a crash never leaves a
//! half-written snapshot.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors from reading or writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Filesystem operation failed
    #[error("snapshot I/O error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Snapshot content could not be (de)serialized
    #[error("snapshot JSON error at {path}: {message}")]
    Json { path: PathBuf, message: String },
}

/// A JSON file holding one store's state.
#[derive(Debug, Clone)]
pub struct JsonSnapshot {
    path: PathBuf,
}

impl JsonSnapshot {
    /// Create a snapshot handle for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    /// Load the snapshot.
    ///
    /// Returns `None` if the file does not exist yet. A file that exists but
    /// cannot be parsed is an error, so a corrupt snapshot is never silently
    /// replaced by an empty store.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, PersistError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| PersistError::Json {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    /// Save the snapshot.
    ///
    /// Creates parent directories if they don't exist.
    pub async fn save<T: Serialize>(&self, value: &T) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(value).map_err(|e| PersistError::Json {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        Ok(())
    }
}
