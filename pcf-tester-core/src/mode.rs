//! Persisted test mode
//!
//! The mode is one opaque string (a comma-separated probe list, split by the
//! caller). It outlives the control: a fresh control instance picks up
//! whatever the previous one stored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ModeStoreError;

/// Mode used when nothing has been stored yet.
pub const DEFAULT_MODE: &str = "default";

/// Key the mode is stored under in a key/value mode file.
pub const MODE_KEY: &str = "pcf-test-mode";

/// Pass-through to wherever the mode lives.
pub trait ModeStore {
    /// Stored mode, or [`DEFAULT_MODE`] when unset.
    fn get_mode(&self) -> String;

    /// Replace the stored mode. No validation of the content.
    fn set_mode(&mut self, mode: &str) -> Result<(), ModeStoreError>;
}

impl<T: ModeStore + ?Sized> ModeStore for Box<T> {
    fn get_mode(&self) -> String {
        (**self).get_mode()
    }

    fn set_mode(&mut self, mode: &str) -> Result<(), ModeStoreError> {
        (**self).set_mode(mode)
    }
}

/// In-process store, for tests and for `--mode` runs that should not persist.
#[derive(Debug, Clone, Default)]
pub struct MemoryModeStore {
    mode: Option<String>,
}

impl MemoryModeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: impl Into<String>) -> Self {
        Self {
            mode: Some(mode.into()),
        }
    }
}

impl ModeStore for MemoryModeStore {
    fn get_mode(&self) -> String {
        match &self.mode {
            Some(mode) if !mode.is_empty() => mode.clone(),
            _ => DEFAULT_MODE.to_string(),
        }
    }

    fn set_mode(&mut self, mode: &str) -> Result<(), ModeStoreError> {
        self.mode = Some(mode.to_string());
        Ok(())
    }
}

/// JSON key/value file holding the mode under [`MODE_KEY`].
///
/// Other keys in the file are preserved on write.
#[derive(Debug, Clone)]
pub struct FileModeStore {
    path: PathBuf,
}

impl FileModeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, ModeStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(ModeStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| ModeStoreError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

impl ModeStore for FileModeStore {
    fn get_mode(&self) -> String {
        match self.read_entries() {
            Ok(entries) => entries
                .get(MODE_KEY)
                .filter(|m| !m.is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_MODE.to_string()),
            Err(error) => {
                tracing::warn!(%error, "Falling back to default mode");
                DEFAULT_MODE.to_string()
            }
        }
    }

    fn set_mode(&mut self, mode: &str) -> Result<(), ModeStoreError> {
        // A corrupt file is replaced rather than blocking the write
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(MODE_KEY.to_string(), mode.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ModeStoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&entries).map_err(|source| ModeStoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| ModeStoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), %mode, "Mode persisted");
        Ok(())
    }
}
