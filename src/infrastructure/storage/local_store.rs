//! File-backed key/value store.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::shared::error::AppError;

/// Local key/value storage persisted as one JSON object.
///
/// Every `set` rewrites the file through a temporary sibling and a
/// rename, so readers never see a half-written document.
pub struct LocalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the value stored under `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        match entries.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// If the existing file cannot be read or parsed it is replaced by a
    /// file holding only `key`; every other key in it is lost.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries().unwrap_or_else(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Local store unreadable, starting fresh"
            );
            Map::new()
        });
        entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.write_entries(&entries)
    }

    /// Remove `key`; returns whether it was present.
    pub fn remove(&self, key: &str) -> Result<bool, AppError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.write_entries(&entries)?;
        }
        Ok(existed)
    }

    fn read_entries(&self) -> Result<Map<String, Value>, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
