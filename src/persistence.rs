/// Settings persistence
///
/// Simple key/value store for UI state such as the last selected step.
/// Values are JSON so callers can store strings or string lists.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::PersistenceError;

/// Key under which the navigation registry stores the selected step id
pub const LAST_SELECTED_STEP_KEY: &str = "navigation.last_selected_step";

/// Object-safe key/value store
pub trait SettingsStore: Send + Sync {
    fn load_value(&self, key: &str) -> Result<Option<Value>, PersistenceError>;

    fn save_value(&self, key: &str, value: Value) -> Result<(), PersistenceError>;

    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Typed helpers over any [`SettingsStore`]
pub trait SettingsStoreExt: SettingsStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        match self.load_value(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| PersistenceError::Serialization {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(value).map_err(|source| {
            PersistenceError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;
        self.save_value(key, value)
    }
}

impl<S: SettingsStore + ?Sized> SettingsStoreExt for S {}

pub type SharedSettingsStore = Arc<dyn SettingsStore>;

/// In-memory store, used headless and in tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl SettingsStore for MemoryStore {
    fn load_value(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save_value(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Store backed by one pretty-printed JSON object on disk.
///
/// Every save rewrites the whole file; the document is small.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let values = Self::read(&path)?;

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Open the store in the platform config directory
    pub fn open_default() -> Result<Self, PersistenceError> {
        let path = Self::default_path().ok_or(PersistenceError::NoConfigDir)?;
        Self::open(path)
    }

    /// Get default settings file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ReqWorkbench").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<BTreeMap<String, Value>, PersistenceError> {
        if !path.exists() {
            tracing::debug!("No settings file at {}, starting fresh", path.display());
            return Ok(BTreeMap::new());
        }

        let json = std::fs::read_to_string(path).map_err(|source| PersistenceError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&json).map_err(|source| PersistenceError::Serialization {
            key: "<document>".to_string(),
            source,
        })
    }

    fn write(&self, values: &BTreeMap<String, Value>) -> Result<(), PersistenceError> {
        let write_failed = |source: std::io::Error| PersistenceError::WriteFailed {
            path: self.path.display().to_string(),
            source,
        };

        // Create parent directory if it doesn't exist
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let json = serde_json::to_string_pretty(values).map_err(|source| {
            PersistenceError::Serialization {
                key: "<document>".to_string(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(write_failed)?;

        tracing::debug!("Saved settings to: {}", self.path.display());
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn load_value(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save_value(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        let mut values = self.values.lock();
        let previous = values.insert(key.to_string(), value);

        if let Err(err) = self.write(&values) {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(previous) => values.insert(key.to_string(), previous),
                None => values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut values = self.values.lock();
        if let Some(previous) = values.remove(key) {
            if let Err(err) = self.write(&values) {
                values.insert(key.to_string(), previous);
                return Err(err);
            }
        }
        Ok(())
    }
}
