//! Device key-value storage and rider preferences.
//!
//! The host platform's local storage is reached through [`KeyValueStore`].
//! [`JsonFileStore`] keeps all keys in one JSON object on disk; every `set`
//! rewrites the file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::warn;

use crate::proximity::AlertRadius;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("Storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialising the store failed.
    #[error("Failed to encode storage: {0}")]
    Encode(#[source] serde_json::Error),
}

/// String key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Volatile store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a single JSON object file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries).map_err(StorageError::Encode)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        // Memory only takes the write once it is on disk
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }
}

const ALERT_RADIUS_KEY: &str = "alert_radius_m";
const LAST_BUS_KEY: &str = "last_bus_id";

/// Rider settings kept on the device.
pub struct RiderPreferences<S> {
    store: S,
}

impl<S: KeyValueStore> RiderPreferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Selected alert radius; the default when unset or unrecognised.
    pub fn alert_radius(&self) -> Result<AlertRadius, StorageError> {
        self.alert_radius_or(AlertRadius::default())
    }

    /// Selected alert radius, or `fallback` when unset or unrecognised.
    pub fn alert_radius_or(&self, fallback: AlertRadius) -> Result<AlertRadius, StorageError> {
        let Some(raw) = self.store.get(ALERT_RADIUS_KEY)? else {
            return Ok(fallback);
        };
        match raw.parse::<AlertRadius>() {
            Ok(radius) => Ok(radius),
            Err(e) => {
                warn!(value = %raw, error = %e, "Ignoring stored alert radius");
                Ok(fallback)
            }
        }
    }

    pub fn set_alert_radius(&self, radius: AlertRadius) -> Result<(), StorageError> {
        self.store.set(ALERT_RADIUS_KEY, &radius.meters().to_string())
    }

    /// Bus the rider tracked last, if any.
    pub fn last_bus_id(&self) -> Result<Option<String>, StorageError> {
        self.store.get(LAST_BUS_KEY)
    }

    pub fn set_last_bus_id(&self, bus_id: &str) -> Result<(), StorageError> {
        self.store.set(LAST_BUS_KEY, bus_id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
