// Local persisted key/value storage and the booking repository

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::booking::BookingRecord;

// Error types for the persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt value under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Logical storage keys. One key per concern, no versioning or migration.
pub mod keys {
    pub const BOOKINGS: &str = "bookings";
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    pub const PURPOSE: &str = "purpose";
    pub const FAVORITE_LOCATIONS: &str = "favoriteLocations";
    pub const PACKING_CHECKLIST: &str = "packingChecklist";
    pub const TRIP_NAME: &str = "tripName";
}

/// String-keyed, JSON-serialized key/value store backed by one file per key.
/// This is the only data store in the system; values live for as long as the
/// backing directory does.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and decode the value under `key`. A missing key is `None`; a
    /// present but undecodable value is surfaced as `Corrupt` rather than
    /// silently reset.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let value = serde_json::from_str(&raw).map_err(|source| {
            warn!(key, "stored value is corrupt");
            StorageError::Corrupt {
                key: key.to_string(),
                source,
            }
        })?;
        Ok(Some(value))
    }

    /// Encode and overwrite the value under `key`.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        fs::write(self.path_for(key), raw)?;
        debug!(key, "stored value");
        Ok(())
    }

    /// Remove the value under `key`. Returns whether anything was removed.
    pub fn remove(&self, key: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Owns every read and write of the persisted booking collection. Components
/// get a handle to this instead of reaching into storage ad hoc.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    store: Arc<LocalStore>,
}

impl BookingRepository {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// The full persisted list, oldest first. Empty if nothing was ever
    /// booked.
    pub fn load(&self) -> Result<Vec<BookingRecord>, StorageError> {
        Ok(self.store.get(keys::BOOKINGS)?.unwrap_or_default())
    }

    /// Append one record and persist the whole list back. Records are never
    /// updated or deleted afterwards.
    pub fn append(&self, record: BookingRecord) -> Result<(), StorageError> {
        let mut records = self.load()?;
        records.push(record);
        self.store.set(keys::BOOKINGS, &records)?;
        debug!(total = records.len(), "booking list persisted");
        Ok(())
    }
}
