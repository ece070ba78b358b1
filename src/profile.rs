// Session state and trip-planning extras kept in local storage

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::store::{keys, LocalStore, StorageError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub email: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignUpError {
    #[error("Passwords do not match.")]
    PasswordMismatch,
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<UserProfile, SignUpError> {
        if self.password != self.confirm_password {
            return Err(SignUpError::PasswordMismatch);
        }
        Ok(UserProfile {
            username: self.username.clone(),
            email: self.email.clone(),
        })
    }
}

/// Login/logout state. Logging in stores the token, the profile blob and the
/// stated purpose of use; logging out drops the token only, leaving the rest
/// behind for the next sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    store: Arc<LocalStore>,
}

impl Session {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    pub fn log_in(
        &self,
        token: &str,
        profile: &UserProfile,
        purpose: &str,
    ) -> Result<(), StorageError> {
        self.store.set(keys::TOKEN, &token)?;
        self.store.set(keys::USER, profile)?;
        self.store.set(keys::PURPOSE, &purpose)?;
        info!(user = %profile.username, "logged in");
        Ok(())
    }

    pub fn log_out(&self) -> Result<bool, StorageError> {
        self.store.remove(keys::TOKEN)
    }

    pub fn is_logged_in(&self) -> Result<bool, StorageError> {
        Ok(self.token()?.is_some())
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::TOKEN)
    }

    pub fn profile(&self) -> Result<Option<UserProfile>, StorageError> {
        self.store.get(keys::USER)
    }

    pub fn purpose(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::PURPOSE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteLocation {
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Persisted list of pinned map locations.
#[derive(Debug, Clone)]
pub struct Favorites {
    store: Arc<LocalStore>,
}

impl Favorites {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Result<Vec<FavoriteLocation>, StorageError> {
        Ok(self
            .store
            .get(keys::FAVORITE_LOCATIONS)?
            .unwrap_or_default())
    }

    /// Pin a location. An unnamed pin gets "Favorite {n}" counting from one;
    /// ids grow past the largest ever assigned, so removals don't recycle
    /// them.
    pub fn add(
        &self,
        latitude: f64,
        longitude: f64,
        name: Option<String>,
    ) -> Result<FavoriteLocation, StorageError> {
        let mut favorites = self.all()?;
        let id = favorites.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let favorite = FavoriteLocation {
            id,
            name: name.unwrap_or_else(|| format!("Favorite {}", favorites.len() + 1)),
            latitude,
            longitude,
        };
        favorites.push(favorite.clone());
        self.store.set(keys::FAVORITE_LOCATIONS, &favorites)?;
        Ok(favorite)
    }

    pub fn remove(&self, id: u32) -> Result<bool, StorageError> {
        let mut favorites = self.all()?;
        let before = favorites.len();
        favorites.retain(|favorite| favorite.id != id);
        if favorites.len() == before {
            return Ok(false);
        }
        self.store.set(keys::FAVORITE_LOCATIONS, &favorites)?;
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingItem {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub packed: bool,
}

/// Packing checklist for the named trip. Items and the trip name live under
/// separate storage keys.
#[derive(Debug, Clone)]
pub struct PackingChecklist {
    store: Arc<LocalStore>,
}

impl PackingChecklist {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    pub fn trip_name(&self) -> Result<String, StorageError> {
        Ok(self
            .store
            .get(keys::TRIP_NAME)?
            .unwrap_or_else(|| "My Trip".to_string()))
    }

    pub fn rename_trip(&self, name: &str) -> Result<(), StorageError> {
        self.store.set(keys::TRIP_NAME, &name)
    }

    pub fn items(&self) -> Result<Vec<PackingItem>, StorageError> {
        Ok(self.store.get(keys::PACKING_CHECKLIST)?.unwrap_or_default())
    }

    pub fn add(&self, name: &str, category: &str) -> Result<PackingItem, StorageError> {
        let mut items = self.items()?;
        let item = PackingItem {
            id: items.iter().map(|item| item.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
            category: category.to_string(),
            packed: false,
        };
        items.push(item.clone());
        self.store.set(keys::PACKING_CHECKLIST, &items)?;
        Ok(item)
    }

    /// Flip one item's packed flag. Returns whether the item existed.
    pub fn toggle(&self, id: u32) -> Result<bool, StorageError> {
        let mut items = self.items()?;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Ok(false);
        };
        item.packed = !item.packed;
        self.store.set(keys::PACKING_CHECKLIST, &items)?;
        Ok(true)
    }

    pub fn remove(&self, id: u32) -> Result<bool, StorageError> {
        let mut items = self.items()?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.store.set(keys::PACKING_CHECKLIST, &items)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::PACKING_CHECKLIST)?;
        Ok(())
    }

    /// (packed, total) counts for the progress bar.
    pub fn packed_count(&self) -> Result<(usize, usize), StorageError> {
        let items = self.items()?;
        let packed = items.iter().filter(|item| item.packed).count();
        Ok((packed, items.len()))
    }

    pub fn by_category(&self, category: &str) -> Result<Vec<PackingItem>, StorageError> {
        let mut items = self.items()?;
        items.retain(|item| item.category == category);
        Ok(items)
    }
}
