use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::AppResult;

use super::{read_document, write_document};

/// Keys the client keeps in local storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AuthUser,
    RecentSearches,
    UserPreferences,
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKey::AuthUser => write!(f, "auth_user"),
            StorageKey::RecentSearches => write!(f, "recentSearches"),
            StorageKey::UserPreferences => write!(f, "userPreferences"),
        }
    }
}

/// File-backed string key/value store
///
/// Values are stored as strings, structured values as JSON text, the same
/// way a browser's `localStorage` holds them.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Opens the store at `path`; a missing or unreadable file yields an empty store
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = read_document(&path).unwrap_or_default();
        Self { path, entries }
    }

    pub fn get_item(&self, key: &StorageKey) -> Option<&str> {
        self.entries.get(&key.to_string()).map(String::as_str)
    }

    pub async fn set_item(&mut self, key: &StorageKey, value: impl Into<String>) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.into());
        write_document(&self.path, &self.entries).await
    }

    pub async fn remove_item(&mut self, key: &StorageKey) -> AppResult<()> {
        if self.entries.remove(&key.to_string()).is_some() {
            write_document(&self.path, &self.entries).await?;
        }
        Ok(())
    }

    /// Parses a JSON entry
    ///
    /// Returns `Ok(None)` when the key is absent and an error when the stored
    /// text does not parse, so callers can decide whether to discard it.
    pub fn get_json<T: DeserializeOwned>(&self, key: &StorageKey) -> AppResult<Option<T>> {
        match self.get_item(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize>(&mut self, key: &StorageKey, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_item(key, json).await
    }
}
