use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::models::{User, UserPreferences};

pub mod cookies;
pub mod local;

pub use cookies::{CookieJar, AUTH_COOKIE, AUTH_COOKIE_MAX_AGE_DAYS};
pub use local::{LocalStorage, StorageKey};

/// Most recent searches kept, newest first
pub const MAX_RECENT_SEARCHES: usize = 10;

const COOKIE_FILE: &str = "cookies.json";
const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// Reads a JSON document, treating a missing or corrupt file as absent
fn read_document<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read client state file");
            return None;
        }
    };

    serde_json::from_str(&raw)
        .map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt client state file");
        })
        .ok()
}

async fn write_document<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Recent searches held in `local`; anything but a string array reads as empty
fn stored_recent_searches(local: &LocalStorage) -> Vec<String> {
    local
        .get_json::<Vec<String>>(&StorageKey::RecentSearches)
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Shared handle over the cookie jar and local storage
#[derive(Clone)]
pub struct Storage {
    inner: Arc<RwLock<StorageInner>>,
}

/// Inner state guarded by the lock
pub struct StorageInner {
    pub cookies: CookieJar,
    pub local: LocalStorage,
}

impl Storage {
    /// Opens (or creates) client state under `dir`
    pub fn open(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        tracing::debug!(dir = %dir.display(), "Opened client state");

        Ok(Self {
            inner: Arc::new(RwLock::new(StorageInner {
                cookies: CookieJar::open(dir.join(COOKIE_FILE)),
                local: LocalStorage::open(dir.join(LOCAL_STORAGE_FILE)),
            })),
        })
    }

    pub async fn auth_token(&self) -> Option<String> {
        let inner = self.inner.read().await;
        inner.cookies.get(AUTH_COOKIE).map(str::to_string)
    }

    pub async fn set_auth_token(&self, token: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .cookies
            .set(AUTH_COOKIE, token, Duration::days(AUTH_COOKIE_MAX_AGE_DAYS))
            .await
    }

    /// Cached user; a value that no longer parses is removed
    pub async fn cached_user(&self) -> Option<User> {
        let mut inner = self.inner.write().await;
        match inner.local.get_json::<User>(&StorageKey::AuthUser) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping unreadable cached user");
                if let Err(e) = inner.local.remove_item(&StorageKey::AuthUser).await {
                    tracing::error!(error = %e, "Failed to remove cached user");
                }
                None
            }
        }
    }

    pub async fn set_cached_user(&self, user: &User) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.local.set_json(&StorageKey::AuthUser, user).await
    }

    /// Forgets both the token cookie and the cached user
    pub async fn clear_auth(&self) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.cookies.remove(AUTH_COOKIE).await?;
        inner.local.remove_item(&StorageKey::AuthUser).await
    }

    /// Recent searches, newest first
    pub async fn recent_searches(&self) -> Vec<String> {
        let inner = self.inner.read().await;
        stored_recent_searches(&inner.local)
    }

    /// Moves `query` to the front, dropping case-insensitive duplicates and
    /// anything past [`MAX_RECENT_SEARCHES`]
    ///
    /// The read and the write happen under one write guard.
    pub async fn push_recent_search(&self, query: &str) -> AppResult<Vec<String>> {
        let query = query.trim();
        let mut inner = self.inner.write().await;
        let mut searches = stored_recent_searches(&inner.local);
        if query.is_empty() {
            return Ok(searches);
        }

        searches.retain(|s| !s.eq_ignore_ascii_case(query));
        searches.insert(0, query.to_string());
        searches.truncate(MAX_RECENT_SEARCHES);

        inner
            .local
            .set_json(&StorageKey::RecentSearches, &searches)
            .await?;
        Ok(searches)
    }

    pub async fn clear_recent_searches(&self) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.local.remove_item(&StorageKey::RecentSearches).await
    }

    /// Stored preferences, or defaults when absent or unreadable
    pub async fn preferences(&self) -> UserPreferences {
        let inner = self.inner.read().await;
        inner
            .local
            .get_json::<UserPreferences>(&StorageKey::UserPreferences)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    pub async fn set_preferences(&self, preferences: &UserPreferences) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .local
            .set_json(&StorageKey::UserPreferences, preferences)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        (dir, storage)
    }

    fn reader() -> User {
        User {
            id: 1,
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_auth_round_trip_and_clear() {
        let (_dir, storage) = open_storage();
        storage.set_auth_token("tok").await.unwrap();
        storage.set_cached_user(&reader()).await.unwrap();

        assert_eq!(storage.auth_token().await.as_deref(), Some("tok"));
        assert_eq!(storage.cached_user().await, Some(reader()));

        storage.clear_auth().await.unwrap();
        assert_eq!(storage.auth_token().await, None);
        assert_eq!(storage.cached_user().await, None);
    }

    #[tokio::test]
    async fn test_corrupt_cached_user_is_removed() {
        let (dir, storage) = open_storage();
        {
            let mut inner = storage.inner.write().await;
            inner
                .local
                .set_item(&StorageKey::AuthUser, "not-json")
                .await
                .unwrap();
        }
        assert_eq!(storage.cached_user().await, None);

        let reopened = Storage::open(dir.path()).unwrap();
        let inner = reopened.inner.read().await;
        assert_eq!(inner.local.get_item(&StorageKey::AuthUser), None);
    }

    #[tokio::test]
    async fn test_recent_searches_dedup_and_order() {
        let (_dir, storage) = open_storage();
        storage.push_recent_search("Dune").await.unwrap();
        storage.push_recent_search("Emma").await.unwrap();
        let searches = storage.push_recent_search("dune").await.unwrap();
        assert_eq!(searches, vec!["dune".to_string(), "Emma".to_string()]);
    }

    #[tokio::test]
    async fn test_recent_searches_capped() {
        let (_dir, storage) = open_storage();
        for i in 0..15 {
            storage.push_recent_search(&format!("query {}", i)).await.unwrap();
        }
        let searches = storage.recent_searches().await;
        assert_eq!(searches.len(), MAX_RECENT_SEARCHES);
        assert_eq!(searches[0], "query 14");
        assert_eq!(searches[9], "query 5");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_recent_searches_keep_every_query() {
        let (dir, storage) = open_storage();
        let handles: Vec<_> = (0..MAX_RECENT_SEARCHES)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move { storage.push_recent_search(&format!("query {}", i)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut searches = storage.recent_searches().await;
        assert_eq!(searches.len(), MAX_RECENT_SEARCHES);
        searches.sort();
        let mut expected: Vec<String> = (0..MAX_RECENT_SEARCHES)
            .map(|i| format!("query {}", i))
            .collect();
        expected.sort();
        assert_eq!(searches, expected);

        let reopened = Storage::open(dir.path()).unwrap();
        assert_eq!(reopened.recent_searches().await.len(), MAX_RECENT_SEARCHES);
    }

    #[tokio::test]
    async fn test_blank_search_not_recorded() {
        let (_dir, storage) = open_storage();
        let searches = storage.push_recent_search("   ").await.unwrap();
        assert!(searches.is_empty());
    }

    #[tokio::test]
    async fn test_recent_searches_non_array_reads_empty() {
        let (_dir, storage) = open_storage();
        {
            let mut inner = storage.inner.write().await;
            inner
                .local
                .set_item(&StorageKey::RecentSearches, r#"{"q": "dune"}"#)
                .await
                .unwrap();
        }
        assert!(storage.recent_searches().await.is_empty());
        storage.clear_recent_searches().await.unwrap();
    }

    #[tokio::test]
    async fn test_preferences_default_and_persist() {
        let (dir, storage) = open_storage();
        assert_eq!(storage.preferences().await, UserPreferences::default());

        let mut prefs = UserPreferences::new();
        prefs.add_genre("Fantasy");
        storage.set_preferences(&prefs).await.unwrap();

        let reopened = Storage::open(dir.path()).unwrap();
        assert_eq!(reopened.preferences().await, prefs);
    }
}
