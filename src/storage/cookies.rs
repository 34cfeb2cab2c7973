use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AppResult;

use super::{read_document, write_document};

/// Cookie holding the bearer token
pub const AUTH_COOKIE: &str = "auth_token";

/// Lifetime of the auth cookie
pub const AUTH_COOKIE_MAX_AGE_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires: DateTime<Utc>,
}

impl Cookie {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

/// File-backed cookie jar
///
/// Every mutation rewrites the file. Expired cookies are never returned and
/// are dropped from disk on the next write.
#[derive(Debug)]
pub struct CookieJar {
    path: PathBuf,
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Opens the jar at `path`; a missing or unreadable file yields an empty jar
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let cookies: Vec<Cookie> = read_document(&path).unwrap_or_default();
        Self { path, cookies }
    }

    /// Current value of a cookie, if set and not expired
    pub fn get(&self, name: &str) -> Option<&str> {
        let now = Utc::now();
        self.cookies
            .iter()
            .find(|c| c.name == name && !c.is_expired(now))
            .map(|c| c.value.as_str())
    }

    /// Sets a cookie on path `/`, replacing any previous value
    pub async fn set(&mut self, name: &str, value: &str, max_age: Duration) -> AppResult<()> {
        self.set_at(name, value, Utc::now() + max_age).await
    }

    pub(crate) async fn set_at(
        &mut self,
        name: &str,
        value: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()> {
        self.cookies.retain(|c| c.name != name);
        self.cookies.push(Cookie {
            name: name.to_string(),
            value: value.to_string(),
            path: "/".to_string(),
            expires,
        });
        self.flush().await
    }

    pub async fn remove(&mut self, name: &str) -> AppResult<()> {
        self.cookies.retain(|c| c.name != name);
        self.flush().await
    }

    async fn flush(&mut self) -> AppResult<()> {
        let now = Utc::now();
        self.cookies.retain(|c| !c.is_expired(now));
        write_document(&self.path, &self.cookies).await
    }
}
