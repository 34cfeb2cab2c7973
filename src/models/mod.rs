use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod book;
pub mod catalog;
pub mod user;
pub mod user_preferences;

pub use book::{Book, BookDetails, Favorite, ImageLinks, RecommendationFactor};
pub use catalog::{AuthorSummary, GenreSummary, HealthStatus, HybridRequest, RecommendationMode};
pub use user::{AuthResponse, LoginRequest, SignupForm, SignupRequest, User, VerifiedUser, VerifyResponse};
pub use user_preferences::UserPreferences;

// ============================================================================
// Response shape normalization
// ============================================================================
//
// The backend is inconsistent about list responses: some endpoints return a
// bare array, others wrap it (`{"recommendations": [...], "count": n}`), and
// error paths may return an object with no list at all. Everything is decoded
// leniently: unknown shapes become empty lists, bad elements are skipped.

/// Wrapper keys that may carry a book list
pub const BOOK_LIST_KEYS: &[&str] = &["recommendations", "books", "results"];

/// Pulls the list out of `value`: either the value itself or the first
/// array found under one of `keys`
pub fn extract_list(value: Value, keys: &[&str]) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => keys
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<T>(item).ok())
        .collect();

    if decoded.len() != total {
        tracing::debug!(
            skipped = total - decoded.len(),
            kept = decoded.len(),
            "Skipped malformed list entries"
        );
    }

    decoded
}

/// Books from any recommendation or catalog response
pub fn normalize_books(value: Value) -> Vec<Book> {
    decode_items(extract_list(value, BOOK_LIST_KEYS))
}

/// Favorites are only accepted as a bare array
pub fn normalize_favorites(value: Value) -> Vec<Favorite> {
    decode_items(extract_list(value, &[]))
}

/// Genres as plain strings or summary objects
pub fn normalize_genres(value: Value) -> Vec<GenreSummary> {
    extract_list(value, &["genres"])
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) if !name.trim().is_empty() => {
                Some(GenreSummary::from(name.trim().to_string()))
            }
            Value::Object(_) => serde_json::from_value(item).ok(),
            _ => None,
        })
        .collect()
}

/// Authors as plain strings or summary objects
pub fn normalize_authors(value: Value) -> Vec<AuthorSummary> {
    extract_list(value, &["authors"])
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) if !name.trim().is_empty() => {
                Some(AuthorSummary::from(name.trim().to_string()))
            }
            Value::Object(_) => serde_json::from_value(item).ok(),
            _ => None,
        })
        .collect()
}
