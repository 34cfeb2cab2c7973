use serde::{Deserialize, Serialize};

use super::RecommendationMode;

/// Search defaults kept under the `userPreferences` local storage key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    /// Genres the user likes, in the order they were added
    pub favorite_genres: Vec<String>,
    /// Mode preselected on the search screen
    pub preferred_mode: RecommendationMode,
    /// Lower rating bound applied when a search gives none
    pub min_rating: Option<f64>,
}

impl UserPreferences {
    /// Creates empty user preferences
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a genre, ignoring case-insensitive duplicates
    pub fn add_genre(&mut self, genre: &str) {
        let genre = genre.trim();
        if genre.is_empty() {
            return;
        }
        if !self
            .favorite_genres
            .iter()
            .any(|g| g.eq_ignore_ascii_case(genre))
        {
            self.favorite_genres.push(genre.to_string());
        }
    }

    /// Removes a genre, returning whether it was present
    pub fn remove_genre(&mut self, genre: &str) -> bool {
        let before = self.favorite_genres.len();
        self.favorite_genres
            .retain(|g| !g.eq_ignore_ascii_case(genre.trim()));
        before != self.favorite_genres.len()
    }
}
