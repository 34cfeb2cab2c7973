use crate::{
    models::{RecommendationMode, UserPreferences},
    services::search::SearchFilters,
};

/// Fills gaps in a search request from stored preferences
///
/// Explicit values always win.
pub fn apply_preferences(
    prefs: &UserPreferences,
    mode: Option<RecommendationMode>,
    mut filters: SearchFilters,
) -> (RecommendationMode, SearchFilters) {
    if filters.min_rating.is_none() {
        filters.min_rating = prefs.min_rating;
    }
    (mode.unwrap_or(prefs.preferred_mode), filters)
}

/// Changes requested from the preferences form
#[derive(Debug, Clone, Default)]
pub struct PreferenceUpdate {
    pub add_genres: Vec<String>,
    pub remove_genres: Vec<String>,
    pub preferred_mode: Option<RecommendationMode>,
    pub min_rating: Option<f64>,
    pub clear_min_rating: bool,
}

pub fn update_preferences(prefs: &mut UserPreferences, update: &PreferenceUpdate) {
    for genre in &update.add_genres {
        prefs.add_genre(genre);
    }
    for genre in &update.remove_genres {
        prefs.remove_genre(genre);
    }
    if let Some(mode) = update.preferred_mode {
        prefs.preferred_mode = mode;
    }
    if update.clear_min_rating {
        prefs.min_rating = None;
    } else if let Some(min) = update.min_rating {
        prefs.min_rating = Some(min);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_preferences_fills_defaults() {
        let prefs = UserPreferences {
            preferred_mode: RecommendationMode::Author,
            min_rating: Some(6.0),
            ..UserPreferences::default()
        };
        let (mode, filters) = apply_preferences(&prefs, None, SearchFilters::default());
        assert_eq!(mode, RecommendationMode::Author);
        assert_eq!(filters.min_rating, Some(6.0));
    }

    #[test]
    fn test_apply_preferences_explicit_wins() {
        let prefs = UserPreferences {
            preferred_mode: RecommendationMode::Author,
            min_rating: Some(6.0),
            ..UserPreferences::default()
        };
        let explicit = SearchFilters {
            min_rating: Some(2.0),
            ..SearchFilters::default()
        };
        let (mode, filters) =
            apply_preferences(&prefs, Some(RecommendationMode::Genre), explicit);
        assert_eq!(mode, RecommendationMode::Genre);
        assert_eq!(filters.min_rating, Some(2.0));
    }

    #[test]
    fn test_update_preferences() {
        let mut prefs = UserPreferences::new();
        update_preferences(
            &mut prefs,
            &PreferenceUpdate {
                add_genres: vec!["Fantasy".to_string(), "Horror".to_string()],
                preferred_mode: Some(RecommendationMode::Hybrid),
                min_rating: Some(7.0),
                ..PreferenceUpdate::default()
            },
        );
        update_preferences(
            &mut prefs,
            &PreferenceUpdate {
                remove_genres: vec!["horror".to_string()],
                clear_min_rating: true,
                ..PreferenceUpdate::default()
            },
        );
        assert_eq!(prefs.favorite_genres, vec!["Fantasy".to_string()]);
        assert_eq!(prefs.preferred_mode, RecommendationMode::Hybrid);
        assert_eq!(prefs.min_rating, None);
    }
}
