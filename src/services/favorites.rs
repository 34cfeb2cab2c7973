use std::{cmp::Ordering, str::FromStr, sync::Arc};

use crate::{
    client::BookApi,
    error::AppError,
    models::{Book, Favorite},
    services::{search::contains_ignore_case, session::AuthSession},
};

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login to manage favorites";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please login again.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load favorites";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update favorites. Please try again.";

/// Ordering of the favorites page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoriteSort {
    /// Server order, newest first
    #[default]
    Recent,
    Title,
    Author,
    /// Highest first; entries without a rating go last
    Rating,
}

impl FromStr for FavoriteSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recent" => Ok(FavoriteSort::Recent),
            "title" => Ok(FavoriteSort::Title),
            "author" => Ok(FavoriteSort::Author),
            "rating" => Ok(FavoriteSort::Rating),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Nothing changed; see `FavoritesScreen::message`
    Rejected,
}

/// State of the favorites page
///
/// Membership is decided by exact title equality.
pub struct FavoritesScreen {
    api: Arc<dyn BookApi>,
    pub favorites: Vec<Favorite>,
    pub loading: bool,
    pub message: Option<String>,
}

impl FavoritesScreen {
    pub fn new(api: Arc<dyn BookApi>) -> Self {
        Self {
            api,
            favorites: Vec::new(),
            loading: false,
            message: None,
        }
    }

    /// Fetches the signed-in user's favorites
    ///
    /// Signed-out users get an empty list without a request.
    pub async fn load(&mut self, session: &mut AuthSession) -> &[Favorite] {
        self.message = None;

        let Some(token) = session.token().map(str::to_string) else {
            self.favorites.clear();
            return &self.favorites;
        };

        self.loading = true;
        let result = self.api.favorites(&token).await;
        self.loading = false;

        match result {
            Ok(favorites) => {
                tracing::info!(count = favorites.len(), "Favorites loaded");
                self.favorites = favorites;
            }
            Err(e) => {
                self.favorites.clear();
                self.fail(session, e, LOAD_FAILED_MESSAGE).await;
            }
        }

        &self.favorites
    }

    pub fn is_favorite(&self, title: &str) -> bool {
        self.favorites.iter().any(|f| f.title == title)
    }

    /// Adds or removes `book` depending on current membership
    pub async fn toggle(&mut self, session: &mut AuthSession, book: &Book) -> ToggleOutcome {
        self.message = None;

        let Some(token) = session.token().map(str::to_string) else {
            self.message = Some(LOGIN_REQUIRED_MESSAGE.to_string());
            return ToggleOutcome::Rejected;
        };

        let removing = self.is_favorite(&book.title);

        self.loading = true;
        let result = if removing {
            self.api.remove_favorite(&token, &book.title).await
        } else {
            self.api.add_favorite(&token, &Favorite::from(book)).await
        };
        self.loading = false;

        match result {
            Ok(()) if removing => {
                self.favorites.retain(|f| !book.same_title(&f.title));
                ToggleOutcome::Removed
            }
            Ok(()) => {
                self.favorites.insert(0, Favorite::from(book));
                ToggleOutcome::Added
            }
            Err(e) => {
                self.fail(session, e, UPDATE_FAILED_MESSAGE).await;
                ToggleOutcome::Rejected
            }
        }
    }

    /// Sorted and searched copy of the already-fetched list
    pub fn view(&self, sort: FavoriteSort, search: Option<&str>) -> Vec<Favorite> {
        let needle = search.map(str::trim).filter(|s| !s.is_empty());

        let mut favorites: Vec<Favorite> = self
            .favorites
            .iter()
            .filter(|f| match needle {
                Some(needle) => {
                    contains_ignore_case(&f.title, needle) || contains_ignore_case(&f.author, needle)
                }
                None => true,
            })
            .cloned()
            .collect();

        match sort {
            FavoriteSort::Recent => {}
            FavoriteSort::Title => {
                favorites.sort_by_key(|f| f.title.to_lowercase());
            }
            FavoriteSort::Author => {
                favorites.sort_by_key(|f| f.author.to_lowercase());
            }
            FavoriteSort::Rating => favorites.sort_by(|a, b| match (a.rating, b.rating) {
                (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
        }

        favorites
    }

    async fn fail(&mut self, session: &mut AuthSession, error: AppError, fallback: &str) {
        if error.is_unauthorized() {
            tracing::warn!("Favorites request rejected, logging out");
            session.expire().await;
            self.favorites.clear();
            self.message = Some(SESSION_EXPIRED_MESSAGE.to_string());
        } else {
            tracing::error!(error = %error, "Favorites request failed");
            self.message = Some(fallback.to_string());
        }
    }
}
