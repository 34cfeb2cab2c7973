use std::sync::Arc;

use crate::{
    client::BookApi,
    error::AppResult,
    models::{AuthorSummary, Book, GenreSummary},
    services::search::{apply_filters, FilterOutcome, SearchFilters},
};

pub const BROWSE_FAILED_MESSAGE: &str = "Failed to load books. Please try again.";
pub const CATALOG_FAILED_MESSAGE: &str = "Failed to load filter options";

/// Which shelf the browse page is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shelf {
    Popular,
    Random,
    Genre(String),
}

/// State of the browse page and of the filter pickers
pub struct BrowseScreen {
    api: Arc<dyn BookApi>,
    pub shelf: Option<Shelf>,
    pub books: Vec<Book>,
    pub genres: Vec<GenreSummary>,
    pub authors: Vec<AuthorSummary>,
    pub loading: bool,
    pub message: Option<String>,
}

impl BrowseScreen {
    pub fn new(api: Arc<dyn BookApi>) -> Self {
        Self {
            api,
            shelf: None,
            books: Vec::new(),
            genres: Vec::new(),
            authors: Vec::new(),
            loading: false,
            message: None,
        }
    }

    /// Loads a shelf; on failure the shelf is empty and `message` is set
    pub async fn open(&mut self, shelf: Shelf) -> &[Book] {
        self.message = None;
        self.loading = true;
        let result: AppResult<Vec<Book>> = match &shelf {
            Shelf::Popular => self.api.popular().await,
            Shelf::Random => self.api.random().await,
            Shelf::Genre(genre) => self.api.books_by_genre(genre).await,
        };
        self.loading = false;

        match result {
            Ok(books) => {
                tracing::info!(shelf = ?shelf, count = books.len(), "Shelf loaded");
                self.books = books;
            }
            Err(e) => {
                tracing::error!(error = %e, shelf = ?shelf, "Failed to load shelf");
                self.books.clear();
                self.message = Some(BROWSE_FAILED_MESSAGE.to_string());
            }
        }
        self.shelf = Some(shelf);
        &self.books
    }

    pub async fn popular(&mut self) -> &[Book] {
        self.open(Shelf::Popular).await
    }

    pub async fn random(&mut self) -> &[Book] {
        self.open(Shelf::Random).await
    }

    pub async fn by_genre(&mut self, genre: &str) -> &[Book] {
        self.open(Shelf::Genre(genre.trim().to_string())).await
    }

    /// Populates the genre picker; failures leave it empty
    pub async fn load_genres(&mut self) -> &[GenreSummary] {
        match self.api.genres().await {
            Ok(genres) => self.genres = genres,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load genres");
                self.genres.clear();
                self.message = Some(CATALOG_FAILED_MESSAGE.to_string());
            }
        }
        &self.genres
    }

    /// Populates the author picker; failures leave it empty
    pub async fn load_authors(&mut self) -> &[AuthorSummary] {
        match self.api.authors().await {
            Ok(authors) => self.authors = authors,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load authors");
                self.authors.clear();
                self.message = Some(CATALOG_FAILED_MESSAGE.to_string());
            }
        }
        &self.authors
    }

    /// Current shelf after client-side filtering
    pub fn filtered(&self, filters: &SearchFilters) -> FilterOutcome {
        apply_filters(&self.books, filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockBookApi;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_popular_shelf() {
        let mut api = MockBookApi::new();
        api.expect_popular().times(1).returning(|| {
            Ok(vec![
                Book::new("The Hobbit", "J.R.R. Tolkien", 9.4),
                Book::new("Dune", "Frank Herbert", 9.3),
            ])
        });
        let mut screen = BrowseScreen::new(Arc::new(api));

        assert_eq!(screen.popular().await.len(), 2);
        assert_eq!(screen.shelf, Some(Shelf::Popular));
        assert_eq!(screen.message, None);
    }

    #[tokio::test]
    async fn test_genre_shelf_trims_input() {
        let mut api = MockBookApi::new();
        api.expect_books_by_genre()
            .withf(|g| g == "Horror")
            .returning(|_| Ok(vec![]));
        let mut screen = BrowseScreen::new(Arc::new(api));

        assert!(screen.by_genre(" Horror ").await.is_empty());
        assert_eq!(screen.shelf, Some(Shelf::Genre("Horror".to_string())));
    }

    #[tokio::test]
    async fn test_shelf_failure_sets_message() {
        let mut api = MockBookApi::new();
        api.expect_random()
            .returning(|| Err(AppError::Internal("timeout".to_string())));
        let mut screen = BrowseScreen::new(Arc::new(api));

        assert!(screen.random().await.is_empty());
        assert_eq!(screen.message.as_deref(), Some(BROWSE_FAILED_MESSAGE));
        assert!(!screen.loading);
    }

    #[tokio::test]
    async fn test_pickers() {
        let mut api = MockBookApi::new();
        api.expect_genres()
            .returning(|| Ok(vec![GenreSummary::from("Fantasy".to_string())]));
        api.expect_authors()
            .returning(|| Err(AppError::Internal("boom".to_string())));
        let mut screen = BrowseScreen::new(Arc::new(api));

        assert_eq!(screen.load_genres().await[0].name, "Fantasy");
        assert!(screen.load_authors().await.is_empty());
        assert_eq!(screen.message.as_deref(), Some(CATALOG_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_filtered_shelf() {
        let mut api = MockBookApi::new();
        api.expect_popular().returning(|| {
            Ok(vec![
                Book::new("The Hobbit", "J.R.R. Tolkien", 9.4),
                Book::new("Emma", "Jane Austen", 4.0),
            ])
        });
        let mut screen = BrowseScreen::new(Arc::new(api));
        screen.popular().await;

        let outcome = screen.filtered(&SearchFilters {
            min_rating: Some(5.0),
            ..SearchFilters::default()
        });
        assert_eq!(outcome.books.len(), 1);
        assert!(!outcome.fell_back);
    }
}
