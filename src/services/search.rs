use std::sync::Arc;

use crate::{
    client::BookApi,
    error::AppResult,
    models::{Book, HybridRequest, RecommendationMode},
    storage::Storage,
};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search query";
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to fetch recommendations. Please try again.";
pub const NO_RESULTS_MESSAGE: &str = "No recommendations found. Try a different search.";
pub const FILTER_FALLBACK_WARNING: &str =
    "No books matched your filters. Showing all results instead.";

/// Client-side post-filter over fetched results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Inclusive lower rating bound
    pub min_rating: Option<f64>,
    /// Inclusive upper rating bound
    pub max_rating: Option<f64>,
    /// Case-insensitive substring of the book's genre
    pub genre: Option<String>,
    /// Case-insensitive substring of the book's author
    pub author: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.min_rating.is_none()
            && self.max_rating.is_none()
            && non_blank(&self.genre).is_none()
            && non_blank(&self.author).is_none()
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(min) = self.min_rating {
            if book.rating < min {
                return false;
            }
        }
        if let Some(max) = self.max_rating {
            if book.rating > max {
                return false;
            }
        }
        if let Some(genre) = non_blank(&self.genre) {
            match &book.genre {
                Some(book_genre) if contains_ignore_case(book_genre, genre) => {}
                _ => return false,
            }
        }
        if let Some(author) = non_blank(&self.author) {
            if !contains_ignore_case(&book.author, author) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Result of applying filters
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub books: Vec<Book>,
    /// Filtering emptied a non-empty set, so `books` is the unfiltered set
    pub fell_back: bool,
}

/// Filters `books`, falling back to the unfiltered set when nothing survives
pub fn apply_filters(books: &[Book], filters: &SearchFilters) -> FilterOutcome {
    if filters.is_empty() {
        return FilterOutcome {
            books: books.to_vec(),
            fell_back: false,
        };
    }

    let filtered: Vec<Book> = books
        .iter()
        .filter(|book| filters.matches(book))
        .cloned()
        .collect();

    if filtered.is_empty() && !books.is_empty() {
        tracing::debug!(total = books.len(), "Filters removed every result, showing all");
        return FilterOutcome {
            books: books.to_vec(),
            fell_back: true,
        };
    }

    FilterOutcome {
        books: filtered,
        fell_back: false,
    }
}

/// Calls the endpoint that belongs to `mode`
pub async fn fetch_recommendations(
    api: &dyn BookApi,
    query: &str,
    mode: RecommendationMode,
    filters: &SearchFilters,
) -> AppResult<Vec<Book>> {
    match mode {
        RecommendationMode::Title => api.recommend(query).await,
        RecommendationMode::Genre => api.recommend_by_genre(query).await,
        RecommendationMode::Author => api.recommend_by_author(query).await,
        RecommendationMode::Hybrid => {
            let request = HybridRequest {
                book_title: query.to_string(),
                genre: non_blank(&filters.genre).map(str::to_string),
                author: non_blank(&filters.author).map(str::to_string),
            };
            api.recommend_hybrid(&request).await
        }
    }
}

/// State of the search page
pub struct SearchScreen {
    api: Arc<dyn BookApi>,
    storage: Storage,
    pub query: String,
    pub mode: RecommendationMode,
    pub filters: SearchFilters,
    pub results: Vec<Book>,
    pub loading: bool,
    /// Error or empty-state text
    pub message: Option<String>,
    /// Set when filters were ignored
    pub warning: Option<String>,
}

impl SearchScreen {
    pub fn new(api: Arc<dyn BookApi>, storage: Storage) -> Self {
        Self {
            api,
            storage,
            query: String::new(),
            mode: RecommendationMode::default(),
            filters: SearchFilters::default(),
            results: Vec::new(),
            loading: false,
            message: None,
            warning: None,
        }
    }

    /// Runs a search and returns what should be shown
    pub async fn search(
        &mut self,
        query: &str,
        mode: RecommendationMode,
        filters: SearchFilters,
    ) -> &[Book] {
        self.query = query.trim().to_string();
        self.mode = mode;
        self.filters = filters;
        self.message = None;
        self.warning = None;

        if self.query.is_empty() {
            self.results.clear();
            self.message = Some(EMPTY_QUERY_MESSAGE.to_string());
            return &self.results;
        }

        if let Err(e) = self.storage.push_recent_search(&self.query).await {
            tracing::warn!(error = %e, "Failed to record recent search");
        }

        tracing::info!(query = %self.query, mode = %self.mode, "Searching");

        self.loading = true;
        let result =
            fetch_recommendations(self.api.as_ref(), &self.query, self.mode, &self.filters).await;
        self.loading = false;

        match result {
            Ok(books) => {
                let outcome = apply_filters(&books, &self.filters);
                if outcome.fell_back {
                    self.warning = Some(FILTER_FALLBACK_WARNING.to_string());
                }
                if outcome.books.is_empty() {
                    self.message = Some(NO_RESULTS_MESSAGE.to_string());
                }
                tracing::info!(
                    fetched = books.len(),
                    shown = outcome.books.len(),
                    fell_back = outcome.fell_back,
                    "Search completed"
                );
                self.results = outcome.books;
            }
            Err(e) => {
                tracing::error!(error = %e, query = %self.query, "Search failed");
                self.results.clear();
                self.message = Some(SEARCH_FAILED_MESSAGE.to_string());
            }
        }

        &self.results
    }

    pub async fn recent_searches(&self) -> Vec<String> {
        self.storage.recent_searches().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockBookApi;
    use crate::error::AppError;

    fn catalog() -> Vec<Book> {
        vec![
            Book::new("The Hobbit", "J.R.R. Tolkien", 8.7).with_genre("Fantasy"),
            Book::new("Murder on the Orient Express", "Agatha Christie", 7.9)
                .with_genre("Mystery/Thriller"),
            Book::new("Emma", "Jane Austen", 5.2).with_genre("Romance"),
            Book::new("Untitled", "Anonymous", 6.0),
        ]
    }

    fn open_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_empty_filters_keep_everything() {
        let outcome = apply_filters(&catalog(), &SearchFilters::default());
        assert_eq!(outcome.books.len(), 4);
        assert!(!outcome.fell_back);
    }

    #[test]
    fn test_blank_strings_are_not_filters() {
        let filters = SearchFilters {
            genre: Some("  ".to_string()),
            ..SearchFilters::default()
        };
        assert!(filters.is_empty());
    }

    #[test]
    fn test_rating_bounds_inclusive() {
        let filters = SearchFilters {
            min_rating: Some(6.0),
            max_rating: Some(7.9),
            ..SearchFilters::default()
        };
        let titles: Vec<String> = apply_filters(&catalog(), &filters)
            .books
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Murder on the Orient Express", "Untitled"]);
    }

    #[test]
    fn test_genre_substring_case_insensitive() {
        let filters = SearchFilters {
            genre: Some("thriller".to_string()),
            ..SearchFilters::default()
        };
        let outcome = apply_filters(&catalog(), &filters);
        assert_eq!(outcome.books.len(), 1);
        assert_eq!(outcome.books[0].author, "Agatha Christie");
    }

    #[test]
    fn test_genre_filter_excludes_books_without_genre() {
        let book = Book::new("Untitled", "Anonymous", 6.0);
        let filters = SearchFilters {
            genre: Some("a".to_string()),
            ..SearchFilters::default()
        };
        assert!(!filters.matches(&book));
    }

    #[test]
    fn test_author_substring() {
        let filters = SearchFilters {
            author: Some("AUSTEN".to_string()),
            ..SearchFilters::default()
        };
        let outcome = apply_filters(&catalog(), &filters);
        assert_eq!(outcome.books[0].title, "Emma");
    }

    #[test]
    fn test_filters_emptying_results_fall_back() {
        let filters = SearchFilters {
            min_rating: Some(9.5),
            ..SearchFilters::default()
        };
        let outcome = apply_filters(&catalog(), &filters);
        assert!(outcome.fell_back);
        assert_eq!(outcome.books, catalog());
    }

    #[test]
    fn test_no_fallback_on_empty_input() {
        let filters = SearchFilters {
            min_rating: Some(9.5),
            ..SearchFilters::default()
        };
        let outcome = apply_filters(&[], &filters);
        assert!(!outcome.fell_back);
        assert!(outcome.books.is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_query_makes_no_request() {
        let mut api = MockBookApi::new();
        api.expect_recommend().never();
        let (_dir, storage) = open_storage();
        let mut screen = SearchScreen::new(Arc::new(api), storage.clone());

        let results = screen
            .search("   ", RecommendationMode::Title, SearchFilters::default())
            .await;
        assert!(results.is_empty());
        assert_eq!(screen.message.as_deref(), Some(EMPTY_QUERY_MESSAGE));
        assert!(storage.recent_searches().await.is_empty());
    }

    #[tokio::test]
    async fn test_search_filter_fallback_sets_warning() {
        let mut api = MockBookApi::new();
        api.expect_recommend()
            .withf(|q| q == "hobbit")
            .times(1)
            .returning(|_| Ok(catalog()));
        let (_dir, storage) = open_storage();
        let mut screen = SearchScreen::new(Arc::new(api), storage);

        let filters = SearchFilters {
            author: Some("Pratchett".to_string()),
            ..SearchFilters::default()
        };
        let shown = screen
            .search(" hobbit ", RecommendationMode::Title, filters)
            .await
            .len();
        assert_eq!(shown, 4);
        assert_eq!(screen.warning.as_deref(), Some(FILTER_FALLBACK_WARNING));
        assert_eq!(screen.message, None);
        assert!(!screen.loading);
    }

    #[tokio::test]
    async fn test_search_dispatches_by_mode() {
        let mut api = MockBookApi::new();
        api.expect_recommend_by_genre()
            .withf(|g| g == "Fantasy")
            .times(1)
            .returning(|_| Ok(vec![Book::new("The Hobbit", "J.R.R. Tolkien", 8.7)]));
        api.expect_recommend_by_author()
            .withf(|a| a == "Jane Austen")
            .times(1)
            .returning(|_| Ok(vec![Book::new("Emma", "Jane Austen", 5.2)]));
        api.expect_recommend_hybrid()
            .withf(|req| req.book_title == "Dune" && req.genre.as_deref() == Some("Science Fiction"))
            .times(1)
            .returning(|_| Ok(vec![Book::new("Dune Messiah", "Frank Herbert", 7.0)]));
        let (_dir, storage) = open_storage();
        let mut screen = SearchScreen::new(Arc::new(api), storage.clone());

        let first = screen
            .search("Fantasy", RecommendationMode::Genre, SearchFilters::default())
            .await[0]
            .title
            .clone();
        assert_eq!(first, "The Hobbit");

        let first = screen
            .search("Jane Austen", RecommendationMode::Author, SearchFilters::default())
            .await[0]
            .title
            .clone();
        assert_eq!(first, "Emma");

        let hybrid_filters = SearchFilters {
            genre: Some("Science Fiction".to_string()),
            ..SearchFilters::default()
        };
        let first = screen
            .search("Dune", RecommendationMode::Hybrid, hybrid_filters)
            .await[0]
            .title
            .clone();
        assert_eq!(first, "Dune Messiah");

        assert_eq!(
            storage.recent_searches().await,
            vec!["Dune".to_string(), "Jane Austen".to_string(), "Fantasy".to_string()]
        );
    }

    #[tokio::test]
    async fn test_search_failure_shows_message() {
        let mut api = MockBookApi::new();
        api.expect_recommend()
            .returning(|_| Err(AppError::Internal("connection refused".to_string())));
        let (_dir, storage) = open_storage();
        let mut screen = SearchScreen::new(Arc::new(api), storage);

        let results = screen
            .search("dune", RecommendationMode::Title, SearchFilters::default())
            .await;
        assert!(results.is_empty());
        assert_eq!(screen.message.as_deref(), Some(SEARCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_search_no_results_message() {
        let mut api = MockBookApi::new();
        api.expect_recommend().returning(|_| Ok(vec![]));
        let (_dir, storage) = open_storage();
        let mut screen = SearchScreen::new(Arc::new(api), storage);

        screen
            .search("zzzz", RecommendationMode::Title, SearchFilters::default())
            .await;
        assert_eq!(screen.message.as_deref(), Some(NO_RESULTS_MESSAGE));
        assert_eq!(screen.warning, None);
    }
}
