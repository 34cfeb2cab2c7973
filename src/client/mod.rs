/// Recommendation backend abstraction
///
/// Every screen talks to the backend through [`BookApi`] so it can be
/// exercised against a mock. [`HttpBookApi`] is the real implementation.
use crate::{
    error::AppResult,
    models::{
        AuthResponse, AuthorSummary, Book, BookDetails, Favorite, GenreSummary, HealthStatus,
        HybridRequest, LoginRequest, SignupRequest, VerifyResponse,
    },
};

pub mod http;
pub mod request_id;

pub use http::HttpBookApi;

/// One method per backend endpoint
///
/// List-returning methods never fail on an unexpected body shape; they
/// return an empty list instead. Methods taking a `token` send it as a
/// bearer credential and report rejection as `AppError::Unauthorized`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BookApi: Send + Sync {
    /// `POST /api/auth/signup`
    async fn signup(&self, request: &SignupRequest) -> AppResult<AuthResponse>;

    /// `POST /api/auth/login`
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse>;

    /// `GET /api/auth/verify`
    async fn verify(&self, token: &str) -> AppResult<VerifyResponse>;

    /// `POST /api/auth/logout`
    async fn logout(&self, token: &str) -> AppResult<()>;

    /// `GET /api/recommend?q=`
    async fn recommend(&self, query: &str) -> AppResult<Vec<Book>>;

    /// `GET /api/recommend/genre/{genre}`
    async fn recommend_by_genre(&self, genre: &str) -> AppResult<Vec<Book>>;

    /// `GET /api/recommend/author/{author}`
    async fn recommend_by_author(&self, author: &str) -> AppResult<Vec<Book>>;

    /// `POST /api/recommend/hybrid`
    async fn recommend_hybrid(&self, request: &HybridRequest) -> AppResult<Vec<Book>>;

    /// `GET /api/book/{title}`
    async fn book_details(&self, title: &str) -> AppResult<BookDetails>;

    /// `GET /api/genres`
    async fn genres(&self) -> AppResult<Vec<GenreSummary>>;

    /// `GET /api/authors`
    async fn authors(&self) -> AppResult<Vec<AuthorSummary>>;

    /// `GET /api/popular`
    async fn popular(&self) -> AppResult<Vec<Book>>;

    /// `GET /api/random`
    async fn random(&self) -> AppResult<Vec<Book>>;

    /// `GET /api/books/genre/{genre}`
    async fn books_by_genre(&self, genre: &str) -> AppResult<Vec<Book>>;

    /// `GET /api/health`
    async fn health(&self) -> AppResult<HealthStatus>;

    /// `GET /api/favorites`
    async fn favorites(&self, token: &str) -> AppResult<Vec<Favorite>>;

    /// `POST /api/favorites`
    async fn add_favorite(&self, token: &str, favorite: &Favorite) -> AppResult<()>;

    /// `DELETE /api/favorites?title=`
    async fn remove_favorite(&self, token: &str, title: &str) -> AppResult<()>;

    /// `POST /api/rate`
    async fn rate(&self, token: &str, title: &str, rating: u8) -> AppResult<()>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
