/// HTTP implementation of the recommendation backend
///
/// All endpoints live under `{base_url}/api/`. Responses are read as text
/// and parsed leniently: list endpoints go through the normalizers in
/// `models`, single-object endpoints are decoded strictly.
use crate::{
    client::{
        request_id::{request_span, RequestId, REQUEST_ID_HEADER},
        BookApi,
    },
    config::Config,
    error::{AppError, AppResult},
    models::{
        normalize_authors, normalize_books, normalize_favorites, normalize_genres, AuthResponse,
        AuthorSummary, Book, BookDetails, Favorite, GenreSummary, HealthStatus, HybridRequest,
        LoginRequest, SignupRequest, VerifyResponse,
    },
};
use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode, Url};
use serde_json::{json, Value};
use tracing::Instrument;

#[derive(Clone)]
pub struct HttpBookApi {
    http_client: HttpClient,
    base_url: Url,
}

impl HttpBookApi {
    /// Builds a client for the backend at `config.api_url`
    pub fn new(config: &Config) -> AppResult<Self> {
        let base_url = Url::parse(config.base_url())
            .map_err(|e| AppError::InvalidInput(format!("Invalid API URL {}: {}", config.api_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::InvalidInput(format!(
                "API URL {} cannot be used as a base URL",
                config.api_url
            )));
        }

        let http_client = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()?;

        tracing::info!(base_url = %base_url, "Backend client configured");

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// `{base}/api/{segments...}` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let builder = self.http_client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the parsed body
    ///
    /// A body that is empty or not JSON becomes `Value::Null`. 401 maps to
    /// `Unauthorized`; any other non-success status maps to `Api`.
    async fn send(&self, builder: RequestBuilder) -> AppResult<Value> {
        let request = builder.build()?;
        let request_id = RequestId::new();
        let span = request_span(request.method().as_str(), request.url().path(), &request_id);

        async move {
            let mut request = request;
            if let Ok(value) = request_id.as_str().parse() {
                request.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            let response = self.http_client.execute(request).await.map_err(|e| {
                tracing::error!(error = %e, "Backend request failed");
                AppError::HttpClient(e)
            })?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let value = parse_body(&body);

            tracing::debug!(status = %status, bytes = body.len(), "Backend responded");

            if status == StatusCode::UNAUTHORIZED {
                return Err(AppError::Unauthorized(
                    error_message(&value).unwrap_or_else(|| "Authentication required".to_string()),
                ));
            }

            if !status.is_success() {
                tracing::warn!(status = %status, "Backend returned an error status");
                return Err(AppError::Api {
                    status,
                    message: error_message(&value).unwrap_or_default(),
                });
            }

            Ok(value)
        }
        .instrument(span)
        .await
    }

    async fn get_books(&self, segments: &[&str]) -> AppResult<Vec<Book>> {
        let url = self.endpoint(segments)?;
        let value = self.send(self.request(Method::GET, url, None)).await?;
        let books = normalize_books(value);
        tracing::info!(
            endpoint = %segments.join("/"),
            count = books.len(),
            "Fetched books"
        );
        Ok(books)
    }
}

fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Backend response was not JSON");
        Value::Null
    })
}

/// The backend reports failures under `error` or `message`
fn error_message(value: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait::async_trait]
impl BookApi for HttpBookApi {
    async fn signup(&self, request: &SignupRequest) -> AppResult<AuthResponse> {
        let url = self.endpoint(&["auth", "signup"])?;
        let value = self
            .send(self.request(Method::POST, url, None).json(request))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        let url = self.endpoint(&["auth", "login"])?;
        let value = self
            .send(self.request(Method::POST, url, None).json(request))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn verify(&self, token: &str) -> AppResult<VerifyResponse> {
        let url = self.endpoint(&["auth", "verify"])?;
        let value = self.send(self.request(Method::GET, url, Some(token))).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn logout(&self, token: &str) -> AppResult<()> {
        let url = self.endpoint(&["auth", "logout"])?;
        self.send(self.request(Method::POST, url, Some(token))).await?;
        Ok(())
    }

    async fn recommend(&self, query: &str) -> AppResult<Vec<Book>> {
        let url = self.endpoint(&["recommend"])?;
        let value = self
            .send(self.request(Method::GET, url, None).query(&[("q", query)]))
            .await?;
        let books = normalize_books(value);
        tracing::info!(query = %query, count = books.len(), "Title recommendations fetched");
        Ok(books)
    }

    async fn recommend_by_genre(&self, genre: &str) -> AppResult<Vec<Book>> {
        self.get_books(&["recommend", "genre", genre]).await
    }

    async fn recommend_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        self.get_books(&["recommend", "author", author]).await
    }

    async fn recommend_hybrid(&self, request: &HybridRequest) -> AppResult<Vec<Book>> {
        let url = self.endpoint(&["recommend", "hybrid"])?;
        let value = self
            .send(self.request(Method::POST, url, None).json(request))
            .await?;
        let books = normalize_books(value);
        tracing::info!(
            book_title = %request.book_title,
            count = books.len(),
            "Hybrid recommendations fetched"
        );
        Ok(books)
    }

    async fn book_details(&self, title: &str) -> AppResult<BookDetails> {
        let url = self.endpoint(&["book", title])?;
        let value = self.send(self.request(Method::GET, url, None)).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn genres(&self) -> AppResult<Vec<GenreSummary>> {
        let url = self.endpoint(&["genres"])?;
        let value = self.send(self.request(Method::GET, url, None)).await?;
        Ok(normalize_genres(value))
    }

    async fn authors(&self) -> AppResult<Vec<AuthorSummary>> {
        let url = self.endpoint(&["authors"])?;
        let value = self.send(self.request(Method::GET, url, None)).await?;
        Ok(normalize_authors(value))
    }

    async fn popular(&self) -> AppResult<Vec<Book>> {
        self.get_books(&["popular"]).await
    }

    async fn random(&self) -> AppResult<Vec<Book>> {
        self.get_books(&["random"]).await
    }

    async fn books_by_genre(&self, genre: &str) -> AppResult<Vec<Book>> {
        self.get_books(&["books", "genre", genre]).await
    }

    async fn health(&self) -> AppResult<HealthStatus> {
        let url = self.endpoint(&["health"])?;
        let value = self.send(self.request(Method::GET, url, None)).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn favorites(&self, token: &str) -> AppResult<Vec<Favorite>> {
        let url = self.endpoint(&["favorites"])?;
        let value = self.send(self.request(Method::GET, url, Some(token))).await?;
        if !value.is_array() {
            tracing::warn!("Favorites response was not an array, treating as empty");
        }
        Ok(normalize_favorites(value))
    }

    async fn add_favorite(&self, token: &str, favorite: &Favorite) -> AppResult<()> {
        let url = self.endpoint(&["favorites"])?;
        let body = json!({
            "title": favorite.title,
            "author": favorite.author,
            "image": favorite.image,
        });
        self.send(self.request(Method::POST, url, Some(token)).json(&body))
            .await?;
        tracing::info!(title = %favorite.title, "Added favorite");
        Ok(())
    }

    async fn remove_favorite(&self, token: &str, title: &str) -> AppResult<()> {
        let url = self.endpoint(&["favorites"])?;
        self.send(
            self.request(Method::DELETE, url, Some(token))
                .query(&[("title", title)]),
        )
        .await?;
        tracing::info!(title = %title, "Removed favorite");
        Ok(())
    }

    async fn rate(&self, token: &str, title: &str, rating: u8) -> AppResult<()> {
        let url = self.endpoint(&["rate"])?;
        let body = json!({ "title": title, "rating": rating });
        self.send(self.request(Method::POST, url, Some(token)).json(&body))
            .await?;
        tracing::info!(title = %title, rating = rating, "Rating saved");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
