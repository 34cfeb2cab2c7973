use std::sync::Arc;

use reqwest::Url;

use crate::{
    client::BookApi,
    models::{Book, BookDetails},
};

pub const DETAILS_FAILED_MESSAGE: &str = "Failed to load book details";

const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/200x300/4a5568/ffffff";
const PLACEHOLDER_TITLE_CHARS: usize = 20;

/// Placeholder cover carrying the start of the title
pub fn placeholder_image(title: &str) -> String {
    let label: String = title.chars().take(PLACEHOLDER_TITLE_CHARS).collect();
    match Url::parse(PLACEHOLDER_BASE) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("text", &label);
            url.to_string()
        }
        Err(_) => PLACEHOLDER_BASE.to_string(),
    }
}

/// Best cover for the modal
///
/// Largest details image first, then the list image of the book that was
/// clicked, then a placeholder.
pub fn cover_image(details: Option<&BookDetails>, book: &Book) -> String {
    details
        .and_then(|d| d.image_links.as_ref())
        .and_then(|links| links.best())
        .map(str::to_string)
        .or_else(|| {
            let image = book.image.trim();
            (!image.is_empty() && !image.eq_ignore_ascii_case("nan")).then(|| image.to_string())
        })
        .unwrap_or_else(|| placeholder_image(&book.title))
}

/// State of the book detail modal
pub struct DetailsScreen {
    api: Arc<dyn BookApi>,
    pub book: Option<Book>,
    pub details: Option<BookDetails>,
    pub loading: bool,
    pub message: Option<String>,
}

impl DetailsScreen {
    pub fn new(api: Arc<dyn BookApi>) -> Self {
        Self {
            api,
            book: None,
            details: None,
            loading: false,
            message: None,
        }
    }

    /// Fetches extended metadata for `book`
    pub async fn open(&mut self, book: Book) -> Option<&BookDetails> {
        self.details = None;
        self.message = None;

        self.loading = true;
        let result = self.api.book_details(&book.title).await;
        self.loading = false;

        match result {
            Ok(details) => match details.error.as_deref().filter(|e| !e.trim().is_empty()) {
                Some(error) => {
                    tracing::info!(title = %book.title, error = %error, "No details available");
                    self.message = Some(error.to_string());
                }
                None => {
                    tracing::info!(title = %book.title, source = ?details.source, "Details loaded");
                    self.details = Some(details);
                }
            },
            Err(e) => {
                tracing::error!(error = %e, title = %book.title, "Failed to load details");
                self.message = Some(DETAILS_FAILED_MESSAGE.to_string());
            }
        }

        self.book = Some(book);
        self.details.as_ref()
    }

    pub fn close(&mut self) {
        self.book = None;
        self.details = None;
        self.message = None;
    }

    /// Cover for the open book, if any
    pub fn cover(&self) -> Option<String> {
        self.book
            .as_ref()
            .map(|book| cover_image(self.details.as_ref(), book))
    }
}
