use serde::{Deserialize, Deserializer, Serialize};

/// A book as returned by the recommendation and catalog endpoints
///
/// `title` doubles as the identity of a book: favorites are keyed on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    #[serde(default = "unknown_author")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendation_factors: Vec<RecommendationFactor>,
}

/// One bar of the "why was this recommended" breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationFactor {
    pub factor: String,
    pub score: f64,
}

fn unknown_author() -> String {
    "Unknown".to_string()
}

/// Ratings arrive as numbers, numeric strings, or null depending on the endpoint
fn lenient_rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>, rating: f64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            rating,
            image: String::new(),
            similarity: None,
            genre: None,
            method: None,
            recommendation_reason: None,
            keywords: Vec::new(),
            recommendation_factors: Vec::new(),
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Same book by the favorites definition of identity
    pub fn same_title(&self, title: &str) -> bool {
        self.title == title
    }
}

/// Entry of the signed-in user's favorites list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub image: String,
    /// Not sent by every backend version; used for rating sort when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl From<&Book> for Favorite {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            image: book.image.clone(),
            rating: Some(book.rating),
        }
    }
}

/// Extended metadata for a single title, sourced by the backend from Google Books
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub ratings_count: Option<u64>,
    #[serde(default)]
    pub page_count: Option<u64>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub preview_link: Option<String>,
    #[serde(default)]
    pub info_link: Option<String>,
    #[serde(default)]
    pub image_links: Option<ImageLinks>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// The backend reports lookup misses in-band with a 200 status
    #[serde(default)]
    pub error: Option<String>,
}

/// Cover images keyed by resolution, largest first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
    pub thumbnail: Option<String>,
    pub small_thumbnail: Option<String>,
}

impl ImageLinks {
    /// Largest available image, skipping empty strings
    pub fn best(&self) -> Option<&str> {
        [
            &self.extra_large,
            &self.large,
            &self.medium,
            &self.small,
            &self.thumbnail,
            &self.small_thumbnail,
        ]
        .into_iter()
        .filter_map(|link| link.as_deref())
        .find(|link| !link.trim().is_empty())
    }
}
