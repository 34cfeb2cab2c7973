use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Which backend endpoint a search goes to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationMode {
    /// Content similarity to a title (`GET /api/recommend?q=`)
    #[default]
    Title,
    Genre,
    Author,
    /// `POST /api/recommend/hybrid`
    Hybrid,
}

impl Display for RecommendationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationMode::Title => write!(f, "title"),
            RecommendationMode::Genre => write!(f, "genre"),
            RecommendationMode::Author => write!(f, "author"),
            RecommendationMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for RecommendationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" | "content" => Ok(RecommendationMode::Title),
            "genre" => Ok(RecommendationMode::Genre),
            "author" => Ok(RecommendationMode::Author),
            "hybrid" => Ok(RecommendationMode::Hybrid),
            other => Err(format!("Unknown recommendation mode: {}", other)),
        }
    }
}

/// Body of `POST /api/recommend/hybrid`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HybridRequest {
    pub book_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Genre entry for filter pickers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreSummary {
    #[serde(alias = "genre")]
    pub name: String,
    #[serde(default, alias = "count")]
    pub book_count: Option<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default, alias = "avg_rating")]
    pub average_rating: Option<f64>,
}

/// Author entry for filter pickers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorSummary {
    #[serde(alias = "author")]
    pub name: String,
    #[serde(default, alias = "count")]
    pub book_count: Option<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default, alias = "avg_rating")]
    pub average_rating: Option<f64>,
}

impl From<String> for GenreSummary {
    fn from(name: String) -> Self {
        Self {
            name,
            book_count: None,
            popularity: None,
            average_rating: None,
        }
    }
}

impl From<String> for AuthorSummary {
    fn from(name: String) -> Self {
        Self {
            name,
            book_count: None,
            popularity: None,
            average_rating: None,
        }
    }
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub data_size: u64,
    #[serde(default)]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
