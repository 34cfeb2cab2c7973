use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from `BOOKQUEST_*` environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the recommendation backend
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Directory holding the cookie jar and local storage files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("bookquest"))
        .unwrap_or_else(|| PathBuf::from(".bookquest"))
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            data_dir: default_data_dir(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("BOOKQUEST_")
            .from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}
