use serde::Deserialize;
use std::{fmt, time::Duration};

use crate::services::related::RelatedStrategy;

/// Opaque credential supplied by the hosting application
///
/// Formatting never reveals the underlying value, so a `Config` can be logged safely.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key for building outgoing requests
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Completion (chat) API key, sent as a bearer token
    pub openai_api_key: ApiKey,

    /// Completion API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Model name passed in every completion request
    #[serde(default = "default_completion_model")]
    pub completion_model: String,

    /// Movie catalog API key
    pub tmdb_api_key: ApiKey,

    /// Movie catalog API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Maximum number of related items kept in an outcome
    #[serde(default = "default_related_limit")]
    pub related_limit: usize,

    /// How related items are looked up for a primary match
    #[serde(default)]
    pub related_strategy: RelatedStrategy,

    /// Language tag sent with recommendation lookups
    #[serde(default = "default_related_language")]
    pub related_language: String,

    /// Upper bound for each network stage of the pipeline
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_completion_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_related_limit() -> usize {
    10
}

fn default_related_language() -> String {
    "en-US".to_string()
}

fn default_stage_timeout_secs() -> u64 {
    15
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
