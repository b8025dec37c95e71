use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::ModelProvider;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// No database URL means the in-memory store.
    pub database_url: Option<String>,
    pub model_provider: ModelProvider,
    pub model_api_key: String,
    pub model_name: String,
    pub model_base_url: String,
    pub model_timeout: Duration,
    pub model_max_retries: u32,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let model_provider: ModelProvider = match get("MODEL_PROVIDER") {
            Some(v) => v.parse()?,
            None => ModelProvider::Anthropic,
        };

        Ok(Config {
            database_url: get("DATABASE_URL"),
            model_provider,
            model_api_key: get("MODEL_API_KEY")
                .context("Required environment variable 'MODEL_API_KEY' is not set")?,
            model_name: get("MODEL_NAME")
                .unwrap_or_else(|| model_provider.default_model().to_string()),
            model_base_url: get("MODEL_BASE_URL")
                .unwrap_or_else(|| model_provider.default_base_url().to_string()),
            model_timeout: Duration::from_secs(
                parse_or(get("MODEL_TIMEOUT_SECS"), 60)
                    .context("MODEL_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            model_max_retries: parse_or(get("MODEL_MAX_RETRIES"), 0)
                .context("MODEL_MAX_RETRIES must be a non-negative integer")?,
            upload_dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            public_base_url: get("PUBLIC_BASE_URL").unwrap_or_default(),
            port: parse_or(get("PORT"), 8080).context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => Ok(v.trim().parse::<T>()?),
        None => Ok(default),
    }
}
