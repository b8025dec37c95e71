/// Model client adapter: the single point of entry for generative-AI calls.
///
/// No other module talks to a provider directly. Provider-specific status codes and
/// error bodies are reduced to [`ModelError`] here, so callers only ever branch on
/// the four failure kinds.
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

pub mod anthropic;
pub mod gemini;
pub mod prompts;
pub mod retry;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use retry::RetryingModelClient;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Rate limited by provider: {message}")]
    RateLimited { message: String },

    #[error("Model '{model}' is not available: {message}")]
    ModelUnavailable { model: String, message: String },

    #[error("Provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ModelError {
    /// Failures that may succeed on a later identical request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::RateLimited { .. } | ModelError::Transport(_))
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        ModelError::Transport(e.to_string())
    }
}

/// One prompt in, one raw text reply out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Named model identifier sent to the provider.
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Anthropic,
    Gemini,
}

impl ModelProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            ModelProvider::Anthropic => anthropic::DEFAULT_MODEL,
            ModelProvider::Gemini => gemini::DEFAULT_MODEL,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ModelProvider::Anthropic => anthropic::DEFAULT_BASE_URL,
            ModelProvider::Gemini => gemini::DEFAULT_BASE_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelProvider::Anthropic => "anthropic",
            ModelProvider::Gemini => "gemini",
        }
    }
}

impl FromStr for ModelProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ModelProvider::Anthropic),
            "gemini" | "google" => Ok(ModelProvider::Gemini),
            other => anyhow::bail!("Unknown model provider '{other}' (expected anthropic or gemini)"),
        }
    }
}

/// Builds the configured client, wrapped in the retry decorator when retries are enabled.
pub fn build_model_client(config: &Config) -> anyhow::Result<Arc<dyn ModelClient>> {
    let http = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    let client: Arc<dyn ModelClient> = match config.model_provider {
        ModelProvider::Anthropic => Arc::new(AnthropicClient::new(
            http,
            config.model_api_key.clone(),
            config.model_name.clone(),
            config.model_base_url.clone(),
        )),
        ModelProvider::Gemini => Arc::new(GeminiClient::new(
            http,
            config.model_api_key.clone(),
            config.model_name.clone(),
            config.model_base_url.clone(),
        )),
    };

    if config.model_max_retries == 0 {
        return Ok(client);
    }
    Ok(Arc::new(RetryingModelClient::new(
        client,
        config.model_max_retries,
        retry::DEFAULT_BASE_DELAY,
    )))
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Maps a non-success provider response to the failure taxonomy.
///
/// Both supported providers wrap errors as `{"error": {"message": ...}}`; anything
/// else is matched against the raw body.
pub(crate) fn classify_failure(model: &str, status: u16, body: &str) -> ModelError {
    let (message, provider_status) = match serde_json::from_str::<ProviderErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (body.trim().to_string(), None),
    };
    let lower = message.to_lowercase();

    let rate_limited = status == 429
        || provider_status.as_deref() == Some("RESOURCE_EXHAUSTED")
        || lower.contains("quota")
        || lower.contains("rate limit")
        || lower.contains("too many requests");
    if rate_limited {
        return ModelError::RateLimited { message };
    }

    let model_missing = status == 404
        || (lower.contains("model")
            && (lower.contains("not found") || lower.contains("not supported")));
    if model_missing {
        return ModelError::ModelUnavailable {
            model: model.to_string(),
            message,
        };
    }

    ModelError::Provider { status, message }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use axum::http::{StatusCode, Uri};
    use axum::Router;

    use super::*;

    /// Serves `body` with `status` on `path` from a local listener; any other path gets 418.
    pub async fn spawn_stub(path: &str, status: StatusCode, body: &'static str) -> String {
        let expected = path.to_string();
        let app = Router::new().fallback(move |uri: Uri| {
            let expected = expected.clone();
            async move {
                if uri.path() == expected {
                    (status, body)
                } else {
                    (StatusCode::IM_A_TEAPOT, "unexpected path")
                }
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// An address nothing listens on.
    pub async fn closed_base_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    /// Replays a fixed sequence of outcomes, repeating the last one, and records prompts.
    pub struct ScriptedModel {
        outcomes: Vec<Result<String, ModelError>>,
        calls: AtomicU32,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new(outcomes: Vec<Result<String, ModelError>>) -> Self {
            assert!(!outcomes.is_empty());
            Self {
                outcomes,
                calls: AtomicU32::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn failing(error: ModelError) -> Self {
            Self::new(vec![Err(error)])
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let idx = n.min(self.outcomes.len() - 1);
            self.outcomes[idx].clone()
        }
    }
}
