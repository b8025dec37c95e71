//! Retry decorator for the model round trip.
//!
//! Only the model call is safe to repeat: it has no side effects. Rate limits and
//! transport failures are retried with exponential backoff; every other failure is
//! returned immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{ModelClient, ModelError};

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

pub struct RetryingModelClient {
    inner: Arc<dyn ModelClient>,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryingModelClient {
    pub fn new(inner: Arc<dyn ModelClient>, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        // 1x, 2x, 4x ... of the base delay
        self.base_delay * (1u32 << (attempt - 1).min(16))
    }
}

#[async_trait]
impl ModelClient for RetryingModelClient {
    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Model call failed ({e}), retry {attempt}/{} after {}ms",
                        self.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
