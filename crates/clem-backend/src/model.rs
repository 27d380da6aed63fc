//! Model trait and retry policy

use async_trait::async_trait;
use clem_core::{ClemError, Message, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::warn;

/// Attempts made for each generation call
pub const DEFAULT_RETRIES: u32 = 3;

/// One generation: what was sent, what came back, and the reply text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Generation {
    /// Prompt as the backend received it
    pub prompt: serde_json::Value,
    /// Raw backend response
    pub raw: serde_json::Value,
    /// Extracted reply text
    pub text: String,
}

/// A text generation backend
///
/// Implementations talk to a remote API or produce responses locally. Several
/// players may share one model instance (`Arc<dyn Model>`).
#[async_trait]
pub trait Model: Send + Sync {
    /// Model name used in logs and records
    fn name(&self) -> &str;

    /// Generate a reply to a message history
    async fn generate_response(&self, messages: &[Message]) -> Result<Generation>;

    /// Whether `generate_batch_response` is implemented
    fn supports_batching(&self) -> bool {
        false
    }

    /// Generate one reply per history, in input order
    async fn generate_batch_response(&self, _batch: &[Vec<Message>]) -> Result<Vec<Generation>> {
        Err(ClemError::BatchingUnsupported(self.name().to_string()))
    }
}

/// Run `call` up to `attempts` times, returning the first success or the last error
pub async fn with_retries<T, F, Fut>(model_name: &str, attempts: u32, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!(model = %model_name, attempt, attempts, error = %e, "generation failed, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// `generate_response` with bounded retries
pub async fn generate_with_retries(
    model: &dyn Model,
    messages: &[Message],
    attempts: u32,
) -> Result<Generation> {
    with_retries(model.name(), attempts, || model.generate_response(messages)).await
}
