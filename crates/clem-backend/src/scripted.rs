//! Model that replays a fixed list of responses

use async_trait::async_trait;
use clem_core::{ClemError, Message, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

use crate::model::{Generation, Model};

/// Deterministic stand-in for a remote model
///
/// Responses are handed out in order across single and batched calls.
/// Used for programmatic players, replays and tests.
#[derive(Debug)]
pub struct ScriptedModel {
    name: String,
    responses: Mutex<VecDeque<String>>,
    batching: bool,
    calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new<I, S>(name: impl Into<String>, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            batching: true,
            calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
        }
    }

    /// Disable batched generation
    pub fn without_batching(mut self) -> Self {
        self.batching = false;
        self
    }

    /// Single generation calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Batched generation calls so far
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub async fn remaining(&self) -> usize {
        self.responses.lock().await.len()
    }

    fn generation(messages: &[Message], text: String) -> Result<Generation> {
        Ok(Generation {
            prompt: serde_json::to_value(messages)?,
            raw: serde_json::json!({ "response": text }),
            text,
        })
    }
}

#[async_trait]
impl Model for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_response(&self, messages: &[Message]) -> Result<Generation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = self
            .responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| ClemError::Model(format!("{}: no scripted responses left", self.name)))?;
        debug!(model = %self.name, response = %text, "scripted response");
        Self::generation(messages, text)
    }

    fn supports_batching(&self) -> bool {
        self.batching
    }

    async fn generate_batch_response(&self, batch: &[Vec<Message>]) -> Result<Vec<Generation>> {
        if !self.batching {
            return Err(ClemError::BatchingUnsupported(self.name.clone()));
        }
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().await;
        if responses.len() < batch.len() {
            return Err(ClemError::Model(format!(
                "{}: {} scripted responses left for a batch of {}",
                self.name,
                responses.len(),
                batch.len()
            )));
        }
        batch
            .iter()
            .map(|messages| {
                let text = responses.pop_front().unwrap_or_default();
                Self::generation(messages, text)
            })
            .collect()
    }
}
