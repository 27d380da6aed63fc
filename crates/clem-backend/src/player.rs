//! Players: a model plus its conversation history

use clem_core::{Message, Result};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::model::{DEFAULT_RETRIES, Generation, Model, generate_with_retries};

/// A participant in a game, backed by a model
pub struct Player {
    name: String,
    game_role: String,
    model: Arc<dyn Model>,
    history: Vec<Message>,
    retries: u32,
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("game_role", &self.game_role)
            .field("model", &self.model.name())
            .field("history", &self.history.len())
            .finish()
    }
}

impl Player {
    /// Create an unnamed player; the game master assigns the name
    pub fn new(model: Arc<dyn Model>, game_role: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            game_role: game_role.into(),
            model,
            history: Vec::new(),
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn game_role(&self) -> &str {
        &self.game_role
    }

    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Whether two players are backed by the same model instance
    pub fn shares_model_with(&self, other: &Player) -> bool {
        Arc::ptr_eq(&self.model, &other.model)
    }

    /// History with `context` appended, without recording it
    pub(crate) fn context_history(&self, context: &Message) -> Vec<Message> {
        let mut messages = self.history.clone();
        messages.push(context.clone());
        messages
    }

    /// Record an exchange produced outside `respond`
    pub(crate) fn record_exchange(&mut self, context: Message, reply: &str) {
        self.history.push(context);
        self.history.push(Message::assistant(reply));
    }

    /// Show `context` to the model and return its reply
    pub async fn respond(&mut self, context: Message) -> Result<Generation> {
        let messages = self.context_history(&context);
        let generation = generate_with_retries(self.model.as_ref(), &messages, self.retries).await?;
        debug!(player = %self.name, model = %self.model.name(), "response received");
        self.record_exchange(context, &generation.text);
        Ok(generation)
    }

    /// Forget the conversation
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
