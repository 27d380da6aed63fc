//! Observation and message types

use serde::{Deserialize, Serialize};

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message in a player's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Image data URLs attached to the message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            image: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            image: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            image: Vec::new(),
        }
    }
}

/// What a player perceives of the environment after a step
///
/// From the player's perspective an observation is always a user turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    /// Prompt text, including any pending warning
    pub content: String,
    /// Image data URLs (`data:image/png;base64,...`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<String>,
}

impl Observation {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            image: Vec::new(),
        }
    }

    pub fn role(&self) -> Role {
        Role::User
    }
}

impl From<Observation> for Message {
    fn from(obs: Observation) -> Self {
        Message {
            role: Role::User,
            content: obs.content,
            image: obs.image,
        }
    }
}

/// Result of one environment step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Scalar reward for the step
    pub reward: f64,
    /// Episode finished (won, lost or cut off)
    pub terminated: bool,
    /// The step was rejected or cut off
    pub aborted: bool,
    /// Public state snapshot
    pub info: serde_json::Value,
}
