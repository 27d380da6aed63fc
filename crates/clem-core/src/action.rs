//! Action types and action spaces

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ClemError, Result};

/// Label identifying the kind of an action
pub type ActionType = String;

/// Action type signalling a response that broke the format rules
pub const VIOLATED_FORMAT: &str = "violated_format";

/// An action a player submits to the environment
///
/// Game-specific parameters are flattened next to `action_type`, so the JSON
/// form reads naturally: `{"action_type": "move", "direction": "n"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Tag selecting how the environment interprets the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ActionType>,
    /// All other fields
    #[serde(flatten, default)]
    pub params: HashMap<String, serde_json::Value>,
}

impl Action {
    /// Create an action of the given type without parameters
    pub fn new(action_type: impl Into<ActionType>) -> Self {
        Self {
            action_type: Some(action_type.into()),
            params: HashMap::new(),
        }
    }

    /// The action produced for responses that violate the format
    pub fn violated_format() -> Self {
        Self::new(VIOLATED_FORMAT)
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The action type, or [`ClemError::MissingActionType`] if the caller never set one
    pub fn action_type(&self) -> Result<&str> {
        self.action_type
            .as_deref()
            .ok_or(ClemError::MissingActionType)
    }

    /// Whether this is the format-violation sentinel
    pub fn is_violated_format(&self) -> bool {
        self.action_type.as_deref() == Some(VIOLATED_FORMAT)
    }

    /// String parameter lookup
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }
}

/// Action types a player may use at the current turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSpace {
    labels: Vec<ActionType>,
}

impl ActionSpace {
    /// Create an action space from labels
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ActionType>,
    {
        let mut space = Self::default();
        for label in labels {
            space.insert(label);
        }
        space
    }

    /// Add a label (duplicates are ignored)
    pub fn insert(&mut self, label: impl Into<ActionType>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn labels(&self) -> &[ActionType] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_flat_params() {
        let json = r#"{"action_type": "move", "direction": "n"}"#;
        let action: Action = serde_json::from_str(json).unwrap();

        assert_eq!(action.action_type().unwrap(), "move");
        assert_eq!(action.param_str("direction"), Some("n"));

        let serialized = serde_json::to_string(&action).unwrap();
        assert!(serialized.contains("\"action_type\":\"move\""));
        assert!(serialized.contains("\"direction\":\"n\""));
        assert!(!serialized.contains("\"params\":"));
    }

    #[test]
    fn test_missing_action_type() {
        let action: Action = serde_json::from_str(r#"{"direction": "n"}"#).unwrap();
        assert!(matches!(
            action.action_type(),
            Err(ClemError::MissingActionType)
        ));
    }

    #[test]
    fn test_violated_format_sentinel() {
        let action = Action::violated_format();
        assert!(action.is_violated_format());
        assert_eq!(action.action_type().unwrap(), VIOLATED_FORMAT);
        assert!(!Action::new("move").is_violated_format());
    }

    #[test]
    fn test_action_space_dedup() {
        let mut space = ActionSpace::new(["move", "wait"]);
        space.insert("move");
        assert_eq!(space.labels().len(), 2);
        assert!(space.contains("wait"));
        assert!(!space.contains("jump"));
    }
}
