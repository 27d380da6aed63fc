//! Error types for clem environments

use thiserror::Error;

/// Result type for clem operations
pub type Result<T> = std::result::Result<T, ClemError>;

/// Clem error types
///
/// Only configuration mistakes and collaborator failures are errors. Illegal
/// moves and malformed responses are ordinary turn outcomes and are reported
/// through the game state warning instead.
#[derive(Debug, Error)]
pub enum ClemError {
    /// A player with this name is already registered
    #[error("Player names must be unique, but there is already a player registered with name '{0}'")]
    DuplicatePlayer(String),

    /// Player is not known to the environment
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    /// Object placed outside the grid
    #[error("Position ({row}, {col}) is out of bounds")]
    OutOfBounds { row: i32, col: i32 },

    /// Action without an action type
    #[error("No action type in action")]
    MissingActionType,

    /// Unsupported `render_as` value
    #[error("Invalid render_as value: {0}")]
    UnknownRenderMode(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation requires a set-up episode
    #[error("Game has not been set up")]
    NotStarted,

    /// Model backend failure
    #[error("Model error: {0}")]
    Model(String),

    /// Batched generation called with inconsistent inputs
    #[error(
        "`players` and `contexts` must have the same length (players: {players}, contexts: {contexts}, row_ids: {row_ids})"
    )]
    BatchLengthMismatch {
        players: usize,
        contexts: usize,
        row_ids: usize,
    },

    /// Model cannot serve batched requests
    #[error("Model '{0}' does not implement `generate_batch_response()`")]
    BatchingUnsupported(String),

    /// Rendering failure
    #[error("Render error: {0}")]
    Render(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for ClemError {
    fn from(err: serde_json::Error) -> Self {
        ClemError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ClemError {
    fn from(err: std::io::Error) -> Self {
        ClemError::Io(err.to_string())
    }
}

impl ClemError {
    /// Whether the error reflects a misconfigured game rather than a runtime failure
    pub fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            ClemError::DuplicatePlayer(_)
                | ClemError::OutOfBounds { .. }
                | ClemError::MissingActionType
                | ClemError::UnknownRenderMode(_)
                | ClemError::Config(_)
        )
    }
}
