//! Model collaborators for clem games
//!
//! This crate provides:
//! - `Model` trait wrapping a text generation backend
//! - Bounded retries around generation calls
//! - `ScriptedModel` replaying fixed responses
//! - `Player`, a model plus its conversation history
//! - `batch_response`, one generation call per distinct shared model

pub mod batch;
pub mod model;
pub mod player;
pub mod scripted;

pub use batch::{RowId, batch_response};
pub use model::{DEFAULT_RETRIES, Generation, Model, generate_with_retries, with_retries};
pub use player::Player;
pub use scripted::ScriptedModel;
