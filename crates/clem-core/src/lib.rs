//! # clem-core
//!
//! Core types shared by clem game environments and game masters.
//!
//! This crate provides the foundational types used across the workspace:
//! - Actions, action spaces and the `violated_format` sentinel
//! - Observations and chat messages exchanged with players
//! - Environment configuration read from game instances
//! - Grid positions
//! - Episode metric keys

pub mod action;
pub mod config;
pub mod error;
pub mod metrics;
pub mod observation;
pub mod position;

pub use action::{Action, ActionSpace, ActionType, VIOLATED_FORMAT};
pub use config::{EnvConfig, GridConfig, RenderMode};
pub use error::{ClemError, Result};
pub use observation::{Message, Observation, Role, StepOutcome};
pub use position::Position;
