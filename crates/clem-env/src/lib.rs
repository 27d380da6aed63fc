//! # clem-env
//!
//! Game environment state machine for clem games.
//!
//! This crate provides:
//! - `Game` trait implemented per game, and the `Environment` that drives it
//!   through the reset/step/validate/render cycle
//! - `Grid` of cells holding stacks of placed objects
//! - Fog-of-war visibility (full, exploration memory, local window)
//! - String, glyph and PNG renderers over a visibility mask
//! - `GridWorld`, a grid with players placed on it

pub mod environment;
pub mod grid;
pub mod render;
pub mod state;
pub mod visibility;
pub mod world;

pub use environment::{Environment, Game};
pub use grid::{Grid, GridCell, Object, ObjectId, ObjectKind};
pub use render::{GridImageRenderer, PngGridRenderer, Rendered};
pub use state::{EpisodePhase, GameState};
pub use visibility::{FogOfWar, VisibilityMask, VisibilityRegime};
pub use world::{Direction, GridWorld};
