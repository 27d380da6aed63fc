//! # clem-master
//!
//! Turn orchestration for clem games.
//!
//! This crate provides:
//! - `EpisodeRules` trait implemented per game
//! - `GameMaster`, the per-episode turn and round state machine
//! - Player roster with sequential naming
//! - Episode recorder and callbacks
//! - `play_episode`, the async loop between players and the master

pub mod callbacks;
pub mod master;
pub mod recorder;
pub mod roster;
pub mod runner;

pub use callbacks::{CallbackList, EpisodeCallback};
pub use master::{EpisodeRules, EpisodeScores, GameMaster, Setup};
pub use recorder::{EpisodeRecorder, InteractionRecord};
pub use roster::PlayerRoster;
pub use runner::play_episode;
