//! Per-episode game state

use serde::{Deserialize, Serialize};

/// Base state every environment carries
///
/// Only these fields and the game's own `public_state` reach the info
/// snapshot. Game internals (grids, positions, exploration maps) live in the
/// game value and are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub terminated: bool,
    pub success: bool,
    pub aborted: bool,
    pub moves: u32,
    /// Feedback for the player after a rejected action
    pub warning: String,
}

/// Where an episode stands after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodePhase {
    Running,
    Won,
    Lost,
    Aborted,
}

impl GameState {
    /// Clear per-step flags and count the move
    pub(crate) fn begin_step(&mut self) {
        self.aborted = false;
        self.terminated = false;
        self.success = false;
        self.warning.clear();
        self.moves += 1;
    }

    /// Record the outcome of a legal action
    pub(crate) fn settle(&mut self, terminated: bool, success: bool) {
        self.terminated = terminated;
        self.success = terminated && success;
    }

    pub(crate) fn reject(&mut self, warning: impl Into<String>) {
        self.aborted = true;
        self.warning = warning.into();
    }

    /// Classify the state; an aborted step wins over everything else
    pub fn phase(&self) -> EpisodePhase {
        match (self.aborted, self.terminated, self.success) {
            (true, _, _) => EpisodePhase::Aborted,
            (false, true, true) => EpisodePhase::Won,
            (false, true, false) => EpisodePhase::Lost,
            (false, false, _) => EpisodePhase::Running,
        }
    }
}
