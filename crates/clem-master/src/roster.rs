//! Player roster and naming

use clem_backend::Player;
use clem_core::{ClemError, Result};

/// Players of one episode, in turn order
///
/// Append-only: players are named `Player 1`, `Player 2`, ... as they join.
#[derive(Debug, Default)]
pub struct PlayerRoster {
    players: Vec<Player>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name and register a player, returning the assigned name
    pub fn register(&mut self, mut player: Player) -> Result<String> {
        let name = format!("Player {}", self.players.len() + 1);
        if self.contains(&name) {
            return Err(ClemError::DuplicatePlayer(name));
        }
        player.set_name(name.clone());
        self.players.push(player);
        Ok(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name() == name)
    }

    pub fn get(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name() == name)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Clear every player's conversation
    pub fn reset_players(&mut self) {
        for player in &mut self.players {
            player.reset();
        }
    }
}
