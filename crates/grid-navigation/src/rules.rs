//! Episode rules: instance setup and response parsing

use clem_backend::Player;
use clem_core::{Action, ClemError, EnvConfig, Position, Result};
use clem_env::Environment;
use clem_master::{EpisodeRules, Setup};
use tracing::debug;

use crate::game::{DIRECTION_PARAM, MOVE_ACTION, NavigationGame};

const MOVE_PREFIX: &str = "MOVE:";
const GAME_ROLE: &str = "Navigator";

/// Direction word of a `MOVE: <dir>` response
///
/// The word itself is not checked here; an unknown direction is a game-level
/// warning, not a format violation.
pub fn parse_move(response: &str) -> Option<&str> {
    let rest = response.trim().strip_prefix(MOVE_PREFIX)?.trim();
    let mut words = rest.split_whitespace();
    match (words.next(), words.next()) {
        (Some(word), None) => Some(word),
        _ => None,
    }
}

/// Sets up navigation instances: `{ "config": {...}, "goal": [row, col] }`
#[derive(Debug, Default)]
pub struct NavigationRules;

impl NavigationRules {
    pub fn new() -> Self {
        Self
    }
}

impl EpisodeRules for NavigationRules {
    type Game = NavigationGame;

    fn on_setup(
        &mut self,
        instance: &serde_json::Value,
        setup: &mut Setup<'_, NavigationGame>,
    ) -> Result<()> {
        let config = EnvConfig::from_value(
            instance
                .get("config")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({})),
        )?;
        let goal: Position = serde_json::from_value(
            instance
                .get("goal")
                .cloned()
                .ok_or_else(|| ClemError::Config("instance has no goal".into()))?,
        )?;

        let game = NavigationGame::new(&config, goal);
        setup.set_environment(Environment::new(config, game)?);
        for model in setup.player_models().to_vec() {
            let name = setup.add_player(Player::new(model, GAME_ROLE))?;
            debug!(player = %name, "navigator joined");
        }
        setup.reset_environment()
    }

    fn validate_response(&self, _player: &Player, response: &str) -> bool {
        parse_move(response).is_some()
    }

    fn parse_action(&self, player: &Player, response: &str) -> Result<Action> {
        let word = parse_move(response).ok_or_else(|| {
            ClemError::Config(format!("unparseable response from {}", player.name()))
        })?;
        Ok(Action::new(MOVE_ACTION).with_param(DIRECTION_PARAM, word.to_lowercase()))
    }
}
