//! Navigation game state and rules of movement

use clem_core::{Action, ActionSpace, ClemError, EnvConfig, Position, Result};
use clem_env::{Direction, GameState, GridWorld, Object};
use tracing::info;

pub const MOVE_ACTION: &str = "move";
pub const DIRECTION_PARAM: &str = "direction";
pub const GOAL_SYMBOL: &str = "G";
pub const GOAL_GLYPH: &str = "🏁";

/// Players walk the grid; standing on the goal wins
#[derive(Debug)]
pub struct NavigationGame {
    world: GridWorld,
    goal: Position,
}

impl NavigationGame {
    pub fn new(config: &EnvConfig, goal: Position) -> Self {
        Self {
            world: GridWorld::new(config),
            goal,
        }
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn position(&self, player: &str) -> Option<Position> {
        self.world.player_position(player)
    }

    fn direction(action: &Action) -> std::result::Result<Direction, String> {
        let raw = action
            .param_str(DIRECTION_PARAM)
            .ok_or_else(|| "Say which direction to move in.".to_string())?;
        raw.parse()
    }
}

impl clem_env::Game for NavigationGame {
    fn reset(&mut self, _config: &EnvConfig, players: &[String]) -> Result<()> {
        self.world.reset(players)?;
        self.world
            .add_object(Object::new(self.goal, "Goal", GOAL_SYMBOL, GOAL_GLYPH))?;
        Ok(())
    }

    fn action_space(&self, _player: &str) -> ActionSpace {
        ActionSpace::new([MOVE_ACTION])
    }

    fn is_action_valid_in_state(&self, player: &str, action: &Action) -> std::result::Result<(), String> {
        let direction = Self::direction(action)?;
        self.world.check_move(player, direction)
    }

    fn apply_action(&mut self, player: &str, action: &Action) -> Result<()> {
        let direction = Self::direction(action).map_err(ClemError::Config)?;
        self.world.move_player(player, direction)?;
        Ok(())
    }

    fn check_won(&self, player: &str) -> (bool, bool) {
        let reached = self.position(player) == Some(self.goal);
        if reached {
            info!(player = %player, goal = %self.goal, "goal reached");
        }
        (reached, reached)
    }

    fn observation_text(&self, player: &str, _state: &GameState) -> String {
        let position = self
            .position(player)
            .map_or_else(|| "off the grid".to_string(), |p| p.to_string());
        format!(
            "You are {player} on a {}x{} grid, at {position}. \
             Reach the goal marked {GOAL_SYMBOL}. \
             Answer with MOVE: <n|s|e|w>.\n\n",
            self.world.width(),
            self.world.height(),
        )
    }

    fn render_as_string(&self, player: Option<&str>) -> String {
        self.world.render_string(player)
    }

    fn render_as_human_readable(&self, player: Option<&str>) -> String {
        self.world.render_human_readable(player)
    }

    fn render_as_image(&self, player: Option<&str>) -> Result<Vec<u8>> {
        self.world.render_image(player)
    }

    fn public_state(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert(
            "goal".into(),
            serde_json::json!([self.goal.row, self.goal.col]),
        );
        map
    }
}
