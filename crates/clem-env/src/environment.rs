//! Game trait and the environment that drives it

use clem_core::{
    Action, ActionSpace, ClemError, EnvConfig, Observation, RenderMode, Result, StepOutcome,
};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::render::{Rendered, png_data_url};
use crate::state::GameState;

pub const FORMAT_WARNING: &str = "Your response violated the format. Please try again.";
pub const ACTION_SPACE_WARNING: &str = "You cannot do that. Please try again.";
pub const IMAGE_NOTICE: &str = "[State image shown below]";

/// Per-game rules plugged into an [`Environment`]
///
/// The environment owns the base [`GameState`] and the step pipeline; a game
/// owns everything else and answers the questions below.
pub trait Game {
    /// (Re)build game state for a new episode
    fn reset(&mut self, config: &EnvConfig, players: &[String]) -> Result<()>;

    /// Action types `player` may use right now
    fn action_space(&self, player: &str) -> ActionSpace;

    /// Reject actions that are illegal in the current state with a warning
    fn is_action_valid_in_state(&self, player: &str, action: &Action) -> std::result::Result<(), String>;

    /// Apply an action that passed validation
    fn apply_action(&mut self, player: &str, action: &Action) -> Result<()>;

    /// `(terminated, success)` after a legal action by `player`
    fn check_won(&self, player: &str) -> (bool, bool);

    /// Prompt text for `player`, without the rendered state
    fn observation_text(&self, player: &str, state: &GameState) -> String;

    fn render_as_string(&self, player: Option<&str>) -> String;

    fn render_as_human_readable(&self, player: Option<&str>) -> String;

    fn render_as_image(&self, player: Option<&str>) -> Result<Vec<u8>>;

    /// Game-specific fields exported in the info snapshot
    fn public_state(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }

    /// Reward for the step just taken
    fn reward(&self, state: &GameState) -> f64 {
        if state.aborted { 0.0 } else { 1.0 }
    }
}

/// Environment state machine around a [`Game`]
#[derive(Debug)]
pub struct Environment<G: Game> {
    config: EnvConfig,
    game: G,
    state: GameState,
    players: Vec<String>,
    action_spaces: HashMap<String, ActionSpace>,
    observations: HashMap<String, Observation>,
    last_render: Option<Rendered>,
}

impl<G: Game> Environment<G> {
    pub fn new(config: EnvConfig, game: G) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            game,
            state: GameState::default(),
            players: Vec::new(),
            action_spaces: HashMap::new(),
            observations: HashMap::new(),
            last_render: None,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// Register a player; order of registration is turn order
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.players.contains(&name) {
            return Err(ClemError::DuplicatePlayer(name));
        }
        self.players.push(name);
        Ok(())
    }

    /// Start a new episode
    pub fn reset(&mut self) -> Result<()> {
        self.state = GameState::default();
        self.observations.clear();
        self.action_spaces.clear();
        self.last_render = None;

        self.game.reset(&self.config, &self.players)?;
        self.refresh_action_spaces();
        self.update_observations()?;
        debug!(players = self.players.len(), "environment reset");
        Ok(())
    }

    /// Execute one action for `player`
    ///
    /// Returns the reward, termination and abort flags and the public state.
    /// Only caller mistakes (unknown player, action without type) are errors.
    pub fn step(&mut self, player: &str, action: &Action) -> Result<StepOutcome> {
        info!(player = %player, "environment step");
        if !self.players.iter().any(|p| p == player) {
            return Err(ClemError::UnknownPlayer(player.to_string()));
        }
        action.action_type()?;

        self.state.begin_step();

        if self.max_moves_reached() {
            self.state.terminated = true;
            self.state.aborted = true;
            return Ok(StepOutcome {
                reward: 0.0,
                terminated: true,
                aborted: true,
                info: self.info(),
            });
        }

        if self.is_action_valid(player, action)? {
            self.game.apply_action(player, action)?;
            let (terminated, success) = self.game.check_won(player);
            self.state.settle(terminated, success);
            self.refresh_action_spaces();
            debug!(state = ?self.state, "new game state");
        } else {
            self.state.aborted = true;
            warn!(player = %player, ?action, warning = %self.state.warning, "action invalid");
        }

        self.update_observations()?;
        self.last_render = Some(self.render_state(Some(player))?);

        Ok(StepOutcome {
            reward: self.reward(),
            terminated: self.state.terminated,
            aborted: self.state.aborted,
            info: self.info(),
        })
    }

    fn max_moves_reached(&self) -> bool {
        match self.config.max_moves {
            Some(max) if self.state.moves >= max => {
                warn!(moves = self.state.moves, max, "max moves reached, will abort and terminate");
                true
            }
            _ => false,
        }
    }

    /// Validation chain; the first failing check sets the warning
    fn is_action_valid(&mut self, player: &str, action: &Action) -> Result<bool> {
        let action_type = action.action_type()?;

        if action.is_violated_format() {
            self.state.reject(FORMAT_WARNING);
            return Ok(false);
        }

        let in_space = self
            .action_spaces
            .get(player)
            .is_some_and(|space| space.contains(action_type));
        if !in_space {
            self.state.reject(ACTION_SPACE_WARNING);
            return Ok(false);
        }

        if let Err(warning) = self.game.is_action_valid_in_state(player, action) {
            self.state.reject(warning);
            return Ok(false);
        }

        Ok(true)
    }

    fn refresh_action_spaces(&mut self) {
        for player in &self.players {
            self.action_spaces
                .insert(player.clone(), self.game.action_space(player));
        }
    }

    /// Override the action space of a player until the next refresh
    pub fn set_action_space(&mut self, player: &str, space: ActionSpace) {
        self.action_spaces.insert(player.to_string(), space);
    }

    pub fn action_space(&self, player: &str) -> Option<&ActionSpace> {
        self.action_spaces.get(player)
    }

    /// Rebuild every player's observation from the current state
    pub fn update_observations(&mut self) -> Result<()> {
        let mut observations = HashMap::with_capacity(self.players.len());
        for player in &self.players {
            let mut text = String::new();
            if !self.state.warning.is_empty() {
                text.push_str(&self.state.warning);
                text.push_str("\n\n");
            }
            text.push_str(&self.game.observation_text(player, &self.state));
            let rendered = self.render_state(Some(player))?;
            observations.insert(player.clone(), self.create_observation(text, rendered));
        }
        self.observations = observations;
        Ok(())
    }

    /// Render the state as seen by `player`, or in full without one
    pub fn render_state(&self, player: Option<&str>) -> Result<Rendered> {
        Ok(match self.config.render_as {
            RenderMode::String => Rendered::Text(self.game.render_as_string(player)),
            RenderMode::HumanReadable => {
                Rendered::Text(self.game.render_as_human_readable(player))
            }
            RenderMode::Image => Rendered::Image(self.game.render_as_image(player)?),
        })
    }

    /// Last render produced by `step`, from the acting player's view
    pub fn last_render(&self) -> Option<&Rendered> {
        self.last_render.as_ref()
    }

    fn create_observation(&self, text: String, rendered: Rendered) -> Observation {
        match rendered {
            Rendered::Image(bytes) => Observation {
                content: text + IMAGE_NOTICE,
                image: vec![png_data_url(&bytes)],
            },
            Rendered::Text(render) => Observation::text(text + &render),
        }
    }

    /// Current observation of `player`
    pub fn observe(&self, player: &str) -> Result<&Observation> {
        self.observations
            .get(player)
            .ok_or_else(|| ClemError::UnknownPlayer(player.to_string()))
    }

    pub fn reward(&self) -> f64 {
        self.game.reward(&self.state)
    }

    /// Public state: base fields plus the game's exported fields
    pub fn info(&self) -> serde_json::Value {
        let mut map = match serde_json::to_value(&self.state) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        for (key, value) in self.game.public_state() {
            map.entry(key).or_insert(value);
        }
        serde_json::Value::Object(map)
    }

    /// SHA-256 over the public state and the unmasked string render
    pub fn state_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.info().to_string().as_bytes());
        hasher.update(self.game.render_as_string(None).as_bytes());
        hex::encode(hasher.finalize())
    }
}
