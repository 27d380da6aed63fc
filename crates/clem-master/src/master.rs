//! Game master: turn order, rounds and episode lifecycle
//!
//! A [`GameMaster`] drives one episode. Per-game behaviour (building the
//! environment, validating and parsing responses, turn policies, hooks) lives
//! in an [`EpisodeRules`] implementation; the master owns the roster, the
//! current turn and the round counter.

use clem_backend::{Model, Player};
use clem_core::metrics::{METRIC_ABORTED, METRIC_LOSE, METRIC_SUCCESS};
use clem_core::{Action, ClemError, Observation, Result};
use clem_env::{Environment, Game, GameState};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::recorder::{EpisodeRecorder, InteractionRecord};
use crate::roster::PlayerRoster;

/// Per-game contract the game master depends on
pub trait EpisodeRules {
    type Game: Game;

    /// Build and reset the environment and add every player
    fn on_setup(&mut self, instance: &serde_json::Value, setup: &mut Setup<'_, Self::Game>)
    -> Result<()>;

    /// Whether a raw response is well-formed enough to parse
    fn validate_response(&self, player: &Player, response: &str) -> bool;

    /// Turn a validated response into an action
    fn parse_action(&self, player: &Player, response: &str) -> Result<Action>;

    /// Index of the player after `current`
    fn next_player_index(&self, current: usize, num_players: usize) -> usize {
        (current + 1) % num_players
    }

    /// Whether the turn moves on after a step
    fn should_pass_turn(&self, aborted: bool) -> bool {
        !aborted
    }

    /// Whether reaching `index` starts a new round
    fn start_next_round(&self, index: usize) -> bool {
        index == 0
    }

    fn on_before_game(&mut self, _env: &Environment<Self::Game>) {}

    fn on_before_round(&mut self, _env: &Environment<Self::Game>) {}

    fn on_after_round(&mut self, _env: &Environment<Self::Game>) {}

    fn on_after_game(&mut self, _env: &Environment<Self::Game>) {}
}

/// Handle given to [`EpisodeRules::on_setup`]
pub struct Setup<'a, G: Game> {
    environment: &'a mut Option<Environment<G>>,
    roster: &'a mut PlayerRoster,
    recorder: &'a mut dyn EpisodeRecorder,
    player_models: &'a [Arc<dyn Model>],
}

impl<'a, G: Game> Setup<'a, G> {
    /// Install the environment for this episode
    pub fn set_environment(&mut self, environment: Environment<G>) {
        *self.environment = Some(environment);
    }

    /// Models handed to the game master, one per intended player
    pub fn player_models(&self) -> &[Arc<dyn Model>] {
        self.player_models
    }

    /// Name a player, log it and register it with the environment
    ///
    /// The environment must be installed first.
    pub fn add_player(&mut self, player: Player) -> Result<String> {
        let env = self
            .environment
            .as_mut()
            .ok_or_else(|| ClemError::Config("set the environment before adding players".into()))?;
        let game_role = player.game_role().to_string();
        let model_name = player.model_name().to_string();
        let name = self.roster.register(player)?;
        env.add_player(name.clone())?;
        self.recorder.log_player(&name, &game_role, &model_name);
        Ok(name)
    }

    pub fn environment_mut(&mut self) -> Option<&mut Environment<G>> {
        self.environment.as_mut()
    }

    /// Reset the installed environment with the players added so far
    pub fn reset_environment(&mut self) -> Result<()> {
        self.environment
            .as_mut()
            .ok_or(ClemError::NotStarted)?
            .reset()
    }
}

/// Exclusive outcome of a finished episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpisodeScores {
    pub aborted: bool,
    pub success: bool,
    pub lose: bool,
}

impl EpisodeScores {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            aborted: state.aborted,
            success: state.success,
            lose: !state.success && !state.aborted,
        }
    }
}

/// Drives one episode of a game
pub struct GameMaster<R: EpisodeRules, L: EpisodeRecorder = InteractionRecord> {
    rules: R,
    player_models: Vec<Arc<dyn Model>>,
    roster: PlayerRoster,
    environment: Option<Environment<R::Game>>,
    recorder: L,
    current: Option<usize>,
    round: u32,
    scores: Option<EpisodeScores>,
}

impl<R: EpisodeRules> GameMaster<R> {
    pub fn new(rules: R, player_models: Vec<Arc<dyn Model>>) -> Self {
        Self {
            rules,
            player_models,
            roster: PlayerRoster::new(),
            environment: None,
            recorder: InteractionRecord::new(),
            current: None,
            round: 0,
            scores: None,
        }
    }
}

impl<R: EpisodeRules, L: EpisodeRecorder> GameMaster<R, L> {
    /// Replace the recorder; use before `setup`
    pub fn with_recorder<M: EpisodeRecorder>(self, recorder: M) -> GameMaster<R, M> {
        GameMaster {
            rules: self.rules,
            player_models: self.player_models,
            roster: self.roster,
            environment: self.environment,
            recorder,
            current: self.current,
            round: self.round,
            scores: self.scores,
        }
    }

    /// Prepare the episode described by `instance`
    ///
    /// A game master runs a single episode; a second setup is rejected.
    pub fn setup(&mut self, instance: &serde_json::Value) -> Result<()> {
        if self.has_started() {
            return Err(ClemError::Config("episode is already set up".into()));
        }
        let mut setup = Setup {
            environment: &mut self.environment,
            roster: &mut self.roster,
            recorder: &mut self.recorder,
            player_models: &self.player_models,
        };
        self.rules.on_setup(instance, &mut setup)?;

        let env = self
            .environment
            .as_ref()
            .ok_or_else(|| ClemError::Config("setup did not create an environment".into()))?;
        if self.roster.is_empty() {
            return Err(ClemError::Config("setup did not add any players".into()));
        }

        self.current = Some(0);
        self.round = 0;
        self.scores = None;
        info!(players = self.roster.len(), "episode set up");
        self.rules.on_before_game(env);
        Ok(())
    }

    /// Play the current player's `response`
    ///
    /// Returns whether the episode is over and the environment's public state.
    pub fn step(&mut self, response: &str) -> Result<(bool, serde_json::Value)> {
        let index = self.current.ok_or(ClemError::NotStarted)?;
        let env = self.environment.as_mut().ok_or(ClemError::NotStarted)?;
        let player = self.roster.get(index).ok_or(ClemError::NotStarted)?;

        self.recorder.count_request();
        let action = if self.rules.validate_response(player, response) {
            let action = self.rules.parse_action(player, response)?;
            self.recorder.count_request_parsed();
            action
        } else {
            debug!(player = %player.name(), "response failed validation");
            Action::violated_format()
        };

        let outcome = env.step(player.name(), &action)?;
        self.recorder.log_to_self("state", outcome.info.clone());
        self.recorder
            .log_to_self("reward", serde_json::json!(outcome.reward));

        if outcome.aborted && outcome.reward == 0.0 {
            self.recorder.count_request_violation();
        }

        if outcome.terminated {
            self.rules.on_after_game(env);
            self.recorder.log_game_end();
            self.end_game();
            return Ok((true, outcome.info));
        }

        if self.rules.should_pass_turn(outcome.aborted) {
            let next = self.rules.next_player_index(index, self.roster.len());
            self.current = Some(next);
            if self.rules.start_next_round(next) {
                self.rules.on_after_round(env);
                self.round += 1;
                self.recorder.log_next_round();
                info!(round = self.round, "round advanced");
                self.rules.on_before_round(env);
            }
        }

        Ok((false, outcome.info))
    }

    /// Score the finished episode and reset the players
    fn end_game(&mut self) {
        let Some(env) = self.environment.as_ref() else {
            return;
        };
        let scores = EpisodeScores::from_state(env.state());
        self.recorder
            .log_key(METRIC_ABORTED, serde_json::json!(u8::from(scores.aborted)));
        self.recorder
            .log_key(METRIC_SUCCESS, serde_json::json!(u8::from(scores.success)));
        self.recorder
            .log_key(METRIC_LOSE, serde_json::json!(u8::from(scores.lose)));
        self.roster.reset_players();
        info!(?scores, rounds = self.round + 1, "episode finished");
        self.scores = Some(scores);
    }

    pub fn is_done(&self) -> bool {
        self.environment
            .as_ref()
            .is_some_and(|env| env.state().terminated)
    }

    pub fn has_started(&self) -> bool {
        self.current.is_some() && self.environment.is_some()
    }

    /// Current player and what it sees
    pub fn observe(&self) -> Result<(&Player, &Observation)> {
        let player = self.current_player().ok_or(ClemError::NotStarted)?;
        let env = self.environment.as_ref().ok_or(ClemError::NotStarted)?;
        Ok((player, env.observe(player.name())?))
    }

    pub fn get_players(&self) -> &[Player] {
        self.roster.players()
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current.and_then(|index| self.roster.get(index))
    }

    pub fn current_player_mut(&mut self) -> Option<&mut Player> {
        self.current.and_then(|index| self.roster.get_mut(index))
    }

    pub fn current_player_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_round(&self) -> u32 {
        self.round
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn environment(&self) -> Option<&Environment<R::Game>> {
        self.environment.as_ref()
    }

    pub fn recorder(&self) -> &L {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut L {
        &mut self.recorder
    }

    /// Scores of the finished episode
    pub fn scores(&self) -> Option<EpisodeScores> {
        self.scores
    }
}
