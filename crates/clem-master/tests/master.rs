//! Turn order, rounds, scoring and the episode loop

use clem_backend::{Model, Player, ScriptedModel};
use clem_core::metrics::{
    METRIC_ABORTED, METRIC_LOSE, METRIC_REQUEST_COUNT, METRIC_REQUEST_COUNT_VIOLATED,
    METRIC_SUCCESS,
};
use clem_core::{Action, ActionSpace, ClemError, EnvConfig, Result, VIOLATED_FORMAT};
use clem_env::{Environment, Game, GameState};
use clem_master::{
    CallbackList, EpisodeCallback, EpisodeRules, EpisodeScores, GameMaster, Setup, play_episode,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Players take turns saying a word; `stop` wins, `lose` loses, `hold` is never allowed
#[derive(Debug, Default)]
struct RelayGame {
    said: Vec<(String, String)>,
}

impl Game for RelayGame {
    fn reset(&mut self, _config: &EnvConfig, _players: &[String]) -> Result<()> {
        self.said.clear();
        Ok(())
    }

    fn action_space(&self, _player: &str) -> ActionSpace {
        ActionSpace::new(["pass", "stop", "lose", "hold", VIOLATED_FORMAT])
    }

    fn is_action_valid_in_state(&self, _player: &str, action: &Action) -> std::result::Result<(), String> {
        match action.action_type.as_deref() {
            Some("hold") => Err("You cannot hold now.".into()),
            _ => Ok(()),
        }
    }

    fn apply_action(&mut self, player: &str, action: &Action) -> Result<()> {
        self.said
            .push((player.to_string(), action.action_type()?.to_string()));
        Ok(())
    }

    fn check_won(&self, _player: &str) -> (bool, bool) {
        match self.said.last().map(|(_, word)| word.as_str()) {
            Some("stop") => (true, true),
            Some("lose") => (true, false),
            _ => (false, false),
        }
    }

    fn observation_text(&self, player: &str, _state: &GameState) -> String {
        format!("{player}, your word: ")
    }

    fn render_as_string(&self, _player: Option<&str>) -> String {
        self.said.len().to_string()
    }

    fn render_as_human_readable(&self, player: Option<&str>) -> String {
        self.render_as_string(player)
    }

    fn render_as_image(&self, _player: Option<&str>) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Default)]
struct RelayRules {
    rounds_started: usize,
    rounds_finished: usize,
    games_started: usize,
    games_finished: usize,
}

impl EpisodeRules for RelayRules {
    type Game = RelayGame;

    fn on_setup(&mut self, instance: &serde_json::Value, setup: &mut Setup<'_, RelayGame>) -> Result<()> {
        let config = EnvConfig::from_value(instance["config"].clone())?;
        setup.set_environment(Environment::new(config, RelayGame::default())?);
        for model in setup.player_models().to_vec() {
            setup.add_player(Player::new(model, "Relay"))?;
        }
        setup.reset_environment()
    }

    fn validate_response(&self, _player: &Player, response: &str) -> bool {
        response.starts_with("SAY: ")
    }

    fn parse_action(&self, _player: &Player, response: &str) -> Result<Action> {
        Ok(Action::new(response.trim_start_matches("SAY: ").trim()))
    }

    fn on_before_game(&mut self, _env: &Environment<RelayGame>) {
        self.games_started += 1;
    }

    fn on_before_round(&mut self, _env: &Environment<RelayGame>) {
        self.rounds_started += 1;
    }

    fn on_after_round(&mut self, _env: &Environment<RelayGame>) {
        self.rounds_finished += 1;
    }

    fn on_after_game(&mut self, _env: &Environment<RelayGame>) {
        self.games_finished += 1;
    }
}

fn models(n: usize) -> Vec<Arc<dyn Model>> {
    (0..n)
        .map(|i| Arc::new(ScriptedModel::new(format!("model_{i}"), Vec::<String>::new())) as Arc<dyn Model>)
        .collect()
}

fn instance() -> serde_json::Value {
    json!({ "config": {} })
}

fn master_with(n: usize) -> GameMaster<RelayRules> {
    let mut master = GameMaster::new(RelayRules::default(), models(n));
    master.setup(&instance()).unwrap();
    master
}

fn current_name(master: &GameMaster<RelayRules>) -> String {
    master.current_player().unwrap().name().to_string()
}

#[test]
fn test_round_robin_fairness() {
    let mut master = master_with(3);
    assert_eq!(master.get_players().len(), 3);
    assert_eq!(master.rules().games_started, 1);

    let mut order = Vec::new();
    let mut rounds = Vec::new();
    for _ in 0..7 {
        order.push(current_name(&master));
        let (done, _) = master.step("SAY: pass").unwrap();
        assert!(!done);
        rounds.push(master.current_round());
    }

    assert_eq!(
        order,
        ["Player 1", "Player 2", "Player 3", "Player 1", "Player 2", "Player 3", "Player 1"]
    );
    assert_eq!(rounds, [0, 0, 1, 1, 1, 2, 2]);
    assert_eq!(master.rules().rounds_finished, 2);
    assert_eq!(master.rules().rounds_started, 2);
    assert_eq!(master.recorder().rounds.len(), 3);
}

#[test]
fn test_aborted_turn_is_retried_by_same_player() {
    let mut master = master_with(2);

    // unparseable, then illegal in state
    master.step("I pass").unwrap();
    assert_eq!(master.current_player_index(), Some(0));
    let (_, info) = master.step("SAY: hold").unwrap();
    assert_eq!(info["aborted"], true);
    assert_eq!(info["warning"], "You cannot hold now.");
    assert_eq!(master.current_player_index(), Some(0));

    master.step("SAY: pass").unwrap();
    assert_eq!(master.current_player_index(), Some(1));
    assert_eq!(master.current_round(), 0);

    let record = master.recorder();
    assert_eq!(record.request_counts[0], 3);
    assert_eq!(record.parsed_request_counts[0], 2);
    assert_eq!(record.violated_request_counts[0], 2);
}

#[test]
fn test_aborted_turn_at_round_end_does_not_advance_round() {
    let mut master = master_with(2);
    master.step("SAY: pass").unwrap();
    master.step("garbage").unwrap();
    assert_eq!(master.current_round(), 0);
    assert_eq!(master.current_player_index(), Some(1));
    master.step("SAY: pass").unwrap();
    assert_eq!(master.current_round(), 1);
}

#[test]
fn test_success_scoring() {
    let mut master = master_with(2);
    master.step("SAY: pass").unwrap();
    let (done, info) = master.step("SAY: stop").unwrap();

    assert!(done);
    assert!(master.is_done());
    assert_eq!(info["success"], true);
    assert_eq!(
        master.scores(),
        Some(EpisodeScores { aborted: false, success: true, lose: false })
    );
    assert_eq!(master.rules().games_finished, 1);

    let record = master.recorder();
    assert!(record.finished);
    assert_eq!(record.key(METRIC_SUCCESS), Some(&json!(1)));
    assert_eq!(record.key(METRIC_ABORTED), Some(&json!(0)));
    assert_eq!(record.key(METRIC_LOSE), Some(&json!(0)));
    assert_eq!(record.key(METRIC_REQUEST_COUNT), Some(&json!(2)));
}

#[test]
fn test_lose_scoring() {
    let mut master = master_with(1);
    let (done, _) = master.step("SAY: lose").unwrap();
    assert!(done);
    let scores = master.scores().unwrap();
    assert!(scores.lose && !scores.success && !scores.aborted);
    assert_eq!(master.recorder().key(METRIC_LOSE), Some(&json!(1)));
}

#[test]
fn test_move_cap_scores_aborted() {
    let mut master = GameMaster::new(RelayRules::default(), models(2));
    master
        .setup(&json!({ "config": { "max_moves": 3 } }))
        .unwrap();

    assert!(!master.step("SAY: pass").unwrap().0);
    assert!(!master.step("SAY: pass").unwrap().0);
    let (done, info) = master.step("SAY: stop").unwrap();

    assert!(done);
    assert_eq!(info["aborted"], true);
    assert_eq!(
        master.scores(),
        Some(EpisodeScores { aborted: true, success: false, lose: false })
    );
    let record = master.recorder();
    assert_eq!(record.key(METRIC_ABORTED), Some(&json!(1)));
    assert_eq!(record.key(METRIC_REQUEST_COUNT_VIOLATED), Some(&json!(1)));
}

#[test]
fn test_step_before_setup() {
    let mut master = GameMaster::new(RelayRules::default(), models(1));
    assert!(!master.has_started());
    assert!(matches!(master.step("SAY: pass"), Err(ClemError::NotStarted)));
    assert!(matches!(master.observe(), Err(ClemError::NotStarted)));
}

#[test]
fn test_setup_without_players_fails() {
    let mut master = GameMaster::new(RelayRules::default(), Vec::new());
    let err = master.setup(&instance()).unwrap_err();
    assert!(matches!(err, ClemError::Config(_)));
    assert!(!master.has_started());
}

#[test]
fn test_setup_rejects_bad_render_mode() {
    let mut master = GameMaster::new(RelayRules::default(), models(1));
    let err = master
        .setup(&json!({ "config": { "render_as": "hologram" } }))
        .unwrap_err();
    assert!(err.is_fatal_config());
}

#[test]
fn test_players_logged_in_order() {
    let master = master_with(2);
    let players = &master.recorder().players;
    assert_eq!(players[0].name, "Player 1");
    assert_eq!(players[1].model_name, "model_1");
    assert_eq!(master.environment().unwrap().players(), ["Player 1", "Player 2"]);
}

#[derive(Clone, Default)]
struct Spy {
    events: Arc<Mutex<Vec<String>>>,
}

impl EpisodeCallback for Spy {
    fn on_game_start(&mut self, _instance: &serde_json::Value) {
        self.events.lock().unwrap().push("start".into());
    }

    fn on_game_end(&mut self, _instance: &serde_json::Value, scores: &EpisodeScores) {
        self.events
            .lock()
            .unwrap()
            .push(format!("end success={}", scores.success));
    }
}

#[tokio::test]
async fn test_play_episode_with_shared_model() {
    let shared = Arc::new(ScriptedModel::new(
        "shared",
        ["SAY: pass", "SAY: hold", "SAY: pass", "SAY: stop"],
    ));
    let models: Vec<Arc<dyn Model>> = vec![shared.clone(), shared.clone()];
    let mut master = GameMaster::new(RelayRules::default(), models);

    let spy = Spy::default();
    let mut callbacks = CallbackList::new();
    callbacks.append(spy.clone());

    let scores = play_episode(&mut master, &instance(), &mut callbacks, None)
        .await
        .unwrap()
        .unwrap();

    assert!(scores.success);
    assert_eq!(shared.remaining().await, 0);
    assert_eq!(*spy.events.lock().unwrap(), ["start", "end success=true"]);

    let said = &master.environment().unwrap().game().said;
    assert_eq!(
        said,
        &[
            ("Player 1".to_string(), "pass".to_string()),
            ("Player 2".to_string(), "pass".to_string()),
            ("Player 1".to_string(), "stop".to_string()),
        ]
    );

    // histories are cleared at the end of the episode
    assert!(master.get_players().iter().all(|p| p.history().is_empty()));

    let messages = master
        .recorder()
        .events()
        .filter(|e| e.action["type"] == "get message")
        .count();
    assert_eq!(messages, 4);
}

#[tokio::test]
async fn test_play_episode_turn_limit() {
    let model: Arc<dyn Model> = Arc::new(ScriptedModel::new("looper", ["SAY: pass"; 5]));
    let mut master = GameMaster::new(RelayRules::default(), vec![model]);
    let mut callbacks = CallbackList::new();

    let scores = play_episode(&mut master, &instance(), &mut callbacks, Some(3))
        .await
        .unwrap();

    assert!(scores.is_none());
    assert!(!master.is_done());
    assert_eq!(master.current_round(), 3);
}
