//! Episode recording
//!
//! The game master reports what happens through [`EpisodeRecorder`]; where
//! the record ends up is the recorder's business.

use clem_core::metrics::{
    METRIC_REQUEST_COUNT, METRIC_REQUEST_COUNT_PARSED, METRIC_REQUEST_COUNT_VIOLATED,
};
use serde::Serialize;
use tracing::{debug, info};

/// Sink for structured episode logs
pub trait EpisodeRecorder {
    /// Store a keyed value, e.g. an episode score
    fn log_key(&mut self, key: &str, value: serde_json::Value);

    /// Register a player and the model behind it
    fn log_player(&mut self, name: &str, game_role: &str, model_name: &str);

    /// Record an interaction in the current round
    fn log_event(&mut self, from: &str, to: &str, action: serde_json::Value);

    /// A new round begins
    fn log_next_round(&mut self);

    /// The episode is over
    fn log_game_end(&mut self);

    fn count_request(&mut self);

    fn count_request_parsed(&mut self);

    fn count_request_violation(&mut self);

    /// Game master note to itself
    fn log_to_self(&mut self, kind: &str, content: serde_json::Value) {
        self.log_event(
            "GM",
            "GM",
            serde_json::json!({ "type": kind, "content": content }),
        );
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlayerInfo {
    pub name: String,
    pub game_role: String,
    pub model_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Event {
    pub from: String,
    pub to: String,
    pub action: serde_json::Value,
}

/// In-memory transcript of one episode, serializable as JSON
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InteractionRecord {
    pub players: Vec<PlayerInfo>,
    /// Events grouped by round
    pub rounds: Vec<Vec<Event>>,
    /// Keyed values, including episode scores
    pub keys: serde_json::Map<String, serde_json::Value>,
    /// Requests per round
    pub request_counts: Vec<u32>,
    pub parsed_request_counts: Vec<u32>,
    pub violated_request_counts: Vec<u32>,
    pub finished: bool,
}

impl Default for InteractionRecord {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            rounds: vec![Vec::new()],
            keys: serde_json::Map::new(),
            request_counts: vec![0],
            parsed_request_counts: vec![0],
            violated_request_counts: vec![0],
            finished: false,
        }
    }
}

impl InteractionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Option<&serde_json::Value> {
        self.keys.get(key)
    }

    fn bump(counts: &mut [u32]) {
        if let Some(last) = counts.last_mut() {
            *last += 1;
        }
    }

    /// Events of all rounds, in order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.rounds.iter().flatten()
    }
}

impl EpisodeRecorder for InteractionRecord {
    fn log_key(&mut self, key: &str, value: serde_json::Value) {
        info!(key = %key, value = %value, "episode value");
        self.keys.insert(key.to_string(), value);
    }

    fn log_player(&mut self, name: &str, game_role: &str, model_name: &str) {
        info!(player = %name, role = %game_role, model = %model_name, "player registered");
        self.players.push(PlayerInfo {
            name: name.to_string(),
            game_role: game_role.to_string(),
            model_name: model_name.to_string(),
        });
    }

    fn log_event(&mut self, from: &str, to: &str, action: serde_json::Value) {
        debug!(from = %from, to = %to, "event");
        if let Some(round) = self.rounds.last_mut() {
            round.push(Event {
                from: from.to_string(),
                to: to.to_string(),
                action,
            });
        }
    }

    fn log_next_round(&mut self) {
        self.rounds.push(Vec::new());
        self.request_counts.push(0);
        self.parsed_request_counts.push(0);
        self.violated_request_counts.push(0);
        info!(round = self.rounds.len() - 1, "next round");
    }

    fn log_game_end(&mut self) {
        let total = |counts: &[u32]| serde_json::Value::from(counts.iter().sum::<u32>());
        let requests = total(&self.request_counts);
        let parsed = total(&self.parsed_request_counts);
        let violated = total(&self.violated_request_counts);
        self.keys.insert(METRIC_REQUEST_COUNT.into(), requests);
        self.keys.insert(METRIC_REQUEST_COUNT_PARSED.into(), parsed);
        self.keys.insert(METRIC_REQUEST_COUNT_VIOLATED.into(), violated);
        self.finished = true;
        info!(rounds = self.rounds.len(), "game end");
    }

    fn count_request(&mut self) {
        Self::bump(&mut self.request_counts);
    }

    fn count_request_parsed(&mut self) {
        Self::bump(&mut self.parsed_request_counts);
    }

    fn count_request_violation(&mut self) {
        Self::bump(&mut self.violated_request_counts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_grouped_by_round() {
        let mut record = InteractionRecord::new();
        record.log_event("GM", "Player 1", serde_json::json!("go"));
        record.log_next_round();
        record.log_to_self("state", serde_json::json!({ "moves": 1 }));

        assert_eq!(record.rounds.len(), 2);
        assert_eq!(record.rounds[0][0].to, "Player 1");
        assert_eq!(record.rounds[1][0].action["type"], "state");
        assert_eq!(record.events().count(), 2);
    }

    #[test]
    fn test_request_totals_on_game_end() {
        let mut record = InteractionRecord::new();
        record.count_request();
        record.count_request_parsed();
        record.log_next_round();
        record.count_request();
        record.count_request_violation();
        record.log_game_end();

        assert_eq!(record.request_counts, [1, 1]);
        assert_eq!(record.key(METRIC_REQUEST_COUNT), Some(&serde_json::json!(2)));
        assert_eq!(record.key(METRIC_REQUEST_COUNT_PARSED), Some(&serde_json::json!(1)));
        assert_eq!(record.key(METRIC_REQUEST_COUNT_VIOLATED), Some(&serde_json::json!(1)));
        assert!(record.finished);
    }
}
