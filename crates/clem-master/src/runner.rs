//! Async episode loop between players and the game master

use clem_core::{ClemError, Message, Result};
use tracing::{debug, info, warn};

use crate::callbacks::{CallbackList, EpisodeCallback};
use crate::master::{EpisodeRules, EpisodeScores, GameMaster};
use crate::recorder::EpisodeRecorder;

/// Set up `instance` and play it until the episode ends
///
/// Each turn the current player is shown its observation, its reply is
/// logged and handed to [`GameMaster::step`]. Stops early after `max_turns`
/// steps, returning `None` since the episode has no scores yet.
pub async fn play_episode<R, L>(
    master: &mut GameMaster<R, L>,
    instance: &serde_json::Value,
    callbacks: &mut CallbackList,
    max_turns: Option<usize>,
) -> Result<Option<EpisodeScores>>
where
    R: EpisodeRules,
    L: EpisodeRecorder,
{
    master.setup(instance)?;
    callbacks.on_game_start(instance);

    let mut turns = 0;
    while !master.is_done() {
        if max_turns.is_some_and(|max| turns >= max) {
            warn!(turns, "turn limit reached before the episode ended");
            return Ok(None);
        }

        let (name, observation) = {
            let (player, observation) = master.observe()?;
            (player.name().to_string(), observation.clone())
        };
        master.recorder_mut().log_event(
            "GM",
            &name,
            serde_json::json!({ "type": "send message", "content": observation.content }),
        );

        let player = master.current_player_mut().ok_or(ClemError::NotStarted)?;
        let generation = player.respond(Message::from(observation)).await?;
        debug!(player = %name, response = %generation.text, "player responded");
        master.recorder_mut().log_event(
            &name,
            "GM",
            serde_json::json!({ "type": "get message", "content": generation.text }),
        );

        master.step(&generation.text)?;
        turns += 1;
    }

    let scores = master.scores().ok_or(ClemError::NotStarted)?;
    info!(turns, rounds = master.current_round() + 1, "episode complete");
    callbacks.on_game_end(instance, &scores);
    Ok(Some(scores))
}
