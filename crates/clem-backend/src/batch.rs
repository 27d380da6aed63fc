//! Batched generation across players that share a model
//!
//! Players are grouped by model instance. Each distinct model receives one
//! batched call holding its players' histories, and the replies are routed
//! back to the caller's row ids in input order.

use clem_core::{ClemError, Message, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::model::{Model, with_retries};
use crate::player::Player;

/// Caller-chosen key for one (player, context) pair
pub type RowId = u64;

/// Generate replies for `players[i]` to `contexts[i]`
///
/// Without `row_ids`, rows are numbered `0..N`. Returns `row_id -> (context,
/// reply text)` and records each exchange in the player's history.
pub async fn batch_response(
    players: &mut [Player],
    contexts: Vec<Message>,
    row_ids: Option<Vec<RowId>>,
) -> Result<BTreeMap<RowId, (Message, String)>> {
    let row_ids = row_ids.unwrap_or_else(|| (0..players.len() as RowId).collect());
    if players.len() != contexts.len() || players.len() != row_ids.len() {
        return Err(ClemError::BatchLengthMismatch {
            players: players.len(),
            contexts: contexts.len(),
            row_ids: row_ids.len(),
        });
    }

    // Group row indices by model instance, in order of first appearance
    let mut groups: Vec<(Arc<dyn Model>, Vec<usize>)> = Vec::new();
    for (index, player) in players.iter().enumerate() {
        match groups
            .iter_mut()
            .find(|(model, _)| Arc::ptr_eq(model, player.model()))
        {
            Some((_, indices)) => indices.push(index),
            None => groups.push((player.model().clone(), vec![index])),
        }
    }

    if let Some((model, _)) = groups.iter().find(|(model, _)| !model.supports_batching()) {
        return Err(ClemError::BatchingUnsupported(model.name().to_string()));
    }

    let mut replies: Vec<Option<String>> = vec![None; players.len()];
    for (model, indices) in &groups {
        let batch: Vec<Vec<Message>> = indices
            .iter()
            .map(|&i| players[i].context_history(&contexts[i]))
            .collect();
        debug!(model = %model.name(), rows = batch.len(), "batched generation");

        let generations = with_retries(model.name(), players[indices[0]].retries(), || {
            model.generate_batch_response(&batch)
        })
        .await?;
        if generations.len() != indices.len() {
            return Err(ClemError::Model(format!(
                "{} returned {} responses for a batch of {}",
                model.name(),
                generations.len(),
                indices.len()
            )));
        }
        for (&i, generation) in indices.iter().zip(generations) {
            replies[i] = Some(generation.text);
        }
    }

    let mut results = BTreeMap::new();
    for (((player, context), row_id), reply) in players
        .iter_mut()
        .zip(contexts)
        .zip(row_ids)
        .zip(replies)
    {
        let reply = reply.unwrap_or_default();
        player.record_exchange(context.clone(), &reply);
        results.insert(row_id, (context, reply));
    }
    Ok(results)
}
