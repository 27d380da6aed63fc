//! Batched generation across players

use async_trait::async_trait;
use clem_backend::{Generation, Model, Player, ScriptedModel, batch_response};
use clem_core::{ClemError, Message, Result};
use std::sync::Arc;

/// Answers every history in reverse order, to prove routing is by position
struct ReversingModel;

#[async_trait]
impl Model for ReversingModel {
    fn name(&self) -> &str {
        "reversing"
    }

    async fn generate_response(&self, messages: &[Message]) -> Result<Generation> {
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(Generation {
            prompt: serde_json::json!(last),
            raw: serde_json::json!({}),
            text: last.replace("ctx", "resp"),
        })
    }

    fn supports_batching(&self) -> bool {
        true
    }

    async fn generate_batch_response(&self, batch: &[Vec<Message>]) -> Result<Vec<Generation>> {
        // compute out of order, hand back in input order
        let mut out = Vec::with_capacity(batch.len());
        for messages in batch.iter().rev() {
            out.push(self.generate_response(messages).await?);
        }
        out.reverse();
        Ok(out)
    }
}

fn player(model: Arc<dyn Model>) -> Player {
    Player::new(model, "Navigator")
}

fn contexts(items: &[&str]) -> Vec<Message> {
    items.iter().map(|c| Message::user(*c)).collect()
}

#[tokio::test]
async fn test_distinct_models_one_call_each() {
    let model_a = Arc::new(ScriptedModel::new("model_a", ["resp1"]));
    let model_b = Arc::new(ScriptedModel::new("model_b", ["resp2"]));
    let mut players = vec![player(model_a.clone()), player(model_b.clone())];

    let result = batch_response(&mut players, contexts(&["ctx1", "ctx2"]), Some(vec![10, 20]))
        .await
        .unwrap();

    assert_eq!(result[&10], (Message::user("ctx1"), "resp1".to_string()));
    assert_eq!(result[&20], (Message::user("ctx2"), "resp2".to_string()));
    assert_eq!(model_a.batch_calls(), 1);
    assert_eq!(model_b.batch_calls(), 1);
}

#[tokio::test]
async fn test_shared_model_single_batched_call() {
    let shared = Arc::new(ScriptedModel::new("shared_model", ["resp1", "resp2"]));
    let mut players = vec![player(shared.clone()), player(shared.clone())];

    let result = batch_response(&mut players, contexts(&["ctx1", "ctx2"]), Some(vec![1, 2]))
        .await
        .unwrap();

    assert_eq!(result[&1].1, "resp1");
    assert_eq!(result[&2].1, "resp2");
    assert_eq!(shared.batch_calls(), 1);
    assert_eq!(shared.calls(), 0);

    // each player remembers only its own exchange
    assert_eq!(players[0].history()[0].content, "ctx1");
    assert_eq!(players[0].history()[1].content, "resp1");
    assert_eq!(players[1].history()[1].content, "resp2");
}

#[tokio::test]
async fn test_auto_row_ids_follow_input_order() {
    let shared = Arc::new(ScriptedModel::new("test_model", ["resp0", "resp1"]));
    let mut players = vec![player(shared.clone()), player(shared)];

    let result = batch_response(&mut players, contexts(&["ctx0", "ctx1"]), None)
        .await
        .unwrap();

    let keys: Vec<_> = result.keys().copied().collect();
    assert_eq!(keys, [0, 1]);
    assert_eq!(result[&0], (Message::user("ctx0"), "resp0".to_string()));
    assert_eq!(result[&1], (Message::user("ctx1"), "resp1".to_string()));
}

#[tokio::test]
async fn test_attribution_survives_internal_reordering() {
    let shared: Arc<dyn Model> = Arc::new(ReversingModel);
    let mut players = vec![player(shared.clone()), player(shared)];

    let result = batch_response(&mut players, contexts(&["ctx1", "ctx2"]), None)
        .await
        .unwrap();

    assert_eq!(result[&0].1, "resp1");
    assert_eq!(result[&1].1, "resp2");
}

#[tokio::test]
async fn test_interleaved_models_keep_rows() {
    let shared = Arc::new(ScriptedModel::new("shared", ["s1", "s2"]));
    let single = Arc::new(ScriptedModel::new("single", ["x1"]));
    let mut players = vec![
        player(shared.clone()),
        player(single.clone()),
        player(shared.clone()),
    ];

    let result = batch_response(&mut players, contexts(&["a", "b", "c"]), Some(vec![7, 8, 9]))
        .await
        .unwrap();

    assert_eq!(result[&7].1, "s1");
    assert_eq!(result[&8].1, "x1");
    assert_eq!(result[&9].1, "s2");
    assert_eq!(shared.batch_calls(), 1);
}

#[tokio::test]
async fn test_mismatched_lengths() {
    let mut players = vec![player(Arc::new(ScriptedModel::new("model_x", ["resp"])))];

    let err = batch_response(&mut players, Vec::new(), Some(vec![1]))
        .await
        .unwrap_err();

    assert!(matches!(err, ClemError::BatchLengthMismatch { players: 1, contexts: 0, .. }));
    assert!(err.to_string().contains("`players` and `contexts` must have the same length"));
}

#[tokio::test]
async fn test_model_without_batching() {
    let model = Arc::new(ScriptedModel::new("bad_model", ["x"]).without_batching());
    let mut players = vec![player(model.clone())];

    let err = batch_response(&mut players, contexts(&["x"]), Some(vec![1]))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("does not implement `generate_batch_response()`"));
    assert_eq!(model.remaining().await, 1);
    assert!(players[0].history().is_empty());
}
