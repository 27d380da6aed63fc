//! Hooks around whole episodes

use crate::master::EpisodeScores;

/// Observer notified when an episode starts and ends
pub trait EpisodeCallback {
    fn on_game_start(&mut self, _instance: &serde_json::Value) {}

    fn on_game_end(&mut self, _instance: &serde_json::Value, _scores: &EpisodeScores) {}
}

/// Fans out to several callbacks, in registration order
#[derive(Default)]
pub struct CallbackList {
    callbacks: Vec<Box<dyn EpisodeCallback + Send>>,
}

impl CallbackList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, callback: impl EpisodeCallback + Send + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl EpisodeCallback for CallbackList {
    fn on_game_start(&mut self, instance: &serde_json::Value) {
        for callback in &mut self.callbacks {
            callback.on_game_start(instance);
        }
    }

    fn on_game_end(&mut self, instance: &serde_json::Value, scores: &EpisodeScores) {
        for callback in &mut self.callbacks {
            callback.on_game_end(instance, scores);
        }
    }
}
