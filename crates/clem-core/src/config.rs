//! Environment configuration read from game instances

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClemError;
use crate::position::Position;

/// How the environment state is rendered for players
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RenderMode {
    /// Machine-oriented cell listing
    #[default]
    String,
    /// PNG image
    Image,
    /// Emoji glyph grid
    HumanReadable,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::String => "string",
            RenderMode::Image => "image",
            RenderMode::HumanReadable => "human-readable",
        }
    }
}

impl FromStr for RenderMode {
    type Err = ClemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(RenderMode::String),
            "image" => Ok(RenderMode::Image),
            "human-readable" => Ok(RenderMode::HumanReadable),
            other => Err(ClemError::UnknownRenderMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for RenderMode {
    type Error = ClemError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RenderMode> for String {
    fn from(mode: RenderMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid section of the configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridConfig {
    /// Start cell per player, in registration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players_start: Option<Vec<Position>>,
}

/// Environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Renderer used for observations
    #[serde(default)]
    pub render_as: RenderMode,
    /// Hard cap on the number of steps per episode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_moves: Option<u32>,
    /// Grid width in cells
    #[serde(default = "default_extent")]
    pub width: usize,
    /// Grid height in cells
    #[serde(default = "default_extent")]
    pub height: usize,
    /// Restrict each player's view to part of the grid
    #[serde(default)]
    pub limited_visibility: bool,
    /// With limited visibility, remember every cell a player has seen
    #[serde(default)]
    pub show_explored: bool,
    /// Represent players as objects on the grid
    #[serde(default = "default_players_in_grid")]
    pub players_in_grid: bool,
    #[serde(default)]
    pub grid: GridConfig,
}

fn default_extent() -> usize {
    10
}

fn default_players_in_grid() -> bool {
    true
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            render_as: RenderMode::default(),
            max_moves: None,
            width: default_extent(),
            height: default_extent(),
            limited_visibility: false,
            show_explored: false,
            players_in_grid: default_players_in_grid(),
            grid: GridConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Parse the configuration from an instance value
    pub fn from_value(value: serde_json::Value) -> crate::Result<Self> {
        let config: EnvConfig = serde_json::from_value(value).map_err(|e| {
            // Keep the fatal render mode diagnostic recognisable
            let msg = e.to_string();
            if msg.starts_with("Invalid render_as value") {
                ClemError::Config(msg)
            } else {
                ClemError::from(e)
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot express
    pub fn validate(&self) -> crate::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ClemError::Config(format!(
                "grid must have a positive size, got {}x{}",
                self.width, self.height
            )));
        }
        if self.max_moves == Some(0) {
            return Err(ClemError::Config("max_moves must be at least 1".into()));
        }
        Ok(())
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_players_start(mut self, starts: Vec<Position>) -> Self {
        self.grid.players_start = Some(starts);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnvConfig::from_value(serde_json::json!({})).unwrap();
        assert_eq!(config.render_as, RenderMode::String);
        assert_eq!(config.width, 10);
        assert_eq!(config.height, 10);
        assert!(config.max_moves.is_none());
        assert!(!config.limited_visibility);
        assert!(config.players_in_grid);
    }

    #[test]
    fn test_full_instance() {
        let config = EnvConfig::from_value(serde_json::json!({
            "render_as": "human-readable",
            "max_moves": 20,
            "width": 5,
            "height": 4,
            "limited_visibility": true,
            "show_explored": true,
            "grid": { "players_start": [[2, 2], [0, 1]] }
        }))
        .unwrap();

        assert_eq!(config.render_as, RenderMode::HumanReadable);
        assert_eq!(config.max_moves, Some(20));
        assert_eq!(
            config.grid.players_start.unwrap(),
            vec![Position::new(2, 2), Position::new(0, 1)]
        );
    }

    #[test]
    fn test_unknown_render_mode_is_fatal() {
        let err = EnvConfig::from_value(serde_json::json!({ "render_as": "ascii-art" })).unwrap_err();
        assert!(err.is_fatal_config());
        assert!(err.to_string().contains("ascii-art"));

        let err = "svg".parse::<RenderMode>().unwrap_err();
        assert!(matches!(err, ClemError::UnknownRenderMode(v) if v == "svg"));
    }

    #[test]
    fn test_zero_sized_grid_rejected() {
        assert!(EnvConfig::from_value(serde_json::json!({ "width": 0 })).is_err());
    }
}
