//! # grid-navigation
//!
//! Reference game for the clem environment stack.
//!
//! Each player stands on a grid and answers `MOVE: <n|s|e|w>` until one of
//! them reaches the goal cell. The game exercises every layer: the grid
//! world with fog-of-war, the environment step pipeline and the game master.

pub mod game;
pub mod rules;

pub use game::{DIRECTION_PARAM, GOAL_GLYPH, GOAL_SYMBOL, MOVE_ACTION, NavigationGame};
pub use rules::{NavigationRules, parse_move};
