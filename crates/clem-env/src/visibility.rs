//! Fog-of-war: which cells each player can see

use clem_core::{EnvConfig, Position};
use std::collections::HashMap;

/// Boolean per cell, true where the cell is visible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl VisibilityMask {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![true; width * height],
        }
    }

    pub fn hidden(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Only the 3x3 neighbourhood around `center`, clipped to the grid
    pub fn window(width: usize, height: usize, center: Position) -> Self {
        let mut mask = Self::hidden(width, height);
        mask.reveal_window(center);
        mask
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cells outside the grid are never visible
    pub fn is_visible(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
            && self.cells[pos.row as usize * self.width + pos.col as usize]
    }

    pub fn reveal(&mut self, pos: Position) {
        if pos.in_bounds(self.width, self.height) {
            self.cells[pos.row as usize * self.width + pos.col as usize] = true;
        }
    }

    pub fn reveal_window(&mut self, center: Position) {
        for d_row in -1..=1 {
            for d_col in -1..=1 {
                self.reveal(center.offset(d_row, d_col));
            }
        }
    }

    pub fn visible_count(&self) -> usize {
        self.cells.iter().filter(|v| **v).count()
    }

    /// Visible positions in row-major order
    pub fn visible_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| Position::new((i / self.width) as i32, (i % self.width) as i32))
    }
}

/// Visibility policy, selected by `limited_visibility` and `show_explored`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityRegime {
    /// Everything is visible
    Full,
    /// Everything the player has ever stood next to
    Explored,
    /// Only the live 3x3 neighbourhood
    LocalWindow,
}

impl VisibilityRegime {
    pub fn from_flags(limited_visibility: bool, show_explored: bool) -> Self {
        match (limited_visibility, show_explored) {
            (false, _) => VisibilityRegime::Full,
            (true, true) => VisibilityRegime::Explored,
            (true, false) => VisibilityRegime::LocalWindow,
        }
    }
}

/// Per-player visibility state for one episode
#[derive(Debug, Clone)]
pub struct FogOfWar {
    regime: VisibilityRegime,
    track_explored: bool,
    width: usize,
    height: usize,
    explored: HashMap<String, VisibilityMask>,
}

impl FogOfWar {
    pub fn new(config: &EnvConfig) -> Self {
        Self {
            regime: VisibilityRegime::from_flags(config.limited_visibility, config.show_explored),
            track_explored: config.show_explored,
            width: config.width,
            height: config.height,
            explored: HashMap::new(),
        }
    }

    pub fn regime(&self) -> VisibilityRegime {
        self.regime
    }

    /// Forget all exploration history
    pub fn reset(&mut self) {
        self.explored.clear();
    }

    /// Mark the 3x3 neighbourhood of `pos` as explored
    ///
    /// Cells only ever flip from hidden to explored.
    pub fn mark_explored(&mut self, player: &str, pos: Position) {
        if !self.track_explored {
            return;
        }
        let (width, height) = (self.width, self.height);
        self.explored
            .entry(player.to_string())
            .or_insert_with(|| VisibilityMask::hidden(width, height))
            .reveal_window(pos);
    }

    pub fn explored(&self, player: &str) -> Option<&VisibilityMask> {
        self.explored.get(player)
    }

    /// Mask for a player standing at `position`
    ///
    /// Without a known player or position the whole grid is shown.
    pub fn mask_for(&self, player: Option<&str>, position: Option<Position>) -> VisibilityMask {
        let full = || VisibilityMask::full(self.width, self.height);
        match self.regime {
            VisibilityRegime::Full => full(),
            VisibilityRegime::Explored => player
                .and_then(|p| self.explored.get(p))
                .cloned()
                .unwrap_or_else(full),
            VisibilityRegime::LocalWindow => match position {
                Some(pos) => VisibilityMask::window(self.width, self.height, pos),
                None => full(),
            },
        }
    }
}
