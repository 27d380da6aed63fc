//! Grid world with players placed on the grid

use clem_core::{ClemError, EnvConfig, Position, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::grid::{Grid, Object, ObjectId};
use crate::render::{self, GridImageRenderer, PngGridRenderer};
use crate::visibility::{FogOfWar, VisibilityMask};

/// Compass move on the grid; north is towards row 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "n")]
    North,
    #[serde(alias = "s")]
    South,
    #[serde(alias = "e")]
    East,
    #[serde(alias = "w")]
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Cell reached by stepping from `pos` in this direction
    pub fn apply(self, pos: Position) -> Position {
        match self {
            Direction::North => pos.offset(-1, 0),
            Direction::South => pos.offset(1, 0),
            Direction::East => pos.offset(0, 1),
            Direction::West => pos.offset(0, -1),
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::South => "s",
            Direction::East => "e",
            Direction::West => "w",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "s" | "south" => Ok(Direction::South),
            "e" | "east" => Ok(Direction::East),
            "w" | "west" => Ok(Direction::West),
            _ => Err(format!("Invalid direction: {s}! Please try again.")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

/// Where a player's grid object lives
#[derive(Debug, Clone, Copy)]
struct Placement {
    position: Position,
    object: ObjectId,
}

/// A grid that may contain the players themselves
///
/// Owns the grid, each player's placement and the fog-of-war. Games embed one
/// and delegate movement and rendering to it.
pub struct GridWorld {
    grid: Grid,
    players_in_grid: bool,
    players_start: Vec<Position>,
    placements: HashMap<String, Placement>,
    fog: FogOfWar,
    image_renderer: Box<dyn GridImageRenderer + Send + Sync>,
}

impl fmt::Debug for GridWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridWorld")
            .field("grid", &self.grid)
            .field("players_in_grid", &self.players_in_grid)
            .field("placements", &self.placements)
            .field("fog", &self.fog)
            .finish_non_exhaustive()
    }
}

impl GridWorld {
    pub fn new(config: &EnvConfig) -> Self {
        Self {
            grid: Grid::new(config.width, config.height),
            players_in_grid: config.players_in_grid,
            players_start: config.grid.players_start.clone().unwrap_or_default(),
            placements: HashMap::new(),
            fog: FogOfWar::new(config),
            image_renderer: Box::new(PngGridRenderer::default()),
        }
    }

    /// Replace the PNG renderer
    pub fn with_image_renderer(
        mut self,
        renderer: impl GridImageRenderer + Send + Sync + 'static,
    ) -> Self {
        self.image_renderer = Box::new(renderer);
        self
    }

    /// Start a fresh episode: empty grid, players on their start cells
    pub fn reset(&mut self, players: &[String]) -> Result<()> {
        self.grid = Grid::new(self.grid.width(), self.grid.height());
        self.placements.clear();
        self.fog.reset();

        if !self.players_in_grid {
            return Ok(());
        }
        for (i, player) in players.iter().enumerate() {
            let Some(start) = self.players_start.get(i).copied() else {
                return Err(ClemError::Config(format!(
                    "grid.players_start has no entry for {player}"
                )));
            };
            let object = self.grid.add_object(Object::player(start, player))?;
            self.placements.insert(
                player.clone(),
                Placement {
                    position: start,
                    object,
                },
            );
            self.fog.mark_explored(player, start);
            debug!(player = %player, position = %start, "player placed");
        }
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn fog(&self) -> &FogOfWar {
        &self.fog
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Place a non-player object
    pub fn add_object(&mut self, obj: Object) -> Result<ObjectId> {
        self.grid.add_object(obj)
    }

    pub fn remove_object(&mut self, pos: Position, id: ObjectId) -> Option<Object> {
        self.grid.remove_object(pos, id)
    }

    pub fn get_objects_at(&self, pos: Position) -> &[Object] {
        self.grid.get_objects_at(pos)
    }

    pub fn player_position(&self, player: &str) -> Option<Position> {
        self.placements.get(player).map(|p| p.position)
    }

    /// The player's own grid object
    pub fn player_object(&self, player: &str) -> Option<&Object> {
        let placement = self.placements.get(player)?;
        self.grid
            .get_objects_at(placement.position)
            .iter()
            .find(|o| o.id() == Some(placement.object))
    }

    /// Warning text if `player` may not step in `direction`
    pub fn check_move(&self, player: &str, direction: Direction) -> std::result::Result<(), String> {
        let Some(pos) = self.player_position(player) else {
            return Err(format!("{player} is not on the grid."));
        };
        let target = direction.apply(pos);
        if !self.grid.contains(target) {
            return Err(format!(
                "The cell ({}, {}) is outside the grid! Please try again.",
                target.row, target.col
            ));
        }
        Ok(())
    }

    /// Move a player one cell and return the new position
    pub fn move_player(&mut self, player: &str, direction: Direction) -> Result<Position> {
        let placement = self
            .placements
            .get_mut(player)
            .ok_or_else(|| ClemError::UnknownPlayer(player.to_string()))?;
        let target = direction.apply(placement.position);

        self.grid
            .move_object(placement.object, placement.position, target)?;
        placement.position = target;
        self.fog.mark_explored(player, target);

        debug!(player = %player, %direction, position = %target, "player moved");
        Ok(target)
    }

    /// What `player` can currently see; everything when `player` is `None`
    pub fn visibility_mask(&self, player: Option<&str>) -> VisibilityMask {
        let position = player.and_then(|p| self.player_position(p));
        self.fog.mask_for(player, position)
    }

    pub fn render_string(&self, player: Option<&str>) -> String {
        render::render_string(&self.grid, &self.visibility_mask(player))
    }

    pub fn render_human_readable(&self, player: Option<&str>) -> String {
        render::render_human_readable(&self.grid, &self.visibility_mask(player))
    }

    pub fn render_image(&self, player: Option<&str>) -> Result<Vec<u8>> {
        let position = player.and_then(|p| self.player_position(p));
        self.image_renderer
            .render_grid_image(&self.grid, &self.visibility_mask(player), position)
    }
}
