//! Grid model: cells holding ordered stacks of objects

use clem_core::{ClemError, Position, Result};
use serde::Serialize;
use std::fmt;

/// Identity of a placed object, unique within one grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectId(u64);

/// What an object stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ObjectKind {
    /// Scenery, items, goals
    Item,
    /// Stand-in for a player on the grid
    Player(String),
}

/// Something placed on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Object {
    id: Option<ObjectId>,
    pub position: Position,
    pub name: String,
    /// Character shown by the string renderer
    pub symbol: String,
    /// Glyph shown by the human-readable renderer
    pub pretty_symbol: String,
    pub kind: ObjectKind,
}

impl Object {
    pub fn new(
        position: Position,
        name: impl Into<String>,
        symbol: impl Into<String>,
        pretty_symbol: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            position,
            name: name.into(),
            symbol: symbol.into(),
            pretty_symbol: pretty_symbol.into(),
            kind: ObjectKind::Item,
        }
    }

    /// The grid representation of a player
    pub fn player(position: Position, player: &str) -> Self {
        Self {
            id: None,
            position,
            name: format!("Player_{player}"),
            symbol: "P".into(),
            pretty_symbol: "👤".into(),
            kind: ObjectKind::Player(player.to_string()),
        }
    }

    /// Assigned when the object is first added to a grid
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn player_name(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Player(name) => Some(name),
            ObjectKind::Item => None,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.name, self.position)
    }
}

/// One cell; the last object in the stack is the visible occupant
#[derive(Debug, Clone, Serialize)]
pub struct GridCell {
    pub position: Position,
    pub objects: Vec<Object>,
}

impl GridCell {
    pub fn topmost(&self) -> Option<&Object> {
        self.objects.last()
    }
}

/// Row-major 2D array of cells
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<GridCell>,
    next_id: u64,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                cells.push(GridCell {
                    position: Position::new(row as i32, col as i32),
                    objects: Vec::new(),
                });
            }
        }
        Self {
            width,
            height,
            cells,
            next_id: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.row as usize * self.width + pos.col as usize)
    }

    pub fn cell(&self, pos: Position) -> Option<&GridCell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Push an object onto the stack at its position
    ///
    /// Placing outside the grid is a bug in the game, never clamped.
    pub fn add_object(&mut self, mut obj: Object) -> Result<ObjectId> {
        let Some(index) = self.index(obj.position) else {
            return Err(ClemError::OutOfBounds {
                row: obj.position.row,
                col: obj.position.col,
            });
        };
        let id = match obj.id {
            Some(id) => id,
            None => {
                let id = ObjectId(self.next_id);
                self.next_id += 1;
                obj.id = Some(id);
                id
            }
        };
        self.cells[index].objects.push(obj);
        Ok(id)
    }

    /// Take an object out of the cell at `pos`; `None` if it is not there
    pub fn remove_object(&mut self, pos: Position, id: ObjectId) -> Option<Object> {
        let index = self.index(pos)?;
        let objects = &mut self.cells[index].objects;
        let at = objects.iter().position(|o| o.id == Some(id))?;
        Some(objects.remove(at))
    }

    /// The stack at `pos`; empty outside the grid
    pub fn get_objects_at(&self, pos: Position) -> &[Object] {
        match self.index(pos) {
            Some(i) => &self.cells[i].objects,
            None => &[],
        }
    }

    pub fn topmost(&self, pos: Position) -> Option<&Object> {
        self.get_objects_at(pos).last()
    }

    /// Relocate an object, keeping its identity
    ///
    /// The object leaves its old cell before it joins the new one, so it is
    /// never a member of two stacks.
    pub fn move_object(&mut self, id: ObjectId, from: Position, to: Position) -> Result<()> {
        if !self.contains(to) {
            return Err(ClemError::OutOfBounds {
                row: to.row,
                col: to.col,
            });
        }
        let Some(mut obj) = self.remove_object(from, id) else {
            return Err(ClemError::Config(format!(
                "no object {id:?} at {from} to move"
            )));
        };
        obj.position = to;
        self.add_object(obj)?;
        Ok(())
    }
}
