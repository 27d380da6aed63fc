//! Grid positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(row, col)` cell coordinate
///
/// Coordinates are signed so that a neighbour of an edge cell can be formed
/// and then rejected by a bounds check. Serialized as `[row, col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Position shifted by `(d_row, d_col)`
    pub const fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Whether the position lies inside a `width` x `height` grid
    pub fn in_bounds(self, width: usize, height: usize) -> bool {
        self.row >= 0
            && self.col >= 0
            && (self.row as usize) < height
            && (self.col as usize) < width
    }
}

impl From<[i32; 2]> for Position {
    fn from([row, col]: [i32; 2]) -> Self {
        Self { row, col }
    }
}

impl From<Position> for [i32; 2] {
    fn from(pos: Position) -> Self {
        [pos.row, pos.col]
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Position::new(0, 0).in_bounds(5, 5));
        assert!(Position::new(4, 4).in_bounds(5, 5));
        assert!(!Position::new(-1, 0).in_bounds(5, 5));
        assert!(!Position::new(0, 5).in_bounds(5, 5));
        assert!(!Position::new(3, 0).in_bounds(5, 3));
    }

    #[test]
    fn test_serializes_as_pair() {
        let pos: Position = serde_json::from_str("[2, 3]").unwrap();
        assert_eq!(pos, Position::new(2, 3));
        assert_eq!(serde_json::to_string(&pos).unwrap(), "[2,3]");
    }
}
