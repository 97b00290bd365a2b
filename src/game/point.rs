//! Board coordinates and movement directions.
//!
//! All arithmetic wraps modulo the board dimensions, so the board behaves as
//! a torus. In play the wall ring makes the seam unreachable, but off-nominal
//! boards (and tests) still rely on the wraparound being correct.

use serde::{Deserialize, Serialize};

/// A cell position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    /// Row index (0 is the top row).
    pub row: u16,
    /// Column index (0 is the leftmost column).
    pub col: u16,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Step one cell in `direction`, wrapping around a `rows` × `cols` board.
    #[must_use]
    #[inline]
    pub fn step(self, direction: Direction, rows: u16, cols: u16) -> Self {
        self.shifted(direction, 1, rows, cols)
    }

    /// Step `amount` cells in `direction`, wrapping around a `rows` × `cols` board.
    #[must_use]
    pub fn shifted(self, direction: Direction, amount: i32, rows: u16, cols: u16) -> Self {
        let (dr, dc) = direction.offset();
        Self {
            row: wrap(i32::from(self.row) + dr * amount, rows),
            col: wrap(i32::from(self.col) + dc * amount, cols),
        }
    }

    /// The four cardinal neighbours of this point, wrapping at the edges.
    #[must_use]
    pub fn neighbours(self, rows: u16, cols: u16) -> [Point; 4] {
        Direction::CARDINAL.map(|d| self.step(d, rows, cols))
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Reduce `value` into `0..size`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn wrap(value: i32, size: u16) -> u16 {
    // size is never zero for a constructed board
    value.rem_euclid(i32::from(size.max(1))) as u16
}

/// Direction of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// No movement.
    Null,
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// The four directions that actually move something.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset as `(row, col)`.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Null => (0, 0),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Whether this direction moves along a column.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Whether this direction moves along a row.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Null => "none",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}
