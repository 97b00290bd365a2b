//! Error types for building a game state.

use std::fmt;

use crate::game::Symbol;

/// A structural problem found while building objects from a level matrix.
///
/// Any of these aborts construction; no partially built state is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// The matrix has no rows, no columns, or more than `u16::MAX` of either.
    BoardSize {
        /// Number of rows supplied.
        rows: usize,
        /// Width of the first row.
        cols: usize,
    },
    /// A row is wider or narrower than the first row.
    RowWidth {
        /// Offending row (0-indexed).
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        found: usize,
    },
    /// A character outside the level alphabet.
    InvalidSymbol {
        /// Row of the character (0-indexed).
        row: usize,
        /// Column of the character (0-indexed).
        col: usize,
        /// The rejected character.
        ch: char,
    },
    /// A ship has the wrong number of cells.
    ShipSize {
        /// Ship symbol.
        symbol: Symbol,
        /// Configured size for this ship.
        expected: usize,
        /// Cells found on the board.
        found: usize,
    },
    /// A ship's cells do not form one connected region.
    ShipDisconnected {
        /// Ship symbol.
        symbol: Symbol,
    },
    /// The portal has the wrong number of cells.
    PortalSize {
        /// Configured portal size.
        expected: usize,
        /// Cells found on the board.
        found: usize,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::BoardSize { rows, cols } => {
                write!(f, "unusable board size {rows}x{cols}")
            }
            BuildError::RowWidth {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} cells, expected {expected}"),
            BuildError::InvalidSymbol { row, col, ch } => {
                write!(f, "invalid symbol {ch:?} at row {row}, col {col}")
            }
            BuildError::ShipSize {
                symbol,
                expected,
                found,
            } => write!(f, "ship '{symbol}' has {found} cells, expected {expected}"),
            BuildError::ShipDisconnected { symbol } => {
                write!(f, "ship '{symbol}' cells are not all connected")
            }
            BuildError::PortalSize { expected, found } => {
                write!(f, "portal has {found} cells, expected {expected}")
            }
        }
    }
}

impl std::error::Error for BuildError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err = BuildError::ShipSize {
            symbol: Symbol::BIG_SHIP,
            expected: 2,
            found: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains('@'));
        assert!(msg.contains("expected 2"));

        let err = BuildError::InvalidSymbol { row: 1, col: 4, ch: '!' };
        assert!(err.to_string().contains("'!'"));
    }
}
