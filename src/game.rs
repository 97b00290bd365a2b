//! Game layer for pushover.
//!
//! Implements the push rules on top of a symbol grid:
//! - Points and directions with wrapping arithmetic
//! - The board and its symbol → object index
//! - Objects (ships, blocks, wall, portal) and their legality checks
//! - The chain-push resolver
//! - Game state that commits resolved moves

mod board;
mod command;
mod invariants;
mod object;
mod point;
mod resolver;
mod state;
mod symbol;

pub use board::Board;
pub use command::Command;
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use object::{
    BIG_SHIP_MASS, BlockKind, GameObject, MoveStatus, ObjectClass, ObjectId, SMALL_SHIP_MASS,
    ShipSize,
};
pub use point::{Direction, Point};
pub use resolver::Resolution;
pub use state::GameState;
pub use symbol::{ObjectKind, Symbol};
