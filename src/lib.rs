// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Pushover: a grid puzzle where ships push letter and number blocks
//! toward a portal.
//!
//! This crate provides a deterministic puzzle engine designed for:
//! - Atomic moves: a push chain either moves as a whole or not at all
//! - Reproducible sessions that can be recorded and replayed
//! - Level files checked before play
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI (play / run / replay / ...)   │
//! ├─────────────────────────────────────┤
//! │  Session (lives, timer, gravity)    │
//! ├─────────────────────────────────────┤
//! │  Game (board, objects, resolver)    │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod level;
pub mod record;
pub mod render;
pub mod session;

pub use config::{ConfigError, GameConfig};
pub use error::BuildError;

// Re-export key game types at crate root for convenience
pub use game::{Command, Direction, GameState, MoveStatus, ObjectKind, Point, Symbol};
pub use level::{Level, LevelError, LevelPack};
pub use record::{Recorder, Recording, ReplayEngine};
pub use session::{Outcome, Session};
