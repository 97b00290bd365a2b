//! Player commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::Direction;

/// A single player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Move the current ship one cell.
    Move(Direction),
    /// Hand control to the other ship.
    SwitchPlayer,
}

impl Command {
    /// Map a keyboard character to a command.
    ///
    /// `w a s d` move, `g` switches ship. Case is ignored.
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Command::Move(Direction::Up)),
            's' => Some(Command::Move(Direction::Down)),
            'a' => Some(Command::Move(Direction::Left)),
            'd' => Some(Command::Move(Direction::Right)),
            'g' => Some(Command::SwitchPlayer),
            _ => None,
        }
    }

    /// The key that produces this command, if any.
    #[must_use]
    pub const fn key(self) -> Option<char> {
        match self {
            Command::Move(Direction::Up) => Some('w'),
            Command::Move(Direction::Down) => Some('s'),
            Command::Move(Direction::Left) => Some('a'),
            Command::Move(Direction::Right) => Some('d'),
            Command::Move(Direction::Null) => None,
            Command::SwitchPlayer => Some('g'),
        }
    }

    /// Parse a string of keys, ignoring whitespace.
    ///
    /// # Errors
    ///
    /// Returns the first character that is not a command key.
    pub fn parse_keys(keys: &str) -> Result<Vec<Self>, char> {
        keys.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| Self::from_key(c).ok_or(c))
            .collect()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(direction) => write!(f, "move {direction}"),
            Command::SwitchPlayer => f.write_str("switch ship"),
        }
    }
}
