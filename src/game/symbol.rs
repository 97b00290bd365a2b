//! Board symbols and the object classes they stand for.

use std::fmt;

/// Class of object a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// The big ship (`@`), pushes letter blocks.
    BigShip,
    /// The small ship (`$`), pushes number blocks.
    SmallShip,
    /// A block labelled with an ASCII letter.
    LetterBlock,
    /// A block labelled with a digit.
    NumberBlock,
    /// The immovable border (`#`).
    Wall,
    /// The victory cell (`+`).
    Portal,
}

impl ObjectKind {
    /// Whether this kind is one of the two ships.
    #[must_use]
    pub const fn is_ship(self) -> bool {
        matches!(self, ObjectKind::BigShip | ObjectKind::SmallShip)
    }

    /// Whether this kind is a block of either faction.
    #[must_use]
    pub const fn is_block(self) -> bool {
        matches!(self, ObjectKind::LetterBlock | ObjectKind::NumberBlock)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::BigShip => "big ship",
            ObjectKind::SmallShip => "small ship",
            ObjectKind::LetterBlock => "letter block",
            ObjectKind::NumberBlock => "number block",
            ObjectKind::Wall => "wall",
            ObjectKind::Portal => "portal",
        };
        f.write_str(name)
    }
}

/// A single character of the level alphabet.
///
/// Only characters of the fixed alphabet can be wrapped, so every `Symbol`
/// is either blank or maps to exactly one [`ObjectKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(char);

impl Symbol {
    /// Empty cell.
    pub const BLANK: Symbol = Symbol(' ');
    /// The big ship.
    pub const BIG_SHIP: Symbol = Symbol('@');
    /// The small ship.
    pub const SMALL_SHIP: Symbol = Symbol('$');
    /// Wall cells.
    pub const WALL: Symbol = Symbol('#');
    /// Portal cells.
    pub const PORTAL: Symbol = Symbol('+');

    /// Wrap a character, returning `None` if it is outside the alphabet.
    #[must_use]
    pub const fn new(ch: char) -> Option<Self> {
        match ch {
            ' ' | '@' | '$' | '#' | '+' => Some(Self(ch)),
            _ if ch.is_ascii_alphanumeric() => Some(Self(ch)),
            _ => None,
        }
    }

    /// The underlying character.
    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }

    /// Whether this is the empty cell.
    #[must_use]
    pub const fn is_blank(self) -> bool {
        self.0 == ' '
    }

    /// Object class of this symbol, or `None` for a blank cell.
    #[must_use]
    pub const fn kind(self) -> Option<ObjectKind> {
        match self.0 {
            ' ' => None,
            '@' => Some(ObjectKind::BigShip),
            '$' => Some(ObjectKind::SmallShip),
            '#' => Some(ObjectKind::Wall),
            '+' => Some(ObjectKind::Portal),
            c if c.is_ascii_digit() => Some(ObjectKind::NumberBlock),
            _ => Some(ObjectKind::LetterBlock),
        }
    }
}

impl TryFrom<char> for Symbol {
    type Error = char;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        Symbol::new(ch).ok_or(ch)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
