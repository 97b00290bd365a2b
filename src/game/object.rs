//! Game objects and their push legality rules.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::config::GameConfig;
use crate::error::BuildError;
use crate::game::{Board, Direction, ObjectKind, Point, Symbol};

/// Index of an object in the game state's object list.
pub type ObjectId = usize;

/// Mass of the big ship.
pub const BIG_SHIP_MASS: u32 = 10;

/// Mass of the small ship.
pub const SMALL_SHIP_MASS: u32 = 5;

/// Result of asking whether something can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    /// The move is blocked.
    CannotMove,
    /// The move is legal.
    CanMove,
    /// A ship is crushed by a heavier falling stack.
    ReduceLife,
    /// A ship reached the portal.
    Victory,
}

impl std::fmt::Display for MoveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MoveStatus::CannotMove => "cannot move",
            MoveStatus::CanMove => "moved",
            MoveStatus::ReduceLife => "life lost",
            MoveStatus::Victory => "victory",
        };
        f.write_str(name)
    }
}

/// Size class of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipSize {
    /// The big ship, pushes letter blocks.
    Big,
    /// The small ship, pushes number blocks.
    Small,
}

impl ShipSize {
    /// Fixed mass of this ship class.
    #[must_use]
    pub const fn mass(self) -> u32 {
        match self {
            ShipSize::Big => BIG_SHIP_MASS,
            ShipSize::Small => SMALL_SHIP_MASS,
        }
    }
}

/// Faction of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Letter blocks, movable only by the big ship.
    Letter,
    /// Number blocks, movable only by the small ship.
    Number,
}

impl BlockKind {
    /// The ship class allowed to push this faction.
    #[must_use]
    pub const fn pusher(self) -> ShipSize {
        match self {
            BlockKind::Letter => ShipSize::Big,
            BlockKind::Number => ShipSize::Small,
        }
    }
}

/// The closed set of object variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    /// A player-controlled ship.
    Ship(ShipSize),
    /// A pushable block.
    Block(BlockKind),
    /// The immovable border.
    Wall,
    /// The victory cell.
    Portal,
}

/// A single object on the board.
///
/// Each object owns every cell carrying its symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameObject {
    /// Which variant this is.
    class: ObjectClass,
    /// Symbol drawn on every cell of the object.
    symbol: Symbol,
    /// Occupied cells, in row-major order of first appearance.
    location: Vec<Point>,
    /// Mass used by the push rules.
    mass: u32,
}

impl GameObject {
    /// Build the object for `symbol` occupying `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if a ship has the wrong size or is not connected,
    /// if the portal has the wrong size, or if `symbol` is blank.
    pub fn build(
        symbol: Symbol,
        location: Vec<Point>,
        config: &GameConfig,
        board: &Board,
    ) -> Result<Self, BuildError> {
        let Some(kind) = symbol.kind() else {
            let at = location.first().copied().unwrap_or(Point::new(0, 0));
            return Err(BuildError::InvalidSymbol {
                row: usize::from(at.row),
                col: usize::from(at.col),
                ch: symbol.as_char(),
            });
        };

        match kind {
            ObjectKind::BigShip => Self::ship(ShipSize::Big, location, config.big_ship_size, board),
            ObjectKind::SmallShip => {
                Self::ship(ShipSize::Small, location, config.small_ship_size, board)
            }
            ObjectKind::LetterBlock | ObjectKind::NumberBlock => Ok(Self::block(symbol, location)),
            ObjectKind::Wall => Ok(Self::wall(location)),
            ObjectKind::Portal => Self::portal(location, config.portal_size),
        }
    }

    /// Build a ship, checking its size and connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ShipSize`] or [`BuildError::ShipDisconnected`].
    pub fn ship(
        size: ShipSize,
        location: Vec<Point>,
        expected_cells: usize,
        board: &Board,
    ) -> Result<Self, BuildError> {
        let symbol = match size {
            ShipSize::Big => Symbol::BIG_SHIP,
            ShipSize::Small => Symbol::SMALL_SHIP,
        };

        if location.len() != expected_cells {
            return Err(BuildError::ShipSize {
                symbol,
                expected: expected_cells,
                found: location.len(),
            });
        }
        if !is_connected(&location, board.rows(), board.cols()) {
            return Err(BuildError::ShipDisconnected { symbol });
        }

        Ok(Self {
            class: ObjectClass::Ship(size),
            symbol,
            location,
            mass: size.mass(),
        })
    }

    /// Build a block; its mass is its cell count.
    #[must_use]
    pub fn block(symbol: Symbol, location: Vec<Point>) -> Self {
        let kind = if symbol.as_char().is_ascii_digit() {
            BlockKind::Number
        } else {
            BlockKind::Letter
        };
        let mass = u32::try_from(location.len()).unwrap_or(u32::MAX);

        Self {
            class: ObjectClass::Block(kind),
            symbol,
            location,
            mass,
        }
    }

    /// Build the wall.
    #[must_use]
    pub fn wall(location: Vec<Point>) -> Self {
        Self {
            class: ObjectClass::Wall,
            symbol: Symbol::WALL,
            location,
            mass: 0,
        }
    }

    /// Build the portal, checking its size.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::PortalSize`] if the cell count is wrong.
    pub fn portal(location: Vec<Point>, expected_cells: usize) -> Result<Self, BuildError> {
        if location.len() != expected_cells {
            return Err(BuildError::PortalSize {
                expected: expected_cells,
                found: location.len(),
            });
        }

        Ok(Self {
            class: ObjectClass::Portal,
            symbol: Symbol::PORTAL,
            location,
            mass: 0,
        })
    }

    /// Variant of this object.
    #[must_use]
    pub const fn class(&self) -> ObjectClass {
        self.class
    }

    /// Symbol class of this object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self.class {
            ObjectClass::Ship(ShipSize::Big) => ObjectKind::BigShip,
            ObjectClass::Ship(ShipSize::Small) => ObjectKind::SmallShip,
            ObjectClass::Block(BlockKind::Letter) => ObjectKind::LetterBlock,
            ObjectClass::Block(BlockKind::Number) => ObjectKind::NumberBlock,
            ObjectClass::Wall => ObjectKind::Wall,
            ObjectClass::Portal => ObjectKind::Portal,
        }
    }

    /// Symbol of this object.
    #[must_use]
    pub const fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Occupied cells.
    #[must_use]
    pub fn location(&self) -> &[Point] {
        &self.location
    }

    /// Mass used by the push rules.
    #[must_use]
    pub const fn mass(&self) -> u32 {
        self.mass
    }

    /// Whether this is one of the ships.
    #[must_use]
    pub const fn is_ship(&self) -> bool {
        matches!(self.class, ObjectClass::Ship(_))
    }

    /// Whether this is a block.
    #[must_use]
    pub const fn is_block(&self) -> bool {
        matches!(self.class, ObjectClass::Block(_))
    }

    /// Every cell shifted one step in `direction` on a `rows` × `cols` board.
    #[must_use]
    pub fn shifted_location(&self, direction: Direction, rows: u16, cols: u16) -> Vec<Point> {
        self.location
            .iter()
            .map(|p| p.step(direction, rows, cols))
            .collect()
    }

    pub(crate) fn set_location(&mut self, location: Vec<Point>) {
        self.location = location;
    }

    /// Decide whether `pusher` may push this object on behalf of `root`.
    ///
    /// `power` is the push budget shared by the whole resolution: ships pay a
    /// block's mass out of it, and falling blocks add their mass to it.
    pub fn can_be_pushed(
        &self,
        root: &GameObject,
        power: &mut u32,
        pusher: &GameObject,
        direction: Direction,
    ) -> MoveStatus {
        match self.class {
            ObjectClass::Wall => MoveStatus::CannotMove,
            ObjectClass::Portal => {
                if pusher.is_ship() {
                    MoveStatus::Victory
                } else {
                    MoveStatus::CannotMove
                }
            }
            ObjectClass::Block(kind) => {
                if !root.is_block() && root.class != ObjectClass::Ship(kind.pusher()) {
                    return MoveStatus::CannotMove;
                }

                if root.is_ship() {
                    if *power < self.mass {
                        return MoveStatus::CannotMove;
                    }
                    *power -= self.mass;
                } else if root.is_block() && direction == Direction::Down {
                    *power = power.saturating_add(self.mass);
                }
                MoveStatus::CanMove
            }
            ObjectClass::Ship(_) => {
                if root.is_block() && direction == Direction::Down && *power > self.mass {
                    return MoveStatus::ReduceLife;
                }
                if *power <= self.mass {
                    return MoveStatus::CannotMove;
                }
                MoveStatus::CanMove
            }
        }
    }
}

/// Whether `cells` form one region under wrapped four-way adjacency.
pub(crate) fn is_connected(cells: &[Point], rows: u16, cols: u16) -> bool {
    let Some(&start) = cells.first() else {
        return false;
    };
    let members: HashSet<Point> = cells.iter().copied().collect();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(point) = queue.pop_front() {
        for next in point.neighbours(rows, cols) {
            if members.contains(&next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen.len() == members.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(7, 7).unwrap()
    }

    fn big_ship() -> GameObject {
        GameObject::ship(
            ShipSize::Big,
            vec![Point::new(3, 1), Point::new(3, 2)],
            2,
            &board(),
        )
        .unwrap()
    }

    fn small_ship() -> GameObject {
        GameObject::ship(ShipSize::Small, vec![Point::new(1, 1)], 1, &board()).unwrap()
    }

    fn block(ch: char, cells: usize) -> GameObject {
        let location = (0..cells)
            .map(|i| Point::new(5, u16::try_from(i).unwrap()))
            .collect();
        GameObject::block(Symbol::new(ch).unwrap(), location)
    }

    #[test]
    fn test_ship_mass_and_kind() {
        let ship = big_ship();
        assert_eq!(ship.mass(), BIG_SHIP_MASS);
        assert_eq!(ship.kind(), ObjectKind::BigShip);
        assert_eq!(small_ship().mass(), SMALL_SHIP_MASS);
    }

    #[test]
    fn test_ship_wrong_size() {
        let err = GameObject::ship(ShipSize::Big, vec![Point::new(1, 1)], 2, &board());
        assert_eq!(
            err,
            Err(BuildError::ShipSize {
                symbol: Symbol::BIG_SHIP,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_ship_disconnected() {
        let cells = vec![Point::new(1, 1), Point::new(1, 3)];
        let err = GameObject::ship(ShipSize::Big, cells, 2, &board());
        assert_eq!(
            err,
            Err(BuildError::ShipDisconnected {
                symbol: Symbol::BIG_SHIP
            })
        );
    }

    #[test]
    fn test_ship_l_shape_is_connected() {
        let cells = vec![Point::new(1, 1), Point::new(1, 2), Point::new(2, 2)];
        assert!(GameObject::ship(ShipSize::Big, cells, 3, &board()).is_ok());
    }

    #[test]
    fn test_ship_connected_across_seam() {
        let cells = vec![Point::new(3, 0), Point::new(3, 6)];
        assert!(GameObject::ship(ShipSize::Big, cells, 2, &board()).is_ok());
    }

    #[test]
    fn test_portal_size() {
        assert!(GameObject::portal(vec![Point::new(2, 2)], 1).is_ok());
        assert_eq!(
            GameObject::portal(vec![Point::new(2, 2), Point::new(2, 3)], 1),
            Err(BuildError::PortalSize {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_block_mass_is_cell_count() {
        assert_eq!(block('a', 3).mass(), 3);
        assert_eq!(block('a', 3).class(), ObjectClass::Block(BlockKind::Letter));
        assert_eq!(block('4', 1).class(), ObjectClass::Block(BlockKind::Number));
    }

    #[test]
    fn test_wall_never_moves() {
        let wall = GameObject::wall(vec![Point::new(0, 0)]);
        let ship = big_ship();
        for direction in Direction::CARDINAL {
            let mut power = u32::MAX;
            assert_eq!(
                wall.can_be_pushed(&ship, &mut power, &ship, direction),
                MoveStatus::CannotMove
            );
            assert_eq!(power, u32::MAX);
        }
    }

    #[test]
    fn test_portal_needs_ship_pusher() {
        let portal = GameObject::portal(vec![Point::new(2, 2)], 1).unwrap();
        let ship = big_ship();
        let blk = block('a', 1);
        let mut power = 10;
        assert_eq!(
            portal.can_be_pushed(&ship, &mut power, &ship, Direction::Right),
            MoveStatus::Victory
        );
        assert_eq!(
            portal.can_be_pushed(&ship, &mut power, &blk, Direction::Right),
            MoveStatus::CannotMove
        );
    }

    #[test]
    fn test_block_faction_gating() {
        let big = big_ship();
        let small = small_ship();
        let letter = block('a', 1);
        let number = block('1', 1);

        let mut power = 10;
        assert_eq!(
            number.can_be_pushed(&big, &mut power, &big, Direction::Right),
            MoveStatus::CannotMove
        );
        assert_eq!(power, 10);

        let mut power = 5;
        assert_eq!(
            letter.can_be_pushed(&small, &mut power, &small, Direction::Right),
            MoveStatus::CannotMove
        );
        assert_eq!(power, 5);
    }

    #[test]
    fn test_block_pays_mass_from_power() {
        let big = big_ship();
        let heavy = block('a', 4);

        let mut power = 10;
        assert_eq!(
            heavy.can_be_pushed(&big, &mut power, &big, Direction::Left),
            MoveStatus::CanMove
        );
        assert_eq!(power, 6);

        let mut power = 3;
        assert_eq!(
            heavy.can_be_pushed(&big, &mut power, &big, Direction::Left),
            MoveStatus::CannotMove
        );
        assert_eq!(power, 3);
    }

    #[test]
    fn test_falling_block_accumulates_weight() {
        let top = block('a', 2);
        let below = block('7', 3);

        let mut power = top.mass();
        assert_eq!(
            below.can_be_pushed(&top, &mut power, &top, Direction::Down),
            MoveStatus::CanMove
        );
        assert_eq!(power, 5);

        // Sideways block chains neither pay nor gain.
        let mut power = top.mass();
        assert_eq!(
            below.can_be_pushed(&top, &mut power, &top, Direction::Right),
            MoveStatus::CanMove
        );
        assert_eq!(power, 2);
    }

    #[test]
    fn test_ship_crushed_by_heavier_stack() {
        let small = small_ship();
        let stack = block('a', 6);

        let mut power = stack.mass();
        assert_eq!(
            small.can_be_pushed(&stack, &mut power, &stack, Direction::Down),
            MoveStatus::ReduceLife
        );

        let light = block('a', 2);
        let mut power = light.mass();
        assert_eq!(
            small.can_be_pushed(&light, &mut power, &light, Direction::Down),
            MoveStatus::CannotMove
        );
    }

    #[test]
    fn test_ship_pushes_ship_only_when_stronger() {
        let big = big_ship();
        let small = small_ship();

        let mut power = big.mass();
        assert_eq!(
            small.can_be_pushed(&big, &mut power, &big, Direction::Up),
            MoveStatus::CanMove
        );

        let mut power = small.mass();
        assert_eq!(
            big.can_be_pushed(&small, &mut power, &small, Direction::Up),
            MoveStatus::CannotMove
        );
    }
}
