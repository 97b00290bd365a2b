//! Game state: the board, the objects on it, and the controlled ship.

use std::collections::HashMap;

use crate::config::GameConfig;
use crate::error::BuildError;
use crate::game::resolver;
use crate::game::{
    Board, Direction, GameObject, MoveStatus, ObjectClass, ObjectId, Point, Resolution, ShipSize,
    Symbol, assert_invariants,
};
use crate::level::Level;

/// Complete state of one level in play.
///
/// The board and the object list are built together and kept consistent:
/// every non-blank cell belongs to exactly one object and every object cell
/// is drawn on the board.
#[derive(Debug, Clone)]
pub struct GameState {
    /// The symbol grid.
    board: Board,
    /// All objects, in order of first appearance (row-major).
    objects: Vec<GameObject>,
    /// The ship receiving move commands.
    current_player: Option<ObjectId>,
}

impl GameState {
    /// Build a game state from a validated level.
    ///
    /// # Errors
    ///
    /// Returns an error if an object breaks a structural invariant.
    pub fn from_level(level: &Level, config: &GameConfig) -> Result<Self, BuildError> {
        Self::from_rows(level.rows(), config)
    }

    /// Build a game state from raw rows of symbols.
    ///
    /// The board takes the dimensions of the matrix itself. Only structural
    /// object invariants are checked here; level-wide rules (border wall,
    /// required elements) belong to the level loader.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or ragged matrix, a character outside
    /// the alphabet, or an object that breaks a structural invariant.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], config: &GameConfig) -> Result<Self, BuildError> {
        let matrix = parse_matrix(rows)?;
        let row_count = matrix.len();
        let col_count = matrix.first().map_or(0, Vec::len);
        let size_error = BuildError::BoardSize {
            rows: row_count,
            cols: col_count,
        };
        let rows_u16 = u16::try_from(row_count).map_err(|_| size_error)?;
        let cols_u16 = u16::try_from(col_count).map_err(|_| size_error)?;
        let mut board = Board::new(rows_u16, cols_u16).ok_or(size_error)?;

        // Group cells by symbol, keeping first-seen order so object ids are
        // stable for a given level.
        let mut groups: Vec<(Symbol, Vec<Point>)> = Vec::new();
        let mut group_of: HashMap<Symbol, usize> = HashMap::new();
        for (point, symbol) in points_of(&matrix) {
            board.set(point, symbol);
            if symbol.is_blank() {
                continue;
            }
            let slot = *group_of.entry(symbol).or_insert_with(|| {
                groups.push((symbol, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(point);
        }

        let mut objects = Vec::with_capacity(groups.len());
        for (symbol, location) in groups {
            let object = GameObject::build(symbol, location, config, &board)?;
            board.register(symbol, objects.len());
            objects.push(object);
        }

        let current_player = board.object_for(Symbol::BIG_SHIP);
        tracing::debug!(
            rows = rows_u16,
            cols = cols_u16,
            objects = objects.len(),
            "built game state"
        );

        Ok(Self {
            board,
            objects,
            current_player,
        })
    }

    /// The board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// All objects, indexed by [`ObjectId`].
    #[must_use]
    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    /// Object by id.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Id of the object drawn with `symbol`.
    #[must_use]
    pub fn object_id(&self, symbol: Symbol) -> Option<ObjectId> {
        self.board.object_for(symbol)
    }

    /// Object occupying `point`, if any.
    #[must_use]
    pub fn object_at(&self, point: Point) -> Option<&GameObject> {
        self.board.object_at(point).and_then(|id| self.objects.get(id))
    }

    /// Id of the ship currently under control.
    #[must_use]
    pub const fn current_player(&self) -> Option<ObjectId> {
        self.current_player
    }

    /// The ship currently under control.
    #[must_use]
    pub fn current_ship(&self) -> Option<&GameObject> {
        self.current_player.and_then(|id| self.objects.get(id))
    }

    /// Copy of the board as a matrix of symbols.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Vec<Symbol>> {
        self.board.snapshot()
    }

    /// Hand control to the other ship.
    ///
    /// From the big ship control passes to the small ship; from anything else
    /// it returns to the big ship. If the target ship is not on the board the
    /// current player becomes `None`.
    pub fn switch_current_player(&mut self) -> Option<ObjectId> {
        let target = match self.current_ship().map(GameObject::class) {
            Some(ObjectClass::Ship(ShipSize::Big)) => Symbol::SMALL_SHIP,
            _ => Symbol::BIG_SHIP,
        };
        self.current_player = self.board.object_for(target);
        tracing::debug!(player = %target, found = self.current_player.is_some(), "switched ship");
        self.current_player
    }

    /// Resolve moving the current ship one step in `direction`.
    ///
    /// Nothing is mutated; pass the result to [`GameState::commit`] to apply
    /// it, or drop it to discard.
    #[must_use]
    pub fn resolve(&self, direction: Direction) -> Resolution {
        match self.current_player {
            Some(id) => self.resolve_from(id, direction),
            None => Resolution::blocked(None, direction),
        }
    }

    /// Resolve moving an arbitrary object one step in `direction`.
    ///
    /// A `Null` direction or an unknown id never moves anything.
    #[must_use]
    pub fn resolve_from(&self, root: ObjectId, direction: Direction) -> Resolution {
        if direction == Direction::Null || root >= self.objects.len() {
            return Resolution::blocked(Some(root).filter(|&id| id < self.objects.len()), direction);
        }
        resolver::resolve(&self.board, &self.objects, root, direction)
    }

    /// Apply a resolution.
    ///
    /// Only a `CanMove` resolution changes anything: each listed object is
    /// shifted one step (wrapping). The board is updated for all movers
    /// together, vacated cells first, so interleaved shapes commit cleanly
    /// whatever the relocation order. The resolution must come from this
    /// state with no commit in between.
    pub fn commit(&mut self, resolution: Resolution) -> MoveStatus {
        let status = resolution.status();
        if status != MoveStatus::CanMove {
            return status;
        }

        let direction = resolution.direction();
        let relocations = resolution.into_relocations();
        let (rows, cols) = (self.board.rows(), self.board.cols());
        let shifted: Vec<(ObjectId, Vec<Point>)> = relocations
            .iter()
            .filter_map(|&id| {
                let object = self.objects.get(id)?;
                Some((id, object.shifted_location(direction, rows, cols)))
            })
            .collect();

        let moves: Vec<(Symbol, &[Point], &[Point])> = shifted
            .iter()
            .map(|(id, new_location)| {
                let object = &self.objects[*id];
                (object.symbol(), object.location(), new_location.as_slice())
            })
            .collect();
        self.board.apply_relocations(&moves);

        for (id, new_location) in shifted {
            self.objects[id].set_location(new_location);
        }

        tracing::debug!(
            %direction,
            moved = relocations.len(),
            "committed move"
        );
        assert_invariants(self);
        status
    }

    /// Resolve and, if legal, commit a move of the current ship.
    pub fn apply_move(&mut self, direction: Direction) -> MoveStatus {
        let resolution = self.resolve(direction);
        self.commit(resolution)
    }

    #[cfg(test)]
    pub(crate) fn parts_mut(&mut self) -> (&mut Board, &mut Vec<GameObject>) {
        (&mut self.board, &mut self.objects)
    }
}

/// Split rows into symbols, checking width and alphabet.
fn parse_matrix<S: AsRef<str>>(rows: &[S]) -> Result<Vec<Vec<Symbol>>, BuildError> {
    let expected = rows.first().map_or(0, |r| r.as_ref().chars().count());
    if rows.is_empty() || expected == 0 {
        return Err(BuildError::BoardSize {
            rows: rows.len(),
            cols: expected,
        });
    }

    rows.iter()
        .enumerate()
        .map(|(row, line)| {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != expected {
                return Err(BuildError::RowWidth {
                    row,
                    expected,
                    found,
                });
            }
            line.chars()
                .enumerate()
                .map(|(col, ch)| {
                    Symbol::new(ch).ok_or(BuildError::InvalidSymbol { row, col, ch })
                })
                .collect()
        })
        .collect()
}

/// Row-major points of a matrix that already fits in `u16` dimensions.
fn points_of(matrix: &[Vec<Symbol>]) -> impl Iterator<Item = (Point, Symbol)> + '_ {
    matrix.iter().enumerate().flat_map(|(r, row)| {
        row.iter().enumerate().map(move |(c, &symbol)| {
            #[allow(clippy::cast_possible_truncation)]
            let point = Point::new(r as u16, c as u16);
            (point, symbol)
        })
    })
}
