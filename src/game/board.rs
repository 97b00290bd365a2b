//! The symbol grid and its symbol → object index.

use std::collections::{HashMap, HashSet};

use crate::game::{Direction, ObjectId, Point, Symbol};

/// The game board.
///
/// Cells are stored in row-major order. Every non-blank symbol is registered
/// in the index so a cell can be resolved to the object that owns it.
#[derive(Debug, Clone)]
pub struct Board {
    /// Number of rows.
    rows: u16,
    /// Number of columns.
    cols: u16,
    /// Cells stored in row-major order.
    cells: Vec<Symbol>,
    /// Owning object of each non-blank symbol.
    index: HashMap<Symbol, ObjectId>,
}

impl Board {
    /// Create a new board filled with blank cells.
    ///
    /// Returns `None` if `rows` or `cols` is zero.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }

        let size = usize::from(rows) * usize::from(cols);
        Some(Self {
            rows,
            cols,
            cells: vec![Symbol::BLANK; size],
            index: HashMap::new(),
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    /// Check if a point is within the board bounds.
    #[must_use]
    pub const fn in_bounds(&self, point: Point) -> bool {
        point.row < self.rows && point.col < self.cols
    }

    fn point_to_index(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some(usize::from(point.row) * usize::from(self.cols) + usize::from(point.col))
        } else {
            None
        }
    }

    /// Step one cell from `point` in `direction`, wrapping at the edges.
    #[must_use]
    #[inline]
    pub fn step(&self, point: Point, direction: Direction) -> Point {
        point.step(direction, self.rows, self.cols)
    }

    /// Symbol at a point, or `None` if the point is out of bounds.
    #[must_use]
    #[inline]
    pub fn cell_at(&self, point: Point) -> Option<Symbol> {
        self.point_to_index(point).map(|idx| self.cells[idx])
    }

    /// The object occupying a point, or `None` for blank or out-of-bounds cells.
    #[must_use]
    #[inline]
    pub fn object_at(&self, point: Point) -> Option<ObjectId> {
        let symbol = self.cell_at(point)?;
        if symbol.is_blank() {
            return None;
        }
        self.index.get(&symbol).copied()
    }

    /// The object registered for `symbol`, if any.
    #[must_use]
    pub fn object_for(&self, symbol: Symbol) -> Option<ObjectId> {
        self.index.get(&symbol).copied()
    }

    /// Register `symbol` as belonging to object `id`.
    pub(crate) fn register(&mut self, symbol: Symbol, id: ObjectId) {
        self.index.insert(symbol, id);
    }

    /// Write a symbol to a cell.
    ///
    /// Returns `false` if the point is out of bounds.
    pub(crate) fn set(&mut self, point: Point, symbol: Symbol) -> bool {
        if let Some(idx) = self.point_to_index(point) {
            self.cells[idx] = symbol;
            true
        } else {
            false
        }
    }

    /// Move `symbol` from `old` cells to `new` cells.
    ///
    /// Only the difference is written: cells in `old` but not `new` are
    /// blanked, cells in `new` but not `old` receive the symbol. Cells shared
    /// by both sets are left alone.
    pub fn apply_relocation(&mut self, symbol: Symbol, old: &[Point], new: &[Point]) {
        self.apply_relocations(&[(symbol, old, new)]);
    }

    /// Move several objects at once, each given as `(symbol, old, new)`.
    ///
    /// Every mover's vacated cells are blanked before any mover's new cells
    /// are written, so the result does not depend on the order of `moves`
    /// even when one object wraps around another.
    pub fn apply_relocations(&mut self, moves: &[(Symbol, &[Point], &[Point])]) {
        let deltas: Vec<(Symbol, Vec<Point>, Vec<Point>)> = moves
            .iter()
            .map(|&(symbol, old, new)| {
                let old_set: HashSet<Point> = old.iter().copied().collect();
                let new_set: HashSet<Point> = new.iter().copied().collect();
                let vacated = old.iter().copied().filter(|p| !new_set.contains(p)).collect();
                let claimed = new.iter().copied().filter(|p| !old_set.contains(p)).collect();
                (symbol, vacated, claimed)
            })
            .collect();

        for (_, vacated, _) in &deltas {
            for &point in vacated {
                self.set(point, Symbol::BLANK);
            }
        }
        for (symbol, _, claimed) in &deltas {
            for &point in claimed {
                self.set(point, *symbol);
            }
        }
    }

    /// Copy of the board as a matrix of symbols.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Vec<Symbol>> {
        self.cells
            .chunks(usize::from(self.cols))
            .map(<[Symbol]>::to_vec)
            .collect()
    }

    /// One row rendered as a string, or `None` if out of bounds.
    #[must_use]
    pub fn row_string(&self, row: u16) -> Option<String> {
        if row >= self.rows {
            return None;
        }
        let start = usize::from(row) * usize::from(self.cols);
        let end = start + usize::from(self.cols);
        Some(self.cells[start..end].iter().map(|s| s.as_char()).collect())
    }

    /// Iterate over all points and symbols in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, Symbol)> + '_ {
        let cols = usize::from(self.cols);
        self.cells.iter().enumerate().map(move |(idx, symbol)| {
            #[allow(clippy::cast_possible_truncation)]
            let point = Point::new((idx / cols) as u16, (idx % cols) as u16);
            (point, *symbol)
        })
    }

    /// Number of non-blank cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|s| !s.is_blank()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(ch: char) -> Symbol {
        Symbol::new(ch).unwrap()
    }

    #[test]
    fn test_board_creation() {
        let board = Board::new(5, 8).unwrap();
        assert_eq!(board.rows(), 5);
        assert_eq!(board.cols(), 8);
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_board_zero_size() {
        assert!(Board::new(0, 10).is_none());
        assert!(Board::new(10, 0).is_none());
    }

    #[test]
    fn test_board_bounds() {
        let board = Board::new(4, 6).unwrap();
        assert!(board.in_bounds(Point::new(0, 0)));
        assert!(board.in_bounds(Point::new(3, 5)));
        assert!(!board.in_bounds(Point::new(4, 0)));
        assert!(!board.in_bounds(Point::new(0, 6)));
        assert_eq!(board.cell_at(Point::new(4, 0)), None);
    }

    #[test]
    fn test_object_at_uses_index() {
        let mut board = Board::new(3, 3).unwrap();
        board.set(Point::new(1, 1), sym('a'));
        assert_eq!(board.object_at(Point::new(1, 1)), None);

        board.register(sym('a'), 4);
        assert_eq!(board.object_at(Point::new(1, 1)), Some(4));
        assert_eq!(board.object_at(Point::new(0, 0)), None);
        assert_eq!(board.object_for(sym('a')), Some(4));
    }

    #[test]
    fn test_apply_relocation_writes_only_delta() {
        let mut board = Board::new(1, 5).unwrap();
        let old = [Point::new(0, 1), Point::new(0, 2)];
        let new = [Point::new(0, 2), Point::new(0, 3)];
        for &p in &old {
            board.set(p, Symbol::BIG_SHIP);
        }

        board.apply_relocation(Symbol::BIG_SHIP, &old, &new);
        assert_eq!(board.row_string(0).unwrap(), "  @@ ");
    }

    #[test]
    fn test_apply_relocation_keeps_shared_cell_of_other_mover() {
        // A block moved out of (0,2) first and the ship then claims it; the
        // ship's own delta must not touch the block's new cell.
        let mut board = Board::new(1, 5).unwrap();
        board.set(Point::new(0, 1), Symbol::BIG_SHIP);
        board.set(Point::new(0, 2), sym('a'));

        board.apply_relocation(sym('a'), &[Point::new(0, 2)], &[Point::new(0, 3)]);
        board.apply_relocation(Symbol::BIG_SHIP, &[Point::new(0, 1)], &[Point::new(0, 2)]);
        assert_eq!(board.row_string(0).unwrap(), "  @a ");
    }

    #[test]
    fn test_apply_relocations_inner_block_listed_first() {
        // `a` cups `b`: b moves into a cell a is leaving, and a moves into
        // the cell b is leaving.
        let mut board = Board::new(1, 6).unwrap();
        board.set(Point::new(0, 1), sym('a'));
        board.set(Point::new(0, 2), sym('b'));
        board.set(Point::new(0, 3), sym('a'));
        let a_old = [Point::new(0, 1), Point::new(0, 3)];
        let a_new = [Point::new(0, 2), Point::new(0, 4)];
        let b_old = [Point::new(0, 2)];
        let b_new = [Point::new(0, 3)];

        board.apply_relocations(&[
            (sym('b'), &b_old[..], &b_new[..]),
            (sym('a'), &a_old[..], &a_new[..]),
        ]);
        assert_eq!(board.row_string(0).unwrap(), "  aba ");
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut board = Board::new(2, 2).unwrap();
        let mut snapshot = board.snapshot();
        snapshot[0][0] = Symbol::WALL;
        assert_eq!(board.cell_at(Point::new(0, 0)), Some(Symbol::BLANK));

        board.set(Point::new(1, 1), Symbol::PORTAL);
        assert_eq!(snapshot[1][1], Symbol::BLANK);
        assert_eq!(board.snapshot()[1][1], Symbol::PORTAL);
    }

    #[test]
    fn test_iter_row_major() {
        let board = Board::new(2, 3).unwrap();
        let points: Vec<Point> = board.iter().map(|(p, _)| p).collect();
        assert_eq!(points[0], Point::new(0, 0));
        assert_eq!(points[2], Point::new(0, 2));
        assert_eq!(points[3], Point::new(1, 0));
        assert_eq!(points.len(), 6);
    }
}
