//! Game invariants - sanity checks that detect bugs.
//!
//! A correctly implemented move engine never trips these. They run after
//! every commit in debug builds and from the property tests and fuzzer.

use std::collections::HashSet;

use crate::game::object::is_connected;
use crate::game::{GameState, ObjectClass, Point};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut report = |message: String| violations.push(InvariantViolation { message });

    let board = state.board();
    let mut claimed: HashSet<Point> = HashSet::new();

    // Every object cell is drawn with the object's symbol and owned by it.
    for (id, object) in state.objects().iter().enumerate() {
        let symbol = object.symbol();
        if object.location().is_empty() {
            report(format!("Object '{symbol}' occupies no cells"));
        }
        for &point in object.location() {
            if !claimed.insert(point) {
                report(format!("Cell {point} is claimed by more than one object"));
            }
            if board.cell_at(point) != Some(symbol) {
                report(format!(
                    "Object '{symbol}' claims {point} but the board shows {:?}",
                    board.cell_at(point).map(|s| s.as_char())
                ));
            } else if board.object_at(point) != Some(id) {
                report(format!("Cell {point} does not resolve to object '{symbol}'"));
            }
        }

        match object.class() {
            ObjectClass::Ship(size) => {
                if object.mass() != size.mass() {
                    report(format!(
                        "Ship '{symbol}' has mass {}, expected {}",
                        object.mass(),
                        size.mass()
                    ));
                }
                if !is_connected(object.location(), board.rows(), board.cols()) {
                    report(format!("Ship '{symbol}' is no longer connected"));
                }
            }
            ObjectClass::Block(_) => {
                let cells = object.location().len();
                if usize::try_from(object.mass()).ok() != Some(cells) {
                    report(format!(
                        "Block '{symbol}' has mass {} but {cells} cells",
                        object.mass()
                    ));
                }
            }
            ObjectClass::Wall | ObjectClass::Portal => {
                if object.mass() != 0 {
                    report(format!("'{symbol}' has non-zero mass {}", object.mass()));
                }
            }
        }
    }

    // Every drawn cell belongs to some object.
    for (point, symbol) in board.iter() {
        if !symbol.is_blank() && !claimed.contains(&point) {
            report(format!("Board shows '{symbol}' at {point} but no object owns it"));
        }
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Direction, Symbol};

    fn create_valid_game() -> GameState {
        GameState::from_rows(
            &["######", "# aa #", "#@@$ #", "#  + #", "######"],
            &GameConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_game_passes() {
        let game = create_valid_game();
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_valid_after_moves() {
        let mut game = create_valid_game();
        for direction in [Direction::Down, Direction::Up, Direction::Left, Direction::Right] {
            game.apply_move(direction);
            assert!(check_invariants(&game).is_empty(), "after {direction}");
        }
    }

    #[test]
    fn test_stray_board_cell_detected() {
        let mut game = create_valid_game();
        let (board, _) = game.parts_mut();
        board.set(Point::new(3, 1), Symbol::new('a').unwrap());

        let violations = check_invariants(&game);
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("no object owns it"));
    }

    #[test]
    fn test_erased_object_cell_detected() {
        let mut game = create_valid_game();
        let (board, _) = game.parts_mut();
        board.set(Point::new(2, 3), Symbol::BLANK);

        let violations = check_invariants(&game);
        assert!(
            violations
                .iter()
                .any(|v| v.message.contains("claims (2, 3)"))
        );
    }

    #[test]
    fn test_double_claim_detected() {
        let mut game = create_valid_game();
        let block = game.object_id(Symbol::new('a').unwrap()).unwrap();
        let (_, objects) = game.parts_mut();
        objects[block].set_location(vec![Point::new(1, 2), Point::new(2, 1)]);

        let violations = check_invariants(&game);
        assert!(
            violations
                .iter()
                .any(|v| v.message.contains("more than one object"))
        );
    }

    #[test]
    fn test_broken_ship_detected() {
        let mut game = create_valid_game();
        let ship = game.object_id(Symbol::BIG_SHIP).unwrap();
        let (board, objects) = game.parts_mut();
        board.set(Point::new(2, 2), Symbol::BLANK);
        board.set(Point::new(3, 2), Symbol::BIG_SHIP);
        objects[ship].set_location(vec![Point::new(2, 1), Point::new(3, 2)]);

        let violations = check_invariants(&game);
        assert_eq!(violations.len(), 1, "{violations:?}");
        assert!(violations[0].message.contains("connected"));
    }

    #[test]
    fn test_violation_display() {
        let violation = InvariantViolation {
            message: "boom".to_string(),
        };
        assert_eq!(violation.to_string(), "Invariant violation: boom");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Game invariant violations")]
    fn test_assert_invariants_panics() {
        let mut game = create_valid_game();
        let (board, _) = game.parts_mut();
        board.set(Point::new(3, 1), Symbol::WALL);
        assert_invariants(&game);
    }
}
