//! Chain-push resolution.
//!
//! Given a root object and a direction, walk every object standing in the
//! way, ask each whether it may be pushed, and either stop with a terminal
//! status or produce the list of objects that must move.
//!
//! The relocation list is ordered front-most first: an object is recorded
//! only after everything in front of it has been recorded, so committing the
//! list in order always vacates a destination cell before the object behind
//! writes to it.

use std::collections::HashSet;

use crate::game::{Board, Direction, GameObject, MoveStatus, ObjectId};

/// Result of resolving a single move.
///
/// Only a `CanMove` resolution carries relocations; committing any other
/// status is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Terminal status of the move.
    status: MoveStatus,
    /// Object that initiated the move.
    root: Option<ObjectId>,
    /// Direction of the move.
    direction: Direction,
    /// Objects to relocate, front-most first.
    relocations: Vec<ObjectId>,
}

impl Resolution {
    /// A resolution that moves nothing.
    #[must_use]
    pub(crate) const fn blocked(root: Option<ObjectId>, direction: Direction) -> Self {
        Self {
            status: MoveStatus::CannotMove,
            root,
            direction,
            relocations: Vec::new(),
        }
    }

    /// Terminal status.
    #[must_use]
    pub const fn status(&self) -> MoveStatus {
        self.status
    }

    /// Object that initiated the move, if there was one.
    #[must_use]
    pub const fn root(&self) -> Option<ObjectId> {
        self.root
    }

    /// Direction of the move.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Objects to relocate, in commit order.
    #[must_use]
    pub fn relocations(&self) -> &[ObjectId] {
        &self.relocations
    }

    pub(crate) fn into_relocations(self) -> Vec<ObjectId> {
        self.relocations
    }
}

/// Resolve moving `root` one step in `direction`.
///
/// The board and objects are only read; nothing is mutated until the caller
/// commits the returned resolution.
pub(crate) fn resolve(
    board: &Board,
    objects: &[GameObject],
    root: ObjectId,
    direction: Direction,
) -> Resolution {
    let Some(root_object) = objects.get(root) else {
        return Resolution::blocked(None, direction);
    };

    let mut resolver = Resolver {
        board,
        objects,
        root,
        direction,
        visited: HashSet::from([root]),
    };
    let mut power = root_object.mass();
    let mut relocations = Vec::new();

    let status = resolver.can_move(&mut power, root, &mut relocations);
    if status != MoveStatus::CanMove {
        relocations.clear();
    }

    tracing::debug!(
        root = %root_object.symbol(),
        %direction,
        %status,
        movers = relocations.len(),
        power_left = power,
        "resolved move"
    );

    Resolution {
        status,
        root: Some(root),
        direction,
        relocations,
    }
}

/// State of one resolution.
///
/// `visited` is scoped to a single top-level call, so every object is
/// examined at most once and the walk terminates on any adjacency graph.
struct Resolver<'a> {
    board: &'a Board,
    objects: &'a [GameObject],
    root: ObjectId,
    direction: Direction,
    visited: HashSet<ObjectId>,
}

impl Resolver<'_> {
    /// Distinct objects one step from `id` in `direction`, excluding `id`.
    fn neighbors(&self, id: ObjectId, direction: Direction) -> Vec<ObjectId> {
        let mut found = Vec::new();
        for &point in self.objects[id].location() {
            let next = self.board.step(point, direction);
            if let Some(other) = self.board.object_at(next)
                && other != id
                && !found.contains(&other)
            {
                found.push(other);
            }
        }
        found
    }

    fn can_move(
        &mut self,
        power: &mut u32,
        current: ObjectId,
        relocations: &mut Vec<ObjectId>,
    ) -> MoveStatus {
        let objects = self.objects;
        let neighbors = self.neighbors(current, self.direction);

        for &neighbor in &neighbors {
            if neighbor == self.root || !self.visited.insert(neighbor) {
                continue;
            }

            let status = objects[neighbor].can_be_pushed(
                &objects[self.root],
                power,
                &objects[current],
                self.direction,
            );
            match status {
                MoveStatus::CannotMove | MoveStatus::Victory => return status,
                MoveStatus::ReduceLife if validate_lose(objects, &neighbors) => return status,
                // An ambiguous crush against several objects is not fatal.
                MoveStatus::ReduceLife | MoveStatus::CanMove => {}
            }

            let status = self.can_move(power, neighbor, relocations);
            if status != MoveStatus::CanMove {
                return status;
            }
        }

        relocations.push(current);
        self.carry_above(power, current, relocations);
        MoveStatus::CanMove
    }

    /// Pull along whatever rests on top of `current` during a sideways move.
    fn carry_above(&mut self, power: &mut u32, current: ObjectId, relocations: &mut Vec<ObjectId>) {
        if !self.direction.is_horizontal() {
            return;
        }

        let objects = self.objects;
        for above in self.neighbors(current, Direction::Up) {
            if self.visited.contains(&above) {
                continue;
            }

            let saved_power = *power;
            let rider = &objects[above];
            if rider.can_be_pushed(&objects[self.root], power, rider, self.direction)
                != MoveStatus::CanMove
            {
                *power = saved_power;
                continue;
            }

            // A rider that cannot follow stays put, and so does anything it
            // had started to pull along.
            let saved_visited = self.visited.clone();
            let mark = relocations.len();
            self.visited.insert(above);
            if self.can_move(power, above, relocations) != MoveStatus::CanMove {
                relocations.truncate(mark);
                self.visited = saved_visited;
                *power = saved_power;
            }
        }
    }
}

/// A crush only counts when a single ship is the only thing in the way.
fn validate_lose(objects: &[GameObject], neighbors: &[ObjectId]) -> bool {
    match neighbors {
        [only] => objects[*only].is_ship(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;

    fn state(rows: &[&str]) -> GameState {
        GameState::from_rows(rows, &crate::config::GameConfig::default()).unwrap()
    }

    fn id(state: &GameState, ch: char) -> ObjectId {
        state.object_id(crate::game::Symbol::new(ch).unwrap()).unwrap()
    }

    #[test]
    fn test_free_move_relocates_only_root() {
        let game = state(&["#####", "#@@ #", "#####"]);
        let ship = id(&game, '@');
        let resolution = resolve(game.board(), game.objects(), ship, Direction::Right);
        assert_eq!(resolution.status(), MoveStatus::CanMove);
        assert_eq!(resolution.relocations(), &[ship]);
    }

    #[test]
    fn test_chain_is_front_most_first() {
        let game = state(&["#######", "#@@ab #", "#######"]);
        let resolution = resolve(game.board(), game.objects(), id(&game, '@'), Direction::Right);
        assert_eq!(resolution.status(), MoveStatus::CanMove);
        assert_eq!(
            resolution.relocations(),
            &[id(&game, 'b'), id(&game, 'a'), id(&game, '@')]
        );
    }

    #[test]
    fn test_blocked_chain_has_no_relocations() {
        let game = state(&["######", "#@@ab#", "######"]);
        let resolution = resolve(game.board(), game.objects(), id(&game, '@'), Direction::Right);
        assert_eq!(resolution.status(), MoveStatus::CannotMove);
        assert!(resolution.relocations().is_empty());
    }

    #[test]
    fn test_diamond_pushes_shared_block_once() {
        // Both 'a' and 'b' touch 'c'; 'c' must be recorded a single time.
        let config = crate::config::GameConfig {
            big_ship_size: 3,
            ..crate::config::GameConfig::default()
        };
        let game = GameState::from_rows(
            &["#######", "#@a   #", "#@ac  #", "#@bc  #", "#######"],
            &config,
        )
        .unwrap();
        let resolution = resolve(game.board(), game.objects(), id(&game, '@'), Direction::Right);
        assert_eq!(resolution.status(), MoveStatus::CanMove);
        assert_eq!(
            resolution.relocations(),
            &[id(&game, 'c'), id(&game, 'a'), id(&game, 'b'), id(&game, '@')]
        );
    }

    #[test]
    fn test_validate_lose_requires_single_ship() {
        let game = state(&["#####", "#@@$#", "#####"]);
        let ship = id(&game, '$');
        let wall = id(&game, '#');
        assert!(validate_lose(game.objects(), &[ship]));
        assert!(!validate_lose(game.objects(), &[ship, wall]));
        assert!(!validate_lose(game.objects(), &[wall]));
        assert!(!validate_lose(game.objects(), &[]));
    }
}
