//! A level in play: lives, the countdown, gravity and the outcome.
//!
//! The session wraps a [`GameState`] and drives it one command at a time.
//! After every command it handles while playing, the settle step lets each
//! unsupported block fall one cell. A block that lands on a lone ship while
//! carrying more weight than the ship's mass costs a life.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::config::GameConfig;
use crate::error::BuildError;
use crate::game::{Command, Direction, GameState, MoveStatus, ObjectId};
use crate::level::Level;

/// Life counter for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lives {
    /// Lives at the start of the level.
    started: u32,
    /// Lives left.
    current: u32,
    /// Whether any life was ever lost.
    ever_reduced: bool,
    /// Whether a life was lost during the latest command.
    reduced_this_turn: bool,
}

impl Lives {
    /// Start with `hearts` lives.
    #[must_use]
    pub const fn new(hearts: u32) -> Self {
        Self {
            started: hearts,
            current: hearts,
            ever_reduced: false,
            reduced_this_turn: false,
        }
    }

    /// Lives at the start of the level.
    #[must_use]
    pub const fn started(&self) -> u32 {
        self.started
    }

    /// Lives left.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Whether any life was ever lost.
    #[must_use]
    pub const fn is_ever_reduced(&self) -> bool {
        self.ever_reduced
    }

    /// Whether a life was lost during the latest command.
    #[must_use]
    pub const fn is_reduced_this_turn(&self) -> bool {
        self.reduced_this_turn
    }

    /// Whether no lives are left.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.current == 0
    }

    fn start_turn(&mut self) {
        self.reduced_this_turn = false;
    }

    fn reduce(&mut self) {
        self.current = self.current.saturating_sub(1);
        self.ever_reduced = true;
        self.reduced_this_turn = true;
        tracing::debug!(lives = self.current, "life reduced");
    }
}

/// Why a level was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    /// Every life was used up.
    OutOfLives,
    /// The countdown reached zero.
    OutOfTime,
}

/// State of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Still in play.
    Playing,
    /// A ship reached the portal.
    Won,
    /// The level was lost.
    Lost(LossReason),
}

impl Outcome {
    /// Whether the level has ended.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Outcome::Playing)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Playing => f.write_str("playing"),
            Outcome::Won => f.write_str("won"),
            Outcome::Lost(LossReason::OutOfLives) => f.write_str("lost (out of lives)"),
            Outcome::Lost(LossReason::OutOfTime) => f.write_str("lost (out of time)"),
        }
    }
}

/// What one handled command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    /// Status of the command itself.
    pub status: MoveStatus,
    /// Objects moved by the settle step.
    pub fell: usize,
    /// Whether the settle step cost a life.
    pub life_lost: bool,
}

/// One level in play.
#[derive(Debug, Clone)]
pub struct Session {
    /// Name of the level.
    level_name: String,
    /// Configuration the level was built with.
    config: GameConfig,
    /// Board and objects.
    state: GameState,
    /// Life counter.
    lives: Lives,
    /// Time left, or `None` when unlimited.
    remaining: Option<Duration>,
    /// Current outcome.
    outcome: Outcome,
    /// Commands handled so far.
    commands: usize,
}

impl Session {
    /// Start a level.
    ///
    /// # Errors
    ///
    /// Returns an error if the level's objects are invalid under `config`.
    pub fn new(level: &Level, config: GameConfig) -> Result<Self, BuildError> {
        Self::from_rows(level.name(), level.rows(), config)
    }

    /// Start a level from raw rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows do not form a valid game state.
    pub fn from_rows<S: AsRef<str>>(
        level_name: &str,
        rows: &[S],
        config: GameConfig,
    ) -> Result<Self, BuildError> {
        let state = GameState::from_rows(rows, &config)?;
        let remaining = match config.time_limit_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self {
            level_name: level_name.to_string(),
            config,
            state,
            lives: Lives::new(config.hearts),
            remaining,
            outcome: Outcome::Playing,
            commands: 0,
        })
    }

    /// Name of the level.
    #[must_use]
    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Board and objects.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Life counter.
    #[must_use]
    pub const fn lives(&self) -> Lives {
        self.lives
    }

    /// Time left, or `None` when unlimited.
    #[must_use]
    pub const fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    /// Current outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Commands handled while playing.
    #[must_use]
    pub const fn commands(&self) -> usize {
        self.commands
    }

    /// Handle one command.
    ///
    /// Returns `None` once the level is over; the command is ignored.
    pub fn handle(&mut self, command: Command) -> Option<Turn> {
        if self.outcome.is_over() {
            return None;
        }
        self.lives.start_turn();
        self.commands += 1;

        let status = match command {
            Command::Move(direction) => self.state.apply_move(direction),
            Command::SwitchPlayer => {
                if self.state.switch_current_player().is_some() {
                    MoveStatus::CanMove
                } else {
                    MoveStatus::CannotMove
                }
            }
        };

        if status == MoveStatus::Victory {
            self.outcome = Outcome::Won;
            tracing::info!(level = %self.level_name, commands = self.commands, "level won");
            return Some(Turn {
                status,
                fell: 0,
                life_lost: false,
            });
        }

        let (fell, life_lost) = self.settle();
        if life_lost {
            self.lives.reduce();
            if self.lives.is_over() {
                self.outcome = Outcome::Lost(LossReason::OutOfLives);
                tracing::info!(level = %self.level_name, "out of lives");
            }
        }

        Some(Turn {
            status,
            fell,
            life_lost,
        })
    }

    /// Advance the countdown by `elapsed`.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.outcome.is_over() {
            return;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(elapsed);
            if remaining.is_zero() {
                self.outcome = Outcome::Lost(LossReason::OutOfTime);
                tracing::info!(level = %self.level_name, "out of time");
            }
        }
    }

    /// Let every unsupported block fall one cell.
    ///
    /// Blocks are tried in object order; a block already moved by an
    /// earlier fall in this step is skipped. Returns the number of objects
    /// moved and whether any fall crushed a ship.
    fn settle(&mut self) -> (usize, bool) {
        let blocks: Vec<ObjectId> = self
            .state
            .objects()
            .iter()
            .enumerate()
            .filter(|(_, object)| object.is_block())
            .map(|(id, _)| id)
            .collect();

        let mut moved: HashSet<ObjectId> = HashSet::new();
        let mut crushed = false;
        for id in blocks {
            if moved.contains(&id) {
                continue;
            }
            let resolution = self.state.resolve_from(id, Direction::Down);
            match resolution.status() {
                MoveStatus::CanMove => {
                    moved.extend(resolution.relocations().iter().copied());
                    self.state.commit(resolution);
                }
                MoveStatus::ReduceLife => crushed = true,
                MoveStatus::CannotMove | MoveStatus::Victory => {}
            }
        }

        if !moved.is_empty() || crushed {
            tracing::debug!(fell = moved.len(), crushed, "settled");
        }
        (moved.len(), crushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Point, Symbol};

    fn config() -> GameConfig {
        GameConfig {
            rows: 7,
            cols: 7,
            hearts: 2,
            time_limit_secs: 10,
            ..GameConfig::default()
        }
    }

    fn session(rows: &[&str]) -> Session {
        Session::from_rows("test", rows, config()).unwrap()
    }

    fn row(session: &Session, r: u16) -> String {
        session.state().board().row_string(r).unwrap()
    }

    const RIGHT: Command = Command::Move(Direction::Right);

    #[test]
    fn test_victory_ends_level() {
        let mut game = session(&[
            "#######", "#     #", "#@a   #", "#@ +  #", "#  $  #", "#     #", "#######",
        ]);
        let first = game.handle(RIGHT).unwrap();
        assert_eq!(first.status, MoveStatus::CanMove);
        assert_eq!(game.outcome(), Outcome::Playing);

        let second = game.handle(RIGHT).unwrap();
        assert_eq!(second.status, MoveStatus::Victory);
        assert_eq!(game.outcome(), Outcome::Won);
        assert!(game.handle(RIGHT).is_none());
        assert_eq!(game.commands(), 2);
    }

    #[test]
    fn test_unsupported_block_falls_one_cell_per_command() {
        let mut game = session(&[
            "#######", "#  a  #", "#     #", "#     #", "#@@$  #", "#    +#", "#######",
        ]);
        let block = game.state().object_id(Symbol::new('a').unwrap()).unwrap();

        let turn = game.handle(Command::Move(Direction::Left)).unwrap();
        assert_eq!(turn.status, MoveStatus::CannotMove);
        assert_eq!(turn.fell, 1);
        let location = game.state().object(block).unwrap().location().to_vec();
        assert_eq!(location, vec![Point::new(2, 3)]);

        game.handle(Command::Move(Direction::Left));
        game.handle(Command::Move(Direction::Left));
        let location = game.state().object(block).unwrap().location().to_vec();
        assert_eq!(location, vec![Point::new(3, 3)]);
        assert_eq!(row(&game, 3), "#  a  #");
    }

    #[test]
    fn test_falling_stack_pushes_blocks_below() {
        let mut game = session(&[
            "#######", "# a   #", "# b   #", "#     #", "#@@$  #", "#    +#", "#######",
        ]);
        let turn = game.handle(Command::SwitchPlayer).unwrap();
        assert_eq!(turn.status, MoveStatus::CanMove);
        assert_eq!(turn.fell, 2);
        assert_eq!(row(&game, 2), "# a   #");
        assert_eq!(row(&game, 3), "# b   #");
    }

    #[test]
    fn test_falling_block_cupping_another() {
        // `b` rests on a cell of `a`, which also arches over it.
        let mut game = session(&[
            "#######", "# aaa #", "# aba #", "#  a  #", "#     #", "#@@$ +#", "#######",
        ]);
        let turn = game.handle(Command::Move(Direction::Left)).unwrap();
        assert_eq!(turn.fell, 2);
        assert_eq!(row(&game, 1), "#     #");
        assert_eq!(row(&game, 2), "# aaa #");
        assert_eq!(row(&game, 3), "# aba #");
        assert_eq!(row(&game, 4), "#  a  #");
        assert!(crate::game::check_invariants(game.state()).is_empty());
    }

    #[test]
    fn test_heavy_block_costs_lives() {
        // Six cells of mass fall onto the small ship (mass 5).
        let mut game = session(&[
            "#######", "#aaaaa#", "#a    #", "#$    #", "#@@  +#", "#     #", "#######",
        ]);
        let turn = game.handle(Command::SwitchPlayer).unwrap();
        assert!(turn.life_lost);
        assert_eq!(game.lives().current(), 1);
        assert!(game.lives().is_ever_reduced());
        assert!(game.lives().is_reduced_this_turn());
        assert_eq!(game.outcome(), Outcome::Playing);

        game.handle(Command::SwitchPlayer);
        assert_eq!(game.lives().current(), 0);
        assert_eq!(game.outcome(), Outcome::Lost(LossReason::OutOfLives));
        assert!(game.handle(RIGHT).is_none());
    }

    #[test]
    fn test_light_block_rests_on_ship() {
        let mut game = session(&[
            "#######", "#     #", "# a   #", "# $   #", "#@@  +#", "#     #", "#######",
        ]);
        let turn = game.handle(Command::Move(Direction::Down)).unwrap();
        assert!(!turn.life_lost);
        assert_eq!(turn.fell, 0);
        assert_eq!(game.lives().current(), 2);
        assert!(!game.lives().is_reduced_this_turn());
    }

    #[test]
    fn test_countdown() {
        let mut game = session(&[
            "#######", "#     #", "#@@   #", "#$   +#", "#######", "#     #", "#######",
        ]);
        game.tick(Duration::from_secs(4));
        assert_eq!(game.remaining(), Some(Duration::from_secs(6)));
        assert_eq!(game.outcome(), Outcome::Playing);

        game.tick(Duration::from_secs(7));
        assert_eq!(game.remaining(), Some(Duration::ZERO));
        assert_eq!(game.outcome(), Outcome::Lost(LossReason::OutOfTime));
        assert!(game.handle(RIGHT).is_none());
    }

    #[test]
    fn test_unlimited_time() {
        let config = GameConfig {
            time_limit_secs: 0,
            ..config()
        };
        let mut game =
            Session::from_rows("free", &["#####", "#@@ #", "#$ +#", "#####"], config).unwrap();
        game.tick(Duration::from_secs(3600));
        assert_eq!(game.remaining(), None);
        assert_eq!(game.outcome(), Outcome::Playing);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Won.to_string(), "won");
        assert_eq!(
            Outcome::Lost(LossReason::OutOfTime).to_string(),
            "lost (out of time)"
        );
        assert!(!Outcome::Playing.is_over());
    }
}
