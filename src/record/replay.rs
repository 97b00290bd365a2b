//! Deterministic playback of a recording.

use std::time::Duration;

use crate::record::{RecordError, Recording};
use crate::session::{Outcome, Session, Turn};

/// Replay engine - steps through a recording deterministically.
///
/// Since sessions are deterministic, this engine can:
/// - Step forward by handling the next recorded command
/// - Step backward by replaying from the start
/// - Jump to any move by replaying from the start
///
/// Each recorded delay is fed to the session's countdown before its
/// command, so a timeout is reproduced exactly.
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    /// The recording being replayed.
    recording: Recording,
    /// Session after `position` moves.
    session: Session,
    /// Number of recorded moves applied.
    position: usize,
}

impl ReplayEngine {
    /// Create a replay engine at the start of a recording.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorded level does not build.
    pub fn new(recording: Recording) -> Result<Self, RecordError> {
        Self::new_at(recording, 0)
    }

    /// Create a replay engine after `position` moves.
    ///
    /// # Errors
    ///
    /// Returns an error if `position` is past the end or the recorded level
    /// does not build.
    pub fn new_at(recording: Recording, position: usize) -> Result<Self, RecordError> {
        if position > recording.len() {
            return Err(RecordError::MoveOutOfBounds {
                requested: position,
                len: recording.len(),
            });
        }

        let session = recording.start()?;
        let mut engine = Self {
            recording,
            session,
            position: 0,
        };
        if engine.recording.is_empty() {
            engine.apply_tail();
        }
        for _ in 0..position {
            engine.advance();
        }
        Ok(engine)
    }

    /// The recording.
    #[must_use]
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Session after the current position.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of moves applied.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of recorded moves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recording.len()
    }

    /// Whether the recording has no moves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recording.is_empty()
    }

    /// Whether every move has been applied.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.recording.len()
    }

    /// Recorded delay before the next move.
    #[must_use]
    pub fn delay_to_next(&self) -> Option<Duration> {
        self.recording
            .moves
            .get(self.position)
            .map(|m| Duration::from_millis(m.delay_ms))
    }

    /// Apply the next move.
    ///
    /// Returns what the command did, or `None` if the session had already
    /// ended and ignored it.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::AtEnd`] after the last move.
    pub fn step_forward(&mut self) -> Result<Option<Turn>, RecordError> {
        if self.is_at_end() {
            return Err(RecordError::AtEnd);
        }
        Ok(self.advance())
    }

    /// Go back one move by replaying from the start.
    ///
    /// # Errors
    ///
    /// Returns an error if already at the start.
    pub fn step_backward(&mut self) -> Result<(), RecordError> {
        if self.position == 0 {
            return Err(RecordError::MoveOutOfBounds {
                requested: 0,
                len: self.recording.len(),
            });
        }
        self.goto(self.position - 1)
    }

    /// Jump to the state after `position` moves.
    ///
    /// # Errors
    ///
    /// Returns an error if `position` is past the end.
    pub fn goto(&mut self, position: usize) -> Result<(), RecordError> {
        if position == self.position {
            return Ok(());
        }
        if position > self.position && position <= self.recording.len() {
            while self.position < position {
                self.advance();
            }
            return Ok(());
        }
        let recording = self.recording.clone();
        *self = Self::new_at(recording, position)?;
        Ok(())
    }

    /// Apply every remaining move and return the final outcome.
    pub fn run_to_end(&mut self) -> Outcome {
        while !self.is_at_end() {
            self.advance();
        }
        self.session.outcome()
    }

    fn advance(&mut self) -> Option<Turn> {
        let recorded = *self.recording.moves.get(self.position)?;
        self.session.tick(Duration::from_millis(recorded.delay_ms));
        let turn = self.session.handle(recorded.command);
        self.position += 1;
        if self.is_at_end() {
            self.apply_tail();
        }
        turn
    }

    fn apply_tail(&mut self) {
        self.session
            .tick(Duration::from_millis(self.recording.tail_ms));
    }
}
