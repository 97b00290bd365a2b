//! Output formatting utilities for CLI.

use pushover::game::MoveStatus;
use pushover::session::{Outcome, Session};
use serde::Serialize;

/// JSON-serializable result of a headless run.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult {
    /// Level name.
    pub(super) level: String,
    /// Final outcome.
    pub(super) outcome: Outcome,
    /// Commands handled.
    pub(super) commands: usize,
    /// Lives left.
    pub(super) lives: u32,
    /// Symbol of the selected ship.
    pub(super) current_ship: Option<char>,
    /// Status of each handled command.
    pub(super) statuses: Vec<MoveStatus>,
    /// Final board rows.
    pub(super) board: Vec<String>,
}

impl JsonRunResult {
    /// Create from a finished session.
    pub(super) fn from_session(session: &Session, statuses: Vec<MoveStatus>) -> Self {
        let state = session.state();
        let board = state.board();
        Self {
            level: session.level_name().to_string(),
            outcome: session.outcome(),
            commands: session.commands(),
            lives: session.lives().current(),
            current_ship: state.current_ship().map(|s| s.symbol().as_char()),
            statuses,
            board: (0..board.rows())
                .filter_map(|row| board.row_string(row))
                .collect(),
        }
    }
}

/// Verification result of one recording.
#[derive(Debug, Serialize)]
pub(super) struct RecordCheck {
    /// Recording file.
    pub(super) path: String,
    /// Recorded level name.
    pub(super) level: Option<String>,
    /// Number of recorded moves.
    pub(super) moves: usize,
    /// Outcome after replaying every move.
    pub(super) outcome: Option<Outcome>,
    /// Why the recording could not be replayed.
    pub(super) error: Option<String>,
}

/// Format a command log for the `run` command.
pub(super) fn format_statuses(statuses: &[MoveStatus]) -> String {
    let mut output = String::new();
    let moved = statuses
        .iter()
        .filter(|s| **s != MoveStatus::CannotMove)
        .count();
    output.push_str(&format!(
        "Commands: {} ({moved} moved, {} blocked)\n",
        statuses.len(),
        statuses.len() - moved
    ));
    output
}

/// Format recording checks as human-readable text.
pub(super) fn format_records_text(checks: &[RecordCheck]) -> String {
    let mut output = String::new();
    let mut won = 0usize;
    let mut failed = 0usize;

    for check in checks {
        match (&check.outcome, &check.error) {
            (Some(outcome), _) => {
                if *outcome == Outcome::Won {
                    won += 1;
                }
                output.push_str(&format!(
                    "  {}: {} in {} moves ({})\n",
                    check.path,
                    outcome,
                    check.moves,
                    check.level.as_deref().unwrap_or("?")
                ));
            }
            (None, error) => {
                failed += 1;
                output.push_str(&format!(
                    "  {}: FAILED {}\n",
                    check.path,
                    error.as_deref().unwrap_or("unknown error")
                ));
            }
        }
    }

    output.push_str(&format!(
        "\n{} recordings: {won} won, {} not won, {failed} failed\n",
        checks.len(),
        checks.len() - won - failed
    ));
    output
}
