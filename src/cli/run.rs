//! Run command implementation.

use super::output::{JsonRunResult, format_statuses};
use super::{CliError, OutputFormat, load_config};
use pushover::game::Command;
use pushover::level::Level;
use pushover::record::Recorder;
use pushover::render::{render_ansi, render_text};
use pushover::session::Session;
use std::path::Path;
use std::time::Duration;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the level, the moves or the configuration are invalid.
pub(crate) fn execute(
    level_path: &Path,
    moves: &str,
    format: OutputFormat,
    save: Option<&Path>,
    color: bool,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let config = load_config(config)?;
    let level = Level::load(level_path, &config)?;
    let commands = Command::parse_keys(moves)
        .map_err(|key| CliError::new(format!("Unknown move key '{key}' (use w/a/s/d/g)")))?;

    let mut session = Session::new(&level, config)?;
    let mut recorder = save.map(|_| Recorder::new(&level, config));
    let mut statuses = Vec::with_capacity(commands.len());

    for command in commands {
        let Some(turn) = session.handle(command) else {
            break;
        };
        if let Some(recorder) = recorder.as_mut() {
            recorder.record_after(command, Duration::ZERO);
        }
        tracing::debug!(%command, status = %turn.status, fell = turn.fell, "handled");
        statuses.push(turn.status);
    }

    if let (Some(path), Some(recorder)) = (save, recorder) {
        recorder.finish_after(Duration::ZERO).save(path)?;
    }

    match format {
        OutputFormat::Text => {
            let frame = if color {
                render_ansi(&session)
            } else {
                render_text(&session)
            };
            print!("{frame}");
            print!("{}", format_statuses(&statuses));
            if let Some(path) = save {
                println!("Recording saved to: {}", path.display());
            }
        }
        OutputFormat::Json => {
            let json_result = JsonRunResult::from_session(&session, statuses);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
