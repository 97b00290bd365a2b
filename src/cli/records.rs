//! Records command implementation.

use super::output::{RecordCheck, format_records_text};
use super::{CliError, OutputFormat};
use pushover::record::{Recording, ReplayEngine, list_records};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Execute the records command.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub(crate) fn execute(
    dir: &Path,
    threads: Option<usize>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let paths = list_records(dir)?;
    if paths.is_empty() {
        return Err(CliError::new(format!(
            "No recordings found in {}",
            dir.display()
        )));
    }

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let start = Instant::now();
    let checks: Vec<RecordCheck> = paths
        .par_iter()
        .map(PathBuf::as_path)
        .map(verify)
        .collect();
    let duration = start.elapsed();

    match format {
        OutputFormat::Text => {
            println!("Recordings in {}:", dir.display());
            print!("{}", format_records_text(&checks));
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&checks)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Replay one recording to the end.
fn verify(path: &Path) -> RecordCheck {
    let name = path.display().to_string();
    let recording = match Recording::load(path) {
        Ok(recording) => recording,
        Err(e) => {
            return RecordCheck {
                path: name,
                level: None,
                moves: 0,
                outcome: None,
                error: Some(e.to_string()),
            };
        }
    };

    let level = Some(recording.level.clone());
    let moves = recording.len();
    match ReplayEngine::new(recording) {
        Ok(mut engine) => {
            let outcome = engine.run_to_end();
            tracing::debug!(path = %name, %outcome, "verified recording");
            RecordCheck {
                path: name,
                level,
                moves,
                outcome: Some(outcome),
                error: None,
            }
        }
        Err(e) => RecordCheck {
            path: name,
            level,
            moves,
            outcome: None,
            error: Some(e.to_string()),
        },
    }
}
