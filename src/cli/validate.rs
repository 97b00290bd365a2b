//! Level validation command implementation.

use super::{CliError, load_config};
use pushover::level::{Level, LevelCheck};
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the level fails a
/// check.
pub(crate) fn execute(level_path: &Path, config: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config)?;

    println!("Validating: {}", level_path.display());
    println!("Board: {} rows x {} cols", config.rows, config.cols);
    println!();

    let result = Level::load(level_path, &config);
    let failed = result.as_ref().err().map(pushover::level::LevelError::check);

    // Checks run in order; everything after the first failure is skipped.
    let mut reached_failure = false;
    for check in LevelCheck::ALL {
        if reached_failure {
            print_check(check, None);
        } else if failed == Some(check) {
            reached_failure = true;
            print_check(check, Some(false));
        } else {
            print_check(check, Some(true));
        }
    }
    println!();

    match result {
        Ok(level) => {
            let state = level.build(&config)?;
            println!("Summary:");
            println!("  Level:    {}", level.name());
            println!("  Objects:  {}", state.objects().len());
            println!(
                "  Blocks:   {}",
                state.objects().iter().filter(|o| o.is_block()).count()
            );
            println!();
            println!("Validation successful!");
            Ok(())
        }
        Err(e) => Err(CliError::new(format!("Level is invalid: {e}"))),
    }
}

fn print_check(check: LevelCheck, ok: Option<bool>) {
    let (symbol, status) = match ok {
        Some(true) => ("✓", "OK"),
        Some(false) => ("✗", "FAILED"),
        None => ("-", "skipped"),
    };
    println!("  {symbol} {check}: {status}");
}
