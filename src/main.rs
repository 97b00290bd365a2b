//! Pushover CLI - play, run, replay and validate Pushover levels.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::filter::EnvFilter;

/// Pushover - push blocks, reach the portal
#[derive(Parser, Debug)]
#[command(name = "pushover")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a level (or a directory of levels) in the terminal
    Play {
        /// Level file or directory of .level.txt files
        #[arg(required = true)]
        path: PathBuf,

        /// Start at this level name when playing a directory
        #[arg(short, long)]
        level: Option<String>,

        /// Save recordings into this directory
        #[arg(short, long)]
        record: Option<PathBuf>,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Apply a move string to a level and print the result
    Run {
        /// Level file
        #[arg(required = true)]
        level: PathBuf,

        /// Moves: w/a/s/d to move, g to switch ship
        #[arg(default_value = "")]
        moves: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save recording to file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Color the text board with ANSI escapes
        #[arg(long)]
        color: bool,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Replay a recorded session
    Replay {
        /// Recording file (.record.json)
        #[arg(required = true)]
        recording: PathBuf,

        /// Output format: tui or text
        #[arg(short, long, default_value = "tui")]
        format: cli::ReplayFormat,

        /// Start after this many moves
        #[arg(short = 'm', long = "move")]
        position: Option<usize>,

        /// Playback delay in milliseconds (default: recorded timing)
        #[arg(long)]
        speed: Option<u64>,
    },

    /// Verify every recording in a directory in parallel
    Records {
        /// Directory holding .record.json files
        #[arg(required = true)]
        dir: PathBuf,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Check a level file
    Validate {
        /// Level file to validate
        #[arg(required = true)]
        level: PathBuf,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(log_file: Option<&Path>) -> Result<(), cli::CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if let Some(path) = log_file {
        let file = File::create(path).map_err(|e| {
            cli::CliError::new(format!("Failed to create log file {}: {e}", path.display()))
        })?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.log_file.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let result = match args.command {
        Commands::Play {
            path,
            level,
            record,
            config,
        } => cli::play::execute(&path, level.as_deref(), record, config.as_deref()),

        Commands::Run {
            level,
            moves,
            format,
            save,
            color,
            config,
        } => cli::run::execute(&level, &moves, format, save.as_deref(), color, config.as_deref()),

        Commands::Replay {
            recording,
            format,
            position,
            speed,
        } => cli::replay::execute(&recording, format, position, speed),

        Commands::Records {
            dir,
            threads,
            format,
        } => cli::records::execute(&dir, threads, format),

        Commands::Validate { level, config } => {
            cli::validate::execute(&level, config.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
