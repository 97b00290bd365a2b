//! Session recording and playback.
//!
//! Sessions are deterministic, so a recording holds only the level, the
//! configuration, and the commands with the time between them. To view the
//! state after move N, re-run the session from the start to N.

mod replay;

pub use replay::ReplayEngine;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::BuildError;
use crate::game::Command;
use crate::level::Level;
use crate::session::Session;

/// File name suffix of recordings.
pub const RECORD_EXTENSION: &str = ".record.json";

/// One recorded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedMove {
    /// The command.
    pub command: Command,
    /// Milliseconds since the previous command (or the start).
    pub delay_ms: u64,
}

/// A complete recording of one level attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Level name.
    pub level: String,
    /// Level rows, so playback does not depend on the level file.
    pub rows: Vec<String>,
    /// Configuration the level was played with.
    pub config: GameConfig,
    /// Commands in the order they were handled.
    pub moves: Vec<RecordedMove>,
    /// Milliseconds between the last command and the end of the attempt.
    #[serde(default)]
    pub tail_ms: u64,
}

impl Recording {
    /// Create an empty recording for a level.
    #[must_use]
    pub fn new(level: &Level, config: GameConfig) -> Self {
        Self {
            level: level.name().to_string(),
            rows: level.rows().to_vec(),
            config,
            moves: Vec::new(),
            tail_ms: 0,
        }
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether no commands were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Total recorded time.
    #[must_use]
    pub fn duration(&self) -> Duration {
        let ms = self
            .moves
            .iter()
            .map(|m| m.delay_ms)
            .fold(self.tail_ms, u64::saturating_add);
        Duration::from_millis(ms)
    }

    /// Fresh session at the start of the recording.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorded rows do not build.
    pub fn start(&self) -> Result<Session, RecordError> {
        Session::from_rows(&self.level, &self.rows, self.config).map_err(RecordError::Level)
    }

    /// Save as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| RecordError::Json {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| RecordError::io(path, &e))?;
        tracing::info!(path = %path.display(), moves = self.moves.len(), "saved recording");
        Ok(())
    }

    /// Load a recording.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or parsing fails.
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let text = fs::read_to_string(path).map_err(|e| RecordError::io(path, &e))?;
        let recording: Self = serde_json::from_str(&text).map_err(|e| RecordError::Json {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::info!(path = %path.display(), level = %recording.level, "loaded recording");
        Ok(recording)
    }
}

/// Timestamps commands during live play.
#[derive(Debug, Clone)]
pub struct Recorder {
    /// Recording being built.
    recording: Recording,
    /// When the previous command was recorded.
    last: Instant,
}

impl Recorder {
    /// Start recording a level now.
    #[must_use]
    pub fn new(level: &Level, config: GameConfig) -> Self {
        Self {
            recording: Recording::new(level, config),
            last: Instant::now(),
        }
    }

    /// Record a command handled now.
    pub fn record(&mut self, command: Command) {
        let now = Instant::now();
        let delay = now.duration_since(self.last);
        self.last = now;
        self.record_after(command, delay);
    }

    /// Record a command handled `delay` after the previous one.
    pub fn record_after(&mut self, command: Command, delay: Duration) {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.recording.moves.push(RecordedMove { command, delay_ms });
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recording.moves.len()
    }

    /// Whether nothing was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recording.moves.is_empty()
    }

    /// Stop recording now.
    #[must_use]
    pub fn finish(self) -> Recording {
        let tail = self.last.elapsed();
        self.finish_after(tail)
    }

    /// Stop recording `tail` after the last command.
    #[must_use]
    pub fn finish_after(mut self, tail: Duration) -> Recording {
        self.recording.tail_ms = u64::try_from(tail.as_millis()).unwrap_or(u64::MAX);
        self.recording
    }
}

/// Delete the oldest recordings in `dir` so a new one fits under `max`.
///
/// At most `max - 1` recordings remain. Age is the file's modification time,
/// ties broken by name. Returns the deleted paths.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a file cannot be
/// deleted.
pub fn prune_records(dir: &Path, max: usize) -> Result<Vec<PathBuf>, RecordError> {
    let mut records = list_records(dir)?
        .into_iter()
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect::<Vec<_>>();
    records.sort();

    let keep = max.saturating_sub(1);
    let excess = records.len().saturating_sub(keep);
    let mut removed = Vec::with_capacity(excess);
    for (_, path) in records.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|e| RecordError::io(&path, &e))?;
        tracing::warn!(path = %path.display(), "pruned old recording");
        removed.push(path);
    }
    Ok(removed)
}

/// Every `*.record.json` file in `dir`, sorted by name.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_records(dir: &Path) -> Result<Vec<PathBuf>, RecordError> {
    let mut records = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| RecordError::io(dir, &e))? {
        let path = entry.map_err(|e| RecordError::io(dir, &e))?.path();
        let is_record = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(RECORD_EXTENSION));
        if is_record && path.is_file() {
            records.push(path);
        }
    }
    records.sort();
    Ok(records)
}

/// Error type for recording operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Reading or writing a file failed.
    Io {
        /// File or directory that failed.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// The file is not a valid recording.
    Json {
        /// File that failed.
        path: String,
        /// Parser message.
        message: String,
    },
    /// The recorded level does not build.
    Level(BuildError),
    /// Move index out of bounds.
    MoveOutOfBounds {
        /// Requested position.
        requested: usize,
        /// Number of recorded moves.
        len: usize,
    },
    /// Already at the end of the recording.
    AtEnd,
}

impl RecordError {
    fn io(path: &Path, e: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "I/O error on {path}: {message}"),
            Self::Json { path, message } => write!(f, "Invalid recording {path}: {message}"),
            Self::Level(e) => write!(f, "Recorded level is invalid: {e}"),
            Self::MoveOutOfBounds { requested, len } => {
                write!(f, "Move {requested} out of bounds (recording has {len})")
            }
            Self::AtEnd => write!(f, "Already at the end of the recording"),
        }
    }
}

impl std::error::Error for RecordError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;
    use std::fs::File;
    use tempfile::TempDir;

    fn level() -> Level {
        let config = GameConfig {
            rows: 5,
            cols: 6,
            ..GameConfig::default()
        };
        Level::parse(
            "tiny.level.txt",
            "######\n#@@  #\n#$  +#\n#    #\n######\n",
            &config,
        )
        .unwrap()
    }

    #[test]
    fn test_recorder_collects_moves() {
        let mut recorder = Recorder::new(&level(), GameConfig::default());
        assert!(recorder.is_empty());
        recorder.record_after(Command::Move(Direction::Right), Duration::from_millis(250));
        recorder.record_after(Command::SwitchPlayer, Duration::from_millis(1500));
        assert_eq!(recorder.len(), 2);

        let recording = recorder.finish_after(Duration::from_millis(50));
        assert_eq!(recording.level, "tiny.level.txt");
        assert_eq!(recording.moves[1].delay_ms, 1500);
        assert_eq!(recording.duration(), Duration::from_millis(1800));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("run{RECORD_EXTENSION}"));
        let mut recorder = Recorder::new(&level(), GameConfig::default());
        recorder.record_after(Command::Move(Direction::Down), Duration::from_millis(10));
        let recording = recorder.finish_after(Duration::ZERO);

        recording.save(&path).unwrap();
        let loaded = Recording::load(&path).unwrap();
        assert_eq!(loaded, recording);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.record.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Recording::load(&path),
            Err(RecordError::Json { .. })
        ));
        assert!(matches!(
            Recording::load(&dir.path().join("missing.record.json")),
            Err(RecordError::Io { .. })
        ));
    }

    #[test]
    fn test_start_rebuilds_level() {
        let recording = Recording::new(&level(), GameConfig::default());
        let session = recording.start().unwrap();
        assert_eq!(session.level_name(), "tiny.level.txt");
        assert_eq!(session.state().board().rows(), 5);
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        for (i, name) in ["c", "a", "b", "d"].iter().enumerate() {
            let path = dir.path().join(format!("{name}{RECORD_EXTENSION}"));
            fs::write(&path, "{}").unwrap();
            let file = File::options().write(true).open(&path).unwrap();
            file.set_modified(base + Duration::from_secs(u64::try_from(i).unwrap()))
                .unwrap();
        }
        fs::write(dir.path().join("keep.txt"), "x").unwrap();

        let removed = prune_records(dir.path(), 3).unwrap();
        let names: Vec<_> = removed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["c.record.json", "a.record.json"]);

        let left = list_records(dir.path()).unwrap();
        assert_eq!(left.len(), 2);
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_prune_under_limit_is_noop() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(format!("one{RECORD_EXTENSION}")), "{}").unwrap();
        assert!(prune_records(dir.path(), 5).unwrap().is_empty());
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError::MoveOutOfBounds {
            requested: 12,
            len: 4,
        };
        assert!(err.to_string().contains("12"));
        assert!(RecordError::AtEnd.to_string().contains("end"));
    }
}
