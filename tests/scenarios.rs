//! End-to-end scenarios over the bundled levels.
//!
//! These tests load the level files shipped in `levels/`, play them through
//! sessions, and round-trip the recordings through disk.
//!
//! Run with: cargo test --release scenarios

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use pushover::config::GameConfig;
use pushover::game::{Command, check_invariants};
use pushover::level::{Level, LevelPack};
use pushover::record::{Recorder, Recording, ReplayEngine, list_records, prune_records};
use pushover::session::{Outcome, Session};
use tempfile::TempDir;

fn levels_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("levels")
}

fn first_level() -> Level {
    Level::load(
        &levels_dir().join("01_first.level.txt"),
        &GameConfig::default(),
    )
    .unwrap()
}

/// Up once, then right until the ship reaches the portal.
const FIRST_SOLUTION: &str = "wdddddddddddddddd";

#[test]
fn test_bundled_levels_load_and_rest() {
    let config = GameConfig::default();
    let mut pack = LevelPack::scan(&levels_dir()).unwrap();
    assert!(pack.len() >= 3);

    loop {
        let level = pack.load_current(&config).unwrap();
        let mut session = Session::new(&level, config).unwrap();
        assert!(
            check_invariants(session.state()).is_empty(),
            "{}",
            level.name()
        );

        // Every block starts out supported.
        let turn = session.handle(Command::SwitchPlayer).unwrap();
        assert_eq!(turn.fell, 0, "{} has a falling block", level.name());
        assert!(!turn.life_lost);

        if !pack.advance() {
            break;
        }
    }
}

#[test]
fn test_first_level_is_solvable() {
    let mut session = Session::new(&first_level(), GameConfig::default()).unwrap();
    for command in Command::parse_keys(FIRST_SOLUTION).unwrap() {
        session.handle(command).unwrap();
    }
    assert_eq!(session.outcome(), Outcome::Won);
    assert_eq!(session.commands(), FIRST_SOLUTION.len());
    assert_eq!(session.lives().current(), session.lives().started());

    // Extra input after the win is ignored.
    assert!(session.handle(Command::SwitchPlayer).is_none());
}

#[test]
fn test_recording_round_trip_and_replay() {
    let dir = TempDir::new().unwrap();
    let level = first_level();
    let config = GameConfig::default();

    let mut recorder = Recorder::new(&level, config);
    for command in Command::parse_keys(FIRST_SOLUTION).unwrap() {
        recorder.record_after(command, Duration::from_millis(250));
    }
    let recording = recorder.finish_after(Duration::from_millis(100));
    assert_eq!(recording.duration(), Duration::from_millis(17 * 250 + 100));

    let path = dir.path().join("01_first-1.record.json");
    recording.save(&path).unwrap();
    let loaded = Recording::load(&path).unwrap();
    assert_eq!(loaded, recording);

    let mut engine = ReplayEngine::new(loaded).unwrap();
    assert_eq!(engine.run_to_end(), Outcome::Won);

    engine.goto(1).unwrap();
    assert_eq!(engine.session().outcome(), Outcome::Playing);
    assert_eq!(engine.session().commands(), 1);
}

#[test]
fn test_slow_recording_times_out() {
    let level = first_level();
    let config = GameConfig {
        time_limit_secs: 2,
        ..GameConfig::default()
    };

    let mut recorder = Recorder::new(&level, config);
    for command in Command::parse_keys(FIRST_SOLUTION).unwrap() {
        recorder.record_after(command, Duration::from_millis(500));
    }
    let mut engine = ReplayEngine::new(recorder.finish_after(Duration::ZERO)).unwrap();
    assert!(matches!(engine.run_to_end(), Outcome::Lost(_)));
    assert_eq!(engine.session().commands(), 3);
}

#[test]
fn test_records_directory_is_pruned() {
    let dir = TempDir::new().unwrap();
    let level = first_level();
    let config = GameConfig {
        max_records: 3,
        ..GameConfig::default()
    };

    for i in 0..5 {
        prune_records(dir.path(), config.max_records).unwrap();
        let mut recorder = Recorder::new(&level, config);
        recorder.record_after(Command::SwitchPlayer, Duration::ZERO);
        let path = dir.path().join(format!("01_first-{i}.record.json"));
        recorder.finish_after(Duration::ZERO).save(&path).unwrap();
        // Distinct modification times.
        let mtime = std::time::SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 + i);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    let names: Vec<String> = list_records(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "01_first-2.record.json",
            "01_first-3.record.json",
            "01_first-4.record.json"
        ]
    );
}
