#![no_main]

//! Session fuzzer.
//!
//! This fuzz target builds a small walled board from fuzzer input and feeds
//! it an arbitrary command sequence. Blocks may span several cells in any
//! shape, disconnected or wrapped around each other. Each command exercises:
//! 1. Resolve and commit moves for either ship
//! 2. Run the gravity settle step
//! 3. Tick the countdown
//!
//! After every command the board/object partition must still hold.

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pushover::config::GameConfig;
use pushover::game::{Command, Direction, check_invariants};
use pushover::session::Session;

const ROWS: u16 = 7;
const COLS: u16 = 9;

/// What an interior cell holds.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum Cell {
    Blank,
    Letter,
    Number,
    Wall,
    /// Another cell of an earlier letter block.
    SameLetter(u8),
    /// Another cell of an earlier number block.
    SameNumber(u8),
}

/// A fuzzer-generated command.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzCommand {
    Up,
    Down,
    Left,
    Right,
    Null,
    Switch,
    /// Let time pass (milliseconds).
    Wait(u16),
}

/// Structured input for session fuzzing.
#[derive(Arbitrary, Debug)]
struct SessionInput {
    cells: Vec<Cell>,
    commands: Vec<FuzzCommand>,
    hearts: u8,
}

fn build_rows(cells: &[Cell]) -> Vec<String> {
    let mut letters = "abcdefghijklmnopqrstuvwxyz".chars();
    let mut digits = "0123456789".chars();
    let mut used_letters = Vec::new();
    let mut used_digits = Vec::new();
    let mut cells = cells.iter();

    (0..ROWS)
        .map(|row| {
            (0..COLS)
                .map(|col| {
                    let border = row == 0 || row == ROWS - 1 || col == 0 || col == COLS - 1;
                    match (row, col) {
                        _ if border => '#',
                        (5, 1 | 2) => '@',
                        (5, 7) => '$',
                        (1, 7) => '+',
                        _ => match cells.next().copied().unwrap_or(Cell::Blank) {
                            Cell::Blank => ' ',
                            Cell::Letter => fresh(&mut letters, &mut used_letters),
                            Cell::Number => fresh(&mut digits, &mut used_digits),
                            Cell::Wall => '#',
                            Cell::SameLetter(pick) => {
                                reuse(pick, &mut letters, &mut used_letters)
                            }
                            Cell::SameNumber(pick) => reuse(pick, &mut digits, &mut used_digits),
                        },
                    }
                })
                .collect()
        })
        .collect()
}

fn fresh(pool: &mut impl Iterator<Item = char>, used: &mut Vec<char>) -> char {
    pool.next().map_or(' ', |ch| {
        used.push(ch);
        ch
    })
}

fn reuse(pick: u8, pool: &mut impl Iterator<Item = char>, used: &mut Vec<char>) -> char {
    if used.is_empty() {
        return fresh(pool, used);
    }
    used[usize::from(pick) % used.len()]
}

fuzz_target!(|input: SessionInput| {
    let config = GameConfig {
        rows: ROWS,
        cols: COLS,
        hearts: u32::from(input.hearts.max(1)),
        time_limit_secs: 60,
        ..GameConfig::default()
    };
    let rows = build_rows(&input.cells);
    let Ok(mut session) = Session::from_rows("fuzz", &rows, config) else {
        return;
    };

    // Cap the sequence to keep each run short
    for command in input.commands.into_iter().take(200) {
        let command = match command {
            FuzzCommand::Up => Command::Move(Direction::Up),
            FuzzCommand::Down => Command::Move(Direction::Down),
            FuzzCommand::Left => Command::Move(Direction::Left),
            FuzzCommand::Right => Command::Move(Direction::Right),
            FuzzCommand::Null => Command::Move(Direction::Null),
            FuzzCommand::Switch => Command::SwitchPlayer,
            FuzzCommand::Wait(ms) => {
                session.tick(Duration::from_millis(u64::from(ms)));
                continue;
            }
        };
        let over_before = session.outcome().is_over();
        let turn = session.handle(command);
        assert_eq!(turn.is_none(), over_before, "commands are ignored only once over");

        let violations = check_invariants(session.state());
        assert!(violations.is_empty(), "invariants broken: {violations:?}");
    }
});
