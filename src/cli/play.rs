//! Play command implementation - interactive TUI.

use super::tui::{self, Term};
use super::{CliError, load_config};
use crossterm::event::KeyCode;
use pushover::config::GameConfig;
use pushover::game::{Command, Direction};
use pushover::level::{LEVEL_EXTENSION, LevelPack};
use pushover::record::{RECORD_EXTENSION, Recorder, prune_records};
use pushover::session::{Outcome, Session};
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::Line,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Execute the play command.
///
/// # Errors
///
/// Returns an error if a level cannot be loaded, a recording cannot be
/// saved, or the TUI fails.
pub(crate) fn execute(
    path: &Path,
    level: Option<&str>,
    record_dir: Option<PathBuf>,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let config = load_config(config)?;
    let mut pack = LevelPack::open(path)?;
    if let Some(name) = level
        && !pack.select(name)
    {
        return Err(CliError::new(format!(
            "No level named {name} in {}",
            path.display()
        )));
    }

    let mut app = App::new(pack, config, record_dir)?;

    let mut terminal = tui::enter()?;
    let result = run_tui(&mut terminal, &mut app);
    tui::leave(&mut terminal)?;

    // Quitting mid-level still keeps the attempt.
    let saved = app.save_recording();
    result?;
    saved
}

/// App state for the TUI.
struct App {
    pack: LevelPack,
    config: GameConfig,
    session: Session,
    record_dir: Option<PathBuf>,
    recorder: Option<Recorder>,
    last_tick: Instant,
    message: String,
}

impl App {
    fn new(pack: LevelPack, config: GameConfig, record_dir: Option<PathBuf>) -> Result<Self, CliError> {
        let level = pack.load_current(&config)?;
        let session = Session::new(&level, config)?;
        let recorder = record_dir.as_ref().map(|_| Recorder::new(&level, config));
        Ok(Self {
            pack,
            config,
            session,
            record_dir,
            recorder,
            last_tick: Instant::now(),
            message: String::new(),
        })
    }

    /// (Re)start the current level of the pack.
    fn load_level(&mut self) -> Result<(), CliError> {
        self.save_recording()?;
        let level = self.pack.load_current(&self.config)?;
        self.session = Session::new(&level, self.config)?;
        self.recorder = self
            .record_dir
            .as_ref()
            .map(|_| Recorder::new(&level, self.config));
        self.last_tick = Instant::now();
        self.message.clear();
        Ok(())
    }

    fn tick(&mut self) -> Result<(), CliError> {
        let now = Instant::now();
        let was_over = self.session.outcome().is_over();
        self.session.tick(now.duration_since(self.last_tick));
        self.last_tick = now;
        if !was_over && self.session.outcome().is_over() {
            self.finish_level()?;
        }
        Ok(())
    }

    fn handle(&mut self, command: Command) -> Result<(), CliError> {
        let Some(turn) = self.session.handle(command) else {
            return Ok(());
        };
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(command);
        }
        self.message = if turn.life_lost {
            "Crushed! A life is lost.".to_string()
        } else {
            String::new()
        };
        if self.session.outcome().is_over() {
            self.finish_level()?;
        }
        Ok(())
    }

    fn finish_level(&mut self) -> Result<(), CliError> {
        self.save_recording()?;
        self.message = match self.session.outcome() {
            Outcome::Won if self.pack.has_next() => "Level complete! [n] Next level".to_string(),
            Outcome::Won => "All levels complete!".to_string(),
            Outcome::Lost(_) => "[r] Try again".to_string(),
            Outcome::Playing => String::new(),
        };
        Ok(())
    }

    fn next_level(&mut self) -> Result<(), CliError> {
        if self.session.outcome() == Outcome::Won && self.pack.advance() {
            self.load_level()?;
        }
        Ok(())
    }

    /// Save the running recording, pruning old ones first.
    fn save_recording(&mut self) -> Result<(), CliError> {
        let (Some(dir), Some(recorder)) = (self.record_dir.as_ref(), self.recorder.take()) else {
            return Ok(());
        };
        if recorder.is_empty() {
            return Ok(());
        }
        let recording = recorder.finish();
        prune_records(dir, self.config.max_records)?;

        let stem = recording
            .level
            .strip_suffix(LEVEL_EXTENSION)
            .unwrap_or(&recording.level);
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let path = dir.join(format!("{stem}-{stamp}{RECORD_EXTENSION}"));
        recording.save(&path)?;
        Ok(())
    }
}

fn key_command(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Up => Some(Command::Move(Direction::Up)),
        KeyCode::Down => Some(Command::Move(Direction::Down)),
        KeyCode::Left => Some(Command::Move(Direction::Left)),
        KeyCode::Right => Some(Command::Move(Direction::Right)),
        KeyCode::Tab => Some(Command::SwitchPlayer),
        KeyCode::Char(c) => Command::from_key(c),
        _ => None,
    }
}

fn run_tui(terminal: &mut Term, app: &mut App) -> Result<(), CliError> {
    loop {
        terminal
            .draw(|f| ui(f, app))
            .map_err(|e| CliError::new(e.to_string()))?;

        app.tick()?;

        if let Some(code) = tui::poll_key(Duration::from_millis(50))? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('r') => app.load_level()?,
                KeyCode::Char('n') | KeyCode::Enter => app.next_level()?,
                code => {
                    if let Some(command) = key_command(code) {
                        app.handle(command)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let (header, board, status, footer) = tui::layout(f.area());

    let title = format!(
        " Pushover | Level {}/{} | {} ",
        app.pack.current() + 1,
        app.pack.len(),
        app.session.level_name()
    );
    tui::render_bar(
        f,
        header,
        title,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    );

    tui::render_board(f, board, &app.session);

    let mut extra = Vec::new();
    if app.recorder.is_some() {
        extra.push(Line::from("● recording"));
    }
    if !app.message.is_empty() {
        extra.push(Line::from(app.message.clone()));
    }
    tui::render_status(f, status, &app.session, extra);

    let controls = if app.session.outcome().is_over() {
        " [q] Quit  [r] Restart  [n] Next level "
    } else {
        " [q] Quit  [←↑↓→/wasd] Move  [g/Tab] Switch ship  [r] Restart "
    };
    tui::render_bar(
        f,
        footer,
        controls.to_string(),
        Style::default().fg(Color::Gray),
    );
}
