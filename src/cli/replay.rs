//! Replay command implementation.

use super::tui::{self, Term};
use super::{CliError, ReplayFormat};
use crossterm::event::KeyCode;
use pushover::record::{Recording, ReplayEngine};
use pushover::render::render_text;
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::Line,
};
use std::path::Path;
use std::time::{Duration, Instant};

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded or the TUI fails.
pub(crate) fn execute(
    recording_path: &Path,
    format: ReplayFormat,
    position: Option<usize>,
    speed: Option<u64>,
) -> Result<(), CliError> {
    let recording = Recording::load(recording_path).map_err(|e| {
        CliError::new(format!(
            "Failed to load recording {}: {e}",
            recording_path.display()
        ))
    })?;

    let engine = match position {
        Some(position) => ReplayEngine::new_at(recording, position)?,
        None => ReplayEngine::new(recording)?,
    };

    match format {
        ReplayFormat::Tui => {
            let mut app = ReplayApp::new(engine, speed);
            let mut terminal = tui::enter()?;
            let result = run_tui(&mut terminal, &mut app);
            tui::leave(&mut terminal)?;
            result
        }
        ReplayFormat::Text => {
            print_text_replay(engine);
            Ok(())
        }
    }
}

/// App state for the replay TUI.
struct ReplayApp {
    engine: ReplayEngine,
    paused: bool,
    /// Fixed delay between moves; `None` follows the recorded timing.
    speed_ms: Option<u64>,
    last_step: Instant,
}

impl ReplayApp {
    fn new(engine: ReplayEngine, speed_ms: Option<u64>) -> Self {
        Self {
            engine,
            paused: true, // Start paused
            speed_ms,
            last_step: Instant::now(),
        }
    }

    fn step_forward(&mut self) {
        if !self.engine.is_at_end() {
            let _ = self.engine.step_forward();
            self.last_step = Instant::now();
        }
    }

    fn step_backward(&mut self) {
        let _ = self.engine.step_backward();
        self.last_step = Instant::now();
    }

    fn restart(&mut self) {
        let _ = self.engine.goto(0);
        self.paused = true;
    }

    fn next_delay(&self) -> Duration {
        match self.speed_ms {
            Some(ms) => Duration::from_millis(ms),
            None => self.engine.delay_to_next().unwrap_or_default(),
        }
    }

    fn increase_speed(&mut self) {
        let current = self.speed_ms.unwrap_or(500);
        self.speed_ms = Some(current.saturating_sub(100).max(50));
    }

    fn decrease_speed(&mut self) {
        let current = self.speed_ms.unwrap_or(500);
        self.speed_ms = Some((current + 100).min(2000));
    }

    fn should_auto_step(&self) -> bool {
        !self.paused && !self.engine.is_at_end() && self.last_step.elapsed() >= self.next_delay()
    }
}

fn run_tui(terminal: &mut Term, app: &mut ReplayApp) -> Result<(), CliError> {
    loop {
        terminal
            .draw(|f| ui(f, app))
            .map_err(|e| CliError::new(e.to_string()))?;

        // Auto-step if needed
        if app.should_auto_step() {
            app.step_forward();
        }

        if let Some(code) = tui::poll_key(Duration::from_millis(50))? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => {
                    app.paused = !app.paused;
                    app.last_step = Instant::now();
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    app.paused = true;
                    app.step_forward();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    app.paused = true;
                    app.step_backward();
                }
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('0') => app.speed_ms = None,
                KeyCode::Char('r') => app.restart(),
                _ => {}
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &ReplayApp) {
    let (header, board, status, footer) = tui::layout(f.area());

    let state = if app.engine.is_at_end() {
        "END"
    } else if app.paused {
        "PAUSED"
    } else {
        "PLAYING"
    };
    let speed = app
        .speed_ms
        .map_or_else(|| "recorded".to_string(), |ms| format!("{ms}ms"));
    let title = format!(
        " Pushover Replay | Move {}/{} | {state} | Speed: {speed} ",
        app.engine.position(),
        app.engine.len()
    );
    tui::render_bar(
        f,
        header,
        title,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    );

    let session = app.engine.session();
    tui::render_board(f, board, session);

    let next = app
        .engine
        .recording()
        .moves
        .get(app.engine.position())
        .map_or_else(|| "-".to_string(), |m| m.command.to_string());
    tui::render_status(f, status, session, vec![Line::from(format!("Next:  {next}"))]);

    let controls = " [q] Quit  [Space] Pause  [←/→] Step  [+/-] Speed  [0] Recorded timing  [r] Restart ";
    tui::render_bar(
        f,
        footer,
        controls.to_string(),
        Style::default().fg(Color::Gray),
    );
}

fn print_text_replay(mut engine: ReplayEngine) {
    println!("Replay of {}", engine.recording().level);
    println!(
        "Moves: {}  Duration: {:.1}s",
        engine.len(),
        engine.recording().duration().as_secs_f64()
    );
    println!();

    loop {
        println!("--- Move {}/{} ---", engine.position(), engine.len());
        print!("{}", render_text(engine.session()));
        println!();

        let Some(command) = engine
            .recording()
            .moves
            .get(engine.position())
            .map(|m| m.command)
        else {
            break;
        };
        match engine.step_forward() {
            Ok(Some(turn)) => {
                print!("> {command}: {}", turn.status);
                if turn.fell > 0 {
                    print!(", {} fell", turn.fell);
                }
                if turn.life_lost {
                    print!(", life lost");
                }
                println!();
            }
            Ok(None) => println!("> {command}: ignored (level over)"),
            Err(_) => break,
        }
    }

    println!("=== {} ===", engine.session().outcome());
}
