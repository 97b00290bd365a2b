//! Terminal setup and widgets shared by the play and replay TUIs.

use super::CliError;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use pushover::game::{GameObject, ObjectKind, Point, Symbol};
use pushover::render::format_remaining;
use pushover::session::{Outcome, Session};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{Stdout, stdout};
use std::time::Duration;

/// Terminal type used by the TUIs.
pub(super) type Term = Terminal<CrosstermBackend<Stdout>>;

/// Switch to raw mode and the alternate screen.
pub(super) fn enter() -> Result<Term, CliError> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))
}

/// Restore the terminal.
pub(super) fn leave(terminal: &mut Term) -> Result<(), CliError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

/// Wait up to `timeout` for a key press.
pub(super) fn poll_key(timeout: Duration) -> Result<Option<KeyCode>, CliError> {
    if event::poll(timeout).map_err(|e| CliError::new(e.to_string()))?
        && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key.code));
    }
    Ok(None)
}

/// Split the screen into header, board, side panel and footer.
pub(super) fn layout(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    (chunks[0], main_chunks[0], main_chunks[1], chunks[2])
}

/// One-line bordered bar.
pub(super) fn render_bar(f: &mut Frame, area: Rect, text: String, style: Style) {
    let bar = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(bar, area);
}

/// The board, with the selected ship highlighted.
pub(super) fn render_board(f: &mut Frame, area: Rect, session: &Session) {
    let state = session.state();
    let board = state.board();
    let current = state.current_ship().map(GameObject::symbol);

    let lines: Vec<Line> = (0..board.rows())
        .map(|row| {
            let spans: Vec<Span> = (0..board.cols())
                .map(|col| {
                    let symbol = board.cell_at(Point::new(row, col)).unwrap_or(Symbol::BLANK);
                    Span::styled(symbol.to_string(), symbol_style(symbol, current))
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let title = format!(" {} ", session.level_name());
    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(widget, area);
}

/// Lives, timer and outcome, followed by `extra` lines.
pub(super) fn render_status(f: &mut Frame, area: Rect, session: &Session, extra: Vec<Line>) {
    let lives = session.lives();
    let hearts = "♥".repeat(lives.current() as usize);
    let lost = "♡".repeat(lives.started().saturating_sub(lives.current()) as usize);
    let ship = session
        .state()
        .current_ship()
        .map_or_else(|| "none".to_string(), |s| format!("{} ({})", s.kind(), s.symbol()));

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("Lives: "),
            Span::styled(hearts, Style::default().fg(Color::Red)),
            Span::styled(lost, Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(format!("Time:  {}", format_remaining(session.remaining()))),
        Line::from(format!("Ship:  {ship}")),
        Line::from(format!("Moves: {}", session.commands())),
        Line::from(""),
        Line::from(Span::styled(
            outcome_text(session.outcome()),
            outcome_style(session.outcome()),
        )),
        Line::from(""),
    ];
    lines.extend(extra);

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Status "))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn outcome_text(outcome: Outcome) -> String {
    match outcome {
        Outcome::Playing => "PLAYING".to_string(),
        Outcome::Won => "LEVEL COMPLETE".to_string(),
        Outcome::Lost(_) => format!("GAME OVER: {outcome}"),
    }
}

fn outcome_style(outcome: Outcome) -> Style {
    let color = match outcome {
        Outcome::Playing => Color::Gray,
        Outcome::Won => Color::Green,
        Outcome::Lost(_) => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn symbol_style(symbol: Symbol, current: Option<Symbol>) -> Style {
    let color = match symbol.kind() {
        Some(ObjectKind::BigShip | ObjectKind::SmallShip) => Color::Green,
        Some(ObjectKind::LetterBlock) => Color::Cyan,
        Some(ObjectKind::NumberBlock) => Color::Yellow,
        Some(ObjectKind::Portal) => Color::Magenta,
        Some(ObjectKind::Wall) => Color::DarkGray,
        None => Color::Reset,
    };
    let style = Style::default().fg(color);
    if Some(symbol) == current {
        style.add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        style
    }
}
