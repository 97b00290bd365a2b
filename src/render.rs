//! Text renderers for sessions.

use std::fmt::Write;
use std::time::Duration;

use crate::game::{GameObject, ObjectKind, Point, Symbol};
use crate::session::Session;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const MAGENTA: &str = "\x1b[35m";
const GRAY: &str = "\x1b[90m";

/// Render a session as plain text.
///
/// Output format:
/// ```text
/// === LEVEL first.level.txt ===
/// Lives: 3/3  Time: 1:58  Ship: big ship (@)  Commands: 4
///
/// #######
/// #     #
/// #@a   #
/// #@ +  #
/// #  $  #
/// #######
///
/// Status: playing
/// ```
#[must_use]
pub fn render_text(session: &Session) -> String {
    let mut output = String::new();
    render_header(&mut output, session);

    let board = session.state().board();
    for row in 0..board.rows() {
        if let Some(line) = board.row_string(row) {
            output.push_str(&line);
            output.push('\n');
        }
    }

    let _ = writeln!(output, "\nStatus: {}", session.outcome());
    output
}

/// Render a session with ANSI colors; the current ship is highlighted.
#[must_use]
pub fn render_ansi(session: &Session) -> String {
    let mut output = String::new();
    render_header(&mut output, session);

    let state = session.state();
    let current = state.current_ship().map(GameObject::symbol);
    let board = state.board();
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            let symbol = board
                .cell_at(Point::new(row, col))
                .unwrap_or(Symbol::BLANK);
            let color = symbol_color(symbol, current);
            if color.is_empty() {
                output.push(symbol.as_char());
            } else {
                let _ = write!(output, "{color}{symbol}{RESET}");
            }
        }
        output.push('\n');
    }

    let _ = writeln!(output, "\nStatus: {BOLD}{}{RESET}", session.outcome());
    output
}

/// Format a countdown as `m:ss`, or `unlimited`.
#[must_use]
pub fn format_remaining(remaining: Option<Duration>) -> String {
    match remaining {
        None => "unlimited".to_string(),
        Some(left) => {
            // Round up so the display reads 0:00 only once time is out.
            let secs = left.as_millis().div_ceil(1000);
            format!("{}:{:02}", secs / 60, secs % 60)
        }
    }
}

fn render_header(output: &mut String, session: &Session) {
    let lives = session.lives();
    let ship = session
        .state()
        .current_ship()
        .map_or_else(|| "none".to_string(), |s| format!("{} ({})", s.kind(), s.symbol()));
    let _ = writeln!(output, "=== LEVEL {} ===", session.level_name());
    let _ = writeln!(
        output,
        "Lives: {}/{}  Time: {}  Ship: {ship}  Commands: {}\n",
        lives.current(),
        lives.started(),
        format_remaining(session.remaining()),
        session.commands()
    );
}

fn symbol_color(symbol: Symbol, current: Option<Symbol>) -> &'static str {
    match symbol.kind() {
        _ if Some(symbol) == current => YELLOW,
        Some(ObjectKind::BigShip | ObjectKind::SmallShip) => GREEN,
        Some(ObjectKind::LetterBlock | ObjectKind::NumberBlock) => CYAN,
        Some(ObjectKind::Portal) => MAGENTA,
        Some(ObjectKind::Wall) => GRAY,
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Command, Direction};

    const ROWS: [&str; 7] = [
        "#######", "#     #", "#@a   #", "#@ +  #", "#  $  #", "#     #", "#######",
    ];

    fn session(time_limit_secs: u64) -> Session {
        let config = GameConfig {
            rows: 7,
            cols: 7,
            time_limit_secs,
            ..GameConfig::default()
        };
        Session::from_rows("render.level.txt", &ROWS, config).unwrap()
    }

    #[test]
    fn test_render_text_layout() {
        let text = render_text(&session(120));
        assert!(text.starts_with("=== LEVEL render.level.txt ===\n"));
        assert!(text.contains("Lives: 3/3"));
        assert!(text.contains("Time: 2:00"));
        assert!(text.contains("Ship: big ship (@)"));
        for row in ROWS {
            assert!(text.contains(&format!("\n{row}\n")), "missing row {row}");
        }
        assert!(text.ends_with("Status: playing\n"));
    }

    #[test]
    fn test_render_text_after_moves() {
        let mut session = session(0);
        session.handle(Command::SwitchPlayer);
        session.handle(Command::Move(Direction::Right));
        let text = render_text(&session);
        assert!(text.contains("Time: unlimited"));
        assert!(text.contains("Ship: small ship ($)"));
        assert!(text.contains("Commands: 2"));
        assert!(text.contains("\n#@    #\n"));
        assert!(text.contains("\n# a $ #\n"));
    }

    #[test]
    fn test_render_ansi_highlights_current_ship() {
        let text = render_ansi(&session(120));
        assert!(text.contains(&format!("{YELLOW}@{RESET}")));
        assert!(text.contains(&format!("{GREEN}${RESET}")));
        assert!(text.contains(&format!("{MAGENTA}+{RESET}")));
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(None), "unlimited");
        assert_eq!(format_remaining(Some(Duration::from_secs(125))), "2:05");
        assert_eq!(format_remaining(Some(Duration::from_millis(59_001))), "1:00");
        assert_eq!(format_remaining(Some(Duration::ZERO)), "0:00");
    }
}
