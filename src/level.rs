//! Level files and level packs.
//!
//! A level is a plain text file named `*.level.txt` holding exactly
//! `rows` lines of `cols` symbols each. Trailing spaces are part of the
//! level; a trailing `\r` is not.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GameConfig;
use crate::error::BuildError;
use crate::game::{GameState, ObjectKind, Symbol};

/// File name suffix of level files.
pub const LEVEL_EXTENSION: &str = ".level.txt";

/// The checks a level goes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelCheck {
    /// The file exists and has the level extension.
    Path,
    /// Row count and row widths match the configuration.
    Size,
    /// Every character is in the alphabet.
    Symbols,
    /// Both ships and the portal are present.
    Elements,
    /// The border ring is wall.
    Border,
    /// Ships and portal have valid shapes.
    Objects,
}

impl LevelCheck {
    /// All checks in the order they run.
    pub const ALL: [LevelCheck; 6] = [
        LevelCheck::Path,
        LevelCheck::Size,
        LevelCheck::Symbols,
        LevelCheck::Elements,
        LevelCheck::Border,
        LevelCheck::Objects,
    ];
}

impl fmt::Display for LevelCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LevelCheck::Path => "file path",
            LevelCheck::Size => "board size",
            LevelCheck::Symbols => "symbols",
            LevelCheck::Elements => "required elements",
            LevelCheck::Border => "wall border",
            LevelCheck::Objects => "object shapes",
        };
        f.write_str(name)
    }
}

/// Error loading or validating a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// The path is not a level file.
    Path {
        /// Offending path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
    /// Reading the file failed.
    Io {
        /// File that failed.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// Wrong number of rows.
    RowCount {
        /// Configured rows.
        expected: usize,
        /// Rows in the file.
        found: usize,
    },
    /// A row has the wrong width.
    RowWidth {
        /// Offending row (0-indexed).
        row: usize,
        /// Configured columns.
        expected: usize,
        /// Width of this row.
        found: usize,
    },
    /// A character outside the alphabet.
    Symbol {
        /// Row of the character (0-indexed).
        row: usize,
        /// Column of the character (0-indexed).
        col: usize,
        /// The rejected character.
        ch: char,
    },
    /// A required object is missing.
    MissingElement(ObjectKind),
    /// A border cell is not wall.
    Border {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
    },
    /// Object construction failed.
    Build(BuildError),
}

impl LevelError {
    /// The check this error belongs to.
    #[must_use]
    pub const fn check(&self) -> LevelCheck {
        match self {
            Self::Path { .. } | Self::Io { .. } => LevelCheck::Path,
            Self::RowCount { .. } | Self::RowWidth { .. } => LevelCheck::Size,
            Self::Symbol { .. } => LevelCheck::Symbols,
            Self::MissingElement(_) => LevelCheck::Elements,
            Self::Border { .. } => LevelCheck::Border,
            Self::Build(_) => LevelCheck::Objects,
        }
    }
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path { path, reason } => write!(f, "Bad level path {path}: {reason}"),
            Self::Io { path, message } => write!(f, "Failed to read level {path}: {message}"),
            Self::RowCount { expected, found } => {
                write!(f, "Level has {found} rows, expected {expected}")
            }
            Self::RowWidth {
                row,
                expected,
                found,
            } => write!(
                f,
                "Level row {} has {found} columns, expected {expected}",
                row + 1
            ),
            Self::Symbol { row, col, ch } => {
                write!(f, "Level has invalid symbol {ch:?} at row {row}, col {col}")
            }
            Self::MissingElement(kind) => write!(f, "Level has no {kind}"),
            Self::Border { row, col } => {
                write!(f, "Level border is open at row {row}, col {col}")
            }
            Self::Build(e) => write!(f, "Level objects are invalid: {e}"),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<BuildError> for LevelError {
    fn from(e: BuildError) -> Self {
        Self::Build(e)
    }
}

/// A validated level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    /// Level name, usually the file name.
    name: String,
    /// Rows of symbols.
    rows: Vec<String>,
}

impl Level {
    /// Parse and validate level text.
    ///
    /// # Errors
    ///
    /// Returns the first failed check: size, symbols, required elements,
    /// wall border, then object shapes.
    pub fn parse(
        name: impl Into<String>,
        text: &str,
        config: &GameConfig,
    ) -> Result<Self, LevelError> {
        let rows: Vec<String> = text.lines().map(str::to_string).collect();
        let expected_rows = usize::from(config.rows);
        let expected_cols = usize::from(config.cols);

        if rows.len() != expected_rows {
            return Err(LevelError::RowCount {
                expected: expected_rows,
                found: rows.len(),
            });
        }
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != expected_cols {
                return Err(LevelError::RowWidth {
                    row,
                    expected: expected_cols,
                    found,
                });
            }
        }

        let mut matrix = Vec::with_capacity(rows.len());
        for (row, line) in rows.iter().enumerate() {
            let symbols = line
                .chars()
                .enumerate()
                .map(|(col, ch)| Symbol::new(ch).ok_or(LevelError::Symbol { row, col, ch }))
                .collect::<Result<Vec<_>, _>>()?;
            matrix.push(symbols);
        }

        for required in [Symbol::BIG_SHIP, Symbol::SMALL_SHIP, Symbol::PORTAL] {
            if !matrix.iter().flatten().any(|&s| s == required) {
                let kind = required.kind().unwrap_or(ObjectKind::Portal);
                return Err(LevelError::MissingElement(kind));
            }
        }

        let last_row = expected_rows - 1;
        let last_col = expected_cols - 1;
        for (row, symbols) in matrix.iter().enumerate() {
            for (col, &symbol) in symbols.iter().enumerate() {
                let on_border = row == 0 || row == last_row || col == 0 || col == last_col;
                if on_border && symbol != Symbol::WALL {
                    return Err(LevelError::Border { row, col });
                }
            }
        }

        let level = Self {
            name: name.into(),
            rows,
        };
        // Shapes are only known once objects are grouped.
        GameState::from_level(&level, config)?;
        Ok(level)
    }

    /// Load and validate a level file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a `*.level.txt` file, cannot be
    /// read, or fails [`Level::parse`].
    pub fn load(path: &Path, config: &GameConfig) -> Result<Self, LevelError> {
        let name = level_name(path)?;
        let text = fs::read_to_string(path).map_err(|e| LevelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let level = Self::parse(name, &text, config)?;
        tracing::info!(level = %level.name, path = %path.display(), "loaded level");
        Ok(level)
    }

    /// Level name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows of symbols.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Build a fresh game state for this level.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` differs from the one the level was
    /// validated with in a way that breaks an object.
    pub fn build(&self, config: &GameConfig) -> Result<GameState, BuildError> {
        GameState::from_level(self, config)
    }
}

/// File name of a level path, checking the extension.
fn level_name(path: &Path) -> Result<String, LevelError> {
    let bad = |reason: &str| LevelError::Path {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| bad("no file name"))?;
    if !name.ends_with(LEVEL_EXTENSION) {
        return Err(bad(&format!("file name must end with {LEVEL_EXTENSION}")));
    }
    if !path.is_file() {
        return Err(bad("not a file"));
    }
    Ok(name.to_string())
}

/// An ordered set of level files with a cursor on the current one.
#[derive(Debug, Clone)]
pub struct LevelPack {
    /// Directory the levels live in.
    dir: PathBuf,
    /// Level files, sorted by name.
    files: Vec<PathBuf>,
    /// Index of the current level.
    current: usize,
}

impl LevelPack {
    /// Collect every `*.level.txt` file in `dir`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or holds no levels.
    pub fn scan(dir: &Path) -> Result<Self, LevelError> {
        let io_error = |e: std::io::Error| LevelError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let is_level = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(LEVEL_EXTENSION));
            if is_level && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(LevelError::Path {
                path: dir.display().to_string(),
                reason: format!("no {LEVEL_EXTENSION} files found"),
            });
        }
        tracing::debug!(dir = %dir.display(), levels = files.len(), "scanned level pack");

        Ok(Self {
            dir: dir.to_path_buf(),
            files,
            current: 0,
        })
    }

    /// Open a directory as a pack, or a single level file as a pack of one.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory holds no levels.
    pub fn open(path: &Path) -> Result<Self, LevelError> {
        if path.is_dir() {
            return Self::scan(path);
        }
        let dir = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
        Ok(Self {
            dir,
            files: vec![path.to_path_buf()],
            current: 0,
        })
    }

    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the pack has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Index of the current level.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Path of the current level.
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.files.get(self.current).map(PathBuf::as_path)
    }

    /// Load the current level.
    ///
    /// # Errors
    ///
    /// Returns an error if the level fails to load.
    pub fn load_current(&self, config: &GameConfig) -> Result<Level, LevelError> {
        let path = self.current_path().ok_or_else(|| LevelError::Path {
            path: self.dir.display().to_string(),
            reason: "no current level".to_string(),
        })?;
        Level::load(path, config)
    }

    /// Load a level of this pack's directory by file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the level fails to load.
    pub fn load_by_name(&self, name: &str, config: &GameConfig) -> Result<Level, LevelError> {
        Level::load(&self.dir.join(name), config)
    }

    /// Make the level with file name `name` the current one.
    ///
    /// Returns `false` and keeps the cursor if the pack has no such level.
    pub fn select(&mut self, name: &str) -> bool {
        let found = self
            .files
            .iter()
            .position(|f| f.file_name().and_then(|n| n.to_str()) == Some(name));
        if let Some(index) = found {
            self.current = index;
        }
        found.is_some()
    }

    /// Whether a level follows the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current + 1 < self.files.len()
    }

    /// Move to the next level; returns `false` at the end of the pack.
    pub fn advance(&mut self) -> bool {
        if self.has_next() {
            self.current += 1;
            true
        } else {
            false
        }
    }
}
