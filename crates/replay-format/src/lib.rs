#![forbid(unsafe_code)]

//! Serialization formats for Replay macros.
//!
//! Three interchangeable representations of the same record sequence:
//!
//! - [`line`]: one command per line, comments and the suppress marker
//!   passed through verbatim.
//! - [`script`]: the same per-line content wrapped in `eval("...")`
//!   statements under a fixed header.
//! - [`json`]: structured records with native typed value slots.
//!
//! File-level parsing is all-or-nothing: records are accumulated into a
//! scratch vector and only replace the store's contents when the whole
//! input parsed. A malformed line therefore never leaves a partial macro
//! behind.

use std::fmt;
use std::fs;
use std::path::Path;

use replay_core::store::FileFormat;
use replay_core::{CommandRecord, CommandRegistry, MacroStore};

pub mod json;
pub mod line;
pub mod script;

// ============================================================================
// Error
// ============================================================================

/// Errors raised while parsing or rendering a macro file.
#[derive(Debug)]
pub enum Error {
    /// Filesystem failure.
    Io(std::io::Error),
    /// The structured format did not deserialize.
    Json(serde_json::Error),
    /// A text line failed to parse.
    Parse {
        /// 1-based line number in the input.
        line: usize,
        /// Underlying core error.
        source: replay_core::Error,
    },
    /// A structured record failed validation.
    Record(replay_core::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::Parse { line, source } => write!(f, "line {line}: {source}"),
            Self::Record(source) => write!(f, "{source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Parse { source, .. } | Self::Record(source) => Some(source),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Standard result type for format APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Parsed contents of one macro source: the records plus any comment
/// lines trailing the last command (text formats only).
pub type Parsed = (Vec<CommandRecord>, Vec<String>);

// ============================================================================
// Dispatch
// ============================================================================

/// Parse `text` in `format`.
pub fn parse_str(registry: &dyn CommandRegistry, format: FileFormat, text: &str) -> Result<Parsed> {
    match format {
        FileFormat::Line => line::parse_str(registry, text),
        FileFormat::Script => script::parse_str(registry, text),
        FileFormat::Json => json::parse_str(registry, text),
    }
}

/// Render `commands` (and trailing comments, for text formats) in
/// `format`.
pub fn render_string(
    commands: &[CommandRecord],
    trailing_comments: &[String],
    format: FileFormat,
) -> Result<String> {
    match format {
        FileFormat::Line => Ok(line::render_string(commands, trailing_comments)),
        FileFormat::Script => Ok(script::render_string(commands, trailing_comments)),
        FileFormat::Json => json::render_string(commands),
    }
}

/// Parse the file at `path`, detecting the format from its extension, and
/// replace `store`'s contents on success. On any error the store is left
/// untouched.
pub fn parse_path(store: &mut MacroStore, registry: &dyn CommandRegistry, path: &Path) -> Result<()> {
    let format = FileFormat::from_path(path);
    let text = fs::read_to_string(path)?;
    let (records, trailing) = parse_str(registry, format, &text)?;
    store.replace(records, trailing, Some(path.to_path_buf()), Some(format));
    Ok(())
}

/// Render `store` to `path` in `format` and mark the store saved.
pub fn render_path(store: &mut MacroStore, format: FileFormat, path: &Path) -> Result<()> {
    let text = render_string(store.commands(), &store.trailing_comments, format)?;
    fs::write(path, text)?;
    store.mark_saved(path, format);
    Ok(())
}
