#![forbid(unsafe_code)]

//! Replay public facade crate.
//!
//! This crate provides the stable surface area for embedders. It
//! re-exports the common types from the internal crates and offers a
//! lightweight prelude: a host adapter normally needs a
//! [`ReplaySession`], the [`CommandRegistry`]/[`CommandExecutor`]
//! traits, and the [`CommandEvent`] model, and nothing else.

// --- Core re-exports -------------------------------------------------------

pub use replay_core::argument::{ArgType, Argument};
pub use replay_core::codec::{force_quote, wrap_quote};
pub use replay_core::command::{CommandRecord, Prefix, RowColor, SUPPRESS_MARKER};
pub use replay_core::error::{Error, Result};
pub use replay_core::host::{
    ArgDecl, CommandDecl, CommandExecutor, CommandRegistry, NullExecutor, TableRegistry,
};
pub use replay_core::store::{FileFormat, MacroStore};

// --- Format re-exports -----------------------------------------------------

pub use replay_format::{
    Error as FormatError, parse_path, parse_str, render_path, render_string,
};

// --- Capture re-exports ----------------------------------------------------

pub use replay_capture::event::{
    ArgFlags, ArgSnapshot, CallId, CommandEvent, CommandFlags, CommandSnapshot,
};
pub use replay_capture::idle::{DeferredAction, IdleQueue};
pub use replay_capture::listener::{CaptureConfig, CmdListener, DENY_LIST};
pub use replay_capture::session::{AlertSink, LogAlerts, ReplaySession};
pub use replay_capture::undo::{EditList, RowColorEdit, UndoEntry};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AlertSink, CaptureConfig, CommandEvent, CommandExecutor, CommandRecord, CommandRegistry,
        CommandSnapshot, Error, FileFormat, MacroStore, Prefix, ReplaySession, Result, RowColor,
    };

    pub use crate::{capture, core, format};
}

pub use replay_capture as capture;
pub use replay_core as core;
pub use replay_format as format;
