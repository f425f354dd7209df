#![forbid(unsafe_code)]

//! Core data model for the Replay macro recorder.
//!
//! This crate owns the pieces every other Replay crate builds on: the
//! [`CommandRecord`](command::CommandRecord) data model, the argument
//! codec (quoting rules and the command-line tokenizer), the
//! [`MacroStore`](store::MacroStore), and the narrow traits the host
//! adapter implements.
//!
//! Serialization formats live in `replay-format`; the capture state
//! machine lives in `replay-capture`.

pub mod argument;
pub mod codec;
pub mod command;
pub mod error;
pub mod host;
pub mod store;

pub use argument::{ArgType, Argument};
pub use command::{CommandRecord, Prefix, RowColor, SUPPRESS_MARKER};
pub use error::{Error, Result};
pub use host::{ArgDecl, CommandDecl, CommandExecutor, CommandRegistry, NullExecutor, TableRegistry};
pub use store::{FileFormat, MacroStore};
