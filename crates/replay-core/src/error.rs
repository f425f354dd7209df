#![forbid(unsafe_code)]

//! Error taxonomy for the macro core.
//!
//! Expected validation failures (`UnknownCommand`, `UnknownArgument`,
//! malformed input) are plain `Result` values recoverable at the call
//! boundary. Host-API failures that should not normally occur are carried
//! as [`Error::Host`] so callers can log and degrade instead of aborting.

use std::fmt;

/// Standard result type for core APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by record construction, argument parsing, and execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A command name the host registry does not recognize.
    UnknownCommand {
        /// The rejected command name.
        name: String,
    },
    /// An explicit argument name not present in the command's declaration.
    UnknownArgument {
        /// Command whose declaration was consulted.
        command: String,
        /// The rejected argument name.
        argument: String,
    },
    /// An argument index was assigned twice during one parse.
    DuplicateArgument {
        /// Command being parsed.
        command: String,
        /// Declared index that was already filled.
        index: usize,
    },
    /// More argument tokens than declared argument slots.
    TooManyArguments {
        /// Command being parsed.
        command: String,
        /// Declared argument count.
        declared: usize,
    },
    /// Input that does not scan as a command line or argument token.
    Malformed {
        /// Human-readable description of the defect.
        reason: String,
    },
    /// A host boundary call failed while executing a command.
    Host {
        /// Message reported by the host adapter.
        message: String,
    },
}

impl Error {
    /// Shorthand for [`Error::Malformed`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand { name } => write!(f, "unknown command `{name}`"),
            Self::UnknownArgument { command, argument } => {
                write!(f, "command `{command}` has no argument `{argument}`")
            }
            Self::DuplicateArgument { command, index } => {
                write!(f, "argument {index} of `{command}` assigned twice")
            }
            Self::TooManyArguments { command, declared } => {
                write!(f, "`{command}` declares {declared} arguments; got more")
            }
            Self::Malformed { reason } => write!(f, "malformed input: {reason}"),
            Self::Host { message } => write!(f, "host failure: {message}"),
        }
    }
}

impl std::error::Error for Error {}
