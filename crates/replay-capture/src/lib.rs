#![forbid(unsafe_code)]

//! Live capture for the Replay macro recorder.
//!
//! The host adapter translates its native command-system callbacks into
//! [`CommandEvent`]s and feeds them to a [`ReplaySession`]. The session's
//! [`CmdListener`] filters the stream down to top-level user actions,
//! defers the resulting store mutations through an [`IdleQueue`], and the
//! embedder drains that queue between callbacks.
//!
//! Reversible user edits (row color today) go through the [`undo`]
//! module's [`UndoEntry`] objects, handed to the host undo stack for
//! forward/reverse replay.

pub mod event;
pub mod idle;
pub mod listener;
pub mod session;
pub mod undo;

pub use event::{ArgFlags, ArgSnapshot, CallId, CommandEvent, CommandFlags, CommandSnapshot};
pub use idle::{DeferredAction, IdleQueue};
pub use listener::{CaptureConfig, CmdListener, DENY_LIST};
pub use session::{AlertSink, LogAlerts, ReplaySession};
pub use undo::{EditList, RowColorEdit, UndoEntry};
