#![forbid(unsafe_code)]

//! Command-lifecycle events delivered by the host.
//!
//! The host adapter translates its native listener callbacks into
//! [`CommandEvent`]s. Each execute event carries a [`CommandSnapshot`]:
//! everything the capture machine may need from the host's command handle,
//! copied out at callback time so nothing borrows host state.

use bitflags::bitflags;

use replay_core::Prefix;
use replay_core::codec::wrap_quote;

bitflags! {
    /// Host command flags relevant to recording.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct CommandFlags: u32 {
        /// The host marks the command as quiet; never recorded.
        const QUIET = 1 << 0;
        /// Undo-special commands (undo/redo machinery).
        const UNDO_SPECIAL = 1 << 1;
        /// Pure UI commands.
        const UI = 1 << 2;
    }
}

bitflags! {
    /// Host argument flags relevant to recording.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ArgFlags: u32 {
        /// Datatype depends on another argument's value.
        const VARIABLE = 1 << 0;
        /// The argument carries an explicit value on this invocation.
        const VALUE_SET = 1 << 1;
        /// Hidden from the UI.
        const HIDDEN = 1 << 2;
    }
}

/// One argument of a command handle, copied out of the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgSnapshot {
    /// Declared argument name.
    pub name: String,
    /// Raw value string, unconverted. `None` when the value is unset.
    pub raw_value: Option<String>,
    /// Value as it appears on a command line: booleans as `true`/`false`,
    /// hinted integers as their symbolic names. `None` when unset.
    pub value_string: Option<String>,
    /// Argument flags.
    pub flags: ArgFlags,
}

impl ArgSnapshot {
    /// Whether the host set a value for this invocation.
    #[must_use]
    pub fn is_value_set(&self) -> bool {
        self.flags.contains(ArgFlags::VALUE_SET)
    }

    /// Whether the argument's datatype is variable.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.flags.contains(ArgFlags::VARIABLE)
    }
}

/// A command handle copied out of the host at event time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSnapshot {
    /// Host command name, e.g. `tool.set`.
    pub name: String,
    /// Execution prefix derived from the command's dialog behavior.
    pub prefix: Prefix,
    /// Command flags.
    pub flags: CommandFlags,
    /// Button label, when the host reports one.
    pub button_label: Option<String>,
    /// Arguments in declared order.
    pub args: Vec<ArgSnapshot>,
}

impl CommandSnapshot {
    /// Snapshot with just a name; everything else defaulted. Test and
    /// adapter convenience.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Identity of this invocation for refire tracking: the command name
    /// plus every non-variable raw argument value. Variable arguments are
    /// excluded because their datatype (and thus their raw rendering) can
    /// flip between refires of the same logical call.
    #[must_use]
    pub fn call_id(&self) -> CallId {
        let mut parts = vec![self.name.clone()];
        for arg in &self.args {
            if !arg.is_variable()
                && let Some(raw) = &arg.raw_value
            {
                parts.push(raw.clone());
            }
        }
        CallId(parts)
    }

    /// Render the command line for this invocation: prefix, name, then
    /// arguments positionally until the first unset one and `name:value`
    /// from there on. Unset arguments are skipped entirely.
    #[must_use]
    pub fn command_string(&self) -> String {
        let mut out = String::new();
        out.push_str(self.prefix.as_str());
        out.push_str(&self.name);
        let mut default_seen = false;
        for arg in &self.args {
            let Some(value) = &arg.value_string else {
                default_seen = true;
                continue;
            };
            if !arg.is_value_set() {
                default_seen = true;
                continue;
            }
            out.push(' ');
            if default_seen {
                out.push_str(&arg.name);
                out.push(':');
            }
            out.push_str(&wrap_quote(value));
        }
        out
    }
}

/// Refire-tracking identity of a command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallId(Vec<String>);

impl CallId {
    /// The command name component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0[0]
    }
}

/// One notification from the host's command dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
    /// A command is about to execute.
    ExecutePre {
        /// The command handle.
        cmd: CommandSnapshot,
    },
    /// A command produced its result.
    ExecuteResult {
        /// The command handle.
        cmd: CommandSnapshot,
        /// Whether the host reports success.
        was_successful: bool,
    },
    /// A command finished unwinding.
    ExecutePost {
        /// The command handle.
        cmd: CommandSnapshot,
    },
    /// A grouped multi-command operation opened.
    BlockBegin,
    /// A grouped multi-command operation closed.
    BlockEnd {
        /// Whether the host discarded the block.
        was_discarded: bool,
    },
    /// A rapid-repeat interactive gesture started.
    RefireBegin,
    /// The interactive gesture ended.
    RefireEnd,
}
