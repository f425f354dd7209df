#![forbid(unsafe_code)]

//! Recorded command model.
//!
//! A [`CommandRecord`] is one replayable line of a macro: a host command
//! name, an execution [`Prefix`], a suppression flag, preserved leading
//! comments, and one [`Argument`] slot per argument the host declares for
//! that name. The name is validated against the host registry when the
//! record is built; argument slots are populated from the declaration at
//! that moment, so `args().len()` always equals the declared count.

use std::collections::BTreeSet;
use std::fmt;

use crate::argument::Argument;
use crate::codec;
use crate::error::{Error, Result};
use crate::host::{CommandExecutor, CommandRegistry};

// ============================================================================
// Prefix
// ============================================================================

/// Execution prefix controlling dialog behavior when a command runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Prefix {
    /// No prefix: default dialog behavior.
    #[default]
    None,
    /// `!` — suppress dialogs.
    SuppressDialogs,
    /// `!!` — suppress all dialogs.
    SuppressAll,
    /// `+` — show dialogs.
    ShowDialogs,
    /// `++` — show all dialogs.
    ShowAll,
    /// `?` — show the command dialog.
    ShowCommandDialog,
}

impl Prefix {
    /// The wire spelling of this prefix.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::SuppressDialogs => "!",
            Self::SuppressAll => "!!",
            Self::ShowDialogs => "+",
            Self::ShowAll => "++",
            Self::ShowCommandDialog => "?",
        }
    }

    /// Parse a wire spelling. Anything outside the six known forms is
    /// malformed input.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "" => Ok(Self::None),
            "!" => Ok(Self::SuppressDialogs),
            "!!" => Ok(Self::SuppressAll),
            "+" => Ok(Self::ShowDialogs),
            "++" => Ok(Self::ShowAll),
            "?" => Ok(Self::ShowCommandDialog),
            other => Err(Error::malformed(format!("unknown prefix `{other}`"))),
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RowColor
// ============================================================================

/// Display color of a macro row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowColor {
    /// No explicit color.
    #[default]
    None,
    Red,
    Magenta,
    Pink,
    Brown,
    Orange,
    Yellow,
    Green,
    LightGreen,
    Cyan,
    Blue,
    LightBlue,
    Ultramarine,
    Purple,
    LightPurple,
    DarkGrey,
    Grey,
    White,
}

impl RowColor {
    /// Every color in palette order.
    pub const ALL: [Self; 18] = [
        Self::None,
        Self::Red,
        Self::Magenta,
        Self::Pink,
        Self::Brown,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::LightGreen,
        Self::Cyan,
        Self::Blue,
        Self::LightBlue,
        Self::Ultramarine,
        Self::Purple,
        Self::LightPurple,
        Self::DarkGrey,
        Self::Grey,
        Self::White,
    ];

    /// Stable internal name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Red => "red",
            Self::Magenta => "magenta",
            Self::Pink => "pink",
            Self::Brown => "brown",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::LightGreen => "light_g",
            Self::Cyan => "cyan",
            Self::Blue => "blue",
            Self::LightBlue => "light_blue",
            Self::Ultramarine => "ultrama",
            Self::Purple => "purple",
            Self::LightPurple => "light_pu",
            Self::DarkGrey => "dark_grey",
            Self::Grey => "grey",
            Self::White => "white",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Red => "Red",
            Self::Magenta => "Magenta",
            Self::Pink => "Pink",
            Self::Brown => "Brown",
            Self::Orange => "Orange",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
            Self::LightGreen => "Light Green",
            Self::Cyan => "Cyan",
            Self::Blue => "Blue",
            Self::LightBlue => "Light Blue",
            Self::Ultramarine => "Ultramarine",
            Self::Purple => "Purple",
            Self::LightPurple => "Light Purple",
            Self::DarkGrey => "Dark Gray",
            Self::Grey => "Gray",
            Self::White => "White",
        }
    }

    /// Parse the stable internal name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

// ============================================================================
// CommandRecord
// ============================================================================

/// Marker line flagging the following command as suppressed.
pub const SUPPRESS_MARKER: &str = "# replay suppress:";

/// One recorded command of a macro.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    name: String,
    args: Vec<Argument>,
    marked_as_string: BTreeSet<usize>,
    /// Execution prefix.
    pub prefix: Prefix,
    /// When set, the record renders as an inert comment and is skipped on
    /// run.
    pub suppress: bool,
    /// Raw comment lines preserved verbatim above the command.
    pub comments_before: Vec<String>,
    /// Display override name, when the host reported a button label.
    pub button_label: Option<String>,
    /// Display color of the row.
    pub row_color: RowColor,
}

impl CommandRecord {
    /// Build an empty record for `name`, validating it against the host
    /// registry and populating argument slots from the declaration.
    pub fn new(registry: &dyn CommandRegistry, name: &str) -> Result<Self> {
        let decl = registry.lookup(name).ok_or_else(|| Error::UnknownCommand {
            name: name.to_string(),
        })?;
        Ok(Self {
            name: decl.name.clone(),
            args: decl.args.iter().map(Argument::from_decl).collect(),
            marked_as_string: BTreeSet::new(),
            prefix: Prefix::None,
            suppress: false,
            comments_before: Vec::new(),
            button_label: None,
            row_color: RowColor::None,
        })
    }

    /// Parse a `[prefix]command.name [argName:]value ...` line.
    ///
    /// The line must not carry its comment prefix; suppression and leading
    /// comments are handled by the file-level parsers.
    pub fn parse_line(registry: &dyn CommandRegistry, line: &str) -> Result<Self> {
        let line = line.trim();
        let prefix_len = line
            .chars()
            .take_while(|c| matches!(c, '!' | '?' | '+'))
            .count();
        let prefix = Prefix::parse(&line[..prefix_len])?;
        let rest = &line[prefix_len..];
        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let name = &rest[..name_end];
        if name.is_empty() {
            return Err(Error::malformed(format!("no command name in `{line}`")));
        }

        let mut record = Self::new(registry, name)?;
        record.prefix = prefix;
        codec::parse_args(&mut record, &rest[name_end..])?;
        Ok(record)
    }

    /// The host command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name for the row: the button label when present, else the
    /// command name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.button_label.as_deref().unwrap_or(&self.name)
    }

    /// Argument slots in declared order.
    #[must_use]
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Mutable argument slots. Values may change; order and count are
    /// fixed by the declaration.
    pub fn args_mut(&mut self) -> &mut [Argument] {
        &mut self.args
    }

    /// Argument by declared name.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&Argument> {
        self.args.iter().find(|a| a.name == name)
    }

    /// Mutable argument by declared name.
    pub fn arg_mut(&mut self, name: &str) -> Option<&mut Argument> {
        self.args.iter_mut().find(|a| a.name == name)
    }

    /// Set (or unset) a named argument's value.
    pub fn set_arg(&mut self, name: &str, value: Option<String>) -> Result<()> {
        match self.arg_mut(name) {
            Some(arg) => {
                arg.value = value;
                Ok(())
            }
            None => Err(Error::UnknownArgument {
                command: self.name.clone(),
                argument: name.to_string(),
            }),
        }
    }

    /// Force (or stop forcing) the argument at `index` to render quoted.
    pub fn mark_argument_as_string(&mut self, index: usize, marked: bool) {
        if marked {
            self.marked_as_string.insert(index);
        } else {
            self.marked_as_string.remove(&index);
        }
    }

    /// Whether the argument at `index` is forced to render quoted.
    #[must_use]
    pub fn is_marked_as_string(&self, index: usize) -> bool {
        self.marked_as_string.contains(&index)
    }

    /// Render the bare command line: prefix, name, and every set argument
    /// as `name:value` with codec quoting. Unset arguments are omitted.
    #[must_use]
    pub fn render_line(&self) -> String {
        let mut out = String::new();
        out.push_str(self.prefix.as_str());
        out.push_str(&self.name);
        for (index, arg) in self.args.iter().enumerate() {
            if let Some(value) = &arg.value {
                let rendered = if self.is_marked_as_string(index) {
                    codec::force_quote(value)
                } else {
                    codec::wrap_quote(value)
                };
                out.push(' ');
                out.push_str(&arg.name);
                out.push(':');
                out.push_str(&rendered);
            }
        }
        out
    }

    /// Render the record for the line format: leading comments verbatim,
    /// the suppress marker when flagged, then the (possibly comment-
    /// prefixed) command line.
    #[must_use]
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = self.comments_before.clone();
        if self.suppress {
            lines.push(SUPPRESS_MARKER.to_string());
            lines.push(format!("# {}", self.render_line()));
        } else {
            lines.push(self.render_line());
        }
        lines
    }

    /// Execute the record against the host. Suppressed records are
    /// skipped.
    pub fn run(&self, executor: &mut dyn CommandExecutor) -> Result<()> {
        if self.suppress {
            return Ok(());
        }
        executor.execute(&self.render_line())
    }
}
