#![forbid(unsafe_code)]

//! Host boundary traits.
//!
//! The recorder never talks to the host application directly. It consumes
//! two narrow capabilities, implemented by the embedding adapter:
//!
//! - [`CommandRegistry`]: declared metadata for a command name (argument
//!   names, types, docs). Record construction validates names against it.
//! - [`CommandExecutor`]: runs a fully rendered command string.
//!
//! [`TableRegistry`] is a plain in-memory registry for adapters that can
//! enumerate the host's command set up front, and for test suites.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Declared metadata for one argument slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgDecl {
    /// Stable identifier, unique within the command.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Host type code: 0 generic object, 1 integer, 2 float, 3 string.
    pub type_code: u32,
    /// Richer type name, when the host reports one.
    pub type_name: Option<String>,
    /// Symbolic hint list for integer arguments.
    pub hints: Vec<(i32, String)>,
    /// Documentation string.
    pub description: String,
    /// Example value.
    pub example: Option<String>,
    /// Whether the datatype depends on another argument's value.
    pub is_variable: bool,
}

impl ArgDecl {
    /// New declaration with the given name; everything else defaulted.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Set the human-readable label.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the host type code.
    #[must_use]
    pub fn with_type_code(mut self, type_code: u32) -> Self {
        self.type_code = type_code;
        self
    }

    /// Set the richer type name.
    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the integer hint list.
    #[must_use]
    pub fn with_hints(mut self, hints: Vec<(i32, String)>) -> Self {
        self.hints = hints;
        self
    }

    /// Mark the argument as having a variable datatype.
    #[must_use]
    pub fn variable(mut self) -> Self {
        self.is_variable = true;
        self
    }
}

/// Declared metadata for one host command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandDecl {
    /// Command name, e.g. `item.name`.
    pub name: String,
    /// Human-readable command label.
    pub display_name: String,
    /// Argument declarations in host order.
    pub args: Vec<ArgDecl>,
}

impl CommandDecl {
    /// New declaration with the given name; label defaults to the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            args: Vec::new(),
        }
    }

    /// Set the human-readable label.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Append an argument declaration.
    #[must_use]
    pub fn with_arg(mut self, arg: ArgDecl) -> Self {
        self.args.push(arg);
        self
    }
}

/// Read access to the host's declared command metadata.
pub trait CommandRegistry {
    /// Declaration for `name`, or `None` when the host does not know it.
    fn lookup(&self, name: &str) -> Option<&CommandDecl>;

    /// Whether the host recognizes `name`.
    fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

/// Executes a rendered command string against the host.
pub trait CommandExecutor {
    /// Run one command string. Failures surface as [`Error::Host`].
    fn execute(&mut self, command: &str) -> Result<()>;
}

/// In-memory [`CommandRegistry`] backed by a name table.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    commands: HashMap<String, CommandDecl>,
}

impl TableRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration, builder style.
    #[must_use]
    pub fn with_command(mut self, decl: CommandDecl) -> Self {
        self.insert(decl);
        self
    }

    /// Add or replace a declaration.
    pub fn insert(&mut self, decl: CommandDecl) {
        self.commands.insert(decl.name.clone(), decl);
    }

    /// Number of declared commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandRegistry for TableRegistry {
    fn lookup(&self, name: &str) -> Option<&CommandDecl> {
        self.commands.get(name)
    }
}

/// Executor that refuses every command; useful as a placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExecutor;

impl CommandExecutor for NullExecutor {
    fn execute(&mut self, command: &str) -> Result<()> {
        Err(Error::Host {
            message: format!("no executor attached; cannot run `{command}`"),
        })
    }
}
