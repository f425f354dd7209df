#![forbid(unsafe_code)]

//! Command argument model.
//!
//! Every [`CommandRecord`](crate::command::CommandRecord) carries one
//! [`Argument`] per slot declared by the host for its command name. The
//! argument's datatype is resolved once, at declaration time, into the
//! closed [`ArgType`] variant; an explicit host type name wins over the
//! positional type-code lookup.
//!
//! # Invariants
//!
//! - `value == None` means "unset on this record": the argument is omitted
//!   from every text rendering and serialized as an explicit null in the
//!   structured format.
//! - Argument order mirrors the host's declared order and never changes
//!   after construction.

use crate::host::ArgDecl;

/// Resolved datatype of a command argument.
///
/// The host reports a small type code (0 generic object, 1 integer,
/// 2 float, 3 string) and optionally a richer type name. Resolution rules:
/// a recognized type name takes precedence over the code; an integer with
/// a non-empty hint list becomes [`ArgType::EnumeratedHint`]; unrecognized
/// richer names fall back to the code lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgType {
    /// Type code 0: an opaque host object, rendered as a string.
    GenericObject,
    /// Plain integer.
    Integer,
    /// Floating point value.
    Float,
    /// Plain string.
    String,
    /// Integer rendered through `true`/`false`.
    Boolean,
    /// Integer rendered through a symbolic hint list of `(value, name)`.
    EnumeratedHint(Vec<(i32, String)>),
}

impl ArgType {
    /// Resolve a host type declaration into a closed variant.
    #[must_use]
    pub fn resolve(type_code: u32, type_name: Option<&str>, hints: &[(i32, String)]) -> Self {
        match type_name {
            Some("boolean") => Self::Boolean,
            Some("integer") if !hints.is_empty() => Self::EnumeratedHint(hints.to_vec()),
            Some("integer") => Self::Integer,
            Some("float") => Self::Float,
            Some("string") => Self::String,
            // Unknown richer names resolve through the code lookup.
            _ => match type_code {
                1 if !hints.is_empty() => Self::EnumeratedHint(hints.to_vec()),
                1 => Self::Integer,
                2 => Self::Float,
                3 => Self::String,
                _ => Self::GenericObject,
            },
        }
    }

    /// The host type code corresponding to this variant.
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::GenericObject => 0,
            Self::Integer | Self::Boolean | Self::EnumeratedHint(_) => 1,
            Self::Float => 2,
            Self::String => 3,
        }
    }
}

/// One argument slot of a recorded command.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Stable identifier, unique within the command declaration.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Current value, or `None` when unset (command default applies).
    pub value: Option<String>,
    /// Datatype resolved at declaration time.
    pub ty: ArgType,
    /// Raw richer type name as reported by the host, if any.
    pub type_name: Option<String>,
    /// Documentation string; not used in execution.
    pub description: String,
    /// Example value; not used in execution.
    pub example: Option<String>,
    /// Whether the datatype depends on another argument's value.
    pub is_variable: bool,
}

impl Argument {
    /// Build an unset argument from a host declaration.
    #[must_use]
    pub fn from_decl(decl: &ArgDecl) -> Self {
        Self {
            name: decl.name.clone(),
            display_name: decl.display_name.clone(),
            value: None,
            ty: ArgType::resolve(decl.type_code, decl.type_name.as_deref(), &decl.hints),
            type_name: decl.type_name.clone(),
            description: decl.description.clone(),
            example: decl.example.clone(),
            is_variable: decl.is_variable,
        }
    }

    /// Whether this argument currently carries a value.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}
