#![forbid(unsafe_code)]

//! Argument codec: quoting rules and the command-line tokenizer.
//!
//! The line format owes its round-trip correctness to two small pieces of
//! logic kept here in one place:
//!
//! - [`wrap_quote`]: a value is wrapped in double quotes iff it contains
//!   any character outside `[A-Za-z0-9_]`. (Empty values are also quoted;
//!   a bare empty token would not survive re-parsing.)
//! - [`ArgTokenizer`]: splits the remainder of a command line into
//!   `name:value` / positional value tokens, honoring `'…'`, `"…"` and
//!   `{…}` wrappers. Wrappers are stripped on extraction; there is no
//!   escape mechanism inside a wrapper, matching the wire format.
//!
//! # Tokenizer rules
//!
//! 1. Skip leading whitespace.
//! 2. A token opening with `'`, `"` or `{` is a positional value.
//! 3. Otherwise, a `:` before the next whitespace splits an explicit
//!    argument name from its value (unless a wrapper character appears
//!    before the colon, which makes the token positional).
//! 4. A wrapped value runs to the matching closing character; a bare value
//!    runs to the next whitespace or end of input.

use crate::command::CommandRecord;
use crate::error::{Error, Result};

/// Whether `c` counts as a word character for quoting purposes.
#[inline]
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Quote `value` iff it contains a non-word character (or is empty).
#[must_use]
pub fn wrap_quote(value: &str) -> String {
    if value.is_empty() || value.chars().any(|c| !is_word_char(c)) {
        force_quote(value)
    } else {
        value.to_string()
    }
}

/// Quote `value` unconditionally. Used for arguments marked as strings.
#[must_use]
pub fn force_quote(value: &str) -> String {
    format!("\"{value}\"")
}

/// One scanned argument token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgToken<'a> {
    /// Explicit argument name, when the token carried one.
    pub name: Option<&'a str>,
    /// Value with any wrapper already stripped.
    pub value: &'a str,
}

/// Iterator over the argument tokens of a command line remainder.
#[derive(Debug, Clone)]
pub struct ArgTokenizer<'a> {
    rest: &'a str,
}

impl<'a> ArgTokenizer<'a> {
    /// Tokenizer over `input`, the text following the command name.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn scan(&mut self) -> Result<Option<ArgToken<'a>>> {
        let mut rest = self.rest.trim_start();
        if rest.is_empty() {
            self.rest = "";
            return Ok(None);
        }

        let mut name = None;
        let first = rest.chars().next().unwrap_or_default();
        if !matches!(first, '\'' | '"' | '{') {
            let boundary = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let head = &rest[..boundary];
            if let Some(colon) = head.find(':') {
                // A wrapper before the colon makes the token positional.
                if !head[..colon].contains(['\'', '"', '{']) {
                    name = Some(&head[..colon]);
                    rest = &rest[colon + 1..];
                }
            }
        }

        // The value starts immediately after the colon; a colon followed
        // by whitespace or end-of-input names nothing.
        if let Some(name) = name
            && (rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            return Err(Error::malformed(format!("missing value after `{name}:`")));
        }

        let (value, after) = match rest.chars().next().unwrap_or_default() {
            open @ ('\'' | '"') => {
                let close = rest[1..]
                    .find(open)
                    .ok_or_else(|| Error::malformed(format!("unterminated {open} in `{rest}`")))?;
                (&rest[1..1 + close], 1 + close + 1)
            }
            '{' => {
                let close = rest[1..]
                    .find('}')
                    .ok_or_else(|| Error::malformed(format!("unterminated {{ in `{rest}`")))?;
                (&rest[1..1 + close], 1 + close + 1)
            }
            _ => {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                (&rest[..end], end)
            }
        };

        self.rest = &rest[after..];
        Ok(Some(ArgToken { name, value }))
    }
}

impl<'a> Iterator for ArgTokenizer<'a> {
    type Item = Result<ArgToken<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.scan() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(err) => {
                self.rest = "";
                Some(Err(err))
            }
        }
    }
}

/// Parse an argument string onto `record`'s declared slots.
///
/// Explicit names resolve against the declaration
/// ([`Error::UnknownArgument`] otherwise); positional values fill the next
/// sequential unfilled index. Refilling an index is
/// [`Error::DuplicateArgument`]. Scanning stops once every declared slot
/// is filled; trailing text is ignored at that point.
pub fn parse_args(record: &mut CommandRecord, input: &str) -> Result<()> {
    let declared = record.args().len();
    let mut filled = vec![false; declared];
    let mut cursor = 0usize;
    let mut tokens = ArgTokenizer::new(input);

    loop {
        if filled.iter().all(|f| *f) {
            break;
        }
        let Some(token) = tokens.next() else { break };
        let token = token?;

        let index = match token.name {
            Some(name) => record
                .args()
                .iter()
                .position(|arg| arg.name == name)
                .ok_or_else(|| Error::UnknownArgument {
                    command: record.name().to_string(),
                    argument: name.to_string(),
                })?,
            None => {
                while cursor < declared && filled[cursor] {
                    cursor += 1;
                }
                cursor
            }
        };

        if index >= declared {
            return Err(Error::TooManyArguments {
                command: record.name().to_string(),
                declared,
            });
        }
        if filled[index] {
            return Err(Error::DuplicateArgument {
                command: record.name().to_string(),
                index,
            });
        }
        filled[index] = true;
        record.args_mut()[index].value = Some(token.value.to_string());
    }

    Ok(())
}
