#![forbid(unsafe_code)]

//! Source-code text format.
//!
//! Identical per-line content to the line format, but every command is
//! wrapped as an `eval("...")` statement under a fixed header so the file
//! doubles as an executable script for the host. Comments are preserved
//! as-is.
//!
//! The importer is deliberately narrow: it accepts the header, blank
//! lines, comment lines, and single `eval`-style invocations carrying one
//! string literal. Any other construct is malformed input.

use replay_core::{CommandRecord, CommandRegistry, Error as CoreError, SUPPRESS_MARKER};

use crate::{Error, Parsed, Result};

/// Fixed first line of every rendered script.
pub const HEADER: &str = "# replay script";

fn escape(command: &str) -> String {
    command.replace('\\', "\\\\").replace('"', "\\\"")
}

fn statement(command: &str) -> String {
    format!("eval(\"{}\")", escape(command))
}

/// Extract the command string from a single `eval(...)` statement.
fn parse_eval(stmt: &str) -> std::result::Result<String, String> {
    let inner = stmt
        .trim()
        .strip_prefix("eval(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| format!("expected an eval(...) statement, got `{stmt}`"))?
        .trim();

    let quote = match inner.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return Err(format!("eval argument is not a string literal: `{inner}`")),
    };
    if inner.len() < 2 || !inner.ends_with(quote) {
        return Err(format!("unterminated string literal: `{inner}`"));
    }
    let body = &inner[1..inner.len() - 1];

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('\\' | '"' | '\'')) => out.push(escaped),
                Some(other) => return Err(format!("unsupported escape `\\{other}`")),
                None => return Err("dangling escape at end of literal".to_string()),
            },
            // An unescaped quote means the literal ended early; whatever
            // follows is a second expression.
            c if c == quote => {
                return Err("eval accepts exactly one string literal".to_string());
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Parse script-format text into records and trailing comments.
pub fn parse_str(registry: &dyn CommandRegistry, text: &str) -> Result<Parsed> {
    let mut records = Vec::new();
    let mut comments: Vec<String> = Vec::new();
    let mut suppress_next = false;
    let mut seen_any = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        // The fixed header is dropped rather than kept as a comment, so a
        // render/parse cycle does not accumulate headers.
        if !seen_any && line == HEADER {
            seen_any = true;
            continue;
        }
        seen_any = true;

        let (command_text, suppressed) = if let Some(rest) = line.strip_prefix('#') {
            if line == SUPPRESS_MARKER {
                suppress_next = true;
                continue;
            }
            let rest = rest.trim_start();
            if suppress_next && rest.starts_with("eval(") {
                (rest, true)
            } else {
                comments.push(line.to_string());
                continue;
            }
        } else {
            // The marker flags the next command even when intervening
            // comments left the command line itself unprefixed.
            (line, suppress_next)
        };

        let command = parse_eval(command_text).map_err(|reason| Error::Parse {
            line: line_no,
            source: CoreError::Malformed { reason },
        })?;
        let mut record =
            CommandRecord::parse_line(registry, &command).map_err(|source| Error::Parse {
                line: line_no,
                source,
            })?;
        record.suppress = suppressed;
        record.comments_before = std::mem::take(&mut comments);
        records.push(record);
        suppress_next = false;
    }

    if suppress_next {
        comments.push(SUPPRESS_MARKER.to_string());
    }
    Ok((records, comments))
}

/// Render records and trailing comments as script-format text.
#[must_use]
pub fn render_string(commands: &[CommandRecord], trailing_comments: &[String]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for record in commands {
        for comment in &record.comments_before {
            out.push_str(comment);
            out.push('\n');
        }
        if record.suppress {
            out.push_str(SUPPRESS_MARKER);
            out.push('\n');
            out.push_str("# ");
        }
        out.push_str(&statement(&record.render_line()));
        out.push('\n');
    }
    for comment in trailing_comments {
        out.push_str(comment);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_core::{ArgDecl, CommandDecl, Prefix, TableRegistry};

    fn registry() -> TableRegistry {
        TableRegistry::new()
            .with_command(
                CommandDecl::new("item.name").with_arg(ArgDecl::new("name").with_type_code(3)),
            )
            .with_command(CommandDecl::new("app.quit"))
    }

    #[test]
    fn statement_escapes_quotes_and_backslashes() {
        assert_eq!(
            statement(r#"item.name name:"a\b""#),
            r#"eval("item.name name:\"a\\b\"")"#
        );
    }

    #[test]
    fn parse_eval_double_and_single_quotes() {
        assert_eq!(parse_eval(r#"eval("app.quit")"#).unwrap(), "app.quit");
        assert_eq!(parse_eval("eval('app.quit')").unwrap(), "app.quit");
    }

    #[test]
    fn parse_eval_rejects_other_code() {
        assert!(parse_eval("run('app.quit')").is_err());
        assert!(parse_eval("eval(command)").is_err());
        assert!(parse_eval(r#"eval("a" "b")"#).is_err());
        assert!(parse_eval(r#"eval("dangling)"#).is_err());
    }

    #[test]
    fn render_then_parse_round_trips() {
        let reg = registry();
        let mut record = CommandRecord::new(&reg, "item.name").unwrap();
        record.prefix = Prefix::ShowCommandDialog;
        record.set_arg("name", Some(r"a \b c".to_string())).unwrap();
        record.comments_before.push("# tricky".to_string());
        let mut suppressed = CommandRecord::new(&reg, "app.quit").unwrap();
        suppressed.suppress = true;

        let text = render_string(&[record.clone(), suppressed.clone()], &[]);
        assert!(text.starts_with(HEADER));

        let (records, _) = parse_str(&reg, &text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], record);
        assert_eq!(records[1], suppressed);
    }

    #[test]
    fn header_does_not_accumulate_as_comment() {
        let reg = registry();
        let text = render_string(&[CommandRecord::new(&reg, "app.quit").unwrap()], &[]);
        let (records, _) = parse_str(&reg, &text).unwrap();
        assert!(records[0].comments_before.is_empty());
    }

    #[test]
    fn marker_survives_comments_before_an_unprefixed_statement() {
        let reg = registry();
        let text = "# replay script\n# replay suppress:\n# why this is off\neval(\"app.quit\")\n";
        let (records, _) = parse_str(&reg, text).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].suppress);
        assert_eq!(
            records[0].comments_before,
            vec!["# why this is off".to_string()]
        );
    }

    #[test]
    fn non_eval_statement_is_fatal() {
        let text = "# replay script\nprint('hello')\n";
        let err = parse_str(&registry(), text).unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
