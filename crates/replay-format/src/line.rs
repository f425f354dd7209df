#![forbid(unsafe_code)]

//! Line-oriented text format.
//!
//! One command per line: `[prefix]command.name [argName:]value ...` with
//! codec quoting. Comment lines (`#`) pass through verbatim and attach to
//! the command that follows them. A `# replay suppress:` marker line flags
//! the next command as suppressed; the command line itself is then also
//! comment-prefixed so foreign interpreters skip it.

use replay_core::{CommandRecord, CommandRegistry, SUPPRESS_MARKER};

use crate::{Error, Parsed, Result};

/// Parse line-format text into records and trailing comments.
///
/// Blank lines are skipped. Any unparseable command line aborts the whole
/// parse with the offending line number.
pub fn parse_str(registry: &dyn CommandRegistry, text: &str) -> Result<Parsed> {
    let mut records = Vec::new();
    let mut comments: Vec<String> = Vec::new();
    let mut suppress_next = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            if line == SUPPRESS_MARKER {
                suppress_next = true;
                continue;
            }
            if suppress_next {
                let mut record = CommandRecord::parse_line(registry, rest.trim_start())
                    .map_err(|source| Error::Parse {
                        line: line_no,
                        source,
                    })?;
                record.suppress = true;
                record.comments_before = std::mem::take(&mut comments);
                records.push(record);
                suppress_next = false;
                continue;
            }
            comments.push(line.to_string());
            continue;
        }

        let mut record =
            CommandRecord::parse_line(registry, line).map_err(|source| Error::Parse {
                line: line_no,
                source,
            })?;
        record.comments_before = std::mem::take(&mut comments);
        records.push(record);
    }

    // A dangling marker with no command after it survives as a comment.
    if suppress_next {
        comments.push(SUPPRESS_MARKER.to_string());
    }
    Ok((records, comments))
}

/// Render records and trailing comments as line-format text.
#[must_use]
pub fn render_string(commands: &[CommandRecord], trailing_comments: &[String]) -> String {
    let mut out = String::new();
    for record in commands {
        for line in record.render_lines() {
            out.push_str(&line);
            out.push('\n');
        }
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
                CommandDecl::new("item.name")
                    .with_arg(ArgDecl::new("name").with_type_code(3))
                    .with_arg(ArgDecl::new("item").with_type_code(0)),
            )
            .with_command(CommandDecl::new("app.quit"))
    }

    #[test]
    fn parse_attaches_comments_to_following_command() {
        let text = "# set the name\n# twice\nitem.name name:\"Cube A\"\napp.quit\n";
        let (records, trailing) = parse_str(&registry(), text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].comments_before,
            vec!["# set the name".to_string(), "# twice".to_string()]
        );
        assert!(records[1].comments_before.is_empty());
        assert!(trailing.is_empty());
    }

    #[test]
    fn parse_suppress_marker() {
        let text = "# replay suppress:\n# app.quit\nitem.name name:x\n";
        let (records, _) = parse_str(&registry(), text).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].suppress);
        assert_eq!(records[0].name(), "app.quit");
        assert!(!records[1].suppress);
    }

    #[test]
    fn parse_keeps_trailing_comments() {
        let text = "app.quit\n# the end\n";
        let (records, trailing) = parse_str(&registry(), text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(trailing, vec!["# the end".to_string()]);
    }

    #[test]
    fn parse_bad_line_reports_line_number() {
        let text = "app.quit\nbogus.command\n";
        let err = parse_str(&registry(), text).unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn render_then_parse_round_trips() {
        let reg = registry();
        let mut record = CommandRecord::new(&reg, "item.name").unwrap();
        record.prefix = Prefix::SuppressDialogs;
        record.set_arg("name", Some("a b".to_string())).unwrap();
        record.comments_before.push("# renaming".to_string());
        let mut suppressed = CommandRecord::new(&reg, "app.quit").unwrap();
        suppressed.suppress = true;

        let text = render_string(
            &[record.clone(), suppressed.clone()],
            &["# done".to_string()],
        );
        let (records, trailing) = parse_str(&reg, &text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], record);
        assert_eq!(records[1], suppressed);
        assert_eq!(trailing, vec!["# done".to_string()]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "\napp.quit\n\n\napp.quit\n";
        let (records, _) = parse_str(&registry(), text).unwrap();
        assert_eq!(records.len(), 2);
    }
}
