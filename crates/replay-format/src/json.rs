#![forbid(unsafe_code)]

//! Structured JSON format.
//!
//! A macro is an array of `{"command": {...}}` objects carrying the
//! command name, prefix, suppress flag, leading comments, and the full
//! argument table including metadata. Unlike the text formats, values
//! round-trip through native typed JSON slots and `null` is explicit.
//!
//! Parsing matches each incoming argument to a declared argument strictly
//! by `argName`; a name with no declared match is fatal.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use replay_core::{
    ArgType, Argument, CommandRecord, CommandRegistry, Error as CoreError, Prefix,
};

use crate::{Error, Parsed, Result};

#[derive(Debug, Serialize, Deserialize)]
struct CommandEntry {
    command: CommandBody,
}

#[derive(Debug, Serialize, Deserialize)]
struct CommandBody {
    name: String,
    prefix: String,
    suppress: bool,
    comment: Vec<String>,
    args: Vec<ArgEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArgEntry {
    arg_name: String,
    value: Value,
    arg_username: String,
    arg_type: u32,
    arg_type_name: Option<String>,
    arg_desc: String,
    arg_example: Option<String>,
}

/// Typed JSON slot for an in-memory value, guided by the declared type.
/// Values that do not scan as their declared type degrade to strings.
fn value_to_json(arg: &Argument) -> Value {
    let Some(value) = &arg.value else {
        return Value::Null;
    };
    match &arg.ty {
        ArgType::Integer | ArgType::EnumeratedHint(_) => value
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.clone())),
        ArgType::Float => value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.clone())),
        ArgType::Boolean => match value.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        },
        ArgType::GenericObject | ArgType::String => Value::String(value.clone()),
    }
}

/// In-memory string for a typed JSON slot. `null` stays unset.
fn json_to_value(value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(if *b { "true" } else { "false" }.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(Error::Record(CoreError::malformed(
            "argument values must be scalars or null",
        ))),
    }
}

fn entry_for(record: &CommandRecord) -> CommandEntry {
    CommandEntry {
        command: CommandBody {
            name: record.name().to_string(),
            prefix: record.prefix.as_str().to_string(),
            suppress: record.suppress,
            comment: record.comments_before.clone(),
            args: record
                .args()
                .iter()
                .map(|arg| ArgEntry {
                    arg_name: arg.name.clone(),
                    value: value_to_json(arg),
                    arg_username: arg.display_name.clone(),
                    arg_type: arg.ty.code(),
                    arg_type_name: arg.type_name.clone(),
                    arg_desc: arg.description.clone(),
                    arg_example: arg.example.clone(),
                })
                .collect(),
        },
    }
}

/// Parse structured-format text into records. The structured format has
/// no slot for trailing comments, so that half of [`Parsed`] is always
/// empty.
pub fn parse_str(registry: &dyn CommandRegistry, text: &str) -> Result<Parsed> {
    let entries: Vec<CommandEntry> = serde_json::from_str(text)?;
    let mut records = Vec::with_capacity(entries.len());

    for entry in entries {
        let CommandBody {
            name,
            prefix,
            suppress,
            comment,
            args,
        } = entry.command;

        let mut record = CommandRecord::new(registry, &name).map_err(Error::Record)?;
        record.prefix = Prefix::parse(&prefix).map_err(Error::Record)?;
        record.suppress = suppress;
        record.comments_before = comment;

        for arg in args {
            let value = json_to_value(&arg.value)?;
            let slot = record
                .arg_mut(&arg.arg_name)
                .ok_or_else(|| {
                    Error::Record(CoreError::UnknownArgument {
                        command: name.clone(),
                        argument: arg.arg_name.clone(),
                    })
                })?;
            slot.value = value;
        }
        records.push(record);
    }

    Ok((records, Vec::new()))
}

/// Render records as a pretty-printed JSON array.
pub fn render_string(commands: &[CommandRecord]) -> Result<String> {
    let entries: Vec<CommandEntry> = commands.iter().map(entry_for).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_core::{ArgDecl, CommandDecl, TableRegistry};

    fn registry() -> TableRegistry {
        TableRegistry::new().with_command(
            CommandDecl::new("tool.set")
                .with_arg(ArgDecl::new("preset").with_type_code(3))
                .with_arg(
                    ArgDecl::new("mode")
                        .with_type_code(1)
                        .with_type_name("boolean"),
                )
                .with_arg(ArgDecl::new("amount").with_type_code(2)),
        )
    }

    fn record() -> CommandRecord {
        CommandRecord::new(&registry(), "tool.set").unwrap()
    }

    #[test]
    fn null_round_trips_to_unset() {
        let mut rec = record();
        rec.set_arg("preset", Some("brush".to_string())).unwrap();
        // `mode` and `amount` stay unset.
        let text = render_string(&[rec]).unwrap();
        assert!(text.contains("\"value\": null"));

        let (records, _) = parse_str(&registry(), &text).unwrap();
        let rec = &records[0];
        assert_eq!(rec.arg("preset").unwrap().value.as_deref(), Some("brush"));
        assert_eq!(rec.arg("mode").unwrap().value, None);
        assert_eq!(rec.arg("amount").unwrap().value, None);
        // Unset never renders a name:value pair in the line format.
        assert_eq!(rec.render_line(), "tool.set preset:brush");
    }

    #[test]
    fn values_use_native_typed_slots() {
        let mut rec = record();
        rec.set_arg("mode", Some("true".to_string())).unwrap();
        rec.set_arg("amount", Some("2.5".to_string())).unwrap();
        let text = render_string(&[rec]).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        let args = &parsed[0]["command"]["args"];
        assert_eq!(args[1]["value"], Value::Bool(true));
        assert_eq!(args[2]["value"], serde_json::json!(2.5));
    }

    #[test]
    fn typed_slots_parse_back_to_strings() {
        let text = r##"[{"command": {
            "name": "tool.set", "prefix": "!", "suppress": true,
            "comment": ["# hi"],
            "args": [
                {"argName": "preset", "value": "brush", "argUsername": "preset",
                 "argType": 3, "argTypeName": null, "argDesc": "", "argExample": null},
                {"argName": "mode", "value": false, "argUsername": "mode",
                 "argType": 1, "argTypeName": "boolean", "argDesc": "", "argExample": null},
                {"argName": "amount", "value": 2.5, "argUsername": "amount",
                 "argType": 2, "argTypeName": null, "argDesc": "", "argExample": null}
            ]}}]"##;
        let (records, _) = parse_str(&registry(), text).unwrap();
        let rec = &records[0];
        assert_eq!(rec.prefix, Prefix::SuppressDialogs);
        assert!(rec.suppress);
        assert_eq!(rec.comments_before, vec!["# hi".to_string()]);
        assert_eq!(rec.arg("mode").unwrap().value.as_deref(), Some("false"));
        assert_eq!(rec.arg("amount").unwrap().value.as_deref(), Some("2.5"));
    }

    #[test]
    fn unknown_arg_name_is_fatal() {
        let text = r#"[{"command": {
            "name": "tool.set", "prefix": "", "suppress": false, "comment": [],
            "args": [{"argName": "bogus", "value": 1, "argUsername": "x",
                      "argType": 1, "argTypeName": null, "argDesc": "", "argExample": null}]
        }}]"#;
        let err = parse_str(&registry(), text).unwrap_err();
        match err {
            Error::Record(CoreError::UnknownArgument { argument, .. }) => {
                assert_eq!(argument, "bogus");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_command_is_fatal() {
        let text = r#"[{"command": {"name": "nope", "prefix": "", "suppress": false,
                        "comment": [], "args": []}}]"#;
        assert!(matches!(
            parse_str(&registry(), text).unwrap_err(),
            Error::Record(CoreError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn container_values_are_rejected() {
        let text = r#"[{"command": {"name": "tool.set", "prefix": "", "suppress": false,
            "comment": [],
            "args": [{"argName": "preset", "value": [1, 2], "argUsername": "x",
                      "argType": 3, "argTypeName": null, "argDesc": "", "argExample": null}]
        }}]"#;
        assert!(parse_str(&registry(), text).is_err());
    }

    #[test]
    fn full_record_round_trips() {
        let mut rec = record();
        rec.prefix = Prefix::ShowAll;
        rec.suppress = true;
        rec.comments_before.push("# saved".to_string());
        rec.set_arg("preset", Some("air brush".to_string())).unwrap();
        rec.set_arg("mode", Some("false".to_string())).unwrap();

        let text = render_string(std::slice::from_ref(&rec)).unwrap();
        let (records, _) = parse_str(&registry(), &text).unwrap();
        assert_eq!(records[0], rec);
    }
}
