#![forbid(unsafe_code)]

//! Property tests for line-format round-trip correctness.
//!
//! Validates:
//! - Rendering a record to its command line and re-parsing yields an equal
//!   record (name, prefix, argument values and order).
//! - Quoting is the only thing deciding round-trip fidelity: any value made
//!   of word characters survives bare, anything else survives quoted.

use proptest::prelude::*;

use replay_core::{ArgDecl, CommandDecl, CommandRecord, Prefix, TableRegistry};

fn registry() -> TableRegistry {
    TableRegistry::new().with_command(
        CommandDecl::new("poly.extrude")
            .with_arg(ArgDecl::new("shift").with_type_code(2))
            .with_arg(ArgDecl::new("mode").with_type_code(3))
            .with_arg(ArgDecl::new("label").with_type_code(3)),
    )
}

fn prefix_strategy() -> impl Strategy<Value = Prefix> {
    prop_oneof![
        Just(Prefix::None),
        Just(Prefix::SuppressDialogs),
        Just(Prefix::SuppressAll),
        Just(Prefix::ShowDialogs),
        Just(Prefix::ShowAll),
        Just(Prefix::ShowCommandDialog),
    ]
}

/// Values the wire format can carry: no double quotes (the quoting scheme
/// has no escape mechanism) and no leading/trailing whitespace outside a
/// quoted wrapper is significant, so plain printable ASCII minus `"`.
fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ -!#-~]{0,24}").expect("valid regex")
}

fn bare_value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_]{1,24}").expect("valid regex")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn render_then_parse_is_identity(
        prefix in prefix_strategy(),
        shift in proptest::option::of(value_strategy()),
        mode in proptest::option::of(bare_value_strategy()),
        label in proptest::option::of(value_strategy()),
    ) {
        let registry = registry();
        let mut record = CommandRecord::new(&registry, "poly.extrude").unwrap();
        record.prefix = prefix;
        record.set_arg("shift", shift).unwrap();
        record.set_arg("mode", mode).unwrap();
        record.set_arg("label", label).unwrap();

        let line = record.render_line();
        let back = CommandRecord::parse_line(&registry, &line).unwrap();

        prop_assert_eq!(back.name(), record.name());
        prop_assert_eq!(back.prefix, record.prefix);
        prop_assert_eq!(back.args(), record.args());
    }

    #[test]
    fn bare_values_render_without_quotes(value in bare_value_strategy()) {
        let registry = registry();
        let mut record = CommandRecord::new(&registry, "poly.extrude").unwrap();
        record.set_arg("mode", Some(value.clone())).unwrap();
        let line = record.render_line();
        prop_assert_eq!(line, format!("poly.extrude mode:{}", value));
    }
}
