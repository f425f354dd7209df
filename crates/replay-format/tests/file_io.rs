#![forbid(unsafe_code)]

//! File-level parse/render behavior.
//!
//! Validates:
//! - Format detection by extension, including the fallback to the line
//!   format for unknown extensions.
//! - All-or-nothing parsing: a malformed file never disturbs the store.
//! - Save bookkeeping: a successful render records path/format and clears
//!   the dirty flag.

use std::fs;

use replay_core::store::FileFormat;
use replay_core::{ArgDecl, CommandDecl, CommandRecord, MacroStore, TableRegistry};
use replay_format::{parse_path, render_path};

fn registry() -> TableRegistry {
    TableRegistry::new()
        .with_command(
            CommandDecl::new("item.name").with_arg(ArgDecl::new("name").with_type_code(3)),
        )
        .with_command(CommandDecl::new("app.quit"))
}

fn seeded_store(reg: &TableRegistry) -> MacroStore {
    let mut store = MacroStore::new();
    let mut rec = CommandRecord::new(reg, "item.name").unwrap();
    rec.set_arg("name", Some("seed value".to_string())).unwrap();
    store.add_command(rec);
    store.add_command(CommandRecord::new(reg, "app.quit").unwrap());
    store
}

#[test]
fn render_and_parse_each_format() {
    let reg = registry();
    let dir = tempfile::tempdir().unwrap();

    for format in FileFormat::ALL {
        let path = dir.path().join(format!("macro.{}", format.extension()));
        let mut store = seeded_store(&reg);
        render_path(&mut store, format, &path).unwrap();
        assert!(!store.unsaved_changes());
        assert_eq!(store.file_format(), Some(format));
        assert_eq!(store.file_path(), Some(path.as_path()));

        let mut fresh = MacroStore::new();
        parse_path(&mut fresh, &reg, &path).unwrap();
        assert_eq!(fresh.commands(), store.commands());
        assert_eq!(fresh.file_format(), Some(format));
        assert!(!fresh.unsaved_changes());
    }
}

#[test]
fn unknown_extension_parses_as_line_format() {
    let reg = registry();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("macro.whatever");
    fs::write(&path, "app.quit\n").unwrap();

    let mut store = MacroStore::new();
    parse_path(&mut store, &reg, &path).unwrap();
    assert_eq!(store.file_format(), Some(FileFormat::Line));
    assert_eq!(store.len(), 1);
}

#[test]
fn malformed_file_leaves_store_untouched() {
    let reg = registry();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.mac");
    // First line parses; second does not. All-or-nothing means neither
    // ends up in the store.
    fs::write(&path, "app.quit\nnot.a.command\n").unwrap();

    let mut store = seeded_store(&reg);
    store.mark_saved("/tmp/original.mac", FileFormat::Line);
    let before = store.commands().to_vec();

    assert!(parse_path(&mut store, &reg, &path).is_err());
    assert_eq!(store.commands(), before.as_slice());
    assert_eq!(store.file_path().unwrap().to_str(), Some("/tmp/original.mac"));
}

#[test]
fn missing_file_is_io_error() {
    let reg = registry();
    let mut store = MacroStore::new();
    let err = parse_path(&mut store, &reg, "/nonexistent/place/m.mac".as_ref()).unwrap_err();
    assert!(matches!(err, replay_format::Error::Io(_)));
}
