#![forbid(unsafe_code)]

//! Macro store: the ordered sequence of recorded commands.
//!
//! The store is the single mutable collection shared between live capture
//! (deferred insertions) and direct user edits. Everything runs on one
//! thread; ordering is the only discipline required. Every mutating
//! operation sets the dirty flag; [`MacroStore::mark_saved`] is the only
//! thing that clears it.
//!
//! Selection state (the selected row set and the "primary" row advanced
//! by step execution) lives here too, because edits and deferred
//! insertions both consult it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::argument::ArgType;
use crate::command::CommandRecord;
use crate::error::Result;
use crate::host::CommandExecutor;

// ============================================================================
// FileFormat
// ============================================================================

/// The three interchangeable serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Line-oriented text, one command per line.
    Line,
    /// Source-code text: command lines wrapped in `eval(...)` statements.
    Script,
    /// Structured JSON records.
    Json,
}

impl FileFormat {
    /// Every format, in menu order.
    pub const ALL: [Self; 3] = [Self::Line, Self::Script, Self::Json];

    /// Canonical file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Line => "mac",
            Self::Script => "scr",
            Self::Json => "json",
        }
    }

    /// User-facing format name for file dialogs.
    #[must_use]
    pub fn user_name(self) -> &'static str {
        match self {
            Self::Line => "Macro file",
            Self::Script => "Script file",
            Self::Json => "JSON file",
        }
    }

    /// File-dialog pattern.
    #[must_use]
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Line => "*.mac",
            Self::Script => "*.scr",
            Self::Json => "*.json",
        }
    }

    /// Format for a file extension. Unknown extensions fall back to the
    /// line format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == ext)
            .unwrap_or(Self::Line)
    }

    /// Format detected from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Self::Line, Self::from_extension)
    }
}

// ============================================================================
// MacroStore
// ============================================================================

/// Ordered collection of [`CommandRecord`]s plus file and selection state.
#[derive(Debug, Clone, Default)]
pub struct MacroStore {
    commands: Vec<CommandRecord>,
    /// Comment lines trailing the last command, preserved verbatim.
    pub trailing_comments: Vec<String>,
    file_path: Option<PathBuf>,
    file_format: Option<FileFormat>,
    unsaved_changes: bool,
    selected: BTreeSet<usize>,
    primary: Option<usize>,
}

impl MacroStore {
    /// Empty, unsaved store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- File state --------------------------------------------------------

    /// Path of the backing file; `None` for an unsaved macro.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Format of the backing file; `None` for an unsaved macro.
    #[must_use]
    pub fn file_format(&self) -> Option<FileFormat> {
        self.file_format
    }

    /// Whether any mutation happened since the last save.
    #[must_use]
    pub fn unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// Flag the store as mutated.
    pub fn mark_dirty(&mut self) {
        self.unsaved_changes = true;
    }

    /// Record a successful save to `path` in `format`.
    pub fn mark_saved(&mut self, path: impl Into<PathBuf>, format: FileFormat) {
        self.file_path = Some(path.into());
        self.file_format = Some(format);
        self.unsaved_changes = false;
    }

    /// Replace the whole contents after a successful parse. Selection
    /// resets; the store starts clean against the new backing file.
    pub fn replace(
        &mut self,
        commands: Vec<CommandRecord>,
        trailing_comments: Vec<String>,
        path: Option<PathBuf>,
        format: Option<FileFormat>,
    ) {
        self.commands = commands;
        self.trailing_comments = trailing_comments;
        self.file_path = path;
        self.file_format = format;
        self.unsaved_changes = false;
        self.selected.clear();
        self.primary = None;
    }

    // --- Records -----------------------------------------------------------

    /// Records in macro order.
    #[must_use]
    pub fn commands(&self) -> &[CommandRecord] {
        &self.commands
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether there are no recorded commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CommandRecord> {
        self.commands.get(index)
    }

    /// Mutable record at `index`. Marks the store dirty on a hit; an
    /// out-of-range lookup leaves it untouched.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut CommandRecord> {
        let record = self.commands.get_mut(index);
        if record.is_some() {
            self.unsaved_changes = true;
        }
        record
    }

    /// Append a record; returns its index.
    pub fn add_command(&mut self, record: CommandRecord) -> usize {
        self.unsaved_changes = true;
        self.commands.push(record);
        self.commands.len() - 1
    }

    /// Insert a record at `index`, shifting selection and primary.
    pub fn insert(&mut self, index: usize, record: CommandRecord) {
        let index = index.min(self.commands.len());
        self.commands.insert(index, record);
        self.selected = self
            .selected
            .iter()
            .map(|&i| if i >= index { i + 1 } else { i })
            .collect();
        if let Some(primary) = self.primary
            && primary >= index
        {
            self.primary = Some(primary + 1);
        }
        self.unsaved_changes = true;
    }

    /// Insert directly after the primary row (or at the end when there is
    /// none) and make the new row primary. Live capture lands here.
    pub fn insert_after_primary(&mut self, record: CommandRecord) -> usize {
        let index = self
            .primary
            .map_or(self.commands.len(), |p| (p + 1).min(self.commands.len()));
        self.insert(index, record);
        self.primary = Some(index);
        index
    }

    /// Remove and return the record at `index`, shifting selection and
    /// primary.
    pub fn remove(&mut self, index: usize) -> Option<CommandRecord> {
        if index >= self.commands.len() {
            return None;
        }
        let record = self.commands.remove(index);
        self.selected = self
            .selected
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        self.primary = match self.primary {
            Some(p) if p == index => None,
            Some(p) if p > index => Some(p - 1),
            other => other,
        };
        self.unsaved_changes = true;
        Some(record)
    }

    /// Remove every selected record, in order. Used by cut.
    pub fn delete_selected(&mut self) -> Vec<CommandRecord> {
        let indices: Vec<usize> = self.selected.iter().copied().collect();
        let mut removed = Vec::with_capacity(indices.len());
        for index in indices.into_iter().rev() {
            if let Some(record) = self.remove(index) {
                removed.push(record);
            }
        }
        removed.reverse();
        removed
    }

    /// Move a record from `from` to `to`, carrying selection with it.
    pub fn move_record(&mut self, from: usize, to: usize) {
        if from >= self.commands.len() || to >= self.commands.len() || from == to {
            return;
        }
        let record = self.commands.remove(from);
        self.commands.insert(to, record);
        self.selected.clear();
        self.selected.insert(to);
        self.primary = Some(to);
        self.unsaved_changes = true;
    }

    /// Append records parsed from another source, preserving their order.
    pub fn merge(&mut self, records: Vec<CommandRecord>) {
        if records.is_empty() {
            return;
        }
        self.commands.extend(records);
        self.unsaved_changes = true;
    }

    /// Drop all records and reset to unsaved-empty state.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.trailing_comments.clear();
        self.file_path = None;
        self.file_format = None;
        self.unsaved_changes = false;
        self.selected.clear();
        self.primary = None;
    }

    // --- Selection ---------------------------------------------------------

    /// Indices of the selected rows, ascending.
    #[must_use]
    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    /// Selected records in macro order.
    pub fn selected_records(&self) -> impl Iterator<Item = &CommandRecord> {
        self.selected.iter().filter_map(|&i| self.commands.get(i))
    }

    /// Add `index` to the selection.
    pub fn select(&mut self, index: usize) {
        if index < self.commands.len() {
            self.selected.insert(index);
        }
    }

    /// Select exactly `index` and make it primary.
    pub fn select_only(&mut self, index: usize) {
        self.selected.clear();
        if index < self.commands.len() {
            self.selected.insert(index);
            self.primary = Some(index);
        } else {
            self.primary = None;
        }
    }

    /// Clear the selection and the primary row.
    pub fn deselect_all(&mut self) {
        self.selected.clear();
        self.primary = None;
    }

    /// The primary row, if any.
    #[must_use]
    pub fn primary(&self) -> Option<usize> {
        self.primary
    }

    /// Set the primary row. Out-of-range indices clear it.
    pub fn set_primary(&mut self, index: Option<usize>) {
        self.primary = index.filter(|&i| i < self.commands.len());
    }

    // --- Execution ---------------------------------------------------------

    /// Run every non-suppressed record in order.
    pub fn run(&self, executor: &mut dyn CommandExecutor) -> Result<()> {
        for record in &self.commands {
            record.run(executor)?;
        }
        Ok(())
    }

    /// Run the primary record, then advance primary to the next record,
    /// wrapping to index 0 past the end. No-op without a primary row.
    pub fn run_next_line(&mut self, executor: &mut dyn CommandExecutor) -> Result<()> {
        let Some(primary) = self.primary else {
            return Ok(());
        };
        let Some(record) = self.commands.get(primary) else {
            return Ok(());
        };
        record.run(executor)?;

        let next = (primary + 1) % self.commands.len();
        self.primary = Some(next);
        self.selected.clear();
        self.selected.insert(next);
        Ok(())
    }

    // --- Multi-record argument editing -------------------------------------

    /// Set a named argument on every selected record that declares it.
    pub fn set_arg_on_selected(&mut self, arg_name: &str, value: Option<String>) {
        let indices: Vec<usize> = self.selected.iter().copied().collect();
        for index in indices {
            if let Some(record) = self.commands.get_mut(index)
                && let Some(arg) = record.arg_mut(arg_name)
            {
                arg.value = value.clone();
                self.unsaved_changes = true;
            }
        }
    }

    /// Distinct values of a named argument across the selection, in first-
    /// seen order. One element means the selection agrees.
    #[must_use]
    pub fn query_arg_on_selected(&self, arg_name: &str) -> Vec<Option<String>> {
        let mut values: Vec<Option<String>> = Vec::new();
        for record in self.selected_records() {
            if let Some(arg) = record.arg(arg_name)
                && !values.contains(&arg.value)
            {
                values.push(arg.value.clone());
            }
        }
        values
    }

    /// Datatype of a named argument across the selection: `None` when no
    /// selected record declares it, the shared type when they agree, and
    /// [`ArgType::String`] when they disagree.
    #[must_use]
    pub fn shared_arg_type(&self, arg_name: &str) -> Option<ArgType> {
        let mut shared: Option<ArgType> = None;
        for record in self.selected_records() {
            if let Some(arg) = record.arg(arg_name) {
                match &shared {
                    None => shared = Some(arg.ty.clone()),
                    Some(ty) if *ty == arg.ty => {}
                    Some(_) => return Some(ArgType::String),
                }
            }
        }
        shared
    }

    // --- Rendering helpers -------------------------------------------------

    /// Line-format rendering of the selected records, for copy/cut.
    #[must_use]
    pub fn render_selected_lines(&self) -> Vec<String> {
        self.selected_records()
            .flat_map(CommandRecord::render_lines)
            .collect()
    }
}
