#![forbid(unsafe_code)]

//! Undo adapter.
//!
//! User edits that touch one attribute across many records are captured
//! as an [`EditList`]: `(target index, old value, new value)` triples
//! recorded at the moment of the edit. [`UndoEntry::forward`] replays the
//! new values onto each target in original order, [`UndoEntry::reverse`]
//! replays the old ones. Both directions mark the store dirty so views
//! and save prompts pick the change up.
//!
//! The session hands completed entries to the host's undo stack; the
//! host calls back into `forward`/`reverse` on redo and undo.

use replay_core::{MacroStore, RowColor};

/// Recorded single-attribute edits over multiple targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditList<T> {
    actions: Vec<(usize, T, T)>,
}

impl<T> EditList<T> {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Record one target's transition from `old` to `new`.
    pub fn push(&mut self, index: usize, old: T, new: T) {
        self.actions.push((index, old, new));
    }

    /// Number of recorded edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Targets with their new values, in recording order.
    pub fn iter_forward(&self) -> impl Iterator<Item = (usize, &T)> {
        self.actions.iter().map(|(index, _, new)| (*index, new))
    }

    /// Targets with their old values, in recording order.
    pub fn iter_reverse(&self) -> impl Iterator<Item = (usize, &T)> {
        self.actions.iter().map(|(index, old, _)| (*index, old))
    }
}

/// A reversible store edit, registrable with the host undo stack.
pub trait UndoEntry {
    /// Replay the edit (redo direction).
    fn forward(&self, store: &mut MacroStore);

    /// Roll the edit back.
    fn reverse(&self, store: &mut MacroStore);
}

/// Row-color edit across the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowColorEdit {
    edits: EditList<RowColor>,
}

impl RowColorEdit {
    /// Capture the transition of every selected record to `color`.
    /// Returns `None` when nothing is selected.
    #[must_use]
    pub fn for_selection(store: &MacroStore, color: RowColor) -> Option<Self> {
        let mut edits = EditList::new();
        for &index in store.selected() {
            if let Some(record) = store.get(index) {
                edits.push(index, record.row_color, color);
            }
        }
        if edits.is_empty() { None } else { Some(Self { edits }) }
    }

    fn apply<'a>(store: &mut MacroStore, actions: impl Iterator<Item = (usize, &'a RowColor)>) {
        for (index, color) in actions {
            if let Some(record) = store.get_mut(index) {
                record.row_color = *color;
            } else {
                // The row was deleted since the edit was recorded; the
                // host undo stack has unwound past us. Skip it.
                tracing::warn!(index, "row color undo target no longer exists");
            }
        }
        store.mark_dirty();
    }
}

impl UndoEntry for RowColorEdit {
    fn forward(&self, store: &mut MacroStore) {
        Self::apply(store, self.edits.iter_forward());
    }

    fn reverse(&self, store: &mut MacroStore) {
        Self::apply(store, self.edits.iter_reverse());
    }
}
