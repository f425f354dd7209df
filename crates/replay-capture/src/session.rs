#![forbid(unsafe_code)]

//! Recording session context.
//!
//! [`ReplaySession`] is the explicitly-owned object that ties the pieces
//! together: the macro store, the capture state machine, the idle queue,
//! and the host-facing traits. The embedder constructs exactly one per
//! process, feeds host events into [`ReplaySession::handle_event`], and
//! calls [`ReplaySession::drain_idle`] whenever the host command stack
//! goes idle.
//!
//! Everything runs on the host's dispatch thread; the session never
//! spawns threads or blocks.

use std::path::Path;

use replay_core::{
    CommandExecutor, CommandRecord, CommandRegistry, FileFormat, MacroStore,
    Result as CoreResult, RowColor,
};

use crate::event::CommandEvent;
use crate::idle::{DeferredAction, IdleQueue};
use crate::listener::{CaptureConfig, CmdListener};
use crate::undo::{RowColorEdit, UndoEntry};

/// Where user-facing alerts go. The host adapter raises a dialog; tests
/// collect the messages.
pub trait AlertSink {
    /// Show `message` under `title`.
    fn alert(&mut self, title: &str, message: &str);
}

/// Alert sink that logs instead of raising dialogs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn alert(&mut self, title: &str, message: &str) {
        tracing::warn!(title, message, "alert");
    }
}

/// One recording session: store, capture machine, idle queue, and host
/// hookups.
pub struct ReplaySession {
    store: MacroStore,
    listener: CmdListener,
    queue: IdleQueue,
    registry: Box<dyn CommandRegistry>,
    executor: Box<dyn CommandExecutor>,
    alerts: Box<dyn AlertSink>,
}

impl ReplaySession {
    /// Session over the host's command registry and executor.
    #[must_use]
    pub fn new(
        config: CaptureConfig,
        registry: Box<dyn CommandRegistry>,
        executor: Box<dyn CommandExecutor>,
        alerts: Box<dyn AlertSink>,
    ) -> Self {
        Self {
            store: MacroStore::new(),
            listener: CmdListener::new(config),
            queue: IdleQueue::new(),
            registry,
            executor,
            alerts,
        }
    }

    /// The macro store.
    #[must_use]
    pub fn store(&self) -> &MacroStore {
        &self.store
    }

    /// Mutable access for direct edits (insert, delete, selection).
    pub fn store_mut(&mut self) -> &mut MacroStore {
        &mut self.store
    }

    /// Replace the capture configuration. Takes effect on the next event.
    pub fn set_config(&mut self, config: CaptureConfig) {
        self.listener.set_config(config);
    }

    // ========================================================================
    // Recording control
    // ========================================================================

    /// Whether capture is active.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.listener.is_recording()
    }

    /// Start capturing host commands.
    pub fn start(&mut self) {
        self.listener.set_recording(true);
    }

    /// Stop capturing.
    pub fn stop(&mut self) {
        self.listener.set_recording(false);
    }

    /// Flip the recording state. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        let state = !self.is_recording();
        self.listener.set_recording(state);
        state
    }

    /// Feed one host event through the capture machine.
    pub fn handle_event(&mut self, event: CommandEvent) {
        self.listener.handle_event(event, &mut self.queue);
    }

    // ========================================================================
    // Deferred work
    // ========================================================================

    /// Apply every pending deferred action, in arming order. Call when
    /// the host command stack is idle.
    pub fn drain_idle(&mut self) {
        for action in self.queue.drain() {
            match action {
                DeferredAction::InsertLine {
                    command,
                    button_label,
                } => self.insert_captured_line(&command, button_label),
                DeferredAction::InsertBlock { commands } => {
                    for command in &commands {
                        self.insert_captured_line(command, None);
                    }
                }
                DeferredAction::StopRecording { title, message } => {
                    self.stop();
                    self.alerts.alert(&title, &message);
                }
            }
        }
    }

    /// Parse one captured command line and insert it after the primary
    /// row. A line the registry cannot parse is logged and dropped; a
    /// bad capture must not poison the rest of the queue.
    fn insert_captured_line(&mut self, command: &str, button_label: Option<String>) {
        // Inverse of the capture-side query-operator escape.
        let line = command.replace("\\q", "?");
        match CommandRecord::parse_line(self.registry.as_ref(), &line) {
            Ok(mut record) => {
                record.button_label = button_label;
                let index = self.store.insert_after_primary(record);
                self.store.select_only(index);
            }
            Err(err) => {
                tracing::warn!(line = %line, %err, "dropping unparseable captured line");
            }
        }
    }

    // ========================================================================
    // Editing commands
    // ========================================================================

    /// Whether the row-color command should be enabled: never while
    /// recording, and only with a non-empty selection.
    #[must_use]
    pub fn can_set_row_color(&self) -> bool {
        !self.is_recording() && !self.store.selected().is_empty()
    }

    /// Set the row color of every selected record. Applies the edit and
    /// returns it for host undo-stack registration; `None` when the
    /// command is disabled or nothing is selected.
    pub fn set_row_color(&mut self, color: RowColor) -> Option<RowColorEdit> {
        if !self.can_set_row_color() {
            return None;
        }
        let edit = RowColorEdit::for_selection(&self.store, color)?;
        edit.forward(&mut self.store);
        Some(edit)
    }

    /// Render the selected records as line-format text.
    #[must_use]
    pub fn copy_selected(&self) -> String {
        self.store.render_selected_lines().join("\n")
    }

    /// Render the selected records, then delete them.
    pub fn cut_selected(&mut self) -> String {
        let text = self.copy_selected();
        self.store.delete_selected();
        text
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Execute the whole macro.
    pub fn run(&mut self) -> CoreResult<()> {
        self.store.run(self.executor.as_mut())
    }

    /// Execute the line after the primary row, wrapping at the end.
    pub fn run_next_line(&mut self) -> CoreResult<()> {
        self.store.run_next_line(self.executor.as_mut())
    }

    // ========================================================================
    // File I/O
    // ========================================================================

    /// Replace the store contents from a macro file, detecting the
    /// format from the extension. All-or-nothing.
    pub fn open(&mut self, path: &Path) -> Result<(), replay_format::Error> {
        replay_format::parse_path(&mut self.store, self.registry.as_ref(), path)
    }

    /// Write the store to `path` in `format` and mark it saved.
    pub fn save_as(&mut self, path: &Path, format: FileFormat) -> Result<(), replay_format::Error> {
        replay_format::render_path(&mut self.store, format, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ArgFlags, ArgSnapshot, CommandEvent, CommandSnapshot};
    use replay_core::{ArgDecl, CommandDecl, NullExecutor, TableRegistry};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct CollectedAlerts(Rc<RefCell<Vec<(String, String)>>>);

    impl AlertSink for CollectedAlerts {
        fn alert(&mut self, title: &str, message: &str) {
            self.0.borrow_mut().push((title.to_string(), message.to_string()));
        }
    }

    fn registry() -> TableRegistry {
        TableRegistry::new()
            .with_command(
                CommandDecl::new("item.name").with_arg(ArgDecl::new("name")),
            )
            .with_command(CommandDecl::new("item.create"))
            .with_command(
                CommandDecl::new("tool.set").with_arg(ArgDecl::new("tool")),
            )
    }

    fn session() -> (ReplaySession, CollectedAlerts) {
        let alerts = CollectedAlerts::default();
        let session = ReplaySession::new(
            CaptureConfig::default(),
            Box::new(registry()),
            Box::new(NullExecutor),
            Box::new(alerts.clone()),
        );
        (session, alerts)
    }

    fn snapshot(name: &str, arg: &str, value: &str) -> CommandSnapshot {
        let mut cmd = CommandSnapshot::named(name);
        cmd.args.push(ArgSnapshot {
            name: arg.to_string(),
            raw_value: Some(value.to_string()),
            value_string: Some(value.to_string()),
            flags: ArgFlags::VALUE_SET,
        });
        cmd
    }

    fn fire(session: &mut ReplaySession, cmd: CommandSnapshot) {
        session.handle_event(CommandEvent::ExecutePre { cmd: cmd.clone() });
        session.handle_event(CommandEvent::ExecuteResult {
            cmd,
            was_successful: true,
        });
    }

    #[test]
    fn captured_command_lands_in_store_after_drain() {
        let (mut session, _) = session();
        session.start();
        fire(&mut session, snapshot("item.name", "name", "Cube"));
        assert!(session.store().is_empty());
        session.drain_idle();
        assert_eq!(session.store().len(), 1);
        let record = session.store().get(0).unwrap();
        assert_eq!(record.name(), "item.name");
        assert_eq!(record.arg("name").unwrap().value.as_deref(), Some("Cube"));
        assert_eq!(session.store().primary(), Some(0));
    }

    #[test]
    fn consecutive_captures_preserve_order() {
        let (mut session, _) = session();
        session.start();
        fire(&mut session, snapshot("item.name", "name", "A"));
        fire(&mut session, snapshot("item.name", "name", "B"));
        session.drain_idle();
        assert_eq!(session.store().len(), 2);
        assert_eq!(
            session.store().get(0).unwrap().arg("name").unwrap().value.as_deref(),
            Some("A")
        );
        assert_eq!(
            session.store().get(1).unwrap().arg("name").unwrap().value.as_deref(),
            Some("B")
        );
    }

    #[test]
    fn identical_commands_in_one_burst_record_twice() {
        let (mut session, _) = session();
        session.start();
        // Same button clicked twice before the stack goes idle: both
        // presses are real actions and both must land.
        fire(&mut session, CommandSnapshot::named("item.create"));
        fire(&mut session, CommandSnapshot::named("item.create"));
        session.drain_idle();
        assert_eq!(session.store().len(), 2);
    }

    #[test]
    fn block_contents_insert_as_consecutive_records() {
        let (mut session, _) = session();
        session.start();
        session.handle_event(CommandEvent::BlockBegin);
        fire(&mut session, CommandSnapshot::named("item.create"));
        fire(&mut session, snapshot("item.name", "name", "Cube"));
        session.handle_event(CommandEvent::BlockEnd {
            was_discarded: false,
        });
        session.drain_idle();
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.store().get(0).unwrap().name(), "item.create");
        assert_eq!(session.store().get(1).unwrap().name(), "item.name");
    }

    #[test]
    fn undo_during_recording_stops_and_alerts() {
        let (mut session, alerts) = session();
        session.start();
        fire(&mut session, CommandSnapshot::named("app.undo"));
        session.drain_idle();
        assert!(!session.is_recording());
        let collected = alerts.0.borrow();
        assert_eq!(collected.len(), 1);
        assert!(collected[0].1.contains("app.undo"));
    }

    #[test]
    fn unparseable_capture_degrades_without_poisoning_the_queue() {
        let (mut session, _) = session();
        session.start();
        // Unknown to the registry.
        fire(&mut session, CommandSnapshot::named("bogus.command"));
        fire(&mut session, snapshot("item.name", "name", "Kept"));
        session.drain_idle();
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.store().get(0).unwrap().name(), "item.name");
    }

    #[test]
    fn query_escape_round_trips_through_the_idle_queue() {
        let (mut session, _) = session();
        session.start();
        fire(&mut session, snapshot("item.name", "name", "what?"));
        session.drain_idle();
        let record = session.store().get(0).unwrap();
        assert_eq!(record.arg("name").unwrap().value.as_deref(), Some("what?"));
    }

    #[test]
    fn row_color_disabled_while_recording() {
        let (mut session, _) = session();
        session.start();
        fire(&mut session, snapshot("item.name", "name", "Cube"));
        session.drain_idle();
        assert!(session.is_recording());
        assert!(!session.can_set_row_color());
        assert!(session.set_row_color(RowColor::Red).is_none());
        session.stop();
        assert!(session.can_set_row_color());
        let edit = session.set_row_color(RowColor::Red).unwrap();
        assert_eq!(session.store().get(0).unwrap().row_color, RowColor::Red);
        edit.reverse(session.store_mut());
        assert_eq!(session.store().get(0).unwrap().row_color, RowColor::None);
    }

    #[test]
    fn cut_renders_then_deletes_selection() {
        let (mut session, _) = session();
        session.start();
        fire(&mut session, snapshot("item.name", "name", "A"));
        fire(&mut session, snapshot("item.name", "name", "B"));
        session.drain_idle();
        session.stop();
        session.store_mut().select_only(0);
        let text = session.cut_selected();
        // Stored records always render their set arguments named.
        assert_eq!(text, "item.name name:A");
        assert_eq!(session.store().len(), 1);
        assert_eq!(
            session.store().get(0).unwrap().arg("name").unwrap().value.as_deref(),
            Some("B")
        );
    }

    #[test]
    fn toggle_flips_recording_state() {
        let (mut session, _) = session();
        assert!(session.toggle());
        assert!(session.is_recording());
        assert!(!session.toggle());
        assert!(!session.is_recording());
    }
}
