#![forbid(unsafe_code)]

//! Capture state machine.
//!
//! [`CmdListener`] consumes the host's command-lifecycle event stream and
//! decides, per top-level user action, what gets appended to the macro.
//! It never mutates the store itself: accepted commands become
//! [`DeferredAction`]s on the [`IdleQueue`], applied by the session once
//! the host dispatcher has unwound.
//!
//! # Design
//!
//! The machine is a `recording` flag plus transient state:
//!
//! - **Depth bookkeeping.** Every command that passes the record filter
//!   increments `total_depth` on its pre event and decrements it on its
//!   result event. A command is appended only when, at result time,
//!   `total_depth - block_depth == 0`: it is a root action, not a
//!   sub-command nested beneath another in-flight command.
//! - **Blocks.** A block-begin at depth zero opens a scratch cache;
//!   commands landing inside the block are cached instead of inserted
//!   individually, and the whole cache flushes as one deferred insertion
//!   when the outermost block closes. Nested blocks only bump depth.
//! - **Refire.** During a rapid-repeat gesture (a dragged slider) the
//!   machine records nothing; it tracks the first-seen order of call
//!   identities and the most recent snapshot per identity, then flushes
//!   them when the gesture ends. The tool-apply command is forced to the
//!   end of the flush order regardless of when it fired.
//!
//! # Invariants
//!
//! - Nested sub-commands never reach the macro; block contents are the
//!   one exception, batched as a single insertion.
//! - `tool.doApply` is never emitted on its own; it materializes only
//!   when the following `tool.set` arrives, re-inserted immediately
//!   before it.

use ahash::AHashMap;

use crate::event::{CallId, CommandEvent, CommandFlags, CommandSnapshot};
use crate::idle::{DeferredAction, IdleQueue};

/// Commands that are no-ops for recording. Their sub-commands are still
/// eligible.
pub const DENY_LIST: [&str; 7] = [
    "tool.attr",
    "tool.noChange",
    "actionCenter.state",
    "workPlane.state",
    "falloff.state",
    "layout.restore",
    "view3d.toggleHUD",
];

/// Undo and redo cannot be represented in a linear macro.
const UNDO_COMMANDS: [&str; 2] = ["app.undo", "app.redo"];

/// Interactive viewport selections cannot be captured reliably.
const INTERACTIVE_SELECT: [&str; 2] = ["select.paint", "select.lasso"];

/// The recorder's own command namespace. Never recorded.
const CAPTURE_NAMESPACE: &str = "replay.";

/// Layout open/close, recorded only when the preference allows it.
const LAYOUT_TOGGLE: &str = "layout.createOrClose";

const TOOL_APPLY: &str = "tool.doApply";
const TOOL_SET: &str = "tool.set";

/// Recording preferences, owned by the session and consulted per event.
#[derive(Debug, Clone, Copy)]
pub struct CaptureConfig {
    /// Record layout open/close operations and their sub-commands.
    pub record_layout_events: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            record_layout_events: true,
        }
    }
}

impl CaptureConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether layout open/close operations are recorded.
    #[must_use]
    pub fn with_record_layout_events(mut self, record: bool) -> Self {
        self.record_layout_events = record;
        self
    }
}

/// The capture state machine.
#[derive(Debug)]
pub struct CmdListener {
    config: CaptureConfig,
    recording: bool,
    armed: bool,
    refiring: bool,
    total_depth: i32,
    block_depth: i32,
    record_in_block: bool,
    block_cache: Vec<String>,
    refire_order: Vec<CallId>,
    refire_last: AHashMap<CallId, CommandSnapshot>,
    last_command: Option<CommandSnapshot>,
    // Diagnostic stack of in-flight command names.
    debug_path: Vec<String>,
}

impl CmdListener {
    /// New listener, not recording.
    #[must_use]
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            recording: false,
            armed: true,
            refiring: false,
            total_depth: 0,
            block_depth: 0,
            record_in_block: false,
            block_cache: Vec::new(),
            refire_order: Vec::new(),
            refire_last: AHashMap::new(),
            last_command: None,
            debug_path: Vec::new(),
        }
    }

    /// Whether capture is active.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Replace the configuration. Takes effect on the next event.
    pub fn set_config(&mut self, config: CaptureConfig) {
        self.config = config;
    }

    /// Start or stop recording. Stopping clears the session-local last
    /// command so a later session cannot coalesce against a stale one.
    pub fn set_recording(&mut self, recording: bool) {
        if self.recording && !recording {
            self.last_command = None;
        }
        self.recording = recording;
        tracing::debug!(recording, "capture state changed");
    }

    /// Feed one host event through the machine, arming deferred actions
    /// on `queue` as needed.
    pub fn handle_event(&mut self, event: CommandEvent, queue: &mut IdleQueue) {
        match event {
            CommandEvent::ExecutePre { cmd } => self.on_execute_pre(&cmd, queue),
            CommandEvent::ExecuteResult { cmd, .. } => self.on_execute_result(cmd, queue),
            CommandEvent::ExecutePost { .. } => {}
            CommandEvent::BlockBegin => self.on_block_begin(),
            CommandEvent::BlockEnd { .. } => self.on_block_end(queue),
            CommandEvent::RefireBegin => self.on_refire_begin(),
            CommandEvent::RefireEnd => self.on_refire_end(queue),
        }
    }

    // ========================================================================
    // Record filter
    // ========================================================================

    /// Whether `cmd` is eligible for recording. Applied to both the pre
    /// and the result event of every command; the two outcomes agree
    /// unless recording state changed in between, which is exactly when
    /// the depth counters must stop tracking the command.
    fn valid_for_record(&mut self, cmd: &CommandSnapshot, is_result: bool, queue: &mut IdleQueue) -> bool {
        if !self.recording {
            return false;
        }

        // Skipping layout open/close must also skip its sub-commands, so
        // the whole machine disarms until the command's own result event.
        // This check deliberately precedes the armed check.
        if cmd.name == LAYOUT_TOGGLE && !self.config.record_layout_events {
            self.trace_path(&cmd.name, "recording disabled by preference, ignore");
            self.armed = is_result;
            return false;
        }

        if !self.armed {
            return false;
        }

        if cmd.flags.contains(CommandFlags::QUIET) {
            self.trace_path(&cmd.name, "quiet command, ignore");
            return false;
        }

        if cmd.name.starts_with(CAPTURE_NAMESPACE) {
            self.trace_path(&cmd.name, "recorder command, ignore");
            return false;
        }

        if DENY_LIST.contains(&cmd.name.as_str()) {
            self.trace_path(&cmd.name, "deny list, ignore");
            return false;
        }

        // Undo and redo stop the session outright; there is no reliable
        // way to fold them into a linear macro.
        if UNDO_COMMANDS.contains(&cmd.name.as_str()) {
            if is_result {
                queue.arm(stop_and_alert(
                    "Undo during recording",
                    &cmd.name,
                ));
            }
            return false;
        }

        if INTERACTIVE_SELECT.contains(&cmd.name.as_str()) {
            if is_result {
                queue.arm(stop_and_alert(
                    "Interactive selection during recording",
                    &cmd.name,
                ));
            }
            return false;
        }

        true
    }

    // ========================================================================
    // Event handlers
    // ========================================================================

    fn on_execute_pre(&mut self, cmd: &CommandSnapshot, queue: &mut IdleQueue) {
        if self.valid_for_record(cmd, false, queue) {
            self.total_depth += 1;
            self.debug_path.push(cmd.name.clone());
        }
    }

    fn on_execute_result(&mut self, cmd: CommandSnapshot, queue: &mut IdleQueue) {
        if !self.valid_for_record(&cmd, true, queue) {
            return;
        }
        self.total_depth -= 1;

        // Only root actions reach the macro.
        if self.total_depth - self.block_depth == 0 {
            if self.refiring {
                self.trace_path(&cmd.name, "refiring, tracking");
                let id = cmd.call_id();
                if !self.refire_order.contains(&id) {
                    self.refire_order.push(id.clone());
                }
                self.refire_last.insert(id, cmd);
            } else {
                self.trace_path(&cmd.name, "adding to macro");
                self.record_command(cmd, queue);
            }
        } else {
            self.trace_path(
                &cmd.name,
                "sub-command at wrong depth, ignore",
            );
        }

        self.debug_path.pop();
    }

    fn on_block_begin(&mut self) {
        if self.block_depth == 0 {
            self.block_cache.clear();
            self.record_in_block = true;
            tracing::trace!("begin recorded block");
        } else {
            tracing::trace!("begin ignored block");
        }
        self.block_depth += 1;
        self.total_depth += 1;
        self.debug_path.push("block".to_string());
    }

    fn on_block_end(&mut self, queue: &mut IdleQueue) {
        self.block_depth -= 1;
        self.total_depth -= 1;
        self.debug_path.pop();

        if self.block_depth == 0 {
            tracing::trace!("end recorded block");
            // While refiring, closing waits until the refire ends.
            if !self.refiring {
                self.close_block(queue);
            }
        } else {
            tracing::trace!("end ignored block");
        }
    }

    fn on_refire_begin(&mut self) {
        tracing::trace!("refire begin");
        self.refiring = true;
        self.refire_order.clear();
        self.refire_last.clear();
    }

    fn on_refire_end(&mut self, queue: &mut IdleQueue) {
        tracing::trace!("refire end");
        self.refiring = false;

        // The host sometimes reports the tool apply mid-gesture. It must
        // always land last, so move its identity to the end of the order.
        if let Some(pos) = self
            .refire_order
            .iter()
            .position(|id| id.name() == TOOL_APPLY)
        {
            let id = self.refire_order.remove(pos);
            self.refire_order.push(id);
        }

        // Flush in first-seen order, each identity at its last state. The
        // apply goes out directly here rather than through record_command:
        // the end of the gesture is its one correct materialization point.
        let order = std::mem::take(&mut self.refire_order);
        let mut last = std::mem::take(&mut self.refire_last);
        for id in order {
            if let Some(cmd) = last.remove(&id) {
                tracing::debug!(name = %cmd.name, "adding refired command");
                if cmd.name == TOOL_APPLY {
                    self.emit(&cmd, queue);
                    self.last_command = None;
                } else {
                    self.record_command(cmd, queue);
                }
            }
        }

        // A block that ended mid-gesture is still open; close it now.
        if self.record_in_block {
            self.close_block(queue);
        }
    }

    // ========================================================================
    // Emission
    // ========================================================================

    /// Append `cmd` to the session, applying the tool-apply coalescing
    /// rule. The apply itself is never emitted directly: it surfaces only
    /// when the following tool set arrives, re-inserted just before it.
    fn record_command(&mut self, cmd: CommandSnapshot, queue: &mut IdleQueue) {
        if cmd.name != TOOL_APPLY {
            if cmd.name == TOOL_SET
                && let Some(last) = self.last_command.take()
                && last.name == TOOL_APPLY
            {
                self.emit(&last, queue);
            }
            self.emit(&cmd, queue);
        }
        self.last_command = Some(cmd);
    }

    /// Route one accepted command: into the block cache while a recorded
    /// block is open, otherwise as its own deferred insertion. The insert
    /// path escapes `?` as `\q` because the host command line treats a
    /// bare question mark as the query operator; the session strips the
    /// escape before parsing.
    fn emit(&mut self, cmd: &CommandSnapshot, queue: &mut IdleQueue) {
        let command = cmd.command_string();
        if self.record_in_block {
            self.block_cache.push(command);
        } else {
            queue.arm(DeferredAction::InsertLine {
                command: command.replace('?', "\\q"),
                button_label: cmd.button_label.clone(),
            });
        }
    }

    /// Flush the block cache as a single deferred insertion.
    fn close_block(&mut self, queue: &mut IdleQueue) {
        self.record_in_block = false;
        if !self.block_cache.is_empty() {
            let commands = std::mem::take(&mut self.block_cache);
            queue.arm(DeferredAction::InsertBlock { commands });
        }
    }

    fn trace_path(&self, name: &str, msg: &str) {
        tracing::trace!(path = %self.debug_path.join(" > "), name, msg);
    }
}

fn stop_and_alert(title: &str, command: &str) -> DeferredAction {
    DeferredAction::StopRecording {
        title: title.to_string(),
        message: format!(
            "The {command} command cannot be recorded. Recording has been stopped."
        ),
    }
}
