#![forbid(unsafe_code)]

//! Deferred work queue.
//!
//! Host listener callbacks fire from deep inside the dispatcher, where
//! mutating the macro or raising dialogs is unsafe. The capture machine
//! therefore never touches the store directly: it arms [`DeferredAction`]s
//! on an [`IdleQueue`], and the embedder drains the queue once the
//! triggering event sequence has fully unwound (the host's "command stack
//! idle" moment, or simply between callbacks).
//!
//! Each armed action runs exactly once: draining takes every pending
//! action in arming order and resets the queue, so nothing is evaluated
//! twice and nothing is lost. Insertions are deliberately not
//! deduplicated — two identical top-level user actions in one burst are
//! two macro rows. Stop-and-alert requests are the exception: a second
//! one armed while the first is still pending is dropped, since stacking
//! identical dialogs over an already-stopped session helps nobody.

/// Work postponed until the host command stack unwinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    /// Insert one captured command line after the primary row.
    InsertLine {
        /// Rendered command string.
        command: String,
        /// Button label from the host, when present.
        button_label: Option<String>,
    },
    /// Insert the cached contents of a closed command block, atomically.
    InsertBlock {
        /// Rendered command strings in block order.
        commands: Vec<String>,
    },
    /// Stop recording and tell the user why.
    StopRecording {
        /// Dialog title.
        title: String,
        /// Dialog message.
        message: String,
    },
}

/// FIFO queue of armed [`DeferredAction`]s.
#[derive(Debug, Clone, Default)]
pub struct IdleQueue {
    pending: Vec<DeferredAction>,
}

impl IdleQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `action`. Returns `false` only for a stop request equal to one
    /// already pending; insertions always queue.
    pub fn arm(&mut self, action: DeferredAction) -> bool {
        if matches!(action, DeferredAction::StopRecording { .. })
            && self.pending.contains(&action)
        {
            tracing::trace!(?action, "stop request already armed");
            return false;
        }
        self.pending.push(action);
        true
    }

    /// Number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending action, in arming order, leaving the queue
    /// disarmed.
    pub fn drain(&mut self) -> Vec<DeferredAction> {
        std::mem::take(&mut self.pending)
    }
}
