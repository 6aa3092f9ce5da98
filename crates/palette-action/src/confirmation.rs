//! Blocking confirmation prompt for destructive commands.
//!
//! Holds at most one outstanding request. Its callback runs exactly once,
//! and only on explicit approval; dismissing drops it unrun.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Work deferred until the user approves.
pub type ConfirmCallback = Box<dyn FnOnce() + Send + 'static>;

/// What the prompt shows. Lives in the observable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationView {
    pub title: String,
    pub message: String,
}

/// A confirmation request awaiting a decision.
pub struct PendingConfirmation {
    pub view: ConfirmationView,
    on_confirm: ConfirmCallback,
}

impl PendingConfirmation {
    /// Run the deferred work, consuming the request.
    pub fn confirm(self) {
        (self.on_confirm)();
    }
}

impl std::fmt::Debug for PendingConfirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingConfirmation")
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

/// Gate that holds the single pending confirmation.
#[derive(Default)]
pub struct ConfirmationGate {
    pending: Mutex<Option<PendingConfirmation>>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a confirmation request.
    ///
    /// A request that was still outstanding is replaced and its callback
    /// dropped unrun. Returns `true` in that case.
    pub fn request(&self, view: ConfirmationView, on_confirm: ConfirmCallback) -> bool {
        let confirmation = PendingConfirmation { view, on_confirm };
        self.pending.lock().unwrap().replace(confirmation).is_some()
    }

    /// Take the pending confirmation for approval.
    ///
    /// Returns `None` if nothing is pending. The caller runs
    /// [`PendingConfirmation::confirm`].
    pub fn approve(&self) -> Option<PendingConfirmation> {
        self.pending.lock().unwrap().take()
    }

    /// Drop the pending confirmation without running it.
    ///
    /// Returns `true` if one was pending.
    pub fn dismiss(&self) -> bool {
        self.pending.lock().unwrap().take().is_some()
    }
}
