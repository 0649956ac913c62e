//! Shared access to one session's undo history

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::document::LiveState;
use crate::patch::{Patch, PatchSet};
use crate::undo_stack::UndoHistory;

/// Handle to the undo history owned by an editing session
///
/// Clones share the same history.
#[derive(Clone, Debug, Default)]
pub struct SharedUndoHistory {
    history: Arc<Mutex<UndoHistory>>,
}

impl SharedUndoHistory {
    /// Wrap `history` for shared use
    pub fn new(history: UndoHistory) -> Self {
        Self {
            history: Arc::new(Mutex::new(history)),
        }
    }

    /// Lock the history for direct access
    pub fn lock(&self) -> MutexGuard<'_, UndoHistory> {
        self.history.lock()
    }

    /// Open a capture transaction that is closed when the guard ends or drops
    ///
    /// If a transaction is already open the returned guard does nothing, the
    /// outer transaction stays in charge. A guard only ever closes the
    /// transaction it opened.
    #[must_use]
    pub fn begin_capture(&self) -> CaptureGuard {
        let mut history = self.history.lock();
        let generation = if history.is_capturing() {
            None
        } else {
            history.begin_capture();
            history.capture_generation()
        };
        CaptureGuard {
            history: self.history.clone(),
            generation,
        }
    }

    /// Record one change, see [`UndoHistory::add_patches`]
    pub fn add_patches<S: LiveState + ?Sized>(&self, change: PatchSet, state: &S) {
        self.history.lock().add_patches(change, state);
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.lock().has_undo_patches()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.lock().has_redo_patches()
    }

    /// Undo patches already synchronized with `state`, ready to apply
    pub fn undo<S: LiveState + ?Sized>(&self, state: &S) -> Vec<Patch> {
        let mut history = self.history.lock();
        let patches = history.get_undo_patches(state);
        history.sync_patches_with_state(patches, state)
    }

    /// Redo patches already synchronized with `state`, ready to apply
    pub fn redo<S: LiveState + ?Sized>(&self, state: &S) -> Vec<Patch> {
        let mut history = self.history.lock();
        let patches = history.get_redo_patches(state);
        history.sync_patches_with_state(patches, state)
    }

    /// Forget the whole history
    pub fn clear(&self) {
        self.history.lock().clear_undo_stack();
    }
}

/// Guard for a capture transaction
/// When dropped, commits everything recorded since creation as one undo step
pub struct CaptureGuard {
    history: Arc<Mutex<UndoHistory>>,
    /// Generation of the transaction this guard opened, `None` once ended
    generation: Option<u64>,
}

impl CaptureGuard {
    /// End the capture transaction explicitly
    ///
    /// Does nothing if the transaction was already closed or dropped by
    /// someone else, e.g. by clearing the history.
    pub fn end(&mut self) {
        let Some(generation) = self.generation.take() else {
            return;
        };
        let mut history = self.history.lock();
        if history.capture_generation() == Some(generation) {
            history.end_capture();
        } else {
            log::debug!("capture transaction {generation} is no longer open");
        }
    }

    /// Whether this guard opened the transaction and has not closed it yet
    pub fn is_active(&self) -> bool {
        self.generation.is_some()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.end();
    }
}
