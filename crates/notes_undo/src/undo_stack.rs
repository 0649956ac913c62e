//! Patch based undo/redo history
//!
//! All document modifications are recorded through [`UndoHistory::add_patches`]:
//! - Single changes create one undo entry
//! - Changes made between `begin_capture()`/`end_capture()` are merged into one entry
//! - Entries are undone/redone as a single unit by returning their patch lists
//!
//! The history never touches the document. Callers apply the returned patches,
//! usually after running them through [`UndoHistory::sync_patches_with_state`].

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::config::HistoryConfig;
use crate::deleted_cards::DeletedCards;
use crate::document::LiveState;
use crate::patch::{Patch, PatchPath, PatchSet};
use crate::sync::sync_patches_with_state;

/// One undo step
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoEntry {
    /// Forward patches in the order they were made
    patches: Vec<Patch>,
    /// Inverse patches, most recent change first
    inverse_patches: Vec<Patch>,
    /// Dirty flags touched by this step
    dirty_keys: Vec<String>,
}

impl UndoEntry {
    /// Get the forward patches of this step
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Get the inverse patches of this step
    pub fn inverse_patches(&self) -> &[Patch] {
        &self.inverse_patches
    }

    /// Get the dirty keys touched by this step
    pub fn dirty_keys(&self) -> &[String] {
        &self.dirty_keys
    }

    /// Check if this step records no patches
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty() && self.inverse_patches.is_empty()
    }

    /// Whether any forward or inverse patch mentions the entity `id`
    pub fn references_id(&self, id: &str) -> bool {
        self.patches.iter().chain(&self.inverse_patches).any(|patch| patch.references_id(id))
    }

    fn append(&mut self, patches: Vec<Patch>, inverse_patches: Vec<Patch>, dirty_keys: Vec<String>) {
        self.patches.extend(patches);
        // the newest change has to be reverted first
        self.inverse_patches.splice(0..0, inverse_patches);
        self.dirty_keys.extend(dirty_keys);
    }
}

/// Read only view of the history for diagnostics
#[derive(Debug, Serialize)]
pub struct HistorySnapshot<'a> {
    pub pointer: isize,
    pub capturing: bool,
    pub entries: &'a [UndoEntry],
    pub deleted_cards: Vec<&'a str>,
}

/// Undo history of one document editing session
#[derive(Debug)]
pub struct UndoHistory {
    stack: Vec<UndoEntry>,
    /// Number of entries currently applied to the document, `pointer() + 1`
    applied: usize,
    /// Entry collecting the changes of the open capture transaction
    capture: Option<UndoEntry>,
    /// Bumped every time a capture transaction is opened
    capture_generation: u64,
    deleted_cards: DeletedCards,
    max_depth: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    /// Create an empty history with the default depth
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Create an empty history with the given configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        if config.max_depth == 0 {
            log::warn!("undo depth of 0 requested, keeping a single step");
        }
        Self {
            stack: Vec::new(),
            applied: 0,
            capture: None,
            capture_generation: 0,
            deleted_cards: DeletedCards::new(),
            max_depth: config.max_depth.max(1),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Capture transactions
    // ═══════════════════════════════════════════════════════════════════════

    /// Open a capture transaction
    ///
    /// Every `add_patches` call until `end_capture` goes into one undo step.
    /// Transactions do not nest, a second `begin_capture` is ignored.
    pub fn begin_capture(&mut self) {
        if self.capture.is_some() {
            log::debug!("begin_capture: transaction already open");
            return;
        }
        self.capture = Some(UndoEntry::default());
        self.capture_generation += 1;
    }

    /// Close the capture transaction and commit its undo step
    ///
    /// A transaction that recorded nothing leaves the history untouched.
    pub fn end_capture(&mut self) {
        let Some(entry) = self.capture.take() else {
            log::debug!("end_capture: no open transaction");
            return;
        };
        if entry.is_empty() {
            log::trace!("end_capture: discarding empty transaction");
            return;
        }
        self.commit(entry);
    }

    /// Check if a capture transaction is open
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// Generation of the open capture transaction, `None` when not capturing
    ///
    /// Every `begin_capture` that opens a transaction gets a new generation, so
    /// a holder can tell whether the open transaction is still the one it started.
    pub fn capture_generation(&self) -> Option<u64> {
        self.capture.as_ref().map(|_| self.capture_generation)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Recording
    // ═══════════════════════════════════════════════════════════════════════

    /// Record one change
    ///
    /// `state` is the live state the change is applied to, before applying it.
    /// Patches that write dirty flags are not recorded, dirty flags are restored
    /// from `dirty_keys` instead.
    pub fn add_patches<S: LiveState + ?Sized>(&mut self, change: PatchSet, state: &S) {
        self.deleted_cards.extract_from_patches(&change.patches, state);

        let PatchSet {
            patches,
            inverse_patches,
            dirty_keys,
        } = change;
        let patches = without_dirty_flags(patches);
        let inverse_patches = without_dirty_flags(inverse_patches);

        if let Some(open) = &mut self.capture {
            open.append(patches, inverse_patches, dirty_keys);
            return;
        }

        self.commit(UndoEntry {
            patches,
            inverse_patches,
            dirty_keys,
        });
    }

    fn commit(&mut self, entry: UndoEntry) {
        self.clamp_pointer();

        if self.applied < self.stack.len() {
            // new edit after undo: the redo future is gone
            self.deleted_cards
                .garbage_collect(self.stack[..self.applied].iter().chain(std::iter::once(&entry)));
            log::trace!("discarding {} redo entries", self.stack.len() - self.applied);
            self.stack.truncate(self.applied);
        }

        self.stack.push(entry);
        self.applied += 1;

        if self.stack.len() > self.max_depth {
            let overflow = self.stack.len() - self.max_depth;
            self.stack.drain(..overflow);
            self.applied -= overflow;
        }
    }

    fn clamp_pointer(&mut self) {
        debug_assert!(self.applied <= self.stack.len(), "undo pointer out of range");
        if self.applied > self.stack.len() {
            log::warn!("undo pointer {} out of range (len={}), clamping", self.pointer(), self.stack.len());
            self.applied = self.stack.len();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Undo / Redo
    // ═══════════════════════════════════════════════════════════════════════

    /// Check if undo is available
    pub fn has_undo_patches(&self) -> bool {
        self.capture.is_none() && self.applied > 0
    }

    /// Check if redo is available
    pub fn has_redo_patches(&self) -> bool {
        self.capture.is_none() && self.applied < self.stack.len()
    }

    /// Patches that revert the most recent undo step
    ///
    /// Returns an empty list when there is nothing to undo.
    pub fn get_undo_patches<S: LiveState + ?Sized>(&mut self, state: &S) -> Vec<Patch> {
        if !self.has_undo_patches() {
            return Vec::new();
        }
        self.applied -= 1;
        let entry = &self.stack[self.applied];
        let patches = entry.inverse_patches.clone();
        let dirty_keys = entry.dirty_keys.clone();
        self.replay(patches, &dirty_keys, state)
    }

    /// Patches that reapply the next undone step
    ///
    /// Returns an empty list when there is nothing to redo.
    pub fn get_redo_patches<S: LiveState + ?Sized>(&mut self, state: &S) -> Vec<Patch> {
        if !self.has_redo_patches() {
            return Vec::new();
        }
        let entry = &self.stack[self.applied];
        self.applied += 1;
        let patches = entry.patches.clone();
        let dirty_keys = entry.dirty_keys.clone();
        self.replay(patches, &dirty_keys, state)
    }

    fn replay<S: LiveState + ?Sized>(&mut self, mut patches: Vec<Patch>, dirty_keys: &[String], state: &S) -> Vec<Patch> {
        // undo/redo can delete cards as well
        self.deleted_cards.extract_from_patches(&patches, state);
        restore_dirty_keys(&mut patches, dirty_keys);
        patches
    }

    /// Rewrite replayed patches against the live state
    ///
    /// See [`crate::sync`] for the rules.
    pub fn sync_patches_with_state<S: LiveState + ?Sized>(&mut self, patches: Vec<Patch>, state: &S) -> Vec<Patch> {
        sync_patches_with_state(patches, state, &mut self.deleted_cards)
    }

    /// Forget the whole history, used when switching documents
    pub fn clear_undo_stack(&mut self) {
        if self.capture.take().is_some() {
            log::warn!("clear_undo_stack: dropping open capture transaction");
        }
        self.stack.clear();
        self.applied = 0;
        self.deleted_cards.clear();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Diagnostics
    // ═══════════════════════════════════════════════════════════════════════

    /// Index of the most recent applied entry, -1 if nothing can be undone
    pub fn pointer(&self) -> isize {
        self.applied as isize - 1
    }

    /// Get the number of entries in the stack
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Check if the stack holds no entries
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Get the number of undo operations
    pub fn undo_len(&self) -> usize {
        self.applied
    }

    /// Get the number of redo operations
    pub fn redo_len(&self) -> usize {
        self.stack.len() - self.applied
    }

    /// Get the maximum number of undo steps kept
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Get all entries, oldest first
    pub fn entries(&self) -> &[UndoEntry] {
        &self.stack
    }

    /// Get the snapshots of deleted note cards
    pub fn deleted_cards(&self) -> &DeletedCards {
        &self.deleted_cards
    }

    /// Get a serializable view of the history for debugging
    pub fn snapshot(&self) -> HistorySnapshot<'_> {
        let mut deleted_cards: Vec<&str> = self.deleted_cards.ids().collect();
        deleted_cards.sort_unstable();
        HistorySnapshot {
            pointer: self.pointer(),
            capturing: self.is_capturing(),
            entries: &self.stack,
            deleted_cards,
        }
    }
}

fn without_dirty_flags(mut patches: Vec<Patch>) -> Vec<Patch> {
    patches.retain(|patch| !patch.path().targets_dirty_flags());
    patches
}

/// Append patches setting the dirty flags of the document the step belongs to
fn restore_dirty_keys(patches: &mut Vec<Patch>, dirty_keys: &[String]) {
    if dirty_keys.is_empty() {
        return;
    }
    let Some(doc_index) = patches.first().and_then(|patch| patch.path().document_index()) else {
        log::warn!("cannot restore dirty keys {:?}: no document index in undo step", dirty_keys);
        return;
    };

    let mut seen = HashSet::new();
    for key in dirty_keys {
        if seen.insert(key.as_str()) {
            patches.push(Patch::add(PatchPath::dirty_flag(doc_index, key), Value::Bool(true)));
        }
    }
}
