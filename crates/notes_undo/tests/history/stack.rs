//! Stack pointer, forking and depth tests

use notes_undo::{HistoryConfig, Patch, UndoHistory, MAX_UNDO};
use pretty_assertions::assert_eq;

use crate::helpers::{assert_invariants, init_logging, push_title_changes, title_change};

#[test]
fn test_new_history_is_empty() {
    let history = UndoHistory::new();
    assert_eq!(history.pointer(), -1);
    assert!(history.is_empty());
    assert!(!history.has_undo_patches());
    assert!(!history.has_redo_patches());
    assert_invariants(&history);
}

#[test]
fn test_empty_undo_and_redo_return_nothing() {
    let mut history = UndoHistory::new();
    assert!(history.get_undo_patches(&()).is_empty());
    assert!(history.get_redo_patches(&()).is_empty());
    assert_eq!(history.pointer(), -1);
}

#[test]
fn test_add_patches_creates_one_entry_per_call() {
    let mut history = UndoHistory::new();
    push_title_changes(&mut history, 3);

    assert_eq!(history.len(), 3);
    assert_eq!(history.pointer(), 2);
    assert!(history.has_undo_patches());
    assert!(!history.has_redo_patches());
    assert_invariants(&history);
}

#[test]
fn test_undo_returns_inverse_and_redo_returns_forward() {
    let mut history = UndoHistory::new();
    let change = title_change(0, "old", "new");
    history.add_patches(change.clone(), &());

    assert_eq!(history.get_undo_patches(&()), change.inverse_patches);
    assert_eq!(history.pointer(), -1);
    assert!(history.has_redo_patches());

    assert_eq!(history.get_redo_patches(&()), change.patches);
    assert_eq!(history.pointer(), 0);
    assert!(!history.has_redo_patches());
}

#[test]
fn test_undo_redo_round_trip() {
    init_logging();
    let mut history = UndoHistory::new();
    let changes: Vec<_> = (0..6).map(|i| title_change(0, &format!("t{i}"), &format!("t{}", i + 1))).collect();
    for change in &changes {
        history.add_patches(change.clone(), &());
    }
    let pointer = history.pointer();

    for change in changes.iter().rev() {
        assert_eq!(history.get_undo_patches(&()), change.inverse_patches);
        assert_invariants(&history);
    }
    assert_eq!(history.pointer(), -1);
    assert!(history.get_undo_patches(&()).is_empty());

    let mut replayed: Vec<Patch> = Vec::new();
    for _ in 0..changes.len() {
        replayed.extend(history.get_redo_patches(&()));
        assert_invariants(&history);
    }
    assert_eq!(history.pointer(), pointer);

    let original: Vec<Patch> = changes.into_iter().flat_map(|change| change.patches).collect();
    assert_eq!(replayed, original);
}

#[test]
fn test_new_edit_after_undo_truncates_future() {
    let mut history = UndoHistory::new();
    push_title_changes(&mut history, 5);
    assert_eq!(history.pointer(), 4);

    history.get_undo_patches(&());
    history.get_undo_patches(&());
    assert_eq!(history.pointer(), 2);
    assert_eq!(history.len(), 5);

    history.add_patches(title_change(0, "x", "y"), &());
    assert_eq!(history.pointer(), 3);
    assert_eq!(history.len(), 4);
    assert!(!history.has_redo_patches());
    assert_invariants(&history);
}

#[test]
fn test_depth_bound_evicts_oldest() {
    let mut history = UndoHistory::new();
    push_title_changes(&mut history, MAX_UNDO + 5);

    assert_eq!(history.len(), MAX_UNDO);
    assert_eq!(history.pointer(), MAX_UNDO as isize - 1);
    // the oldest surviving step is change #5
    assert_eq!(history.entries()[0].inverse_patches(), title_change(0, "t5", "t6").inverse_patches.as_slice());

    for _ in 0..MAX_UNDO {
        assert!(!history.get_undo_patches(&()).is_empty());
    }
    assert!(history.get_undo_patches(&()).is_empty());
    assert_invariants(&history);
}

#[test]
fn test_configured_depth() {
    let mut history = UndoHistory::with_config(HistoryConfig::from_toml_str("max_depth = 3").unwrap());
    push_title_changes(&mut history, 10);
    assert_eq!(history.len(), 3);
    assert_eq!(history.pointer(), 2);
}

#[test]
fn test_eviction_after_undo_keeps_pointer_in_range() {
    let mut history = UndoHistory::with_config(HistoryConfig::with_max_depth(4).unwrap());
    push_title_changes(&mut history, 4);
    history.get_undo_patches(&());
    push_title_changes(&mut history, 3);

    assert_eq!(history.len(), 4);
    assert_eq!(history.pointer(), 3);
    assert_invariants(&history);
}

#[test]
fn test_clear_undo_stack() {
    let mut history = UndoHistory::new();
    push_title_changes(&mut history, 3);
    history.get_undo_patches(&());
    history.clear_undo_stack();

    assert!(history.is_empty());
    assert_eq!(history.pointer(), -1);
    assert!(!history.has_undo_patches());
    assert!(!history.has_redo_patches());
    assert!(history.deleted_cards().is_empty());
}

#[test]
fn test_undo_and_redo_lengths() {
    let mut history = UndoHistory::new();
    push_title_changes(&mut history, 4);
    history.get_undo_patches(&());
    assert_eq!(history.undo_len(), 3);
    assert_eq!(history.redo_len(), 1);
}
