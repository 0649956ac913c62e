//! Snapshots of note cards removed from live state
//!
//! When a note card disappears from a document's card list, its last known
//! content is kept here so a later undo or redo can bring it back even if the
//! recorded patch only holds a stale copy.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::document::{card_id, note_id, LiveState};
use crate::patch::Patch;
use crate::undo_stack::UndoEntry;

#[derive(Clone, Debug, Default)]
pub struct DeletedCards {
    cards: HashMap<String, Value>,
}

impl DeletedCards {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of tracked cards
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if no card is tracked
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Check if a snapshot exists for `id`
    pub fn contains(&self, id: &str) -> bool {
        self.cards.contains_key(id)
    }

    /// Get the snapshot for `id`
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.cards.get(id)
    }

    /// Remove and return the snapshot for `id`
    pub fn take(&mut self, id: &str) -> Option<Value> {
        self.cards.remove(id)
    }

    /// Drop all snapshots
    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Get the ids of all tracked cards
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cards.keys().map(String::as_str)
    }

    fn snapshot(&mut self, card: &Value) {
        if let Some(id) = note_id(card) {
            log::trace!("snapshot deleted note card {id}");
            self.cards.insert(id.to_string(), card.clone());
        }
    }

    /// Record every live note card that `patches` remove from a card list
    ///
    /// `state` must be the state the patches are about to be applied to.
    pub fn extract_from_patches<S: LiveState + ?Sized>(&mut self, patches: &[Patch], state: &S) {
        for patch in patches {
            let path = patch.path();

            if let Some(doc_index) = path.targets_cards() {
                let Some(live_cards) = state.cards(doc_index) else {
                    continue;
                };
                match patch.value() {
                    Some(Value::Array(new_cards)) => {
                        let kept: HashSet<&str> = new_cards.iter().filter_map(card_id).collect();
                        for card in live_cards {
                            if note_id(card).is_some_and(|id| !kept.contains(id)) {
                                self.snapshot(card);
                            }
                        }
                    }
                    Some(_) => {}
                    None => live_cards.iter().for_each(|card| self.snapshot(card)),
                }
                continue;
            }

            if let Some((doc_index, card_index)) = path.targets_card_element() {
                let Some(live_card) = state.cards(doc_index).and_then(|cards| cards.get(card_index)) else {
                    continue;
                };
                match patch {
                    Patch::Remove { .. } => self.snapshot(live_card),
                    Patch::Replace { value, .. } if card_id(value) != card_id(live_card) => self.snapshot(live_card),
                    _ => {}
                }
            }
        }
    }

    /// Drop snapshots that no patch of `entries` still refers to
    pub fn garbage_collect<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = &'a UndoEntry>,
    {
        if self.cards.is_empty() {
            return;
        }
        let entries: Vec<&UndoEntry> = entries.into_iter().collect();
        self.cards.retain(|id, _| {
            let referenced = entries.iter().any(|entry| entry.references_id(id));
            if !referenced {
                log::debug!("dropping unreferenced deleted card {id}");
            }
            referenced
        });
    }
}
