//! Reconciles replayed patches with the live state
//!
//! Note cards have a second, independent undo history inside the rich text
//! editor. The two histories do not coordinate, so a patch recorded by the
//! document history can carry note content that the editor has changed since.
//! The policy is last writer wins: the live `content`/`updatedAt` of a note
//! always replaces the recorded copy, and a note that is no longer live is
//! restored from the [`DeletedCards`] snapshot if one exists.

use serde_json::Value;

use crate::deleted_cards::DeletedCards;
use crate::document::{note_id, LiveState, NOTE_EDITABLE_FIELDS};
use crate::patch::Patch;

/// Rewrite the card values of `patches` against `state`
pub fn sync_patches_with_state<S: LiveState + ?Sized>(mut patches: Vec<Patch>, state: &S, deleted: &mut DeletedCards) -> Vec<Patch> {
    for patch in &mut patches {
        let path = patch.path();
        let is_list = path.targets_cards().is_some();
        let is_element = path.targets_card_element().is_some();
        if !is_list && !is_element {
            continue;
        }
        let Some(value) = patch.value_mut() else {
            continue;
        };
        if is_list {
            if let Value::Array(cards) = value {
                for card in cards.iter_mut() {
                    sync_card(card, state, deleted);
                }
            }
        } else if value.is_object() {
            sync_card(value, state, deleted);
        }
    }
    patches
}

fn sync_card<S: LiveState + ?Sized>(card: &mut Value, state: &S, deleted: &mut DeletedCards) {
    let Some(id) = note_id(card).map(str::to_string) else {
        return;
    };

    if let Some(live) = state.find_card(&id) {
        overlay_editable_fields(card, live);
        return;
    }

    if let Some(snapshot) = deleted.take(&id) {
        log::debug!("restoring note card {id} from deleted snapshot");
        *card = snapshot;
        return;
    }

    log::debug!("note card {id} is neither live nor deleted, keeping recorded value");
}

fn overlay_editable_fields(card: &mut Value, live: &Value) {
    let Value::Object(target) = card else {
        return;
    };
    for field in NOTE_EDITABLE_FIELDS {
        if let Some(live_value) = live.get(field) {
            target.insert(field.to_string(), live_value.clone());
        }
    }
}
