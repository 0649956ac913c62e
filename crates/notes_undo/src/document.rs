//! Read-only view of the live document state
//!
//! The document model itself lives outside this crate. The history only needs
//! to look up the card lists of documents, which is what [`LiveState`] exposes.
//!
//! State tree layout:
//!
//! ```text
//! { "documents": [ { "cards": [ { "id", "type", "content", "updatedAt", .. } ],
//!                    "dirty": { <dirty key>: true } } ] }
//! ```

use serde_json::Value;

pub const DOCUMENTS_FIELD: &str = "documents";
pub const CARDS_FIELD: &str = "cards";
pub const DIRTY_FIELD: &str = "dirty";

pub const ID_FIELD: &str = "id";
pub const TYPE_FIELD: &str = "type";
pub const NOTE_TYPE: &str = "note";

/// Note fields the rich text editor changes through its own undo history
pub const NOTE_EDITABLE_FIELDS: [&str; 2] = ["content", "updatedAt"];

/// Live document state as seen by the undo history
pub trait LiveState {
    /// Number of documents in the state
    fn document_count(&self) -> usize;

    /// Card list of the document at `doc_index`
    fn cards(&self, doc_index: usize) -> Option<&[Value]>;

    /// Find a card by id in any document
    fn find_card(&self, id: &str) -> Option<&Value> {
        (0..self.document_count())
            .filter_map(|doc_index| self.cards(doc_index))
            .flat_map(|cards| cards.iter())
            .find(|card| card_id(card) == Some(id))
    }
}

impl LiveState for Value {
    fn document_count(&self) -> usize {
        self.get(DOCUMENTS_FIELD).and_then(Value::as_array).map_or(0, Vec::len)
    }

    fn cards(&self, doc_index: usize) -> Option<&[Value]> {
        self.get(DOCUMENTS_FIELD)?
            .get(doc_index)?
            .get(CARDS_FIELD)?
            .as_array()
            .map(Vec::as_slice)
    }
}

/// An empty state, for callers that record patches without a document loaded
impl LiveState for () {
    fn document_count(&self) -> usize {
        0
    }

    fn cards(&self, _doc_index: usize) -> Option<&[Value]> {
        None
    }
}

pub fn card_id(card: &Value) -> Option<&str> {
    card.get(ID_FIELD).and_then(Value::as_str)
}

pub fn is_note(card: &Value) -> bool {
    card.get(TYPE_FIELD).and_then(Value::as_str) == Some(NOTE_TYPE)
}

/// Id of `card` if it is a note card
pub fn note_id(card: &Value) -> Option<&str> {
    if is_note(card) { card_id(card) } else { None }
}
