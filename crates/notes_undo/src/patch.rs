//! Patch algebra for document changes
//!
//! A [`Patch`] describes one atomic change to the document tree. Every forward
//! patch recorded in the history has an inverse patch that reverses it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{CARDS_FIELD, DIRTY_FIELD, DOCUMENTS_FIELD, ID_FIELD};
use crate::Result;

/// One step of a [`PatchPath`]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position inside a list
    Index(usize),
    /// Field name inside an object
    Key(String),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(index) => Some(*index),
            PathSegment::Key(_) => None,
        }
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

/// Location of a change inside the document tree
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchPath(Vec<PathSegment>);

impl PatchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// `documents/<doc_index>`
    pub fn document(doc_index: usize) -> Self {
        Self::new().key(DOCUMENTS_FIELD).index(doc_index)
    }

    /// `documents/<doc_index>/cards`
    pub fn cards(doc_index: usize) -> Self {
        Self::document(doc_index).key(CARDS_FIELD)
    }

    /// `documents/<doc_index>/cards/<card_index>`
    pub fn card(doc_index: usize, card_index: usize) -> Self {
        Self::cards(doc_index).index(card_index)
    }

    /// `documents/<doc_index>/dirty/<dirty_key>`
    pub fn dirty_flag(doc_index: usize, dirty_key: &str) -> Self {
        Self::document(doc_index).key(DIRTY_FIELD).key(dirty_key)
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }

    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the document this path points into, if it starts with `documents/<n>`
    pub fn document_index(&self) -> Option<usize> {
        match self.0.as_slice() {
            [PathSegment::Key(root), PathSegment::Index(doc_index), ..] if root == DOCUMENTS_FIELD => Some(*doc_index),
            _ => None,
        }
    }

    /// Document index when the path is exactly a document's card list
    pub fn targets_cards(&self) -> Option<usize> {
        let doc_index = self.document_index()?;
        match &self.0[2..] {
            [PathSegment::Key(field)] if field == CARDS_FIELD => Some(doc_index),
            _ => None,
        }
    }

    /// `(document, card)` indices when the path is exactly one card of a card list
    pub fn targets_card_element(&self) -> Option<(usize, usize)> {
        let doc_index = self.document_index()?;
        match &self.0[2..] {
            [PathSegment::Key(field), PathSegment::Index(card_index)] if field == CARDS_FIELD => Some((doc_index, *card_index)),
            _ => None,
        }
    }

    /// Whether the path points at (or into) a document's dirty flags
    pub fn targets_dirty_flags(&self) -> bool {
        self.document_index().is_some() && matches!(self.0.get(2), Some(PathSegment::Key(field)) if field == DIRTY_FIELD)
    }
}

impl From<Vec<PathSegment>> for PatchPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            match segment {
                PathSegment::Index(index) => write!(f, "/{index}")?,
                PathSegment::Key(key) => write!(f, "/{key}")?,
            }
        }
        Ok(())
    }
}

/// Atomic change to the document tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Patch {
    Add { path: PatchPath, value: Value },
    Replace { path: PatchPath, value: Value },
    Remove { path: PatchPath },
}

impl Patch {
    pub fn add(path: PatchPath, value: Value) -> Self {
        Patch::Add { path, value }
    }

    pub fn replace(path: PatchPath, value: Value) -> Self {
        Patch::Replace { path, value }
    }

    pub fn remove(path: PatchPath) -> Self {
        Patch::Remove { path }
    }

    pub fn path(&self) -> &PatchPath {
        match self {
            Patch::Add { path, .. } | Patch::Replace { path, .. } | Patch::Remove { path } => path,
        }
    }

    /// Operand of the patch, `None` for removals
    pub fn value(&self) -> Option<&Value> {
        match self {
            Patch::Add { value, .. } | Patch::Replace { value, .. } => Some(value),
            Patch::Remove { .. } => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut Value> {
        match self {
            Patch::Add { value, .. } | Patch::Replace { value, .. } => Some(value),
            Patch::Remove { .. } => None,
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            Patch::Add { .. } => "add",
            Patch::Replace { .. } => "replace",
            Patch::Remove { .. } => "remove",
        }
    }

    /// Whether this patch mentions the entity `id` in its path or anywhere in its value
    pub fn references_id(&self, id: &str) -> bool {
        if self.path().segments().iter().any(|segment| segment.as_key() == Some(id)) {
            return true;
        }
        self.value().is_some_and(|value| value_references_id(value, id))
    }
}

fn value_references_id(value: &Value, id: &str) -> bool {
    match value {
        Value::Object(map) => {
            if map.get(ID_FIELD).and_then(Value::as_str) == Some(id) {
                return true;
            }
            map.values().any(|child| value_references_id(child, id))
        }
        Value::Array(items) => items.iter().any(|child| value_references_id(child, id)),
        _ => false,
    }
}

/// Forward and inverse patches produced by one mutation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSet {
    pub patches: Vec<Patch>,
    pub inverse_patches: Vec<Patch>,
    #[serde(default)]
    pub dirty_keys: Vec<String>,
}

impl PatchSet {
    pub fn new(patches: Vec<Patch>, inverse_patches: Vec<Patch>) -> Self {
        Self {
            patches,
            inverse_patches,
            dirty_keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dirty_keys<I, S>(mut self, dirty_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirty_keys = dirty_keys.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a patch set from its JSON form
    ///
    /// # Errors
    ///
    /// Returns [`crate::HistoryError::Json`] if the input is not a valid patch set.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty() && self.inverse_patches.is_empty()
    }
}
