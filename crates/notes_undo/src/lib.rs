//! Undo/redo history for the notes editor
//!
//! Changes to a document are recorded as forward/inverse [`Patch`] pairs. The
//! [`UndoHistory`] groups them into undo steps and hands the patch lists back
//! on undo/redo; applying them to the document is up to the caller.

mod error;
pub use error::*;

mod config;
pub use config::{HistoryConfig, MAX_UNDO};

pub mod document;
pub use document::LiveState;

pub mod patch;
pub use patch::{Patch, PatchPath, PatchSet, PathSegment};

pub mod deleted_cards;
pub use deleted_cards::DeletedCards;

pub mod sync;

pub mod undo_stack;
pub use undo_stack::{HistorySnapshot, UndoEntry, UndoHistory};

mod shared;
pub use shared::{CaptureGuard, SharedUndoHistory};
