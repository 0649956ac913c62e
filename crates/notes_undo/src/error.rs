//! Error types for notes_undo
//!
//! History operations themselves never fail, they log and degrade instead.
//! Errors only come from parsing input handed over by the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Invalid history configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid patch data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Undo depth must be at least 1, got {0}")]
    InvalidMaxDepth(usize),
}

pub type Result<T> = std::result::Result<T, HistoryError>;
