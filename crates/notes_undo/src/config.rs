use serde::{Deserialize, Serialize};

use crate::{HistoryError, Result};

/// Default number of undo steps kept in the history
pub const MAX_UNDO: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undo steps, oldest steps are evicted first
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    MAX_UNDO
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: MAX_UNDO }
    }
}

impl HistoryConfig {
    pub fn with_max_depth(max_depth: usize) -> Result<Self> {
        let config = Self { max_depth };
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from a TOML document
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or a `max_depth` of zero.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: HistoryConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(HistoryError::InvalidMaxDepth(self.max_depth));
        }
        Ok(())
    }
}
