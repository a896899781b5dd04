use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Default window length in characters.
pub const DEFAULT_TARGET_SIZE: usize = 1100;

/// Default number of characters shared by consecutive windows.
pub const DEFAULT_OVERLAP: usize = 200;

/// Configuration for window chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Window length in characters (Unicode scalar values)
    pub target_size: usize,

    /// Characters repeated at the start of the next window
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkerConfig {
    #[must_use]
    pub const fn new(target_size: usize, overlap: usize) -> Self {
        Self {
            target_size,
            overlap,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(ChunkerError::invalid_config("target_size must be > 0"));
        }

        if self.overlap >= self.target_size {
            return Err(ChunkerError::invalid_config(format!(
                "overlap ({}) must be smaller than target_size ({})",
                self.overlap, self.target_size
            )));
        }

        Ok(())
    }

    /// Distance between the starts of two consecutive windows.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.target_size - self.overlap
    }
}
