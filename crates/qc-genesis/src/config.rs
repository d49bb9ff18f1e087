//! Decode pipeline configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use qc_genesis::DecodeConfig;
//!
//! let config = DecodeConfig::default()
//!     .with_text_chunk_size(1024)
//!     .with_multistream(false);
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of base64 characters decoded per chunk.
pub const DEFAULT_TEXT_CHUNK_SIZE: usize = 4096;

/// Largest accepted text chunk (1 MiB of base64 characters).
pub const MAX_TEXT_CHUNK_SIZE: usize = 1024 * 1024;

/// Maximum decompressed size to prevent decompression bombs (100MB).
pub const MAX_DECOMPRESSED_SIZE: u64 = 100 * 1024 * 1024;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Text chunk size {size} must be a multiple of 4 between 4 and {max}")]
    InvalidChunkSize { size: usize, max: usize },

    #[error("Decompressed size limit cannot be 0")]
    ZeroSizeLimit,
}

/// Decode pipeline configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Base64 characters pulled from the source per chunk
    pub text_chunk_size: usize,
    /// Upper bound on plaintext bytes produced across all gzip members
    pub max_decompressed_size: u64,
    /// Decode concatenated gzip members as one stream
    pub multistream: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            text_chunk_size: DEFAULT_TEXT_CHUNK_SIZE,
            max_decompressed_size: MAX_DECOMPRESSED_SIZE,
            multistream: true,
        }
    }
}

impl DecodeConfig {
    /// Create a new configuration with validation
    pub fn new(
        text_chunk_size: usize,
        max_decompressed_size: u64,
        multistream: bool,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            text_chunk_size,
            max_decompressed_size,
            multistream,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.text_chunk_size;
        if size < 4 || size > MAX_TEXT_CHUNK_SIZE || size % 4 != 0 {
            return Err(ConfigError::InvalidChunkSize {
                size,
                max: MAX_TEXT_CHUNK_SIZE,
            });
        }

        if self.max_decompressed_size == 0 {
            return Err(ConfigError::ZeroSizeLimit);
        }

        Ok(())
    }

    /// Builder-style method to set the text chunk size
    pub fn with_text_chunk_size(mut self, size: usize) -> Self {
        self.text_chunk_size = size;
        self
    }

    /// Builder-style method to set the decompressed size limit
    pub fn with_max_decompressed_size(mut self, limit: u64) -> Self {
        self.max_decompressed_size = limit;
        self
    }

    /// Builder-style method to toggle multistream decoding
    pub fn with_multistream(mut self, multistream: bool) -> Self {
        self.multistream = multistream;
        self
    }
}
