//! Configuration for the knowledge base.

use std::path::PathBuf;

use crate::chunking::FixedSizeChunker;
use crate::error::{RagError, Result};

/// Default chunk window, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;
/// Default back-step between consecutive windows, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Default number of hits returned by a query.
pub const DEFAULT_TOP_K: usize = 4;
/// Largest number of hits a caller may request.
pub const DEFAULT_MAX_TOP_K: usize = 10;

/// Configuration for a knowledge base instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagConfig {
    /// Directory holding the persisted index, metadata and text tables.
    pub persist_dir: PathBuf,
    /// Chunk window size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Number of hits returned when the caller does not ask for a specific count.
    pub default_top_k: usize,
    /// Upper bound on caller-requested hit counts.
    pub max_top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            persist_dir: PathBuf::from("./persist"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            default_top_k: DEFAULT_TOP_K,
            max_top_k: DEFAULT_MAX_TOP_K,
        }
    }
}

impl RagConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for custom configuration.
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::new()
    }

    /// Checks the startup invariants.
    ///
    /// # Errors
    /// Returns [`RagError::InvalidConfig`] when the chunk overlap would stall the chunker
    /// or the top-k bounds are inconsistent.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.max_top_k == 0 {
            return Err(RagError::InvalidConfig("max_top_k must be positive".into()));
        }
        if self.default_top_k == 0 || self.default_top_k > self.max_top_k {
            return Err(RagError::InvalidConfig(format!(
                "default_top_k ({}) must be within 1..={}",
                self.default_top_k, self.max_top_k
            )));
        }
        Ok(())
    }

    /// Builds the chunker described by this configuration.
    ///
    /// # Errors
    /// Fails under the same conditions as [`FixedSizeChunker::new`].
    pub fn chunker(&self) -> Result<FixedSizeChunker> {
        FixedSizeChunker::new(self.chunk_size, self.chunk_overlap)
    }
}

/// Builder for knowledge base configuration.
#[derive(Debug, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Creates a new configuration builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RagConfig::default(),
        }
    }

    /// Sets the persistence directory.
    #[must_use]
    pub fn persist_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.persist_dir = path.into();
        self
    }

    /// Sets the chunk window size in characters.
    #[must_use]
    pub const fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Sets the overlap between consecutive chunks in characters.
    #[must_use]
    pub const fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Sets the default number of hits per query.
    #[must_use]
    pub const fn default_top_k(mut self, k: usize) -> Self {
        self.config.default_top_k = k;
        self
    }

    /// Sets the largest number of hits a caller may request.
    #[must_use]
    pub const fn max_top_k(mut self, k: usize) -> Self {
        self.config.max_top_k = k;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    /// Returns [`RagError::InvalidConfig`] if [`RagConfig::validate`] fails.
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RagConfig::default();
        assert_eq!(config.persist_dir, PathBuf::from("./persist"));
        assert_eq!(config.chunk_size, 2000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.default_top_k, 4);
        assert_eq!(config.max_top_k, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_config() {
        let config = RagConfig::builder()
            .persist_dir("/custom/kb")
            .chunk_size(500)
            .chunk_overlap(50)
            .default_top_k(2)
            .max_top_k(5)
            .build()
            .unwrap();

        assert_eq!(config.persist_dir, PathBuf::from("/custom/kb"));
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.default_top_k, 2);
        assert_eq!(config.max_top_k, 5);
    }

    #[test]
    fn overlap_equal_to_size_is_rejected() {
        let result = RagConfig::builder().chunk_size(100).chunk_overlap(100).build();
        assert!(matches!(result, Err(RagError::InvalidConfig(_))));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let result = RagConfig::builder().chunk_size(0).chunk_overlap(0).build();
        assert!(matches!(result, Err(RagError::InvalidConfig(_))));
    }

    #[test]
    fn default_top_k_must_fit_bound() {
        let result = RagConfig::builder().default_top_k(11).build();
        assert!(matches!(result, Err(RagError::InvalidConfig(_))));

        let result = RagConfig::builder().default_top_k(0).build();
        assert!(matches!(result, Err(RagError::InvalidConfig(_))));
    }
}
