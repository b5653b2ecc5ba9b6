//! Text chunking for retrieval.
//!
//! This module provides the [`Chunker`] trait and the [`FixedSizeChunker`] used by the
//! ingestion pipeline.

mod fixed;

pub use fixed::FixedSizeChunker;

/// Trait for text chunking strategies.
///
/// A chunker turns one document's text into the ordered sequence of passages that are
/// embedded and indexed. Output must be deterministic for a given input and
/// configuration so that re-ingesting a document reproduces the same boundaries.
pub trait Chunker: Send + Sync {
    /// Splits text into chunks, in document order.
    fn chunk(&self, text: &str) -> Vec<String>;

    /// Returns the name of this chunking strategy.
    fn name(&self) -> &'static str;
}
