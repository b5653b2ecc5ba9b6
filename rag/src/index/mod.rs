//! Vector index implementations.
//!
//! This module provides the [`VectorIndex`] trait and the [`FlatIndex`] implementation,
//! an exhaustive squared-Euclidean search over a contiguous vector buffer.

mod flat;

pub use flat::FlatIndex;

use crate::error::Result;

/// A neighbor returned by [`VectorIndex::search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion position of the stored vector.
    pub position: usize,
    /// Distance to the query; smaller is closer.
    pub distance: f32,
}

/// Trait for vector index implementations.
///
/// An index stores vectors of one fixed dimension by insertion position and answers
/// nearest-neighbor queries. It never removes or rewrites a stored vector.
pub trait VectorIndex: Send + Sync {
    /// Appends vectors. Either all of them are stored or none are.
    ///
    /// # Errors
    /// Returns [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch) if any
    /// vector's width differs from [`dimension`](VectorIndex::dimension).
    fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()>;

    /// Returns up to `k` neighbors of `query`, closest first.
    ///
    /// `k` is clamped to [`len`](VectorIndex::len); no placeholder neighbors are ever
    /// produced.
    ///
    /// # Errors
    /// Returns [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch) if the
    /// query width differs from the index dimension.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Drops every vector stored at or after `len`.
    fn truncate(&mut self, len: usize);

    /// Returns the embedding dimension.
    fn dimension(&self) -> usize;

    /// Returns the number of stored vectors.
    fn len(&self) -> usize;

    /// Returns `true` if the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
