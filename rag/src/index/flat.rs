//! Exhaustive squared-L2 index.

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::error::{RagError, Result};

use super::{Neighbor, VectorIndex};

/// Brute-force index comparing a query against every stored vector.
///
/// Vectors live row-major in one contiguous buffer, so row `i` occupies
/// `data[i * dimension..(i + 1) * dimension]`. Distances are squared Euclidean over the
/// raw embeddings with no normalization; ties are broken by insertion position.
#[derive(Clone)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl std::fmt::Debug for FlatIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatIndex")
            .field("dimension", &self.dimension)
            .field("len", &self.len())
            .finish()
    }
}

impl FlatIndex {
    /// Creates an empty index for vectors of `dimension` components.
    ///
    /// # Errors
    /// Returns [`RagError::Index`] for a zero dimension.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::Index("embedding dimension must be positive".into()));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// Rebuilds an index from a row-major buffer.
    ///
    /// # Errors
    /// Returns [`RagError::Corrupt`] if the buffer length is not a multiple of
    /// `dimension`, or [`RagError::Index`] for a zero dimension.
    pub fn from_raw(dimension: usize, data: Vec<f32>) -> Result<Self> {
        let mut index = Self::new(dimension)?;
        if data.len() % dimension != 0 {
            return Err(RagError::Corrupt(format!(
                "vector buffer of {} floats is not a multiple of dimension {dimension}",
                data.len()
            )));
        }
        index.data = data;
        Ok(index)
    }

    /// The row-major vector buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn check_width(&self, actual: usize) -> Result<()> {
        if actual == self.dimension {
            Ok(())
        } else {
            Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual,
            })
        }
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(lhs, rhs)| {
            let diff = lhs - rhs;
            diff * diff
        })
        .sum()
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        for vector in vectors {
            self.check_width(vector.len())?;
        }
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_width(query.len())?;
        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<Neighbor> = self
            .data
            .par_chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2(row, query),
            })
            .collect();

        let key = |n: &Neighbor| (OrderedFloat(n.distance), n.position);
        if k < scored.len() {
            scored.select_nth_unstable_by_key(k - 1, key);
            scored.truncate(k);
        }
        scored.sort_unstable_by_key(key);
        Ok(scored)
    }

    fn truncate(&mut self, len: usize) {
        self.data.truncate(len * self.dimension);
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }
}
