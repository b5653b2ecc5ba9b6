//! Persistence backends for the vector store.
//!
//! This module provides the [`Persistence`] trait and the [`DirectoryPersistence`]
//! implementation, which stores the index, the metadata table and the text table as one
//! snapshot directory.

mod directory;

pub use directory::DirectoryPersistence;

use crate::error::{RagError, Result};
use crate::types::ChunkMetadata;
use std::path::Path;

/// Current version of the on-disk index header.
pub const FORMAT_VERSION: u32 = 1;

/// Borrowed view of the full store state, handed to [`Persistence::save`].
#[derive(Debug, Clone, Copy)]
pub struct SnapshotRef<'a> {
    /// Embedding dimension, or zero if nothing has been inserted.
    pub dimension: usize,
    /// Row-major vectors, `texts.len() * dimension` floats.
    pub vectors: &'a [f32],
    /// Chunk texts in id order.
    pub texts: &'a [String],
    /// Chunk metadata in id order.
    pub metadata: &'a [ChunkMetadata],
}

/// Owned store state returned by [`Persistence::load`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Embedding dimension, or zero if nothing has been inserted.
    pub dimension: usize,
    /// Row-major vectors.
    pub vectors: Vec<f32>,
    /// Chunk texts in id order.
    pub texts: Vec<String>,
    /// Chunk metadata in id order.
    pub metadata: Vec<ChunkMetadata>,
}

impl Snapshot {
    /// Number of chunks in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Returns `true` if the snapshot holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Borrows the snapshot.
    #[must_use]
    pub fn as_snapshot_ref(&self) -> SnapshotRef<'_> {
        SnapshotRef {
            dimension: self.dimension,
            vectors: &self.vectors,
            texts: &self.texts,
            metadata: &self.metadata,
        }
    }

    /// Checks that the three tables agree with each other.
    ///
    /// # Errors
    /// Returns [`RagError::Corrupt`] if the counts differ, the vector buffer has the
    /// wrong length, or a metadata row does not carry its own id.
    pub fn validate(&self) -> Result<()> {
        let count = self.texts.len();
        if self.metadata.len() != count {
            return Err(RagError::Corrupt(format!(
                "{count} texts but {} metadata rows",
                self.metadata.len()
            )));
        }
        if count > 0 && self.dimension == 0 {
            return Err(RagError::Corrupt(format!(
                "{count} chunks stored with zero dimension"
            )));
        }
        if self.vectors.len() != count * self.dimension {
            return Err(RagError::Corrupt(format!(
                "expected {} floats for {count} vectors of dimension {}, found {}",
                count * self.dimension,
                self.dimension,
                self.vectors.len()
            )));
        }
        for (position, row) in self.metadata.iter().enumerate() {
            if row.index != position as u64 {
                return Err(RagError::Corrupt(format!(
                    "metadata row {position} carries id {}",
                    row.index
                )));
            }
        }
        Ok(())
    }
}

/// Trait for persistence backends.
///
/// A backend saves and restores the whole store state as a unit. A crash during
/// [`save`](Persistence::save) must leave either the old or the new state loadable,
/// never a mix of the two.
pub trait Persistence: Send + Sync {
    /// Replaces the persisted state with `snapshot`.
    ///
    /// An `Err` means the previous state is still the one that loads; once the new
    /// state is committed, `save` returns `Ok`.
    fn save(&self, snapshot: SnapshotRef<'_>) -> Result<()>;

    /// Loads the persisted state.
    ///
    /// Returns `None` if nothing has been persisted yet.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Returns the storage path.
    fn path(&self) -> &Path;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(index: u64) -> ChunkMetadata {
        ChunkMetadata {
            index,
            source: "a.txt".into(),
            doc_id: "d".into(),
            source_name: None,
        }
    }

    fn snapshot(count: usize) -> Snapshot {
        Snapshot {
            dimension: 2,
            vectors: vec![0.5; count * 2],
            texts: (0..count).map(|i| format!("t{i}")).collect(),
            metadata: (0..count as u64).map(meta).collect(),
        }
    }

    #[test]
    fn consistent_snapshot_validates() {
        snapshot(3).validate().unwrap();
        Snapshot::default().validate().unwrap();
    }

    #[test]
    fn count_disagreements_are_corrupt() {
        let mut s = snapshot(3);
        s.texts.pop();
        assert!(matches!(s.validate(), Err(RagError::Corrupt(_))));

        let mut s = snapshot(3);
        s.vectors.push(1.0);
        assert!(matches!(s.validate(), Err(RagError::Corrupt(_))));
    }

    #[test]
    fn misnumbered_metadata_is_corrupt() {
        let mut s = snapshot(3);
        s.metadata[1].index = 7;
        assert!(matches!(s.validate(), Err(RagError::Corrupt(_))));
    }
}
