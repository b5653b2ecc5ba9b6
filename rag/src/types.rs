//! Core types for the retrieval crate.

use serde::{Deserialize, Serialize};

/// Identifier assigned to a chunk at insertion time.
///
/// Ids are contiguous from zero and never reused.
pub type ChunkId = u64;

/// Where a batch of chunks came from. Shared by every chunk of one ingested document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    /// File name of the upload.
    pub source: String,
    /// Identifier generated for the ingestion request.
    pub doc_id: String,
    /// Optional free-text label supplied by the uploader.
    pub source_name: Option<String>,
}

impl DocumentSource {
    /// Creates a source description.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        doc_id: impl Into<String>,
        source_name: Option<String>,
    ) -> Self {
        Self {
            source: source.into(),
            doc_id: doc_id.into(),
            source_name,
        }
    }
}

/// Metadata stored alongside each chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// The chunk's own id.
    pub index: ChunkId,
    /// File name of the upload.
    pub source: String,
    /// Identifier of the ingestion request that produced the chunk.
    pub doc_id: String,
    /// Optional free-text label supplied by the uploader.
    pub source_name: Option<String>,
}

impl ChunkMetadata {
    pub(crate) fn from_source(index: ChunkId, source: DocumentSource) -> Self {
        Self {
            index,
            source: source.source,
            doc_id: source.doc_id,
            source_name: source.source_name,
        }
    }
}

/// A stored chunk of text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential identifier.
    pub id: ChunkId,
    /// Chunk text.
    pub text: String,
    /// Provenance metadata.
    pub metadata: ChunkMetadata,
}

/// A ranked retrieval hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Id of the matching chunk.
    pub id: ChunkId,
    /// Squared Euclidean distance to the query embedding. Smaller is closer and the
    /// value is unbounded above.
    pub score: f32,
    /// Chunk text.
    pub text: String,
    /// Provenance metadata.
    pub metadata: ChunkMetadata,
}

/// A document recovered by scanning chunk metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Identifier of the ingestion request.
    pub doc_id: String,
    /// File name of the upload.
    pub source: String,
    /// Optional free-text label.
    pub source_name: Option<String>,
    /// Id of the document's first chunk.
    pub first_chunk_id: ChunkId,
    /// Number of chunks the document produced.
    pub chunk_count: usize,
}
