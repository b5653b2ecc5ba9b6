//! Append-only vector store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use async_lock::Mutex;
use parking_lot::RwLock;
use quarry_core::EmbeddingModel;
use tracing::{debug, info};

use crate::error::{RagError, Result};
use crate::index::{FlatIndex, VectorIndex};
use crate::persistence::{DirectoryPersistence, Persistence, SnapshotRef};
use crate::types::{Chunk, ChunkId, ChunkMetadata, DocumentSource, DocumentSummary, SearchHit};

#[derive(Debug, Default)]
struct StoreState {
    /// Allocated by the first insertion, which fixes the dimension.
    index: Option<FlatIndex>,
    texts: Vec<String>,
    metadata: Vec<ChunkMetadata>,
}

impl StoreState {
    fn snapshot(&self) -> SnapshotRef<'_> {
        SnapshotRef {
            dimension: self.index.as_ref().map_or(0, |index| index.dimension()),
            vectors: self.index.as_ref().map_or(&[][..], |index| index.as_slice()),
            texts: &self.texts,
            metadata: &self.metadata,
        }
    }

    fn rollback(&mut self, len: usize, created_index: bool) {
        if created_index {
            self.index = None;
        } else if let Some(index) = self.index.as_mut() {
            index.truncate(len);
        }
        self.texts.truncate(len);
        self.metadata.truncate(len);
    }
}

/// Persistent, append-only store of embedded chunks.
///
/// Chunk ids are assigned sequentially from zero at insertion time and double as
/// positions in the vector index, the text table and the metadata table. Nothing is
/// ever deleted or rewritten.
///
/// # Concurrency
///
/// [`add`](VectorStore::add) holds an async writer mutex for the whole
/// embed, append and persist sequence, so concurrent inserts serialize and ids never
/// interleave. Searches take a shared lock on the in-memory state and run in parallel
/// with each other. Across processes, the [`DirectoryPersistence`] lock admits a single
/// writer per directory.
pub struct VectorStore<M, P = DirectoryPersistence> {
    embedder: M,
    persistence: P,
    state: RwLock<StoreState>,
    writer: Mutex<()>,
}

impl<M, P: Persistence> std::fmt::Debug for VectorStore<M, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("VectorStore")
            .field("path", &self.persistence.path())
            .field("len", &state.texts.len())
            .field("index", &state.index)
            .finish_non_exhaustive()
    }
}

impl<M: EmbeddingModel> VectorStore<M> {
    /// Opens the store persisted under `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns [`RagError::Locked`] if another process holds the directory, or a
    /// persistence error if existing state cannot be loaded.
    pub fn open(dir: impl Into<PathBuf>, embedder: M) -> Result<Self> {
        Self::with_persistence(embedder, DirectoryPersistence::open(dir)?)
    }
}

impl<M: EmbeddingModel, P: Persistence> VectorStore<M, P> {
    /// Creates a store on top of an arbitrary persistence backend, loading any state it
    /// already holds.
    ///
    /// # Errors
    /// Returns an error if the persisted state cannot be read or is inconsistent.
    pub fn with_persistence(embedder: M, persistence: P) -> Result<Self> {
        let mut state = StoreState::default();
        if let Some(snapshot) = persistence.load()? {
            snapshot.validate()?;
            if !snapshot.is_empty() {
                state.index = Some(FlatIndex::from_raw(snapshot.dimension, snapshot.vectors)?);
            }
            state.texts = snapshot.texts;
            state.metadata = snapshot.metadata;
        }

        info!(
            path = %persistence.path().display(),
            chunks = state.texts.len(),
            dimension = state.index.as_ref().map(|index| index.dimension()),
            "opened vector store"
        );

        Ok(Self {
            embedder,
            persistence,
            state: RwLock::new(state),
            writer: Mutex::new(()),
        })
    }

    /// Embeds and appends a batch of chunks, then persists the full state.
    ///
    /// Makes exactly one [`EmbeddingModel::embed_batch`] call. Returns the ids assigned
    /// to the chunks, in input order. If persisting fails, the in-memory append is
    /// undone before the error is returned.
    ///
    /// # Errors
    /// - [`RagError::EmptyBatch`] if `chunks` is empty.
    /// - [`RagError::Embedding`] if the provider fails or returns the wrong number of
    ///   vectors.
    /// - [`RagError::DimensionMismatch`] if a vector's width differs from the store's.
    /// - [`RagError::Index`] if the first batch carries zero-width vectors.
    /// - Any persistence error.
    pub async fn add(&self, chunks: Vec<(String, DocumentSource)>) -> Result<Vec<ChunkId>> {
        if chunks.is_empty() {
            return Err(RagError::EmptyBatch);
        }

        let _writer = self.writer.lock().await;

        let (texts, sources): (Vec<String>, Vec<DocumentSource>) = chunks.into_iter().unzip();
        let vectors = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(RagError::Embedding)?;
        if vectors.len() != texts.len() {
            return Err(RagError::Embedding(anyhow!(
                "provider returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }

        let mut state = self.state.write();
        let start = state.texts.len();

        let created_index = state.index.is_none();
        if created_index {
            state.index = Some(FlatIndex::new(vectors[0].len())?);
        }
        let appended = state
            .index
            .as_mut()
            .map_or(Ok(()), |index| index.add(&vectors));
        if let Err(err) = appended {
            state.rollback(start, created_index);
            return Err(err);
        }

        let ids: Vec<ChunkId> = (start as u64..(start + texts.len()) as u64).collect();
        state.texts.extend(texts);
        state.metadata.extend(
            ids.iter()
                .zip(sources)
                .map(|(&id, source)| ChunkMetadata::from_source(id, source)),
        );

        if let Err(err) = self.persistence.save(state.snapshot()) {
            state.rollback(start, created_index);
            return Err(err);
        }

        debug!(first_id = start, count = ids.len(), "appended chunks");
        Ok(ids)
    }

    /// Returns up to `k` chunks closest to `query`, nearest first.
    ///
    /// Returns an empty list without calling the provider when `k` is zero or the store
    /// is empty.
    ///
    /// # Errors
    /// Returns [`RagError::Embedding`] if the query cannot be embedded, or
    /// [`RagError::DimensionMismatch`] if its width differs from the store's.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(RagError::Embedding)?;
        self.search_vector(&vector, k)
    }

    /// Searches with a precomputed query vector.
    ///
    /// # Errors
    /// Returns [`RagError::DimensionMismatch`] if the vector's width differs from the
    /// store's.
    pub fn search_vector(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let state = self.state.read();
        let Some(index) = state.index.as_ref() else {
            return Ok(Vec::new());
        };

        let hits = index
            .search(vector, k)?
            .into_iter()
            .filter_map(|neighbor| {
                let text = state.texts.get(neighbor.position)?;
                let metadata = state.metadata.get(neighbor.position)?;
                Some(SearchHit {
                    id: neighbor.position as ChunkId,
                    score: neighbor.distance,
                    text: text.clone(),
                    metadata: metadata.clone(),
                })
            })
            .collect();
        Ok(hits)
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.state.read().texts.len()
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension, fixed by the first insertion.
    pub fn dimension(&self) -> Option<usize> {
        self.state.read().index.as_ref().map(|index| index.dimension())
    }

    /// Looks up a chunk by id.
    pub fn chunk(&self, id: ChunkId) -> Option<Chunk> {
        let state = self.state.read();
        let position = usize::try_from(id).ok()?;
        Some(Chunk {
            id,
            text: state.texts.get(position)?.clone(),
            metadata: state.metadata.get(position)?.clone(),
        })
    }

    /// Lists ingested documents in order of their first chunk.
    pub fn documents(&self) -> Vec<DocumentSummary> {
        let state = self.state.read();
        let mut summaries: Vec<DocumentSummary> = Vec::new();
        let mut by_doc: HashMap<&str, usize> = HashMap::new();

        for row in &state.metadata {
            if let Some(&slot) = by_doc.get(row.doc_id.as_str()) {
                summaries[slot].chunk_count += 1;
                continue;
            }
            by_doc.insert(&row.doc_id, summaries.len());
            summaries.push(DocumentSummary {
                doc_id: row.doc_id.clone(),
                source: row.source.clone(),
                source_name: row.source_name.clone(),
                first_chunk_id: row.index,
                chunk_count: 1,
            });
        }
        summaries
    }

    /// Directory or location the store persists to.
    pub fn persist_dir(&self) -> &Path {
        self.persistence.path()
    }
}
