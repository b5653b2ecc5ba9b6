//! High-level ingestion and question answering.

use std::path::Path;

use quarry_core::{AnswerSynthesizer, EmbeddingModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::evaluation::{EvaluationReport, evaluate};
use crate::extract::extract_text;
use crate::store::VectorStore;
use crate::types::{ChunkId, ChunkMetadata, DocumentSource, DocumentSummary, SearchHit};

/// Outcome of ingesting one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Always `"ok"`; failures are reported as errors instead.
    pub status: String,
    /// Identifier generated for this ingestion.
    pub doc_id: String,
    /// Number of chunks the document produced.
    pub num_chunks: usize,
    /// Ids assigned to the chunks, in document order.
    pub ids: Vec<ChunkId>,
}

/// Answer to a query together with its evidence and quality scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Synthesized answer.
    pub answer: String,
    /// Metadata of each retrieved chunk, in rank order.
    pub sources: Vec<ChunkMetadata>,
    /// The retrieved chunks themselves.
    pub hits: Vec<SearchHit>,
    /// Heuristic scores of the answer against the retrieved chunks.
    pub evaluation: EvaluationReport,
}

/// Knowledge base wiring extraction, chunking, retrieval, synthesis and evaluation.
///
/// # Example
///
/// ```rust,ignore
/// use quarry_rag::{KnowledgeBase, RagConfig};
///
/// let config = RagConfig::builder().persist_dir("./persist").build()?;
/// let kb = KnowledgeBase::open(config, embedder, synthesizer)?;
///
/// let report = kb.ingest(&std::fs::read("handbook.pdf")?, "handbook.pdf", None).await?;
/// let response = kb.query("How many vacation days do I get?", None).await?;
/// println!("{}", response.answer);
/// ```
pub struct KnowledgeBase<M, S> {
    store: VectorStore<M>,
    synthesizer: S,
    chunker: FixedSizeChunker,
    config: RagConfig,
}

impl<M, S> std::fmt::Debug for KnowledgeBase<M, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("store", &self.store)
            .field("chunker", &self.chunker)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<M, S> KnowledgeBase<M, S>
where
    M: EmbeddingModel,
    S: AnswerSynthesizer,
{
    /// Validates `config` and opens the store under its persistence directory.
    ///
    /// # Errors
    /// Returns [`RagError::InvalidConfig`] for an invalid configuration, or any error
    /// from [`VectorStore::open`].
    pub fn open(config: RagConfig, embedder: M, synthesizer: S) -> Result<Self> {
        config.validate()?;
        let chunker = config.chunker()?;
        let store = VectorStore::open(config.persist_dir.clone(), embedder)?;
        Ok(Self {
            store,
            synthesizer,
            chunker,
            config,
        })
    }

    /// Extracts, chunks, embeds and stores one uploaded file.
    ///
    /// An empty `filename` is replaced by a generated `upload-<uuid>` name, and an empty
    /// `source_name` is treated as absent. A document that produces no chunks is
    /// acknowledged without calling the embedding provider.
    ///
    /// # Errors
    /// Returns [`RagError::Extraction`] for an unreadable PDF, or any error from
    /// [`VectorStore::add`].
    pub async fn ingest(
        &self,
        bytes: &[u8],
        filename: &str,
        source_name: Option<String>,
    ) -> Result<IngestReport> {
        let filename = if filename.is_empty() {
            format!("upload-{}", Uuid::new_v4().simple())
        } else {
            filename.to_owned()
        };
        let source_name = source_name.filter(|name| !name.is_empty());
        let doc_id = Uuid::new_v4().to_string();

        let text = extract_text(bytes, &filename)?;
        let chunks = self.chunker.chunk(&text);
        debug!(%filename, %doc_id, chunks = chunks.len(), "chunked upload");

        let ids = if chunks.is_empty() {
            Vec::new()
        } else {
            let source = DocumentSource::new(filename.as_str(), doc_id.as_str(), source_name);
            let batch = chunks
                .into_iter()
                .map(|chunk| (chunk, source.clone()))
                .collect();
            self.store.add(batch).await?
        };

        info!(%filename, %doc_id, num_chunks = ids.len(), "ingested document");
        Ok(IngestReport {
            status: "ok".to_owned(),
            doc_id,
            num_chunks: ids.len(),
            ids,
        })
    }

    /// Retrieves the chunks nearest to `query`.
    ///
    /// # Errors
    /// Returns [`RagError::InvalidArgument`] if `top_k` is outside `1..=max_top_k`, or
    /// any error from [`VectorStore::search`].
    pub async fn retrieve(&self, query: &str, top_k: Option<usize>) -> Result<Vec<SearchHit>> {
        let top_k = self.resolve_top_k(top_k)?;
        self.store.search(query, top_k).await
    }

    /// Answers `query` from the stored documents and scores the answer.
    ///
    /// # Errors
    /// Returns [`RagError::InvalidArgument`] for an out-of-range `top_k`,
    /// [`RagError::Synthesis`] if the synthesizer fails, or any retrieval error.
    pub async fn query(&self, query: &str, top_k: Option<usize>) -> Result<QueryResponse> {
        let hits = self.retrieve(query, top_k).await?;
        let contexts: Vec<String> = hits.iter().map(|hit| hit.text.clone()).collect();

        let answer = self
            .synthesizer
            .synthesize(query, &contexts)
            .await
            .map_err(RagError::Synthesis)?;
        let evaluation = evaluate(&answer, query, &contexts);

        info!(
            hits = hits.len(),
            retrieval_accuracy = evaluation.retrieval_accuracy,
            sources_cited = evaluation.sources_cited,
            "answered query"
        );
        Ok(QueryResponse {
            answer,
            sources: hits.iter().map(|hit| hit.metadata.clone()).collect(),
            hits,
            evaluation,
        })
    }

    /// Lists ingested documents in order of ingestion.
    pub fn documents(&self) -> Vec<DocumentSummary> {
        self.store.documents()
    }

    /// The underlying vector store.
    pub const fn store(&self) -> &VectorStore<M> {
        &self.store
    }

    /// The active configuration.
    pub const fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Directory the store persists to.
    pub fn persist_dir(&self) -> &Path {
        self.store.persist_dir()
    }

    fn resolve_top_k(&self, top_k: Option<usize>) -> Result<usize> {
        let top_k = top_k.unwrap_or(self.config.default_top_k);
        if top_k == 0 || top_k > self.config.max_top_k {
            return Err(RagError::InvalidArgument(format!(
                "top_k must be within 1..={}, got {top_k}",
                self.config.max_top_k
            )));
        }
        Ok(top_k)
    }
}
