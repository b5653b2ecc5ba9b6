//! Append-only retrieval store and question-answering pipeline.
//!
//! This crate turns uploaded documents into a searchable knowledge base and answers
//! questions from it:
//!
//! - **Extraction**: PDF or plain-text bytes to a single text stream ([`extract`])
//! - **Chunking**: whitespace-normalized, overlapping fixed-size windows ([`chunking`])
//! - **Vector store**: exhaustive squared-L2 search with atomic on-disk snapshots
//!   ([`VectorStore`])
//! - **Evaluation**: lexical heuristics scoring a synthesized answer ([`evaluation`])
//!
//! [`KnowledgeBase`] wires these together behind `ingest` and `query`.
//!
//! # Append-only contract
//!
//! Chunks are never deleted or updated. Ids are assigned sequentially from zero at
//! insertion time and remain stable across restarts, so a chunk id handed out once
//! always refers to the same text and metadata.
//!
//! # Single writer
//!
//! Within a process, inserts serialize on an async mutex inside the store while searches
//! share a read lock. Across processes, opening a persistence directory takes an
//! exclusive advisory lock; a second process opening the same directory gets
//! [`RagError::Locked`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use quarry_rag::{KnowledgeBase, RagConfig};
//!
//! let config = RagConfig::builder()
//!     .persist_dir("./persist")
//!     .chunk_size(2000)
//!     .chunk_overlap(200)
//!     .build()?;
//! let kb = KnowledgeBase::open(config, embedder, synthesizer)?;
//!
//! kb.ingest(b"Rust is a systems programming language.", "rust.txt", None).await?;
//! let response = kb.query("What is Rust?", Some(4)).await?;
//! println!("{} ({:?})", response.answer, response.evaluation);
//! ```

pub mod chunking;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod extract;
pub mod index;
pub mod knowledge_base;
pub mod persistence;
pub mod store;
pub mod types;

pub use quarry_core::prompt;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use error::{RagError, Result};
pub use evaluation::{EvaluationReport, evaluate, jaccard_similarity};
pub use extract::extract_text;
pub use index::{FlatIndex, Neighbor, VectorIndex};
pub use knowledge_base::{IngestReport, KnowledgeBase, QueryResponse};
pub use persistence::{DirectoryPersistence, Persistence, Snapshot, SnapshotRef};
pub use store::VectorStore;
pub use types::{Chunk, ChunkId, ChunkMetadata, DocumentSource, DocumentSummary, SearchHit};
