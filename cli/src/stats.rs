//! Read-only summary of a persisted store, printed by `quarry stats`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quarry_rag::{DocumentSummary, VectorStore};
use serde::Serialize;

use crate::args::ProviderArgs;

/// Output of `quarry stats`.
#[derive(Debug, Serialize)]
pub struct Stats {
    /// Directory the store persists to.
    pub persist_dir: PathBuf,
    /// Number of stored chunks.
    pub chunks: usize,
    /// Embedding dimension, or `None` before the first insert.
    pub dimension: Option<usize>,
    /// Ingested documents in order of their first chunk.
    pub documents: Vec<DocumentSummary>,
}

impl Stats {
    /// Opens the store under `persist_dir` and summarizes it without calling the provider.
    ///
    /// # Errors
    /// Fails if the directory is locked by another process or its state cannot be loaded.
    pub fn collect(persist_dir: &Path, provider: &ProviderArgs) -> Result<Self> {
        let store = VectorStore::open(persist_dir, provider.offline_client())
            .context("failed to open store")?;
        Ok(Self {
            persist_dir: store.persist_dir().to_path_buf(),
            chunks: store.len(),
            dimension: store.dimension(),
            documents: store.documents(),
        })
    }
}
