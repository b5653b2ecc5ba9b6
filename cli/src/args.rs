//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quarry_rag::{RagConfig, Result as RagResult};
use quarry_rag::config::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K};

/// Ingest documents into and ask questions of a local knowledge base.
#[derive(Parser, Debug)]
#[command(name = "quarry", version, about)]
pub struct Cli {
    /// Store settings shared by every subcommand.
    #[command(flatten)]
    pub store: StoreArgs,

    /// Embedding and chat provider settings.
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Extract, chunk, embed and store one PDF or text file.
    Ingest {
        /// File to ingest.
        path: PathBuf,

        /// Name recorded as the chunk source. Defaults to the file's name.
        #[arg(long)]
        filename: Option<String>,

        /// Free-text label stored with every chunk.
        #[arg(long)]
        source_name: Option<String>,
    },
    /// Answer a question from the stored documents.
    Query {
        /// The question.
        question: String,

        /// Number of chunks to retrieve. Defaults to `TOP_K`.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Summarize the persisted store.
    Stats,
}

/// Knowledge base settings.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StoreArgs {
    /// Directory holding the persisted index, metadata and texts.
    #[arg(long, env = "PERSIST_DIR", default_value = "./persist")]
    pub persist_dir: PathBuf,

    /// Chunk window size, in characters.
    #[arg(long, env = "CHUNK_SIZE_CHARS", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, in characters.
    #[arg(long, env = "CHUNK_OVERLAP_CHARS", default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,

    /// Chunks retrieved per query when `--top-k` is not given.
    #[arg(long = "default-top-k", env = "TOP_K", default_value_t = DEFAULT_TOP_K)]
    pub default_top_k: usize,
}

impl StoreArgs {
    /// Builds and validates the knowledge base configuration.
    ///
    /// # Errors
    /// Returns [`quarry_rag::RagError::InvalidConfig`] for inconsistent values.
    pub fn rag_config(&self) -> RagResult<RagConfig> {
        let defaults = RagConfig::default();
        RagConfig::builder()
            .persist_dir(self.persist_dir.clone())
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .default_top_k(self.default_top_k)
            .max_top_k(defaults.max_top_k.max(self.default_top_k))
            .build()
    }
}

/// OpenAI-compatible provider settings.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ProviderArgs {
    /// API key sent as a bearer token.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = quarry_openai::OPENAI_BASE_URL)]
    pub base_url: String,

    /// Embedding model identifier.
    #[arg(long, env = "EMBEDDING_MODEL", default_value = quarry_openai::EMBEDDING_LARGE)]
    pub embedding_model: String,

    /// Chat model used to synthesize answers.
    #[arg(long, env = "LLM_MODEL", default_value = quarry_openai::GPT4)]
    pub llm_model: String,

    /// Retries after a transient provider failure.
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Per-request timeout, in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}
