//! `OpenAI` integration for quarry built on `reqwest` and the shared `quarry-core`
//! traits.
//!
//! [`OpenAI`] implements [`EmbeddingModel`](quarry_core::EmbeddingModel) against
//! `/embeddings` and [`AnswerSynthesizer`](quarry_core::AnswerSynthesizer) against
//! `/chat/completions`. Any OpenAI-compatible server works through
//! [`Builder::base_url`].
//!
//! Every request gets a per-attempt timeout and bounded retries with exponential
//! backoff. Transport failures, timeouts, HTTP 429 and 5xx are retried; other client
//! errors and malformed responses fail immediately.
//!
//! ```no_run
//! use quarry_core::{AnswerSynthesizer, EmbeddingModel};
//! use quarry_openai::OpenAI;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = OpenAI::builder(std::env::var("OPENAI_API_KEY")?)
//!     .model("gpt-4o-mini")
//!     .max_retries(5)
//!     .build();
//!
//! let vectors = client
//!     .embed_batch(&["first passage".to_string(), "second passage".to_string()])
//!     .await?;
//! let answer = client
//!     .synthesize("What is in the passages?", &["first passage".to_string()])
//!     .await?;
//! println!("{} vectors, answer: {answer}", vectors.len());
//! # Ok(()) }
//! ```

mod chat;
mod client;
mod embedding;
mod error;

pub use client::{Builder, Config, OpenAI, RetryConfig};
pub use error::OpenAIError;

mod constant;
pub use constant::*;

pub(crate) const DEFAULT_BASE_URL: &str = OPENAI_BASE_URL;
pub(crate) const DEFAULT_CHAT_MODEL: &str = GPT4;
pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = EMBEDDING_LARGE;
