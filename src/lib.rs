#![no_std]
//! # quarry
//!
//! Facade crate for an append-only document retrieval stack. It re-exports the
//! provider traits from [`quarry_core`], the knowledge base from [`quarry_rag`] as
//! [`rag`], and, behind the `openai` feature, the OpenAI-compatible provider as
//! `openai`.
//!
//! ## What's inside?
//!
//! - [`EmbeddingModel`] and [`AnswerSynthesizer`], the two seams a provider implements.
//! - [`rag::KnowledgeBase`]: extract, chunk, embed and store uploads, then answer
//!   questions with retrieved evidence and heuristic quality scores.
//! - [`rag::VectorStore`]: exhaustive squared-L2 search over a flat index, persisted
//!   atomically to a directory.
//!
//! ## Example
//!
//! ```rust,ignore
//! use quarry::rag::{KnowledgeBase, RagConfig};
//! use quarry::openai::OpenAI;
//!
//! async fn demo(api_key: &str) -> quarry::rag::Result<()> {
//!     let client = OpenAI::new(api_key);
//!     let config = RagConfig::builder().persist_dir("./persist").build()?;
//!     let kb = KnowledgeBase::open(config, client.clone(), client)?;
//!
//!     kb.ingest(b"Ferns grow best in shade.", "plants.txt", None).await?;
//!     let response = kb.query("Where do ferns grow?", None).await?;
//!     println!("{}\n{:?}", response.answer, response.evaluation);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`quarry_core::embedding`]: text to vectors.
//! - [`quarry_core::synthesis`]: question and passages to an answer.
//! - [`quarry_core::prompt`]: the grounded-answer prompt shared by synthesizers.

pub use quarry_core::*;

pub use quarry_rag as rag;

#[cfg(feature = "openai")]
pub use quarry_openai as openai;
