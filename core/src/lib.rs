//! # quarry-core
//!
//! Provider-agnostic trait APIs for the quarry retrieval stack. Every provider crate
//! implements these traits, and the retrieval crate only ever talks to them.
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────────┐    ┌─────────────────┐
//! │  quarry-rag     │───▶│    quarry-core       │◀───│   Providers     │
//! │                 │    │   (this crate)       │    │                 │
//! │ - chunking      │    │                      │    │ - openai        │
//! │ - vector store  │    │ - EmbeddingModel     │    │ - test doubles  │
//! │ - evaluation    │    │ - AnswerSynthesizer  │    │                 │
//! └─────────────────┘    └──────────────────────┘    └─────────────────┘
//! ```
//!
//! | Capability | Trait | Description |
//! |------------|-------|-------------|
//! | **Embeddings** | [`EmbeddingModel`] | Batch text to fixed-width vectors |
//! | **Answer synthesis** | [`AnswerSynthesizer`] | Question + passages to a cited answer |
//!
//! Hosted-model synthesizers should send [`prompt::SYSTEM_PROMPT`] and the output of
//! [`prompt::build_prompt`] so every provider asks for the same `SOURCES` line.

#![no_std]
extern crate alloc;

/// Text embeddings.
pub mod embedding;
/// Answer synthesis.
pub mod synthesis;
/// Prompt text shared by synthesizer implementations.
pub mod prompt;

use alloc::string::String;

#[doc(inline)]
pub use embedding::{Embedding, EmbeddingModel};
#[doc(inline)]
pub use synthesis::AnswerSynthesizer;

/// Result type used throughout the crate.
///
/// Type alias for [`anyhow::Result<T>`](anyhow::Result) with [`String`] as default success type.
pub type Result<T = String> = anyhow::Result<T>;

pub use anyhow::Error;
