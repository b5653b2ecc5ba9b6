//! Command-line front end for a quarry knowledge base.
//!
//! The `quarry` binary exposes the two boundary operations of the knowledge base,
//! plus a read-only summary of the persisted store:
//!
//! - `quarry ingest <FILE>` extracts, chunks, embeds and stores a PDF or text file
//! - `quarry query <QUESTION>` retrieves, synthesizes and scores an answer
//! - `quarry stats` reports chunk and document counts without calling the provider
//!
//! Results are printed to stdout as JSON. Logs go to stderr and are filtered with
//! `RUST_LOG` (default `info`).
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run -p quarry-cli -- ingest handbook.pdf --source-name "Employee handbook"
//! cargo run -p quarry-cli -- query "How many vacation days do I get?" --top-k 3
//! PERSIST_DIR=/var/lib/quarry cargo run -p quarry-cli -- stats
//! ```

pub mod args;
pub mod provider;
pub mod stats;

pub use args::{Cli, Command, ProviderArgs, StoreArgs};
pub use stats::Stats;
