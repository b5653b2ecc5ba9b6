//! `quarry` binary: ingest documents into and query a local knowledge base.
//!
//! ```bash
//! OPENAI_API_KEY=xxx cargo run -p quarry-cli -- ingest report.pdf
//! OPENAI_API_KEY=xxx cargo run -p quarry-cli -- query "What changed in Q3?"
//! RUST_LOG=quarry_rag=debug cargo run -p quarry-cli -- stats
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use quarry_cli::{Cli, Command, Stats};
use quarry_rag::KnowledgeBase;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.store.rag_config().context("invalid store configuration")?;
    tracing::debug!(
        persist_dir = %config.persist_dir.display(),
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        "resolved configuration"
    );

    match cli.command {
        Command::Ingest {
            path,
            filename,
            source_name,
        } => {
            let client = cli.provider.client()?;
            let kb = KnowledgeBase::open(config, client.clone(), client)
                .context("failed to open knowledge base")?;

            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let filename = filename.unwrap_or_else(|| file_name(&path));

            let report = kb
                .ingest(&bytes, &filename, source_name)
                .await
                .with_context(|| format!("failed to ingest {}", path.display()))?;
            print_json(&report)
        }
        Command::Query { question, top_k } => {
            let client = cli.provider.client()?;
            let kb = KnowledgeBase::open(config, client.clone(), client)
                .context("failed to open knowledge base")?;

            let response = kb
                .query(&question, top_k)
                .await
                .context("failed to answer query")?;
            print_json(&response)
        }
        Command::Stats => print_json(&Stats::collect(&config.persist_dir, &cli.provider)?),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode result")?;
    println!("{json}");
    Ok(())
}
