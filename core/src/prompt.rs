//! Prompt text for grounded answer synthesis.

use alloc::format;
use alloc::string::String;

/// System message sent with every synthesis request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. Using the provided document excerpts, answer the user's question concisely and cite which documents you used.";

const INSTRUCTIONS: &str = "You are given several document excerpts and a user question. Using only the supplied excerpts, answer the question as succinctly as possible. If the answer cannot be derived from the excerpts, say you don't know and list which excerpts you used.";

const EXCERPT_SEPARATOR: &str = "\n\n---\n\n";

/// Builds the user message for `query`, numbering excerpts from 1 in retrieval order.
#[must_use]
pub fn build_prompt(query: &str, contexts: &[String]) -> String {
    let mut excerpts = String::new();
    for (i, context) in contexts.iter().enumerate() {
        if i > 0 {
            excerpts.push_str(EXCERPT_SEPARATOR);
        }
        excerpts.push_str(&format!("Document excerpt {}:\n{context}", i + 1));
    }

    format!(
        "{INSTRUCTIONS}\n\nEXCERPTS:\n{excerpts}\n\nQUESTION:\n{query}\n\n\
         Answer concisely and include a short \"SOURCES\" line listing excerpt numbers used."
    )
}
