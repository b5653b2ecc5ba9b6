//! Answer synthesis from retrieved evidence.
//!
//! A retrieval pipeline hands the user's question and the ranked context passages to an
//! [`AnswerSynthesizer`], usually a hosted language model. The synthesizer is expected to
//! ground its answer in the numbered passages and to end with a `SOURCES:` line naming
//! the excerpt numbers it relied on; downstream answer-quality heuristics look for that
//! marker.

use alloc::string::String;
use core::future::Future;

/// Produces a natural-language answer from a question and its supporting passages.
pub trait AnswerSynthesizer: Send + Sync {
    /// Answers `query` using only `contexts`, which are given in rank order.
    fn synthesize(
        &self,
        query: &str,
        contexts: &[String],
    ) -> impl Future<Output = crate::Result<String>> + Send;
}

impl<T: AnswerSynthesizer> AnswerSynthesizer for alloc::sync::Arc<T> {
    fn synthesize(
        &self,
        query: &str,
        contexts: &[String],
    ) -> impl Future<Output = crate::Result<String>> + Send {
        T::synthesize(self, query, contexts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;
    use alloc::sync::Arc;

    struct Echo;

    impl AnswerSynthesizer for Echo {
        async fn synthesize(&self, query: &str, contexts: &[String]) -> crate::Result<String> {
            Ok(format!("{query} ({} excerpts)\nSOURCES: 1", contexts.len()))
        }
    }

    #[tokio::test]
    async fn arc_forwards_to_inner_synthesizer() {
        let synthesizer = Arc::new(Echo);
        let answer = synthesizer
            .synthesize("why", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(answer, "why (2 excerpts)\nSOURCES: 1");
    }
}
