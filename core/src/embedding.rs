//! # Embedding Module
//!
//! Types and traits for turning text into dense vectors.
//!
//! ## Batching
//!
//! Remote embedding services charge per request and add latency per round trip, so the
//! primary entry point of [`EmbeddingModel`] takes a whole batch of strings at once. A
//! retrieval pipeline embeds every chunk of an ingested document in one call and only
//! uses the single-string helper for queries.
//!
//! ## Dimensions
//!
//! The trait does not advertise a dimension up front. Consumers such as a vector store
//! learn it from the first batch they receive and reject any later batch whose width
//! differs. An implementation must therefore be dimensionally stable for the lifetime of
//! a deployment.
//!
//! ```rust
//! use quarry_core::EmbeddingModel;
//!
//! struct Lengths;
//!
//! impl EmbeddingModel for Lengths {
//!     async fn embed_batch(&self, texts: &[String]) -> quarry_core::Result<Vec<Vec<f32>>> {
//!         Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
//!     }
//! }
//!
//! # tokio_test_block_on(async {
//! let vector = Lengths.embed("four").await.unwrap();
//! assert_eq!(vector, vec![4.0, 1.0]);
//! # });
//! # fn tokio_test_block_on<F: core::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use alloc::{borrow::ToOwned, vec, vec::Vec};
use core::future::Future;

/// A type alias for an embedding vector of 32-bit floats.
pub type Embedding = Vec<f32>;

/// Converts text to vector representations.
///
/// # Implementation Requirements
///
/// - [`embed_batch`](EmbeddingModel::embed_batch) returns exactly one vector per input,
///   in input order.
/// - Every vector produced by one deployment has the same length.
/// - Transport failures, quota errors and malformed responses are reported as errors;
///   implementations never pad or truncate vectors to paper over a bad response.
pub trait EmbeddingModel: Send + Sync {
    /// Embeds a batch of texts in a single provider call.
    fn embed_batch(
        &self,
        texts: &[alloc::string::String],
    ) -> impl Future<Output = crate::Result<Vec<Embedding>>> + Send;

    /// Embeds a single text.
    ///
    /// The default implementation forwards a one-element batch to
    /// [`embed_batch`](EmbeddingModel::embed_batch).
    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Embedding>> + Send {
        let batch = vec![text.to_owned()];
        async move {
            let mut vectors = self.embed_batch(&batch).await?;
            anyhow::ensure!(
                vectors.len() == 1,
                "embedding provider returned {} vectors for a single input",
                vectors.len()
            );
            Ok(vectors.swap_remove(0))
        }
    }
}

impl<T: EmbeddingModel> EmbeddingModel for alloc::sync::Arc<T> {
    fn embed_batch(
        &self,
        texts: &[alloc::string::String],
    ) -> impl Future<Output = crate::Result<Vec<Embedding>>> + Send {
        T::embed_batch(self, texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    struct MockEmbeddingModel {
        dimension: usize,
        calls: AtomicUsize,
    }

    impl EmbeddingModel for MockEmbeddingModel {
        #[allow(clippy::cast_precision_loss)]
        async fn embed_batch(&self, texts: &[String]) -> crate::Result<Vec<Embedding>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|text| {
                    (0..self.dimension)
                        .map(|i| (text.len() + i) as f32 * 0.01)
                        .collect()
                })
                .collect())
        }
    }

    struct Overproducing;

    impl EmbeddingModel for Overproducing {
        async fn embed_batch(&self, _texts: &[String]) -> crate::Result<Vec<Embedding>> {
            Ok(vec![vec![1.0], vec![2.0]])
        }
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let model = MockEmbeddingModel {
            dimension: 2,
            calls: AtomicUsize::new(0),
        };
        let texts = ["a".to_string(), "abc".to_string()];
        let vectors = model.embed_batch(&texts).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert!((vectors[0][0] - 0.01).abs() < f32::EPSILON);
        assert!((vectors[1][0] - 0.03).abs() < f32::EPSILON);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_embed_uses_one_batch_call() {
        let model = MockEmbeddingModel {
            dimension: 3,
            calls: AtomicUsize::new(0),
        };
        let vector = model.embed("test").await.unwrap();

        assert_eq!(vector.len(), 3);
        assert!((vector[2] - 0.06).abs() < f32::EPSILON);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_embed_rejects_extra_vectors() {
        let err = Overproducing.embed("x").await.unwrap_err();
        assert!(err.to_string().contains("2 vectors"));
    }

    #[tokio::test]
    async fn arc_forwards_to_inner_model() {
        let model = Arc::new(MockEmbeddingModel {
            dimension: 1,
            calls: AtomicUsize::new(0),
        });
        let vector = model.embed("ab").await.unwrap();

        assert_eq!(vector.len(), 1);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }
}
