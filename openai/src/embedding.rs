use crate::{client::OpenAI, error::OpenAIError};
use quarry_core::{Embedding, EmbeddingModel, Result as CoreResult};
use serde::{Deserialize, Serialize};

impl OpenAI {
    /// Embeds `texts` with one `/embeddings` request.
    ///
    /// Vectors are returned in input order regardless of the order the server lists
    /// them in. An empty batch returns immediately without a request.
    ///
    /// # Errors
    /// Returns [`OpenAIError::Api`] if the response does not carry exactly one vector
    /// per input, or any transport or status error left after retries.
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Embedding>, OpenAIError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.config().embedding_model,
            input: texts,
        };
        let response: EmbeddingResponse = self.post_json("/embeddings", &request).await?;
        into_ordered_vectors(response, texts.len())
    }
}

impl EmbeddingModel for OpenAI {
    async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Embedding>> {
        Ok(self.embed_texts(texts).await?)
    }
}

fn into_ordered_vectors(
    response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Embedding>, OpenAIError> {
    if response.data.len() != expected {
        return Err(OpenAIError::Api(format!(
            "embedding response has {} vectors for {expected} inputs",
            response.data.len()
        )));
    }

    let mut slots: Vec<Option<Embedding>> = vec![None; expected];
    for item in response.data {
        match slots.get_mut(item.index) {
            Some(slot @ None) => *slot = Some(item.embedding),
            Some(Some(_)) => {
                return Err(OpenAIError::Api(format!(
                    "embedding response repeats index {}",
                    item.index
                )));
            }
            None => {
                return Err(OpenAIError::Api(format!(
                    "embedding response index {} out of range",
                    item.index
                )));
            }
        }
    }
    // Every slot is filled: the counts match and no index repeats.
    Ok(slots.into_iter().flatten().collect())
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}
