use crate::{client::OpenAI, error::OpenAIError};
use quarry_core::{
    AnswerSynthesizer, Result as CoreResult,
    prompt::{SYSTEM_PROMPT, build_prompt},
};
use serde::{Deserialize, Serialize};

impl OpenAI {
    /// Sends one system and one user message to `/chat/completions`.
    ///
    /// Sampling is deterministic (`temperature = 0`) and bounded by the configured
    /// `max_tokens`. Returns the first choice's content, trimmed.
    ///
    /// # Errors
    /// Returns [`OpenAIError::Api`] if the response has no message content, or any
    /// transport or status error left after retries.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, OpenAIError> {
        let cfg = self.config();
        let request = ChatCompletionRequest {
            model: &cfg.chat_model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
            max_tokens: cfg.max_tokens,
        };

        let response: ChatCompletionResponse =
            self.post_json("/chat/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .ok_or_else(|| OpenAIError::Api("chat completion response missing content".into()))
    }
}

impl AnswerSynthesizer for OpenAI {
    async fn synthesize(&self, query: &str, contexts: &[String]) -> CoreResult<String> {
        let prompt = build_prompt(query, contexts);
        Ok(self.chat(SYSTEM_PROMPT, &prompt).await?)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
