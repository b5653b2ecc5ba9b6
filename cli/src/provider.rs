//! Provider construction for the CLI.

use std::time::Duration;

use anyhow::{Result, bail};
use quarry_openai::OpenAI;

use crate::args::ProviderArgs;

impl ProviderArgs {
    /// Builds a client for commands that call the provider.
    ///
    /// # Errors
    /// Fails if no API key was given through `--api-key` or `OPENAI_API_KEY`.
    pub fn client(&self) -> Result<OpenAI> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(self.build(key)),
            _ => bail!("Set OPENAI_API_KEY in your environment or pass --api-key"),
        }
    }

    /// Builds a client that is never expected to send a request.
    ///
    /// Read-only commands still need an embedder to open the store.
    #[must_use]
    pub fn offline_client(&self) -> OpenAI {
        self.build(self.api_key.as_deref().unwrap_or_default())
    }

    fn build(&self, api_key: &str) -> OpenAI {
        OpenAI::builder(api_key)
            .base_url(self.base_url.as_str())
            .embedding_model(self.embedding_model.as_str())
            .model(self.llm_model.as_str())
            .max_retries(self.max_retries)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}
