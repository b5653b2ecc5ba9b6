use crate::{DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, error::OpenAIError};
use futures_lite::future;
use reqwest::{Response, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use std::{future::Future, sync::Arc, time::Duration};

/// Configuration for request retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate delay for a given attempt number (0-indexed).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let seconds = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::try_from_secs_f64(seconds)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay before retrying after `err`, honoring a rate limit's `Retry-After` hint.
    fn delay_for_error(&self, err: &OpenAIError, attempt: u32) -> Duration {
        if let OpenAIError::RateLimit {
            retry_after: Some(delay),
            ..
        } = err
        {
            return (*delay).min(self.max_delay);
        }
        self.delay_for_attempt(attempt)
    }
}

/// Sleep for the given duration (runtime-agnostic).
async fn sleep(duration: Duration) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        async_io::Timer::after(duration).await;
    }
    #[cfg(target_arch = "wasm32")]
    {
        let _ = duration;
    }
}

/// Races `attempt` against a timer.
async fn with_timeout<T, Fut>(timeout: Duration, attempt: Fut) -> Result<T, OpenAIError>
where
    Fut: Future<Output = Result<T, OpenAIError>>,
{
    future::or(attempt, async move {
        sleep(timeout).await;
        Err(OpenAIError::Timeout(timeout))
    })
    .await
}

/// Client for OpenAI-compatible embedding and chat completion endpoints.
///
/// Cloning is cheap; clones share configuration and the connection pool.
#[derive(Clone, Debug)]
pub struct OpenAI {
    inner: Arc<Config>,
    http: reqwest::Client,
}

impl OpenAI {
    /// Create a client with default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder(api_key).build()
    }

    /// Start building a client.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> Builder {
        Builder::new(api_key)
    }

    /// Change the chat model on an existing client.
    #[must_use]
    pub fn with_model(self, model: impl Into<String>) -> Self {
        self.map_config(|cfg| cfg.chat_model = sanitize_model(model))
    }

    /// Change the embedding model on an existing client.
    #[must_use]
    pub fn with_embedding_model(self, model: impl Into<String>) -> Self {
        self.map_config(|cfg| cfg.embedding_model = sanitize_model(model))
    }

    /// Point the client at another OpenAI-compatible endpoint.
    #[must_use]
    pub fn with_base_url(self, url: impl Into<String>) -> Self {
        self.map_config(|cfg| cfg.base_url = url.into())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner
    }

    fn map_config(mut self, f: impl FnOnce(&mut Config)) -> Self {
        f(Arc::make_mut(&mut self.inner));
        self
    }

    /// POSTs `body` to `path` and decodes the JSON response, retrying transient failures.
    ///
    /// Each attempt is bounded by the configured request timeout. Dropping the returned
    /// future cancels the in-flight attempt.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, OpenAIError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let cfg = &self.inner;
        let url = cfg.request_url(path);
        let mut attempt = 0;

        loop {
            let result = with_timeout(cfg.request_timeout, self.post_once(&url, body)).await;
            match result {
                Ok(value) => return Ok(value),
                Err(err) if attempt < cfg.retry.max_retries && err.is_retryable() => {
                    let delay = cfg.retry.delay_for_error(&err, attempt);
                    tracing::debug!(
                        %url,
                        attempt = attempt + 1,
                        max_retries = cfg.retry.max_retries,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "Request failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_once<B, T>(&self, url: &str, body: &B) -> Result<T, OpenAIError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.inner.api_key)
            .header(header::USER_AGENT, "quarry-openai/0.1")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn status_error(status: StatusCode, response: Response) -> OpenAIError {
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_retry_after);
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    if status == StatusCode::TOO_MANY_REQUESTS {
        OpenAIError::RateLimit {
            message,
            retry_after,
        }
    } else if status.is_server_error() {
        OpenAIError::ServerError {
            status: status.as_u16(),
            message,
        }
    } else {
        OpenAIError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

/// Parses a `Retry-After` value given in (possibly fractional) seconds.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

/// Pulls `error.message` out of an OpenAI error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_owned())
}

/// Builder for [`OpenAI`] clients.
#[derive(Debug)]
pub struct Builder {
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    max_tokens: u32,
    retry: RetryConfig,
    request_timeout: Duration,
}

/// Default per-attempt request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default completion budget for synthesized answers.
const DEFAULT_MAX_TOKENS: u32 = 512;

impl Builder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            retry: RetryConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set a custom API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Select the chat model identifier (e.g., `gpt-4`, `gpt-4o-mini`).
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = sanitize_model(model);
        self
    }

    /// Select the embeddings model identifier.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = sanitize_model(model);
        self
    }

    /// Cap the number of tokens in a synthesized answer.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Configure retry behavior for failed requests.
    ///
    /// By default, requests are retried up to 3 times with exponential backoff.
    /// Retries happen on transport errors, timeouts, HTTP 429 and 5xx responses.
    #[must_use]
    pub const fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Set maximum number of retry attempts.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Disable retries entirely.
    #[must_use]
    pub fn no_retry(mut self) -> Self {
        self.retry = RetryConfig::none();
        self
    }

    /// Set the per-attempt request timeout.
    ///
    /// Default is 60 seconds. A timed-out attempt counts as retryable.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Consume the builder and create an [`OpenAI`] client.
    #[must_use]
    pub fn build(self) -> OpenAI {
        OpenAI {
            inner: Arc::new(Config {
                api_key: self.api_key,
                base_url: self.base_url,
                chat_model: self.chat_model,
                embedding_model: self.embedding_model,
                max_tokens: self.max_tokens,
                retry: self.retry,
                request_timeout: self.request_timeout,
            }),
            http: reqwest::Client::new(),
        }
    }
}

/// Resolved client configuration.
#[derive(Clone)]
pub struct Config {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) chat_model: String,
    pub(crate) embedding_model: String,
    pub(crate) max_tokens: u32,
    pub(crate) retry: RetryConfig,
    pub(crate) request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("max_tokens", &self.max_tokens)
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat model identifier.
    #[must_use]
    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Embedding model identifier.
    #[must_use]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Completion token budget.
    #[must_use]
    pub const fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Retry policy.
    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Per-attempt request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub(crate) fn request_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn sanitize_model(model: impl Into<String>) -> String {
    model.into().trim().to_string()
}
