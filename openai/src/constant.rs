//! Model & endpoint constants
//!
//! Only stable model names are listed. Any other identifier can be passed as a string.

/// Default `OpenAI` API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// [`OpenRouter`](https://openrouter.ai)'s OpenAI-compatible base URL.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// GPT-4 chat model.
pub const GPT4: &str = "gpt-4";
/// Multimodal GPT-4o chat model.
pub const GPT4O: &str = "gpt-4o";
/// Cheapest GPT-4o variant.
pub const GPT4O_MINI: &str = "gpt-4o-mini";
/// GPT-4.1 chat model.
pub const GPT41: &str = "gpt-4.1";

/// High-accuracy embedding model (3072-dim).
pub const EMBEDDING_LARGE: &str = "text-embedding-3-large";
/// Small + inexpensive embedding model (1536-dim).
pub const EMBEDDING_SMALL: &str = "text-embedding-3-small";
/// Legacy embedding model (1536-dim).
pub const EMBEDDING_ADA002: &str = "text-embedding-ada-002";
