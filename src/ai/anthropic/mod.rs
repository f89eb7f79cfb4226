pub mod client;
pub mod types;

pub use client::{
    AnthropicHttpClient, API_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
pub use types::{ErrorBody, ErrorEnvelope, MessagesRequest, MessagesResponse, ResponseBlock};
