//! Model provider integration
//!
//! The [`GatewayClient`] turns documents and questions into conversation
//! requests and interprets the replies. How a request reaches the provider
//! is behind the [`Transport`] seam: through the proxy endpoint, or straight
//! to Anthropic's Messages API.

pub mod anthropic;
pub mod direct;
pub mod gateway;
pub mod mock;
pub mod proxy_transport;

pub use direct::DirectTransport;
pub use gateway::GatewayClient;
pub use mock::{MockTransport, RecordedRequest};
pub use proxy_transport::ProxyTransport;

use crate::models::ConversationTurn;
use crate::Result;
use async_trait::async_trait;

/// Status and body of a response, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Returns `Err` only when no response was received.
    async fn send(&self, api_key: &str, messages: &[ConversationTurn]) -> Result<RawResponse>;
}
