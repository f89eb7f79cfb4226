use super::anthropic::AnthropicHttpClient;
use super::{RawResponse, Transport};
use crate::models::ConversationTurn;
use crate::Result;
use async_trait::async_trait;

/// Calls the provider straight from the client, without the proxy.
pub struct DirectTransport {
    http: AnthropicHttpClient,
}

impl DirectTransport {
    pub fn new(http: AnthropicHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    async fn send(&self, api_key: &str, messages: &[ConversationTurn]) -> Result<RawResponse> {
        self.http.create_message(api_key, messages).await
    }
}
