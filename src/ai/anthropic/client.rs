use super::types::MessagesRequest;
use crate::ai::RawResponse;
use crate::Result;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const API_VERSION: &str = "2023-06-01";

/// Thin client for Anthropic's Messages API.
///
/// Returns the provider's status and body untouched; interpreting them is
/// up to the caller (the gateway client or the proxy handler).
pub struct AnthropicHttpClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicHttpClient {
    pub fn new(model: String, max_tokens: u32, timeout: Duration) -> Self {
        Self::new_with_client(model, max_tokens, timeout, Client::new())
    }

    pub fn new_with_client(
        model: String,
        max_tokens: u32,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            max_tokens,
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn create_message<M: Serialize + Sync>(
        &self,
        api_key: &str,
        messages: &[M],
    ) -> Result<RawResponse> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages,
        };

        tracing::debug!(
            "Sending {} turn(s) to Anthropic (model: {})",
            messages.len(),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Anthropic: {}", e);
                e
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            tracing::error!("Anthropic API error (status {}): {}", status, body);
        }

        Ok(RawResponse { status, body })
    }
}
