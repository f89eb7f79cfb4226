use super::{RawResponse, Transport};
use crate::models::ConversationTurn;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Body the proxy endpoint expects.
#[derive(Debug, Serialize)]
struct AnalyzeEnvelope<'a> {
    #[serde(rename = "apiKey")]
    api_key: &'a str,
    messages: &'a [ConversationTurn],
}

/// Sends requests through the proxy endpoint.
pub struct ProxyTransport {
    client: Client,
    url: String,
    timeout: Duration,
}

impl ProxyTransport {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self::new_with_client(url, timeout, Client::new())
    }

    pub fn new_with_client(url: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

#[async_trait]
impl Transport for ProxyTransport {
    async fn send(&self, api_key: &str, messages: &[ConversationTurn]) -> Result<RawResponse> {
        tracing::debug!("Sending {} turn(s) via proxy {}", messages.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&AnalyzeEnvelope { api_key, messages })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach proxy at {}: {}", self.url, e);
                e
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            tracing::error!("Proxy returned error (status {}): {}", status, body);
        }

        Ok(RawResponse { status, body })
    }
}
