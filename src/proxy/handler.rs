use crate::ai::anthropic::{AnthropicHttpClient, ErrorEnvelope};
use serde_json::Value;

/// Headers attached to every proxy response, preflight included.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Content-Type", "application/json"),
];

#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: u16,
    pub body: String,
}

impl ProxyResponse {
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: ErrorEnvelope::new(message).to_json(),
        }
    }

    pub fn not_found() -> Self {
        Self::error(404, "Not found")
    }

    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        &CORS_HEADERS
    }
}

pub struct ProxyHandler {
    upstream: AnthropicHttpClient,
}

impl ProxyHandler {
    pub fn new(upstream: AnthropicHttpClient) -> Self {
        Self { upstream }
    }

    pub async fn handle(&self, request: ProxyRequest) -> ProxyResponse {
        let method = request.method.to_ascii_uppercase();
        if method == "OPTIONS" {
            return ProxyResponse {
                status: 200,
                body: String::new(),
            };
        }
        if method != "POST" {
            return ProxyResponse::error(405, "Method not allowed");
        }

        let payload: Value = match serde_json::from_str(&request.body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!("Rejecting malformed proxy body: {}", e);
                return ProxyResponse::error(400, "Invalid JSON in request body");
            }
        };

        let Some(api_key) = payload
            .get("apiKey")
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
        else {
            return ProxyResponse::error(400, "API key is required");
        };

        let Some(messages) = payload
            .get("messages")
            .and_then(Value::as_array)
            .filter(|messages| !messages.is_empty())
        else {
            return ProxyResponse::error(400, "Messages array is required");
        };

        tracing::info!(
            "Forwarding {} message(s) to {}",
            messages.len(),
            self.upstream.model()
        );

        let upstream = match self.upstream.create_message(api_key, messages).await {
            Ok(upstream) => upstream,
            Err(e) => {
                tracing::error!("Upstream request failed: {}", e);
                return ProxyResponse::error(500, &e.to_string());
            }
        };

        let data: Value = match serde_json::from_str(&upstream.body) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(
                    "Upstream returned non-JSON body (status {}): {}",
                    upstream.status,
                    e
                );
                return ProxyResponse::error(500, "Internal server error");
            }
        };

        if !upstream.is_success() {
            return match upstream.status {
                401 => ProxyResponse::error(
                    401,
                    "Invalid API key. Please check your Anthropic API key.",
                ),
                429 => ProxyResponse::error(429, "Rate limit exceeded. Please wait and try again."),
                status => {
                    let message = data
                        .pointer("/error/message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("API request failed with status {}", status));
                    ProxyResponse::error(status, &message)
                }
            };
        }

        ProxyResponse {
            status: 200,
            body: upstream.body,
        }
    }
}
