//! Anthropic Messages API payloads shared by the client and the proxy.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/messages`.
///
/// `messages` is generic so the proxy can forward turns it has not typed.
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a, M: Serialize> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: &'a [M],
}

/// The parts of a Messages API response this crate reads.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ResponseBlock>,
}

/// One block of response content. Anything that is not text is kept as `Other`.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    /// All text blocks in order, joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text.as_str()),
                ResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `{"error": {"message": ...}}`, used by both the provider and the proxy.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                message: Some(message.into()),
            },
        }
    }

    /// Extract `error.message` from a response body, if it has one.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error.message)
            .filter(|message| !message.trim().is_empty())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"error":{}}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_filters_non_text_blocks_in_order() {
        let response: MessagesResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_01",
            "content": [
                { "type": "text", "text": "A" },
                { "type": "image", "source": { "type": "base64", "media_type": "image/png", "data": "AA==" } },
                { "type": "text", "text": "B" }
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();

        assert_eq!(response.content[1], ResponseBlock::Other);
        assert_eq!(response.text(), "A\nB");
    }

    #[test]
    fn test_empty_content_yields_empty_text() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            ErrorEnvelope::message_from(
                r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#
            ),
            Some("Overloaded".to_string())
        );
        assert_eq!(ErrorEnvelope::message_from("<html>bad gateway</html>"), None);
        assert_eq!(ErrorEnvelope::message_from(r#"{"error":{}}"#), None);
    }

    #[test]
    fn test_error_envelope_json() {
        assert_eq!(
            ErrorEnvelope::new("Method not allowed").to_json(),
            r#"{"error":{"message":"Method not allowed"}}"#
        );
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![serde_json::json!({ "role": "user", "content": "hi" })];
        let request = MessagesRequest {
            model: "claude-test",
            max_tokens: 10,
            messages: &messages,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "model": "claude-test",
                "max_tokens": 10,
                "messages": [{ "role": "user", "content": "hi" }]
            })
        );
    }
}
