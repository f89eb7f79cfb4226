use super::{RawResponse, Transport};
use crate::models::ConversationTurn;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// What a [`MockTransport`] saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub api_key: String,
    pub messages: Vec<ConversationTurn>,
}

#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<Vec<RawResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: RawResponse) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Queue a successful provider reply holding a single text block.
    pub fn with_text_response(self, text: &str) -> Self {
        let body = serde_json::json!({ "content": [{ "type": "text", "text": text }] });
        self.with_response(RawResponse::new(200, body.to_string()))
    }

    /// Queue an error reply in the `{"error":{"message":..}}` shape.
    pub fn with_error_response(self, status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": { "message": message } });
        self.with_response(RawResponse::new(status, body.to_string()))
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, api_key: &str, messages: &[ConversationTurn]) -> Result<RawResponse> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            api_key: api_key.to_string(),
            messages: messages.to_vec(),
        });
        let count = requests.len();

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            let body = serde_json::json!({ "content": [{ "type": "text", "text": "Mock analysis" }] });
            Ok(RawResponse::new(200, body.to_string()))
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_default_response() {
        let transport = MockTransport::new();

        let response = transport.send("key", &[]).await.unwrap();
        assert!(response.is_success());
        assert!(response.body.contains("Mock analysis"));
    }

    #[tokio::test]
    async fn test_mock_transport_cycles_responses() {
        let transport = MockTransport::new()
            .with_text_response("first")
            .with_error_response(429, "slow down");

        assert_eq!(transport.send("k", &[]).await.unwrap().status, 200);
        assert_eq!(transport.send("k", &[]).await.unwrap().status, 429);
        // Should cycle back
        assert_eq!(transport.send("k", &[]).await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_mock_transport_records_requests() {
        let transport = MockTransport::new();
        let probe = transport.clone();

        assert_eq!(probe.get_call_count(), 0);

        let turns = vec![ConversationTurn::user_text("hello")];
        transport.send("sk-1", &turns).await.unwrap();

        assert_eq!(probe.get_call_count(), 1);
        let recorded = probe.last_request().unwrap();
        assert_eq!(recorded.api_key, "sk-1");
        assert_eq!(recorded.messages, turns);
    }
}
