use super::anthropic::{ErrorEnvelope, MessagesResponse};
use super::{RawResponse, Transport};
use crate::credential::{Credential, CredentialPrompt, CredentialStore};
use crate::document::{self, Document};
use crate::models::ConversationTurn;
use crate::{conversation, prompts, Error, Result};

/// Sends analysis and follow-up requests and maps replies to typed results.
///
/// Methods take `&mut self`: a session has at most one request in flight, and
/// a request may clear the credential it started with.
pub struct GatewayClient {
    transport: Box<dyn Transport>,
    store: Box<dyn CredentialStore>,
    prompt: Box<dyn CredentialPrompt>,
    credential: Credential,
}

impl GatewayClient {
    /// Build a client, loading the persisted credential from `store`.
    pub fn new(
        transport: Box<dyn Transport>,
        store: Box<dyn CredentialStore>,
        prompt: Box<dyn CredentialPrompt>,
    ) -> Result<Self> {
        let credential = store.load()?;
        Ok(Self {
            transport,
            store,
            prompt,
            credential,
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn update_credential(&mut self, api_key: &str) -> Result<&Credential> {
        let next = self.credential.set(api_key);
        self.store.save(&next)?;
        self.credential = next;
        Ok(&self.credential)
    }

    pub fn clear_credential(&mut self) -> Result<&Credential> {
        let next = self.credential.clear();
        self.store.save(&next)?;
        self.credential = next;
        Ok(&self.credential)
    }

    /// Request the initial analysis of `document`.
    pub async fn analyze(&mut self, document: &Document) -> Result<String> {
        document.kind()?;
        let api_key = self.resolve_api_key()?;

        let encoded = document::encode(document).await?;
        let turn = conversation::initial_turn(&encoded)?;

        tracing::info!(
            "Requesting analysis of {} (prompt {})",
            document.name(),
            prompts::ANALYSIS_VERSION
        );
        self.send(&api_key, &[turn]).await
    }

    /// Ask a follow-up question; `history` is everything before the question.
    pub async fn ask_follow_up(
        &mut self,
        document: &Document,
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<String> {
        document.kind()?;
        conversation::check_question(question)?;
        let api_key = self.resolve_api_key()?;

        let encoded = document::encode(document).await?;
        let turn = conversation::follow_up_turn(&encoded, question)?;
        let messages = conversation::follow_up_request(history, turn);

        tracing::info!(
            "Asking follow-up about {} ({} prior turn(s))",
            document.name(),
            history.len()
        );
        self.send(&api_key, &messages).await
    }

    fn resolve_api_key(&mut self) -> Result<String> {
        if let Some(key) = self.credential.api_key() {
            return Ok(key.to_string());
        }

        let entered = self.prompt.prompt().unwrap_or_default();
        let next = self.credential.set(&entered);
        let key = match next.api_key() {
            Some(key) => key.to_string(),
            None => {
                tracing::warn!("No API key provided");
                return Err(Error::MissingCredential);
            }
        };

        self.store.save(&next)?;
        self.credential = next;
        Ok(key)
    }

    async fn send(&mut self, api_key: &str, messages: &[ConversationTurn]) -> Result<String> {
        let response = self.transport.send(api_key, messages).await?;
        self.interpret(response)
    }

    fn interpret(&mut self, response: RawResponse) -> Result<String> {
        if response.is_success() {
            let parsed: MessagesResponse = serde_json::from_str(&response.body).map_err(|e| {
                tracing::error!("Failed to parse response: {}\nBody: {}", e, response.body);
                Error::InvalidResponse(e.to_string())
            })?;
            return Ok(parsed.text());
        }

        let provider_message = ErrorEnvelope::message_from(&response.body);
        match response.status {
            401 => {
                tracing::warn!("API key rejected; erasing stored credential");
                self.credential = self.credential.clear();
                if let Err(e) = self.store.save(&self.credential) {
                    tracing::error!("Failed to erase stored credential: {}", e);
                }
                Err(Error::Auth)
            }
            429 => Err(Error::RateLimit),
            400 => Err(Error::BadRequest(
                provider_message.unwrap_or_else(|| "request rejected".to_string()),
            )),
            status => Err(Error::Api {
                status,
                message: provider_message
                    .unwrap_or_else(|| format!("API request failed with status {}", status)),
            }),
        }
    }
}
