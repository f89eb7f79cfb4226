//! Session state behind the user interface
//!
//! A session holds the selected document, its preview, the displayed
//! conversation and a loading flag. Each interaction appends exactly one
//! user turn and one assistant turn; a failed request becomes an assistant
//! turn reading `Error: <message>`.

use crate::ai::GatewayClient;
use crate::document::{self, Document};
use crate::models::{Conversation, ConversationTurn};
use crate::{prompts, Error, Result};

#[derive(Debug, Default)]
pub struct Session {
    document: Option<Document>,
    preview: Option<String>,
    history: Conversation,
    loading: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// `data:` URL of the selected image; `None` for PDFs.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn history(&self) -> &Conversation {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_analysis(&self) -> bool {
        !self.history.is_empty()
    }

    /// Replace the current document and start a fresh conversation.
    pub async fn select_document(&mut self, document: Document) -> Result<()> {
        let preview = if document.is_image() {
            Some(document::encode(&document).await?.data_url())
        } else {
            None
        };

        tracing::info!(
            "Selected {} ({}, {})",
            document.name(),
            document.media_type(),
            document.display_size()
        );
        self.document = Some(document);
        self.preview = preview;
        self.history = Conversation::new();
        Ok(())
    }

    /// Run the initial analysis and return the assistant turn it produced.
    pub async fn analyze(&mut self, client: &mut GatewayClient) -> Result<&ConversationTurn> {
        if self.has_analysis() {
            return Err(Error::InvalidState(
                "This document has already been analyzed".to_string(),
            ));
        }
        let document = self.require_document()?;

        self.loading = true;
        let outcome = client.analyze(&document).await;
        self.loading = false;

        let mut history = Conversation::new();
        history.push(ConversationTurn::user_text(prompts::ANALYZE_REQUEST))?;
        history.push(assistant_turn(outcome))?;
        self.history = history;
        self.last_turn()
    }

    /// Ask a follow-up question and return the assistant turn it produced.
    pub async fn ask_question(
        &mut self,
        client: &mut GatewayClient,
        question: &str,
    ) -> Result<&ConversationTurn> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidState("Please enter a question".to_string()));
        }
        if !self.has_analysis() {
            return Err(Error::InvalidState(
                "Analyze the document before asking follow-up questions".to_string(),
            ));
        }
        let document = self.require_document()?;

        self.loading = true;
        let outcome = client
            .ask_follow_up(&document, self.history.turns(), question)
            .await;
        self.loading = false;

        self.history.push(ConversationTurn::user_text(question))?;
        self.history.push(assistant_turn(outcome))?;
        self.last_turn()
    }

    /// Drop the document, preview and conversation.
    pub fn reset(&mut self) {
        self.document = None;
        self.preview = None;
        self.history = Conversation::new();
        self.loading = false;
    }

    fn require_document(&self) -> Result<Document> {
        self.document
            .clone()
            .ok_or_else(|| Error::InvalidState("Select a document first".to_string()))
    }

    fn last_turn(&self) -> Result<&ConversationTurn> {
        self.history
            .last()
            .ok_or_else(|| Error::Invariant("history is empty after an interaction".to_string()))
    }
}

fn assistant_turn(outcome: Result<String>) -> ConversationTurn {
    match outcome {
        Ok(text) if !text.is_empty() => ConversationTurn::assistant_text(text),
        Ok(_) => ConversationTurn::assistant_text("(The model returned no text.)"),
        Err(e) => {
            tracing::error!("Request failed: {}", e);
            ConversationTurn::assistant_text(format!("Error: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockTransport;
    use crate::credential::{MemoryCredentialStore, StaticPrompt};
    use crate::models::Role;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn client(transport: &MockTransport) -> GatewayClient {
        GatewayClient::new(
            Box::new(transport.clone()),
            Box::new(MemoryCredentialStore::new().with_key("sk-session")),
            Box::new(StaticPrompt::declined()),
        )
        .unwrap()
    }

    async fn open(suffix: &str, bytes: &[u8]) -> (NamedTempFile, Document) {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        let doc = Document::open(file.path()).await.unwrap();
        (file, doc)
    }

    #[tokio::test]
    async fn test_select_image_builds_preview_and_pdf_does_not() {
        let mut session = Session::new();

        let (_png, png) = open(".png", &[0x89, 0x50, 0x4E, 0x47]).await;
        session.select_document(png).await.unwrap();
        assert!(session.preview().unwrap().starts_with("data:image/png;base64,"));

        let (_pdf, pdf) = open(".pdf", b"%PDF-1.4").await;
        session.select_document(pdf).await.unwrap();
        assert!(session.preview().is_none());
        assert_eq!(session.document().unwrap().media_type(), "application/pdf");
    }

    #[tokio::test]
    async fn test_analyze_appends_request_and_answer() {
        let transport = MockTransport::new().with_text_response("A census page, 1880.");
        let mut client = client(&transport);
        let mut session = Session::new();
        let (_file, doc) = open(".pdf", b"%PDF-1.4").await;
        session.select_document(doc).await.unwrap();

        let reply = session.analyze(&mut client).await.unwrap();
        assert_eq!(reply.text(), Some("A census page, 1880."));

        let turns = session.history().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text(), Some(prompts::ANALYZE_REQUEST));
        assert_eq!(turns[1].role, Role::Assistant);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_failed_analysis_becomes_error_turn() {
        let transport = MockTransport::new().with_error_response(429, "slow down");
        let mut client = client(&transport);
        let mut session = Session::new();
        let (_file, doc) = open(".png", &[0x89, 0x50, 0x4E, 0x47]).await;
        session.select_document(doc).await.unwrap();

        let reply = session.analyze(&mut client).await.unwrap();

        assert!(reply.text().unwrap().starts_with("Error: Rate limit exceeded"));
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_follow_up_sends_prior_history_and_grows_by_two() {
        let transport = MockTransport::new()
            .with_text_response("A letter from 1862.")
            .with_text_response("It is signed by Clara.");
        let mut client = client(&transport);
        let mut session = Session::new();
        let (_file, doc) = open(".png", &[0x89, 0x50, 0x4E, 0x47]).await;
        session.select_document(doc).await.unwrap();
        session.analyze(&mut client).await.unwrap();

        let reply = session
            .ask_question(&mut client, "  Who signed it?  ")
            .await
            .unwrap();
        assert_eq!(reply.text(), Some("It is signed by Clara."));

        let turns = session.history().turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].text(), Some("Who signed it?"));

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.messages.len(), 3);
        assert_eq!(&sent.messages[..2], &turns[..2]);
    }

    #[tokio::test]
    async fn test_preconditions_leave_history_untouched() {
        let transport = MockTransport::new();
        let mut client = client(&transport);
        let mut session = Session::new();

        assert!(matches!(
            session.analyze(&mut client).await,
            Err(Error::InvalidState(_))
        ));

        let (_file, doc) = open(".png", &[0x89, 0x50, 0x4E, 0x47]).await;
        session.select_document(doc).await.unwrap();
        assert!(matches!(
            session.ask_question(&mut client, "Too early?").await,
            Err(Error::InvalidState(_))
        ));

        session.analyze(&mut client).await.unwrap();
        assert!(matches!(
            session.ask_question(&mut client, "   ").await,
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            session.analyze(&mut client).await,
            Err(Error::InvalidState(_))
        ));

        assert_eq!(session.history().len(), 2);
        assert_eq!(transport.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_selecting_new_document_and_reset_clear_history() {
        let transport = MockTransport::new();
        let mut client = client(&transport);
        let mut session = Session::new();
        let (_a, first) = open(".png", &[0x89, 0x50, 0x4E, 0x47]).await;
        let (_b, second) = open(".pdf", b"%PDF-1.7").await;

        session.select_document(first).await.unwrap();
        session.analyze(&mut client).await.unwrap();
        session.select_document(second).await.unwrap();
        assert!(!session.has_analysis());

        session.analyze(&mut client).await.unwrap();
        session.reset();
        assert!(session.document().is_none());
        assert!(session.preview().is_none());
        assert!(session.history().is_empty());
    }
}
