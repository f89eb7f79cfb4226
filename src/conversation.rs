//! Conversation building
//!
//! Turns an encoded document (and optionally a question) into a user turn
//! whose document part comes first and whose instruction text comes last.
//! The provider keeps no state between calls, so every turn built here
//! carries the full document.

use crate::document::EncodedDocument;
use crate::models::{ContentPart, ConversationTurn, MediaKind};
use crate::{prompts, Error, Result};

/// The opening analysis request for a document.
pub fn initial_turn(encoded: &EncodedDocument) -> Result<ConversationTurn> {
    document_turn(encoded, prompts::ANALYSIS)
}

/// A follow-up question that re-attaches the document.
pub fn follow_up_turn(encoded: &EncodedDocument, question: &str) -> Result<ConversationTurn> {
    check_question(question)?;
    document_turn(encoded, question)
}

/// Rejects a blank follow-up question.
pub fn check_question(question: &str) -> Result<()> {
    if question.trim().is_empty() {
        return Err(Error::InvalidState(
            "Follow-up question must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Prior history followed by the new turn, order preserved.
pub fn follow_up_request(
    history: &[ConversationTurn],
    turn: ConversationTurn,
) -> Vec<ConversationTurn> {
    let mut turns = Vec::with_capacity(history.len() + 1);
    turns.extend_from_slice(history);
    turns.push(turn);
    turns
}

fn document_turn(encoded: &EncodedDocument, text: &str) -> Result<ConversationTurn> {
    let kind = MediaKind::classify(&encoded.media_type)?;
    Ok(ConversationTurn::user_parts(vec![
        ContentPart::media(kind, encoded),
        ContentPart::text(text),
    ]))
}
