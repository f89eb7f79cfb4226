//! Data models and structures
//!
//! Defines the conversation types exchanged between the client, the proxy
//! endpoint and the model provider, plus runtime configuration.

use crate::ai::anthropic::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::document::EncodedDocument;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Classification of a document's media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Pdf,
}

impl MediaKind {
    /// `image/*` is an image, `application/pdf` is a PDF, anything else is rejected.
    pub fn classify(media_type: &str) -> Result<Self> {
        let normalized = media_type.trim().to_ascii_lowercase();
        if normalized.starts_with("image/") {
            Ok(MediaKind::Image)
        } else if normalized == "application/pdf" {
            Ok(MediaKind::Pdf)
        } else {
            Err(Error::UnsupportedMedia(media_type.to_string()))
        }
    }
}

/// Inline base64 payload carried by image and document parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

/// One unit of a message turn.
///
/// Serializes to the provider shape, e.g.
/// `{"type":"image","source":{"type":"base64","media_type":..,"data":..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Image { source: MediaSource },
    Document { source: MediaSource },
    Text { text: String },
}

impl ContentPart {
    pub fn media(kind: MediaKind, encoded: &EncodedDocument) -> Self {
        let source = MediaSource {
            source_type: "base64".to_string(),
            media_type: encoded.media_type.clone(),
            data: encoded.data.clone(),
        };
        match kind {
            MediaKind::Image => ContentPart::Image { source },
            MediaKind::Pdf => ContentPart::Document { source },
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Turn content: plain text for display turns, typed parts otherwise.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: TurnContent,
}

impl ConversationTurn {
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Parts(parts),
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Typed parts of this turn; empty for plain-text turns.
    pub fn parts(&self) -> &[ContentPart] {
        match &self.content {
            TurnContent::Parts(parts) => parts,
            TurnContent::Text(_) => &[],
        }
    }

    /// Plain text of a display turn.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TurnContent::Text(text) => Some(text),
            TurnContent::Parts(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.content {
            TurnContent::Text(text) => text.is_empty(),
            TurnContent::Parts(parts) => parts.is_empty(),
        }
    }
}

/// Ordered, append-only list of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    pub fn push(&mut self, turn: ConversationTurn) -> Result<()> {
        if turn.is_empty() {
            return Err(Error::Invariant(
                "conversation turns must carry at least one content part".to_string(),
            ));
        }
        self.turns.push(turn);
        Ok(())
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }
}

/// Which route the gateway client takes to the model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Through the proxy endpoint (default).
    Proxy,
    /// Straight to the provider's Messages API.
    Direct,
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proxy" => Ok(TransportMode::Proxy),
            "direct" => Ok(TransportMode::Direct),
            other => Err(Error::Config(format!(
                "ANALYZER_TRANSPORT must be 'proxy' or 'direct', got '{}'",
                other
            ))),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub transport: TransportMode,
    pub proxy_url: String,
    pub anthropic_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub listen_addr: String,
    pub credential_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = match lookup("ANALYZER_TRANSPORT") {
            Some(value) => value.parse()?,
            None => TransportMode::Proxy,
        };

        let max_tokens = match lookup("ANTHROPIC_MAX_TOKENS") {
            Some(value) => parse_number("ANTHROPIC_MAX_TOKENS", &value)?,
            None => DEFAULT_MAX_TOKENS,
        };

        let timeout_secs: u64 = match lookup("ANALYZER_TIMEOUT_SECS") {
            Some(value) => parse_number("ANALYZER_TIMEOUT_SECS", &value)?,
            None => 120,
        };
        if timeout_secs == 0 {
            return Err(Error::Config(
                "ANALYZER_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let credential_dir = lookup("ANALYZER_CREDENTIAL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_credential_dir);

        Ok(Self {
            transport,
            proxy_url: lookup("ANALYZER_PROXY_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8888/analyze".to_string()),
            anthropic_base_url: lookup("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: lookup("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            request_timeout: Duration::from_secs(timeout_secs),
            listen_addr: lookup("PROXY_LISTEN_ADDR")
                .unwrap_or_else(|| "127.0.0.1:8888".to_string()),
            credential_dir,
        })
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a positive integer, got '{}'", name, value)))
}

fn default_credential_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("historical-doc-analyzer"))
        .unwrap_or_else(|| PathBuf::from(".historical-doc-analyzer"))
}
