//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! The `Display` text of the provider-facing variants is what the session
//! shows to the user, so it is written as a user-facing message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API key is required")]
    MissingCredential,

    #[error("Unsupported file type '{0}'. Please upload an image or a PDF.")]
    UnsupportedMedia(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: could not reach the analysis service ({0})")]
    Network(#[from] reqwest::Error),

    #[error("Invalid API key. Please enter a valid key.")]
    Auth,

    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    RateLimit,

    #[error("Bad request: the document may be too large or corrupted ({0})")]
    BadRequest(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from the analysis service: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
