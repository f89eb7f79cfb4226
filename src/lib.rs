//! Historical document analyzer - asks an AI model to interpret scanned
//! historical documents and answer follow-up questions about them
//!
//! A selected image or PDF is base64-encoded, wrapped into a multi-part
//! conversation turn and sent to the Anthropic Messages API, either directly
//! or through the bundled proxy endpoint.

pub mod ai;
pub mod app;
pub mod conversation;
pub mod credential;
pub mod document;
pub mod error;
pub mod models;
pub mod prompts;
pub mod proxy;
pub mod session;

pub use error::{Error, Result};
