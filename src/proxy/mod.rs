//! Proxy endpoint
//!
//! Relays `{apiKey, messages}` requests to the model provider so browsers
//! and other clients never call it cross-origin. [`ProxyHandler`] holds the
//! request/response rules; [`ProxyServer`] puts it behind an HTTP listener.

pub mod handler;
pub mod server;

pub use handler::{ProxyHandler, ProxyRequest, ProxyResponse, CORS_HEADERS};
pub use server::{ProxyServer, ShutdownHandle};
