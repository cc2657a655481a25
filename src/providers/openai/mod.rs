//! `OpenAI` provider
//!
//! Implements both capabilities: the specialized SQL path sends the standard
//! system prompt as a `system` message with the question as the `user` turn.

mod client;
mod config;

pub use client::OpenAiClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiConfig};

/// Registry name.
pub const PROVIDER_ID: &str = "openai";
