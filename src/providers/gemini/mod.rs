//! Google Gemini provider (`generateContent` REST API).

mod client;
mod config;
pub mod convert;

pub use client::GeminiClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiConfig};

/// Registry name.
pub const PROVIDER_ID: &str = "gemini";
