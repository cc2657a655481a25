//! Snowflake Cortex Analyst provider
//!
//! An analyst service rather than a raw completion endpoint: it receives the
//! semantic model with each question and answers with typed content blocks
//! (`text`, `sql`, `suggestions`).

mod client;
mod config;
pub mod types;

pub use client::CortexClient;
pub use config::CortexConfig;

/// Registry name.
pub const PROVIDER_ID: &str = "cortex";
