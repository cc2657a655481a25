//! LLM provider strategies
//!
//! Each submodule owns one backend: its configuration (read from the
//! environment), its wire types and a client implementing the capability
//! traits. [`default_candidates`] lists every built-in provider for the
//! manager to try at startup.

pub mod cortex;
pub mod gemini;
pub mod openai;
pub(crate) mod transport;

use std::time::Duration;

use crate::error::LlmError;
use crate::registry::{ProviderCandidate, ProviderStrategy};

use self::cortex::{CortexClient, CortexConfig};
use self::gemini::{GeminiClient, GeminiConfig};
use self::openai::{OpenAiClient, OpenAiConfig};

/// Shared HTTP client for all providers. `timeout` bounds every LLM call.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LlmError::ConfigurationError(format!("Failed to build HTTP client: {e}")))
}

/// Built-in providers, configured from the environment.
///
/// Configs are read lazily when the manager runs each factory, so a
/// provider with missing credentials is simply skipped.
pub fn default_candidates(http_client: &reqwest::Client) -> Vec<ProviderCandidate> {
    let openai_http = http_client.clone();
    let gemini_http = http_client.clone();
    let cortex_http = http_client.clone();
    vec![
        ProviderCandidate::new(openai::PROVIDER_ID, move || {
            Ok(ProviderStrategy::sql(OpenAiClient::new(
                OpenAiConfig::from_env(),
                openai_http,
            )))
        }),
        ProviderCandidate::new(gemini::PROVIDER_ID, move || {
            Ok(ProviderStrategy::text(GeminiClient::new(
                GeminiConfig::from_env(),
                gemini_http,
            )))
        }),
        ProviderCandidate::new(cortex::PROVIDER_ID, move || {
            Ok(ProviderStrategy::sql(CortexClient::new(
                CortexConfig::from_env(),
                cortex_http,
            )?))
        }),
    ]
}
