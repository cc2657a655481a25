//! Gemini client implementation

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;

use super::PROVIDER_ID;
use super::config::GeminiConfig;
use super::convert::{GenerateContentResponse, build_request, extract_text};
use crate::error::LlmError;
use crate::observability::ProviderTracer;
use crate::providers::transport::post_json;
use crate::traits::TextGenerator;
use crate::types::GenerationOptions;

/// Text-only strategy: SQL generation goes through the manager's generic prompt.
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
    tracer: ProviderTracer,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, http_client: reqwest::Client) -> Self {
        let tracer = ProviderTracer::new(PROVIDER_ID).with_model(config.model.clone());
        Self {
            config,
            http_client,
            tracer,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn build_headers(&self) -> Result<HeaderMap, LlmError> {
        let mut key = HeaderValue::from_str(self.config.api_key.expose_secret())
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid API key header: {e}")))?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-goog-api-key"), key);
        Ok(headers)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn provider_name(&self) -> &str {
        "Google Gemini"
    }

    fn validate_configuration(&self) -> bool {
        self.config.is_valid()
    }

    async fn generate_response(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let request = build_request(prompt, options);
        let response: GenerateContentResponse = post_json(
            &self.http_client,
            &self.tracer,
            &self.generate_content_url(),
            self.build_headers()?,
            &request,
        )
        .await?;
        extract_text(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_includes_model() {
        let client = GeminiClient::new(
            GeminiConfig::new("key").with_base_url("http://localhost:9000/v1beta/"),
            reqwest::Client::new(),
        );
        assert_eq!(
            client.generate_content_url(),
            "http://localhost:9000/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn validation_follows_config() {
        let http = reqwest::Client::new();
        assert!(GeminiClient::new(GeminiConfig::new("key"), http.clone()).validate_configuration());
        assert!(!GeminiClient::new(GeminiConfig::new(""), http).validate_configuration());
    }
}
