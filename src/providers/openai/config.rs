//! `OpenAI` configuration

use secrecy::{ExposeSecret, SecretString};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// Connection settings for the chat completions API.
#[derive(Debug)]
pub struct OpenAiConfig {
    /// API key for authentication
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    /// Sent as `OpenAI-Organization` when set
    pub organization: Option<String>,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            organization: None,
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL` and
    /// `OPENAI_ORGANIZATION`. A missing key yields an invalid config rather
    /// than an error.
    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var("OPENAI_API_KEY").unwrap_or_default());
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config = config.with_model(model);
        }
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(org) = std::env::var("OPENAI_ORGANIZATION") {
            config = config.with_organization(org);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
            && !self.model.trim().is_empty()
            && (self.base_url.starts_with("http://") || self.base_url.starts_with("https://"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = OpenAiConfig::new("sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.is_valid());
    }

    #[test]
    fn empty_key_is_invalid() {
        assert!(!OpenAiConfig::new("").is_valid());
        assert!(!OpenAiConfig::new("   ").is_valid());
    }

    #[test]
    fn base_url_must_be_http() {
        let config = OpenAiConfig::new("sk-test").with_base_url("api.openai.com/v1");
        assert!(!config.is_valid());
        let config = OpenAiConfig::new("sk-test").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert!(config.is_valid());
    }

    #[test]
    fn debug_hides_key() {
        let config = OpenAiConfig::new("sk-super-secret-value");
        assert!(!format!("{config:?}").contains("sk-super-secret-value"));
    }
}
