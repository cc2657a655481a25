use secrecy::{ExposeSecret, SecretString};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini-specific configuration parameters
#[derive(Debug)]
pub struct GeminiConfig {
    /// API key for authentication
    pub api_key: SecretString,
    /// Base URL for the Gemini API
    pub base_url: String,
    /// Default model to use
    pub model: String,
}

impl GeminiConfig {
    /// Create a new Gemini configuration with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// `GEMINI_API_KEY` (or `GOOGLE_API_KEY`), `GEMINI_MODEL`, `GEMINI_BASE_URL`.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .unwrap_or_default();
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config = config.with_model(model);
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        config
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
            && !self.model.trim().is_empty()
            && (self.base_url.starts_with("http://") || self.base_url.starts_with("https://"))
    }
}
