use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-call sampling options passed to a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Overrides the provider's default system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Fields set on `overrides` win; everything else is kept.
    pub fn merge(mut self, overrides: &GenerationOptions) -> Self {
        if overrides.temperature.is_some() {
            self.temperature = overrides.temperature;
        }
        if overrides.max_tokens.is_some() {
            self.max_tokens = overrides.max_tokens;
        }
        if overrides.system_prompt.is_some() {
            self.system_prompt = overrides.system_prompt.clone();
        }
        self
    }
}

/// Body of `POST /api/generate_sql`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerationRequest {
    /// Natural language question from the user.
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub question: String,
    /// Registered provider name; the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub max_tokens: Option<u32>,
    /// Accepted for compatibility with older clients; not used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl GenerationRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            provider: None,
            temperature: None,
            max_tokens: None,
            user_name: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sampling overrides carried by this request.
    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            system_prompt: None,
        }
    }
}

/// Response of `POST /api/generate_sql`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Correlates a chat message with its result; never stored.
    pub request_id: String,
    pub user_question: String,
    pub generated_sql: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_overrides() {
        let base = GenerationOptions::new()
            .with_temperature(0.0)
            .with_max_tokens(500)
            .with_system_prompt("rules");
        let merged = base.merge(&GenerationOptions::new().with_max_tokens(64));
        assert_eq!(merged.temperature, Some(0.0));
        assert_eq!(merged.max_tokens, Some(64));
        assert_eq!(merged.system_prompt.as_deref(), Some("rules"));
    }

    #[test]
    fn request_validation() {
        assert!(GenerationRequest::new("How many orders?").validate().is_ok());
        assert!(GenerationRequest::new("").validate().is_err());

        let mut hot = GenerationRequest::new("q");
        hot.temperature = Some(3.5);
        assert!(hot.validate().is_err());
    }

    #[test]
    fn request_accepts_legacy_user_name() {
        let req: GenerationRequest =
            serde_json::from_str(r#"{"question":"q","user_name":"default_user"}"#).unwrap();
        assert_eq!(req.question, "q");
        assert!(req.provider.is_none());
        assert_eq!(req.options(), GenerationOptions::default());
    }
}
