use secrecy::{ExposeSecret, SecretString};

/// Snowflake Cortex Analyst connection settings.
#[derive(Debug)]
pub struct CortexConfig {
    /// Account URL, e.g. `https://<account>.snowflakecomputing.com`
    pub account_url: String,
    /// Session, OAuth or key-pair JWT token
    pub token: SecretString,
    /// `X-Snowflake-Authorization-Token-Type` (e.g. `OAUTH`, `KEYPAIR_JWT`).
    /// When unset the legacy `Snowflake Token="..."` scheme is used.
    pub token_type: Option<String>,
    /// Stage path of a semantic model (`@DB.SCHEMA.STAGE/model.yaml`); sent
    /// instead of the inline model when set
    pub semantic_model_file: Option<String>,
}

impl CortexConfig {
    pub fn new(account_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account_url: account_url.into().trim_end_matches('/').to_string(),
            token: SecretString::from(token.into()),
            token_type: None,
            semantic_model_file: None,
        }
    }

    /// `SNOWFLAKE_ACCOUNT_URL`, `SNOWFLAKE_TOKEN`, `SNOWFLAKE_TOKEN_TYPE`,
    /// `CORTEX_SEMANTIC_MODEL_FILE`.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("SNOWFLAKE_ACCOUNT_URL").unwrap_or_default(),
            std::env::var("SNOWFLAKE_TOKEN").unwrap_or_default(),
        );
        config.token_type = std::env::var("SNOWFLAKE_TOKEN_TYPE")
            .ok()
            .filter(|v| !v.trim().is_empty());
        config.semantic_model_file = std::env::var("CORTEX_SEMANTIC_MODEL_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty());
        config
    }

    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    pub fn with_semantic_model_file(mut self, path: impl Into<String>) -> Self {
        self.semantic_model_file = Some(path.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
            && (self.account_url.starts_with("http://") || self.account_url.starts_with("https://"))
    }
}
