//! Snowflake Cortex Analyst REST client

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;

use super::PROVIDER_ID;
use super::config::CortexConfig;
use super::types::{AnalystRequest, AnalystRequestMessage, AnalystResponse, RequestContent};
use crate::error::LlmError;
use crate::observability::ProviderTracer;
use crate::prompt::CANNOT_ANSWER_SENTINEL;
use crate::providers::transport::post_json;
use crate::semantic_model::SemanticModel;
use crate::traits::{SqlGenerator, TextGenerator};
use crate::types::GenerationOptions;

const MESSAGE_PATH: &str = "/api/v2/cortex/analyst/message";

/// Analyst service strategy. The semantic model travels in the request
/// itself, so no prompt template is involved and sampling options are not
/// applicable.
pub struct CortexClient {
    config: CortexConfig,
    http_client: reqwest::Client,
    headers: HeaderMap,
    tracer: ProviderTracer,
}

impl CortexClient {
    /// Fails when the token cannot be encoded as a header value.
    pub fn new(config: CortexConfig, http_client: reqwest::Client) -> Result<Self, LlmError> {
        let headers = build_headers(&config)?;
        Ok(Self {
            config,
            http_client,
            headers,
            tracer: ProviderTracer::new(PROVIDER_ID),
        })
    }

    pub fn config(&self) -> &CortexConfig {
        &self.config
    }

    async fn send_message(
        &self,
        question: &str,
        semantic_model: Option<&str>,
    ) -> Result<AnalystResponse, LlmError> {
        let semantic_model_file = self.config.semantic_model_file.as_deref();
        if semantic_model_file.is_none() && semantic_model.is_none() {
            return Err(LlmError::ConfigurationError(
                "Cortex Analyst needs a semantic model: set CORTEX_SEMANTIC_MODEL_FILE".into(),
            ));
        }
        let request = AnalystRequest {
            messages: vec![AnalystRequestMessage {
                role: "user",
                content: vec![RequestContent::Text { text: question }],
            }],
            semantic_model: semantic_model.filter(|_| semantic_model_file.is_none()),
            semantic_model_file,
        };
        let url = format!("{}{}", self.config.account_url, MESSAGE_PATH);
        let response: AnalystResponse = post_json(
            &self.http_client,
            &self.tracer,
            &url,
            self.headers.clone(),
            &request,
        )
        .await?;
        for warning in &response.warnings {
            tracing::warn!(
                provider = PROVIDER_ID,
                request_id = ?response.request_id,
                "{}",
                warning.message
            );
        }
        Ok(response)
    }
}

fn build_headers(config: &CortexConfig) -> Result<HeaderMap, LlmError> {
    let token = config.token.expose_secret();
    let auth = match &config.token_type {
        Some(_) => format!("Bearer {token}"),
        None => format!("Snowflake Token=\"{token}\""),
    };
    let mut auth = HeaderValue::from_str(&auth)
        .map_err(|e| LlmError::ConfigurationError(format!("Invalid Snowflake token: {e}")))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    if let Some(token_type) = &config.token_type {
        let value = HeaderValue::from_str(token_type).map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid Snowflake token type: {e}"))
        })?;
        headers.insert(
            HeaderName::from_static("x-snowflake-authorization-token-type"),
            value,
        );
    }
    Ok(headers)
}

#[async_trait]
impl TextGenerator for CortexClient {
    fn provider_name(&self) -> &str {
        "Snowflake Cortex Analyst"
    }

    fn validate_configuration(&self) -> bool {
        self.config.is_valid()
    }

    /// Raw analyst reply: the text blocks of the answer. Needs a configured
    /// stage model since no inline model is available here.
    async fn generate_response(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let response = self.send_message(prompt, None).await?;
        let text = response.message.text();
        if text.trim().is_empty() {
            return Err(LlmError::ParseError(
                "Cortex Analyst response contained no text".into(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl SqlGenerator for CortexClient {
    /// First SQL block of the reply. When the analyst answers without SQL
    /// (ambiguous or out-of-model question) the sentinel is returned, followed
    /// by the analyst's explanation.
    async fn generate_sql_from_question(
        &self,
        question: &str,
        semantic_model: &SemanticModel,
        _options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let response = self
            .send_message(question, Some(semantic_model.as_str()))
            .await?;
        if let Some(sql) = response.message.first_sql() {
            return Ok(sql.to_string());
        }

        let explanation = response.message.text();
        tracing::info!(
            provider = PROVIDER_ID,
            request_id = ?response.request_id,
            suggestions = ?response.message.suggestions(),
            "Analyst returned no SQL"
        );
        if explanation.trim().is_empty() {
            Ok(CANNOT_ANSWER_SENTINEL.to_string())
        } else {
            Ok(format!("{CANNOT_ANSWER_SENTINEL}\n{explanation}"))
        }
    }
}
