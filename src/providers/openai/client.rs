//! `OpenAI` chat completions client

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::config::OpenAiConfig;
use super::PROVIDER_ID;
use crate::error::LlmError;
use crate::observability::ProviderTracer;
use crate::providers::transport::post_json;
use crate::semantic_model::SemanticModel;
use crate::traits::{SqlGenerator, TextGenerator};
use crate::types::GenerationOptions;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
    tracer: ProviderTracer,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig, http_client: reqwest::Client) -> Self {
        let tracer = ProviderTracer::new(PROVIDER_ID).with_model(config.model.clone());
        Self {
            config,
            http_client,
            tracer,
        }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn build_headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", self.config.api_key.expose_secret());
        let mut auth = HeaderValue::from_str(&bearer)
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid API key header: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        if let Some(org) = &self.config.organization {
            let value = HeaderValue::from_str(org).map_err(|e| {
                LlmError::ConfigurationError(format!("Invalid organization header: {e}"))
            })?;
            headers.insert(HeaderName::from_static("openai-organization"), value);
        }
        Ok(headers)
    }

    async fn complete(
        &self,
        system_prompt: Option<&str>,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_prompt,
        });

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };
        let url = format!("{}/chat/completions", self.config.base_url);
        let response: ChatCompletionResponse = post_json(
            &self.http_client,
            &self.tracer,
            &url,
            self.build_headers()?,
            &request,
        )
        .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                LlmError::ParseError("OpenAI response contained no message content".into())
            })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn provider_name(&self) -> &str {
        "OpenAI"
    }

    fn validate_configuration(&self) -> bool {
        self.config.is_valid()
    }

    async fn generate_response(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        self.complete(options.system_prompt.as_deref(), prompt, options)
            .await
    }
}

#[async_trait]
impl SqlGenerator for OpenAiClient {
    async fn generate_sql_from_question(
        &self,
        question: &str,
        semantic_model: &SemanticModel,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let system_prompt = crate::prompt::build_sql_system_prompt(semantic_model);
        let sql = self.complete(Some(&system_prompt), question, options).await?;
        tracing::debug!(provider = PROVIDER_ID, sql = %sql, "Generated SQL");
        Ok(sql)
    }
}
