//! Tracing - logging setup and per-provider request instrumentation.

use std::time::Instant;

use ::tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::error::LlmError;

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: OutputFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: OutputFormat::Pretty,
        }
    }
}

impl TracingConfig {
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: OutputFormat::Pretty,
        }
    }

    pub fn json_production() -> Self {
        Self {
            level: "info".to_string(),
            format: OutputFormat::Json,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `config.level`.
pub fn init_tracing(config: &TracingConfig) -> Result<(), LlmError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LlmError::ConfigurationError(format!("Invalid log filter: {e}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        OutputFormat::Pretty => builder.pretty().try_init(),
        OutputFormat::Compact => builder.compact().try_init(),
        OutputFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| LlmError::ConfigurationError(format!("Failed to init tracing: {e}")))
}

/// Mask a credential so it can appear in logs.
pub fn mask_sensitive_value(value: &str) -> String {
    if let Some(token) = value.strip_prefix("Bearer ") {
        return format!("Bearer {}", mask_sensitive_value(token));
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

/// Render headers as JSON with credential-bearing values masked.
pub fn format_headers_for_logging(headers: &reqwest::header::HeaderMap) -> String {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(k, v)| {
            let name = k.as_str().to_ascii_lowercase();
            let value = v.to_str().unwrap_or("<invalid>");
            let shown = if name.contains("authorization")
                || name.contains("key")
                || name.contains("token")
            {
                mask_sensitive_value(value)
            } else {
                value.to_string()
            };
            (k.as_str().to_string(), serde_json::Value::String(shown))
        })
        .collect();
    serde_json::Value::Object(map).to_string()
}

/// Per-provider request logger.
#[derive(Debug, Clone)]
pub struct ProviderTracer {
    provider: String,
    model: Option<String>,
}

impl ProviderTracer {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn trace_request_start(&self, method: &str, url: &str) {
        info!(
            provider = %self.provider,
            model = ?self.model,
            method = %method,
            url = %url,
            "Request started"
        );
    }

    pub fn trace_request_details(&self, headers: &reqwest::header::HeaderMap) {
        debug!(
            provider = %self.provider,
            model = ?self.model,
            request_headers = %format_headers_for_logging(headers),
            "Request details"
        );
    }

    pub fn trace_request_complete(&self, started: Instant, response_length: usize) {
        let duration_ms = started.elapsed().as_millis();
        info!(
            provider = %self.provider,
            model = ?self.model,
            duration_ms = duration_ms,
            response_length = response_length,
            "Request completed"
        );
    }

    pub fn trace_request_error(
        &self,
        status_code: Option<u16>,
        error_text: &str,
        started: Instant,
    ) {
        let duration_ms = started.elapsed().as_millis();
        error!(
            provider = %self.provider,
            model = ?self.model,
            status_code = ?status_code,
            error_text = %error_text,
            duration_ms = duration_ms,
            "Request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

    #[test]
    fn masks_long_and_short_secrets() {
        assert_eq!(mask_sensitive_value("sk-abcdefghijklmnop"), "sk-a...mnop");
        assert_eq!(mask_sensitive_value("short"), "***");
        assert_eq!(
            mask_sensitive_value("Bearer sk-abcdefghijklmnop"),
            "Bearer sk-a...mnop"
        );
    }

    #[test]
    fn headers_are_masked() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer sk-abcdefghijklmnop"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-goog-api-key", HeaderValue::from_static("AIzaSyExampleKey123"));

        let rendered = format_headers_for_logging(&headers);
        assert!(!rendered.contains("abcdefghijklmnop"));
        assert!(!rendered.contains("AIzaSyExampleKey123"));
        assert!(rendered.contains("application/json"));
    }
}
