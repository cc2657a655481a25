use thiserror::Error;

/// Coarse classification used to decide how an error reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing credentials, endpoints or semantic model.
    Configuration,
    /// The caller sent something we cannot act on.
    Client,
    /// The model decided the question cannot be answered from the schema.
    Rejection,
    /// Network, endpoint or payload failure talking to an LLM provider.
    Provider,
    /// The database refused or failed to run a statement.
    Execution,
    Internal,
}

/// Errors produced while generating or executing SQL.
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// `available` is the sorted list of registered provider names.
    #[error("Unsupported AI provider: {provider}. Available providers: {available:?}")]
    UnsupportedProvider {
        provider: String,
        available: Vec<String>,
    },

    #[error("{0}")]
    SemanticRejection(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Request timed out: {0}")]
    TimeoutError(String),

    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    /// Database error message, passed through verbatim.
    #[error("{0}")]
    ExecutionError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl LlmError {
    /// Shorthand for a non-success provider response.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn unsupported_provider(provider: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnsupportedProvider {
            provider: provider.into(),
            available,
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
            Self::UnsupportedProvider { .. } | Self::InvalidInput(_) => ErrorCategory::Client,
            Self::SemanticRejection(_) => ErrorCategory::Rejection,
            Self::HttpError(_)
            | Self::TimeoutError(_)
            | Self::ApiError { .. }
            | Self::ParseError(_) => ErrorCategory::Provider,
            Self::ExecutionError(_) => ErrorCategory::Execution,
            Self::IoError(_) | Self::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// Upstream status code, when the error came from an HTTP response.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Status code reported at the HTTP API boundary.
    ///
    /// Rejections, bad input and execution errors are the caller's concern
    /// (400); everything else is a server-side failure (500).
    pub const fn http_status(&self) -> u16 {
        match self.category() {
            ErrorCategory::Client | ErrorCategory::Rejection | ErrorCategory::Execution => 400,
            ErrorCategory::Configuration | ErrorCategory::Provider | ErrorCategory::Internal => 500,
        }
    }

    pub const fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}
