//! Provider capability traits
//!
//! Every provider implements [`TextGenerator`]. Providers that know how to
//! turn a question into SQL themselves (with their own prompt or a native
//! analyst API) also implement [`SqlGenerator`]; the rest go through the
//! manager's generic prompt.

use async_trait::async_trait;

use crate::error::LlmError;
use crate::semantic_model::SemanticModel;
use crate::types::GenerationOptions;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Stable human-readable identifier for diagnostics.
    fn provider_name(&self) -> &str;

    /// Short name of the implementing type.
    fn strategy_type(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Whether credentials and endpoints are present.
    ///
    /// Must not perform I/O and must not panic; a `false` keeps the provider
    /// out of the registry.
    fn validate_configuration(&self) -> bool;

    /// Send one prompt and return the raw text reply.
    async fn generate_response(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError>;
}

#[async_trait]
pub trait SqlGenerator: TextGenerator {
    /// Generate SQL for `question` against `semantic_model`.
    ///
    /// `options` arrive pre-filled with the deterministic SQL settings
    /// (temperature 0, bounded output); implementations must reply with
    /// [`CANNOT_ANSWER_SENTINEL`](crate::prompt::CANNOT_ANSWER_SENTINEL)
    /// when the question cannot be answered.
    async fn generate_sql_from_question(
        &self,
        question: &str,
        semantic_model: &SemanticModel,
        options: &GenerationOptions,
    ) -> Result<String, LlmError>;
}
