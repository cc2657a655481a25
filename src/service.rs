//! Analyst service
//!
//! Ties the pieces together for one request: validate, pick a provider,
//! generate, post-process, and separately execute SQL. The HTTP server and
//! the in-process chat backend both sit on top of this.

use std::sync::Arc;

use serde::Serialize;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::LlmError;
use crate::executor::SqlExecutor;
use crate::manager::ProviderManager;
use crate::providers::{build_http_client, default_candidates};
use crate::registry::ProviderInfo;
use crate::semantic_model::SemanticModel;
use crate::sql::postprocess_generated_sql;
use crate::types::{ExecutionRequest, ExecutionResult, GenerationRequest, GenerationResult};

/// `GET /api/providers` payload.
#[derive(Debug, Clone, Serialize)]
pub struct ProvidersOverview {
    pub default_provider: String,
    pub providers: Vec<ProviderInfo>,
}

#[derive(Debug, Clone)]
pub struct AnalystService {
    manager: Arc<ProviderManager>,
    // Load failure is kept so the server can start and report it per request.
    semantic_model: Result<SemanticModel, LlmError>,
    executor: Arc<SqlExecutor>,
    default_provider: String,
}

impl AnalystService {
    pub fn new(
        manager: Arc<ProviderManager>,
        semantic_model: Result<SemanticModel, LlmError>,
        executor: Arc<SqlExecutor>,
        default_provider: impl Into<String>,
    ) -> Self {
        Self {
            manager,
            semantic_model,
            executor,
            default_provider: default_provider.into(),
        }
    }

    /// Build everything from configuration and the environment.
    ///
    /// Only the database is required. A missing semantic model or zero
    /// configured providers are logged and surface later as request errors.
    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        let semantic_model = SemanticModel::load(&config.semantic_model_path)
            .map(|model| model.with_dialect(&config.sql_dialect))
            .inspect_err(|e| tracing::error!(error = %e, "Semantic model unavailable"));

        let http_client = build_http_client(config.http_timeout())?;
        let (manager, outcomes) = ProviderManager::initialize(default_candidates(&http_client));
        tracing::info!(
            registered = outcomes.iter().filter(|o| o.is_registered()).count(),
            candidates = outcomes.len(),
            "Provider initialization complete"
        );
        if !manager.is_provider_available(&config.default_provider) {
            tracing::warn!(
                provider = %config.default_provider,
                "Default provider is not available"
            );
        }

        let executor = SqlExecutor::open(&config.database_url)?;
        Ok(Self::new(
            Arc::new(manager),
            semantic_model,
            Arc::new(executor),
            config.default_provider.clone(),
        ))
    }

    pub fn manager(&self) -> &ProviderManager {
        &self.manager
    }

    pub fn executor(&self) -> &Arc<SqlExecutor> {
        &self.executor
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Turn a question into cleaned SQL.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, LlmError> {
        request
            .validate()
            .map_err(|e| LlmError::InvalidInput(e.to_string()))?;

        let provider = request
            .provider
            .as_deref()
            .unwrap_or(&self.default_provider);
        let semantic_model = self.semantic_model.as_ref().map_err(Clone::clone)?;

        tracing::info!(provider, question = %request.question, "Generating SQL");
        let raw = self
            .manager
            .generate_sql_with_options(
                provider,
                &request.question,
                semantic_model,
                &request.options(),
            )
            .await?;

        let generated_sql = postprocess_generated_sql(&raw).inspect_err(|_| {
            tracing::info!(provider, "Question rejected by provider");
        })?;

        let result = GenerationResult {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_question: request.question,
            generated_sql,
            warnings: Vec::new(),
        };
        tracing::debug!(
            request_id = %result.request_id,
            sql = %result.generated_sql,
            "SQL generated"
        );
        Ok(result)
    }

    /// Run SQL on the blocking pool.
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let executor = Arc::clone(&self.executor);
        tokio::task::spawn_blocking(move || executor.execute(&request.sql_query))
            .await
            .unwrap_or_else(|e| ExecutionResult::Error(format!("Execution task failed: {e}")))
    }

    pub async fn describe_schema(&self) -> Result<String, LlmError> {
        let executor = Arc::clone(&self.executor);
        tokio::task::spawn_blocking(move || executor.describe_schema())
            .await
            .map_err(|e| LlmError::InternalError(format!("Schema task failed: {e}")))?
    }

    pub fn providers(&self) -> ProvidersOverview {
        ProvidersOverview {
            default_provider: self.default_provider.clone(),
            providers: self
                .manager
                .available_providers()
                .iter()
                .filter_map(|id| self.manager.provider_info(id))
                .collect(),
        }
    }
}
