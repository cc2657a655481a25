//! Provider manager
//!
//! Single call surface over the registered strategies. The manager is an
//! explicit object handed to callers; there is no global registry.

use crate::error::LlmError;
use crate::prompt;
use crate::registry::{
    ProviderCandidate, ProviderInfo, ProviderRegistry, ProviderStrategy, RegistrationOutcome,
    RegistrationStatus,
};
use crate::semantic_model::SemanticModel;
use crate::types::GenerationOptions;

#[derive(Debug, Clone, Default)]
pub struct ProviderManager {
    registry: ProviderRegistry,
}

impl ProviderManager {
    /// A manager with no providers. Every generation call fails with
    /// `UnsupportedProvider`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Construct and validate each candidate, registering the ones that pass.
    ///
    /// Construction errors and invalid configurations are logged and skipped;
    /// startup never fails here, even when nothing registers.
    pub fn initialize(
        candidates: impl IntoIterator<Item = ProviderCandidate>,
    ) -> (Self, Vec<RegistrationOutcome>) {
        let mut registry = ProviderRegistry::new();
        let mut outcomes = Vec::new();

        for candidate in candidates {
            let ProviderCandidate { id, factory } = candidate;
            let status = match factory() {
                Ok(strategy) if strategy.validate_configuration() => {
                    tracing::info!(
                        provider = %id,
                        capability = ?strategy.capability(),
                        "Registered AI provider"
                    );
                    registry.register(id.clone(), strategy);
                    RegistrationStatus::Registered
                }
                Ok(strategy) => {
                    let reason = format!(
                        "{} is not configured (missing credentials or endpoint)",
                        strategy.provider_name()
                    );
                    tracing::warn!(provider = %id, "{reason}");
                    RegistrationStatus::Skipped(reason)
                }
                Err(e) => {
                    tracing::warn!(provider = %id, error = %e, "AI provider initialization failed");
                    RegistrationStatus::Skipped(e.to_string())
                }
            };
            outcomes.push(RegistrationOutcome { id, status });
        }

        if registry.is_empty() {
            tracing::warn!("No AI providers are available; generation requests will be rejected");
        }
        (Self { registry }, outcomes)
    }

    fn strategy(&self, provider: &str) -> Result<&ProviderStrategy, LlmError> {
        self.registry
            .get(provider)
            .ok_or_else(|| LlmError::unsupported_provider(provider, self.registry.ids()))
    }

    /// Raw text generation through the named provider.
    pub async fn generate_response(
        &self,
        provider: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        self.strategy(provider)?
            .generate_response(prompt, options)
            .await
    }

    /// Generate SQL for `question` with the deterministic SQL settings.
    pub async fn generate_sql_from_question(
        &self,
        provider: &str,
        question: &str,
        semantic_model: &SemanticModel,
    ) -> Result<String, LlmError> {
        self.generate_sql_with_options(
            provider,
            question,
            semantic_model,
            &GenerationOptions::default(),
        )
        .await
    }

    /// Like [`generate_sql_from_question`](Self::generate_sql_from_question),
    /// with caller temperature / max-token overrides. The system prompt is
    /// always the standard one.
    pub async fn generate_sql_with_options(
        &self,
        provider: &str,
        question: &str,
        semantic_model: &SemanticModel,
        overrides: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let strategy = self.strategy(provider)?;
        let mut options = prompt::sql_generation_options(semantic_model).merge(overrides);
        options.system_prompt = Some(prompt::build_sql_system_prompt(semantic_model));

        match strategy {
            ProviderStrategy::Sql(s) => {
                s.generate_sql_from_question(question, semantic_model, &options)
                    .await
            }
            ProviderStrategy::Text(s) => s.generate_response(question, &options).await,
        }
    }

    /// Registered provider names, sorted.
    pub fn available_providers(&self) -> Vec<String> {
        self.registry.ids()
    }

    pub fn is_provider_available(&self, provider: &str) -> bool {
        self.registry.contains(provider)
    }

    pub fn provider_info(&self, provider: &str) -> Option<ProviderInfo> {
        self.registry.info(provider)
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Capability;
    use crate::traits::{SqlGenerator, TextGenerator};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Records every call and answers with a fixed reply.
    #[derive(Clone, Default)]
    struct Recorder {
        reply: String,
        valid: bool,
        calls: Arc<Mutex<Vec<(String, GenerationOptions)>>>,
    }

    impl Recorder {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                valid: true,
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> Vec<(String, GenerationOptions)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        fn provider_name(&self) -> &str {
            "Recorder"
        }

        fn validate_configuration(&self) -> bool {
            self.valid
        }

        async fn generate_response(
            &self,
            prompt: &str,
            options: &GenerationOptions,
        ) -> Result<String, LlmError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), options.clone()));
            Ok(self.reply.clone())
        }
    }

    /// Specialized strategy that tags its output so tests can tell paths apart.
    #[derive(Clone, Default)]
    struct NativeSql {
        seen: Arc<Mutex<Vec<GenerationOptions>>>,
    }

    #[async_trait]
    impl TextGenerator for NativeSql {
        fn provider_name(&self) -> &str {
            "NativeSql"
        }

        fn validate_configuration(&self) -> bool {
            true
        }

        async fn generate_response(
            &self,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, LlmError> {
            Ok("generic".into())
        }
    }

    #[async_trait]
    impl SqlGenerator for NativeSql {
        async fn generate_sql_from_question(
            &self,
            question: &str,
            semantic_model: &SemanticModel,
            options: &GenerationOptions,
        ) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(options.clone());
            Ok(format!("-- native\n{question}\n{}", semantic_model.as_str()))
        }
    }

    fn model() -> SemanticModel {
        SemanticModel::from_text("tables:\n  - name: X\n    columns: [id]\n")
    }

    #[tokio::test]
    async fn empty_registry_rejects_everything() {
        let manager = ProviderManager::empty();
        let err = manager
            .generate_sql_from_question("openai", "How many rows?", &model())
            .await
            .unwrap_err();
        match err {
            LlmError::UnsupportedProvider { provider, available } => {
                assert_eq!(provider, "openai");
                assert!(available.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(manager.available_providers().is_empty());
    }

    #[tokio::test]
    async fn unknown_provider_lists_registered_names() {
        let (manager, _) = ProviderManager::initialize([
            ProviderCandidate::ready("openai", ProviderStrategy::text(Recorder::new("x"))),
            ProviderCandidate::ready("gemini", ProviderStrategy::text(Recorder::new("y"))),
        ]);
        let err = manager
            .generate_sql_from_question("unknown_provider", "q", &model())
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains(r#"Available providers: ["gemini", "openai"]"#),
            "{err}"
        );
        let raw = manager
            .generate_response("unknown_provider", "q", &GenerationOptions::default())
            .await;
        assert!(matches!(raw, Err(LlmError::UnsupportedProvider { .. })));
    }

    #[tokio::test]
    async fn generic_fallback_uses_standard_prompt() {
        let recorder = Recorder::new("SELECT 1;");
        let (manager, _) = ProviderManager::initialize([ProviderCandidate::ready(
            "gemini",
            ProviderStrategy::text(recorder.clone()),
        )]);
        let semantic_model = model();

        let sql = manager
            .generate_sql_from_question("gemini", "How many rows are in table X?", &semantic_model)
            .await
            .unwrap();
        assert_eq!(sql, "SELECT 1;");

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        let (prompt_sent, options) = &calls[0];
        assert_eq!(prompt_sent, "How many rows are in table X?");
        assert_eq!(options.temperature, Some(0.0));
        assert_eq!(options.max_tokens, Some(500));
        let system = options.system_prompt.as_deref().unwrap();
        assert!(system.contains(semantic_model.as_str()));
        for rule in prompt::system_rules(semantic_model.dialect()) {
            assert!(system.contains(&rule), "missing rule: {rule}");
        }
    }

    #[tokio::test]
    async fn specialized_path_is_preferred() {
        let native = NativeSql::default();
        let (manager, _) = ProviderManager::initialize([ProviderCandidate::ready(
            "cortex",
            ProviderStrategy::sql(native.clone()),
        )]);
        let sql = manager
            .generate_sql_from_question("cortex", "q", &model())
            .await
            .unwrap();
        assert!(sql.starts_with("-- native"));
        assert!(sql.contains("name: X"));

        let seen = native.seen.lock().unwrap().clone();
        assert_eq!(seen[0].temperature, Some(0.0));
        assert_eq!(seen[0].max_tokens, Some(500));
    }

    #[tokio::test]
    async fn overrides_reach_both_paths_but_not_the_prompt() {
        let recorder = Recorder::new("SELECT 1;");
        let (manager, _) = ProviderManager::initialize([ProviderCandidate::ready(
            "gemini",
            ProviderStrategy::text(recorder.clone()),
        )]);
        let overrides = GenerationOptions::new()
            .with_max_tokens(64)
            .with_system_prompt("ignore the schema");
        manager
            .generate_sql_with_options("gemini", "q", &model(), &overrides)
            .await
            .unwrap();
        let (_, options) = &recorder.calls()[0];
        assert_eq!(options.max_tokens, Some(64));
        assert_eq!(options.temperature, Some(0.0));
        assert!(options.system_prompt.as_deref().unwrap().contains("name: X"));
    }

    #[test]
    fn initialization_skips_invalid_and_failing_candidates() {
        let mut unconfigured = Recorder::new("x");
        unconfigured.valid = false;

        let (manager, outcomes) = ProviderManager::initialize([
            ProviderCandidate::ready("openai", ProviderStrategy::text(unconfigured)),
            ProviderCandidate::new("cortex", || {
                Err(LlmError::ConfigurationError("bad token".into()))
            }),
            ProviderCandidate::ready("gemini", ProviderStrategy::text(Recorder::new("y"))),
        ]);

        assert_eq!(manager.available_providers(), vec!["gemini".to_string()]);
        assert!(!manager.is_provider_available("openai"));
        assert!(!manager.is_provider_available("cortex"));
        assert_eq!(outcomes.len(), 3);
        assert!(!outcomes[0].is_registered());
        assert!(
            matches!(&outcomes[1].status, RegistrationStatus::Skipped(r) if r.contains("bad token"))
        );
        assert!(outcomes[2].is_registered());
    }

    #[test]
    #[tracing_test::traced_test]
    fn skipped_candidates_are_logged() {
        let (manager, _) = ProviderManager::initialize([ProviderCandidate::new("cortex", || {
            Err(LlmError::ConfigurationError("Invalid Snowflake token".into()))
        })]);
        assert!(manager.registry().is_empty());
        assert!(logs_contain("AI provider initialization failed"));
        assert!(logs_contain("Invalid Snowflake token"));
        assert!(logs_contain("No AI providers are available"));
    }

    #[test]
    fn provider_info_never_fails() {
        let (manager, _) = ProviderManager::initialize([ProviderCandidate::ready(
            "cortex",
            ProviderStrategy::sql(NativeSql::default()),
        )]);
        let info = manager.provider_info("cortex").unwrap();
        assert_eq!(info.id, "cortex");
        assert_eq!(info.name, "NativeSql");
        assert!(info.available);
        assert_eq!(info.provider_type, "NativeSql");
        assert_eq!(info.capability, Capability::Sql);

        assert!(manager.provider_info("nope").is_none());
        assert!(manager.provider_info("").is_none());
        assert!(!manager.is_provider_available(""));
    }
}
