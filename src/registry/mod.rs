//! Provider registry
//!
//! Name → strategy map built once at startup from the candidates whose
//! configuration validates. Each entry remembers which capability set its
//! strategy declared, so dispatch never has to probe for methods.

mod factory;

pub use factory::{ProviderCandidate, RegistrationOutcome, RegistrationStatus};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::LlmError;
use crate::traits::{SqlGenerator, TextGenerator};
use crate::types::GenerationOptions;

/// Capability set a strategy declared at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Plain text generation; SQL goes through the generic prompt.
    Text,
    /// Specialized SQL generation.
    Sql,
}

/// A registered strategy, tagged with its capability set.
#[derive(Clone)]
pub enum ProviderStrategy {
    Text(Arc<dyn TextGenerator>),
    Sql(Arc<dyn SqlGenerator>),
}

impl ProviderStrategy {
    pub fn text(strategy: impl TextGenerator + 'static) -> Self {
        Self::Text(Arc::new(strategy))
    }

    pub fn sql(strategy: impl SqlGenerator + 'static) -> Self {
        Self::Sql(Arc::new(strategy))
    }

    pub const fn capability(&self) -> Capability {
        match self {
            Self::Text(_) => Capability::Text,
            Self::Sql(_) => Capability::Sql,
        }
    }

    pub fn provider_name(&self) -> &str {
        match self {
            Self::Text(s) => s.provider_name(),
            Self::Sql(s) => s.provider_name(),
        }
    }

    pub fn strategy_type(&self) -> &'static str {
        match self {
            Self::Text(s) => s.strategy_type(),
            Self::Sql(s) => s.strategy_type(),
        }
    }

    pub fn validate_configuration(&self) -> bool {
        match self {
            Self::Text(s) => s.validate_configuration(),
            Self::Sql(s) => s.validate_configuration(),
        }
    }

    pub async fn generate_response(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        match self {
            Self::Text(s) => s.generate_response(prompt, options).await,
            Self::Sql(s) => s.generate_response(prompt, options).await,
        }
    }
}

impl std::fmt::Debug for ProviderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderStrategy")
            .field("provider_name", &self.provider_name())
            .field("strategy_type", &self.strategy_type())
            .field("capability", &self.capability())
            .finish()
    }
}

/// Introspection record for one registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    /// Registry key, e.g. `openai`
    pub id: String,
    /// Human-readable provider name
    pub name: String,
    /// Result of re-running configuration validation
    pub available: bool,
    /// Implementing type
    pub provider_type: String,
    pub capability: Capability,
}

#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    by_id: BTreeMap<String, ProviderStrategy>,
}

impl ProviderRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, id: impl Into<String>, strategy: ProviderStrategy) {
        self.by_id.insert(id.into(), strategy);
    }

    pub fn get(&self, id: &str) -> Option<&ProviderStrategy> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Registered names, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.by_id.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn info(&self, id: &str) -> Option<ProviderInfo> {
        let strategy = self.by_id.get(id)?;
        Some(ProviderInfo {
            id: id.to_string(),
            name: strategy.provider_name().to_string(),
            available: strategy.validate_configuration(),
            provider_type: strategy.strategy_type().to_string(),
            capability: strategy.capability(),
        })
    }
}
