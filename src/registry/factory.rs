//! Provider candidates and their registration outcome.

use serde::Serialize;

use super::ProviderStrategy;
use crate::error::LlmError;

type Factory = Box<dyn FnOnce() -> Result<ProviderStrategy, LlmError> + Send>;

/// A provider the manager will try to construct and register.
pub struct ProviderCandidate {
    pub(crate) id: String,
    pub(crate) factory: Factory,
}

impl ProviderCandidate {
    pub fn new<F>(id: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce() -> Result<ProviderStrategy, LlmError> + Send + 'static,
    {
        Self {
            id: id.into(),
            factory: Box::new(factory),
        }
    }

    /// Candidate wrapping an already constructed strategy.
    pub fn ready(id: impl Into<String>, strategy: ProviderStrategy) -> Self {
        Self::new(id, move || Ok(strategy))
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Debug for ProviderCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCandidate")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    Skipped(String),
}

/// What happened to one candidate during startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome {
    pub id: String,
    #[serde(flatten)]
    pub status: RegistrationStatus,
}

impl RegistrationOutcome {
    pub fn is_registered(&self) -> bool {
        self.status == RegistrationStatus::Registered
    }
}
