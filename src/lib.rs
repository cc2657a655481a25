//! # sql-analyst
//!
//! Ask a database questions in plain language. A configured LLM provider
//! turns the question into SQL using a static semantic model of the schema,
//! the SQL runs against SQLite, and the rows come back as JSON (HTTP API) or
//! as a text table (terminal chat).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sql_analyst::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LlmError> {
//!     let service = AnalystService::from_config(&AppConfig::default())?;
//!     let result = service
//!         .generate(GenerationRequest::new("How many orders were placed last week?"))
//!         .await?;
//!     let rows = service.execute(ExecutionRequest::new(result.generated_sql)).await;
//!     println!("{rows:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Providers
//!
//! Providers register themselves at startup when their environment is
//! configured: `openai` (`OPENAI_API_KEY`), `gemini` (`GEMINI_API_KEY`) and
//! `cortex` (`SNOWFLAKE_ACCOUNT_URL` + `SNOWFLAKE_TOKEN`). New backends
//! implement [`traits::TextGenerator`] (and optionally
//! [`traits::SqlGenerator`]) and are passed to
//! [`manager::ProviderManager::initialize`] as candidates.

#![deny(unsafe_code)]

pub mod chat;
pub mod config;
pub mod error;
pub mod executor;
pub mod manager;
pub mod observability;
pub mod prompt;
pub mod providers;
pub mod registry;
pub mod semantic_model;
pub mod server;
pub mod service;
pub mod sql;
pub mod traits;
pub mod types;

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::error::{ErrorCategory, LlmError};
    pub use crate::executor::SqlExecutor;
    pub use crate::manager::ProviderManager;
    pub use crate::registry::{Capability, ProviderCandidate, ProviderInfo, ProviderStrategy};
    pub use crate::semantic_model::SemanticModel;
    pub use crate::service::AnalystService;
    pub use crate::traits::{SqlGenerator, TextGenerator};
    pub use crate::types::{
        ExecutionRequest, ExecutionResponse, ExecutionResult, GenerationOptions, GenerationRequest,
        GenerationResult, Row,
    };
}
