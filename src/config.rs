//! Process configuration
//!
//! Every setting is a CLI flag with an environment variable fallback.
//! Provider credentials are not here: each provider reads its own
//! variables through its `*Config::from_env()`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::observability::{OutputFormat, TracingConfig};
use crate::prompt::DEFAULT_DIALECT;

/// Settings shared by the server and the in-process `ask` command.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Address the HTTP API listens on
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    pub bind_addr: SocketAddr,

    /// SQLite database file, or `:memory:`
    #[arg(long, env = "DATABASE_URL", default_value = "analyst.db")]
    pub database_url: String,

    /// Semantic model describing the database schema
    #[arg(
        long = "semantic-model",
        env = "SEMANTIC_MODEL_PATH",
        default_value = "./semantic_model.yml"
    )]
    pub semantic_model_path: PathBuf,

    /// Provider used when a request names none
    #[arg(long, env = "DEFAULT_PROVIDER", default_value = "openai")]
    pub default_provider: String,

    /// SQL dialect generated queries must target
    #[arg(long, env = "SQL_DIALECT", default_value = DEFAULT_DIALECT)]
    pub sql_dialect: String,

    /// Upper bound for a single LLM call, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 60)]
    pub http_timeout_secs: u64,
}

impl AppConfig {
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: "analyst.db".to_string(),
            semantic_model_path: PathBuf::from("./semantic_model.yml"),
            default_provider: "openai".to_string(),
            sql_dialect: DEFAULT_DIALECT.to_string(),
            http_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Pretty,
        global = true
    )]
    pub log_format: OutputFormat,
}

impl From<&LogArgs> for TracingConfig {
    fn from(args: &LogArgs) -> Self {
        Self {
            level: args.log_level.clone(),
            format: args.log_format,
        }
    }
}
