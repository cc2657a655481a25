//! Logging setup and provider request tracing.

pub mod tracing;

pub use self::tracing::{
    OutputFormat, ProviderTracer, TracingConfig, format_headers_for_logging, init_tracing,
    mask_sensitive_value,
};
