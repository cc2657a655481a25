//! Semantic model loading
//!
//! The semantic model is a static description of tables, columns and
//! relationships (usually YAML). It is read once and substituted verbatim
//! into prompts; nothing here parses it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LlmError;
use crate::prompt::DEFAULT_DIALECT;

/// Immutable schema description plus the SQL dialect queries must target.
#[derive(Clone, PartialEq, Eq)]
pub struct SemanticModel {
    text: Arc<str>,
    dialect: Arc<str>,
    source: Option<PathBuf>,
}

impl SemanticModel {
    /// Wrap schema text that is already in memory.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Arc::from(text.into()),
            dialect: Arc::from(DEFAULT_DIALECT),
            source: None,
        }
    }

    /// Read the model from `path`.
    ///
    /// A missing or empty file is a configuration error: no provider can
    /// generate SQL without it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LlmError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LlmError::ConfigurationError(format!(
                    "Semantic model file not found at path: {}",
                    path.display()
                ))
            } else {
                LlmError::ConfigurationError(format!(
                    "Failed to read semantic model {}: {e}",
                    path.display()
                ))
            }
        })?;
        if text.trim().is_empty() {
            return Err(LlmError::ConfigurationError(format!(
                "Semantic model file is empty: {}",
                path.display()
            )));
        }
        tracing::info!(path = %path.display(), bytes = text.len(), "Loaded semantic model");
        Ok(Self {
            source: Some(path.to_path_buf()),
            ..Self::from_text(text)
        })
    }

    pub fn with_dialect(mut self, dialect: impl AsRef<str>) -> Self {
        self.dialect = Arc::from(dialect.as_ref());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

// Model text can be large; keep Debug output to a summary.
impl fmt::Debug for SemanticModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticModel")
            .field("dialect", &self.dialect)
            .field("source", &self.source)
            .field("bytes", &self.text.len())
            .finish()
    }
}
