use serde::{Deserialize, Serialize};

/// One result row: column name to value, in the order the database returned the columns.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Body of `POST /api/execute_sql`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub sql_query: String,
}

impl ExecutionRequest {
    pub fn new(sql_query: impl Into<String>) -> Self {
        Self {
            sql_query: sql_query.into(),
        }
    }
}

/// Outcome of running one statement. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// Row-returning statement.
    Rows(Vec<Row>),
    /// Statement without a result set; the transaction was committed.
    Affected { rows_affected: usize },
    /// Database error text; the transaction was rolled back.
    Error(String),
}

impl ExecutionResult {
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Wire form: `data` and `error` are mutually exclusive.
    pub fn into_response(self) -> ExecutionResponse {
        match self {
            Self::Rows(rows) => ExecutionResponse {
                data: Some(rows),
                error: None,
            },
            Self::Affected { rows_affected } => {
                let mut status = Row::new();
                status.insert("status".into(), "success".into());
                status.insert("rows_affected".into(), rows_affected.into());
                ExecutionResponse {
                    data: Some(vec![status]),
                    error: None,
                }
            }
            Self::Error(message) => ExecutionResponse {
                data: None,
                error: Some(message),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub data: Option<Vec<Row>>,
    pub error: Option<String>,
}

impl From<ExecutionResponse> for ExecutionResult {
    fn from(response: ExecutionResponse) -> Self {
        match (response.data, response.error) {
            (_, Some(error)) => Self::Error(error),
            (Some(rows), None) => Self::Rows(rows),
            (None, None) => Self::Error("Unknown execution error".to_string()),
        }
    }
}
