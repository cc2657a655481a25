//! Terminal chat
//!
//! A linear conversation: each question is turned into SQL, the SQL is run,
//! and the result is attached to the assistant's reply. Failures become
//! assistant messages; the session itself never errors out.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::LlmError;
use crate::observability::ProviderTracer;
use crate::providers::transport::post_json;
use crate::service::AnalystService;
use crate::types::{
    ExecutionRequest, ExecutionResponse, ExecutionResult, GenerationRequest, GenerationResult, Row,
};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const NO_DATA_MESSAGE: &str = "Query returned no data.";
const SQL_GENERATED_MESSAGE: &str = "Here is the SQL query I generated:";
const CLIENT_USER_NAME: &str = "default_user";
const CHART_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub sql: Option<String>,
    pub request_id: Option<String>,
    /// Outcome of running `sql`, when there is one.
    pub result: Option<ExecutionResult>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sql: None,
            request_id: None,
            result: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            ..Self::user(content)
        }
    }
}

/// Where the chat sends its questions and queries.
#[async_trait]
pub trait AnalystBackend: Send + Sync {
    async fn generate_sql(&self, request: GenerationRequest) -> Result<GenerationResult, LlmError>;

    async fn execute_sql(&self, sql: &str) -> ExecutionResult;
}

/// Talks to a running analyst API.
pub struct HttpBackend {
    base_url: String,
    http_client: reqwest::Client,
    tracer: ProviderTracer,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                LlmError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self::with_client(base_url, http_client))
    }

    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client,
            tracer: ProviderTracer::new("analyst-api"),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl AnalystBackend for HttpBackend {
    async fn generate_sql(
        &self,
        mut request: GenerationRequest,
    ) -> Result<GenerationResult, LlmError> {
        if request.user_name.is_none() {
            request.user_name = Some(CLIENT_USER_NAME.to_string());
        }
        post_json(
            &self.http_client,
            &self.tracer,
            &self.url("/api/generate_sql"),
            HeaderMap::new(),
            &request,
        )
        .await
    }

    async fn execute_sql(&self, sql: &str) -> ExecutionResult {
        let response: Result<ExecutionResponse, LlmError> = post_json(
            &self.http_client,
            &self.tracer,
            &self.url("/api/execute_sql"),
            HeaderMap::new(),
            &ExecutionRequest::new(sql),
        )
        .await;
        match response {
            Ok(response) => response.into(),
            Err(e) => ExecutionResult::Error(error_detail(&e)),
        }
    }
}

/// Runs the service in-process.
pub struct LocalBackend {
    service: Arc<AnalystService>,
}

impl LocalBackend {
    pub fn new(service: Arc<AnalystService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AnalystBackend for LocalBackend {
    async fn generate_sql(&self, request: GenerationRequest) -> Result<GenerationResult, LlmError> {
        self.service.generate(request).await
    }

    async fn execute_sql(&self, sql: &str) -> ExecutionResult {
        self.service.execute(ExecutionRequest::new(sql)).await
    }
}

/// The server's `detail` when the error came back from the API.
fn error_detail(err: &LlmError) -> String {
    match err {
        LlmError::ApiError { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

pub struct ChatSession<B> {
    backend: B,
    provider: Option<String>,
    messages: Vec<ChatMessage>,
}

impl<B: AnalystBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            provider: None,
            messages: Vec::new(),
        }
    }

    /// Send every question to `provider` instead of the server default.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    /// Rows of the most recent successful query, if any.
    pub fn last_rows(&self) -> Option<&[Row]> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.result.as_ref().and_then(ExecutionResult::rows))
    }

    /// Ask one question. Returns the assistant's reply.
    pub async fn ask(&mut self, question: &str) -> &ChatMessage {
        self.messages.push(ChatMessage::user(question));

        let mut request = GenerationRequest::new(question);
        request.provider = self.provider.clone();

        let reply = match self.backend.generate_sql(request).await {
            Err(e) => {
                tracing::debug!(error = %e, "SQL generation failed");
                ChatMessage::assistant(format!("Sorry, something went wrong: {}", error_detail(&e)))
            }
            Ok(generated) => {
                let result = self.backend.execute_sql(&generated.generated_sql).await;
                ChatMessage {
                    sql: Some(generated.generated_sql),
                    request_id: Some(generated.request_id),
                    result: Some(result),
                    ..ChatMessage::assistant(SQL_GENERATED_MESSAGE)
                }
            }
        };
        self.messages.push(reply);
        // Just pushed.
        &self.messages[self.messages.len() - 1]
    }
}

/// Plain-text rendering of one message for the terminal.
pub fn render_message(message: &ChatMessage) -> String {
    let mut out = match message.role {
        Role::User => format!("> {}", message.content),
        Role::Assistant => message.content.clone(),
    };
    if let Some(sql) = &message.sql {
        let _ = write!(out, "\n\n{sql}\n");
    }
    match &message.result {
        Some(ExecutionResult::Error(e)) => {
            let _ = write!(out, "\nFailed to execute the SQL query. Error: {e}");
        }
        Some(ExecutionResult::Rows(rows)) => {
            let _ = write!(out, "\n{}", render_table(rows));
        }
        Some(ExecutionResult::Affected { rows_affected }) => {
            let _ = write!(out, "\nStatement executed, {rows_affected} row(s) affected.");
        }
        None => {}
    }
    out
}

/// Aligned text table. Column order follows the first row.
pub fn render_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return NO_DATA_MESSAGE.to_string();
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(*h).map_or_else(String::new, cell_text))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = format_line(headers.iter().copied(), &widths);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        out.push('\n');
        out.push_str(&format_line(row.iter().map(String::as_str), &widths));
    }
    let plural = if rows.len() == 1 { "" } else { "s" };
    let _ = write!(out, "\n({} row{plural})", rows.len());
    out
}

fn format_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(v, &w)| format!("{v:<w$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Horizontal bar chart of column `y` with one bar per row, labelled by
/// column `x`. Bars are scaled to the largest absolute value; negative values
/// are drawn with `-` and NULL draws no bar.
pub fn render_bar_chart(rows: &[Row], x: &str, y: &str) -> Result<String, LlmError> {
    let Some(first) = rows.first() else {
        return Err(LlmError::InvalidInput(NO_DATA_MESSAGE.to_string()));
    };
    if first.len() < 2 {
        return Err(LlmError::InvalidInput(
            "At least 2 columns are required to draw a chart".to_string(),
        ));
    }
    for column in [x, y] {
        if !first.contains_key(column) {
            let available: Vec<&str> = first.keys().map(String::as_str).collect();
            return Err(LlmError::InvalidInput(format!(
                "Unknown column '{column}'. Available columns: {available:?}"
            )));
        }
    }

    let mut bars = Vec::with_capacity(rows.len());
    for row in rows {
        let label = row.get(x).map_or_else(String::new, cell_text);
        let value = match row.get(y) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(other) => {
                return Err(LlmError::InvalidInput(format!(
                    "Column '{y}' is not numeric: {other}"
                )));
            }
        };
        bars.push((label, value));
    }

    let max = bars
        .iter()
        .filter_map(|(_, v)| *v)
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let label_width = bars
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{y} by {x}");
    for (label, value) in &bars {
        let (bar, shown) = match value {
            Some(v) => {
                let len = if max > 0.0 {
                    (v.abs() / max * CHART_WIDTH as f64).round() as usize
                } else {
                    0
                };
                let fill = if *v < 0.0 { "-" } else { "#" };
                (fill.repeat(len), format_number(*v))
            }
            None => (String::new(), "NULL".to_string()),
        };
        let _ = write!(out, "\n{label:<label_width$} | {bar:<CHART_WIDTH$} {shown}");
    }
    Ok(out)
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
