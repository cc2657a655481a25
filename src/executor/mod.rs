//! SQL execution relay
//!
//! Runs one raw SQL statement per call against a shared SQLite connection.
//! Every call gets its own transaction: committed on success, rolled back on
//! any error. Statements SQLite refuses inside a transaction (`VACUUM`,
//! transaction control, `ATTACH`/`DETACH`) run directly, as does anything
//! issued while a caller-opened transaction is active. Driver errors come
//! back verbatim as [`ExecutionResult::Error`]; nothing here panics or
//! returns `Err`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::types::Value as SqlValue;
use rusqlite::{Batch, Connection, Statement};
use serde_json::Value;

use crate::error::LlmError;
use crate::types::{ExecutionResult, Row};

const MEMORY_URL: &str = ":memory:";
const EMPTY_STATEMENT: &str = "Empty SQL statement";
pub const MULTIPLE_STATEMENTS: &str = "Only one SQL statement can be executed per call";

/// Leading keywords of statements SQLite will not run inside a transaction.
const OUTSIDE_TRANSACTION: &[&str] = &[
    "BEGIN", "COMMIT", "END", "ROLLBACK", "SAVEPOINT", "RELEASE", "VACUUM", "ATTACH", "DETACH",
];

pub struct SqlExecutor {
    conn: Mutex<Connection>,
}

impl SqlExecutor {
    /// Open the database named by `database_url`: a file path, optionally
    /// prefixed with `sqlite://` or `sqlite:`, or `:memory:`.
    pub fn open(database_url: &str) -> Result<Self, LlmError> {
        let location = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);
        if location == MEMORY_URL {
            return Self::in_memory();
        }
        let conn = Connection::open(Path::new(location)).map_err(|e| {
            LlmError::ConfigurationError(format!("Failed to open database {location}: {e}"))
        })?;
        tracing::info!(database = %location, "Opened SQL database");
        Ok(Self::from_connection(conn))
    }

    pub fn in_memory() -> Result<Self, LlmError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            LlmError::ConfigurationError(format!("Failed to open in-memory database: {e}"))
        })?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    // A panic while holding the lock rolls back this call's transaction on
    // drop, so the connection is still usable.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute one statement. Blocking; async callers should go through
    /// `spawn_blocking`.
    pub fn execute(&self, sql: &str) -> ExecutionResult {
        let sql = sql.trim();
        if sql.is_empty() {
            return ExecutionResult::Error(EMPTY_STATEMENT.to_string());
        }

        let mut conn = self.lock();
        match run(&mut conn, sql) {
            Ok(result) => {
                match &result {
                    ExecutionResult::Rows(rows) => {
                        tracing::debug!(rows = rows.len(), "SQL query executed")
                    }
                    ExecutionResult::Affected { rows_affected } => {
                        tracing::debug!(rows_affected, "SQL statement executed")
                    }
                    ExecutionResult::Error(message) => {
                        tracing::warn!(error = %message, "SQL statement refused")
                    }
                }
                result
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "SQL execution failed; transaction rolled back");
                ExecutionResult::Error(message)
            }
        }
    }

    /// `CREATE TABLE` statements of every user table, as stored by SQLite.
    pub fn describe_schema(&self) -> Result<String, LlmError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT sql FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL \
             ORDER BY name",
        )?;
        let statements = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statements
            .iter()
            .map(|s| format!("{s};"))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

impl std::fmt::Debug for SqlExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlExecutor").finish_non_exhaustive()
    }
}

fn run(conn: &mut Connection, sql: &str) -> rusqlite::Result<ExecutionResult> {
    if !conn.is_autocommit() || runs_outside_transaction(sql) {
        return run_statement(conn, sql);
    }
    // Any early return drops `tx`, which rolls back.
    let tx = conn.transaction()?;
    let result = run_statement(&tx, sql)?;
    if !result.is_error() {
        tx.commit()?;
    }
    Ok(result)
}

fn run_statement(conn: &Connection, sql: &str) -> rusqlite::Result<ExecutionResult> {
    let mut batch = Batch::new(conn, sql);
    let Some(mut stmt) = batch.next()? else {
        return Ok(ExecutionResult::Error(EMPTY_STATEMENT.to_string()));
    };
    // A second statement that fails to prepare still counts as a second statement.
    if !matches!(batch.next(), Ok(None)) {
        return Ok(ExecutionResult::Error(MULTIPLE_STATEMENTS.to_string()));
    }

    if stmt.column_count() == 0 {
        let rows_affected = stmt.execute([])?;
        return Ok(ExecutionResult::Affected { rows_affected });
    }
    collect_rows(&mut stmt).map(ExecutionResult::Rows)
}

fn collect_rows(stmt: &mut Statement<'_>) -> rusqlite::Result<Vec<Row>> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (idx, name) in columns.iter().enumerate() {
            record.insert(name.clone(), to_json(row.get::<_, SqlValue>(idx)?));
        }
        out.push(record);
    }
    Ok(out)
}

fn runs_outside_transaction(sql: &str) -> bool {
    let keyword = leading_keyword(sql);
    OUTSIDE_TRANSACTION.iter().any(|k| k.eq_ignore_ascii_case(keyword))
}

/// First word of `sql`, skipping whitespace and comments.
fn leading_keyword(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            break;
        }
    }
    let end = sql
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(sql.len());
    &sql[..end]
}

fn to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(n) => Value::from(n),
        SqlValue::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(b) => Value::String(format!("[BLOB {} bytes]", b.len())),
    }
}
