//! Read-only SQL pass-through over the mandi price store.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Rows returned to the caller unless configured otherwise
pub const DEFAULT_ROW_LIMIT: usize = 10;

pub const NO_RESULTS_MESSAGE: &str = "No results found for the query";

/// Counting stops after this many rows; `total_rows` saturates here
/// once the returned rows are collected.
pub const COUNT_CAP: usize = 10_000;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Structured result of a query. Failures are values, never panics or
/// propagated errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub success: bool,
    pub data: Vec<Map<String, Value>>,
    /// Rows the statement produced, saturating at [`COUNT_CAP`]
    pub total_rows: usize,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Echo of the statement, for debugging on the caller side
    pub query: String,
}

impl QueryOutcome {
    fn failure(query: &str, error: String) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            total_rows: 0,
            truncated: false,
            message: None,
            error: Some(error),
            query: query.to_string(),
        }
    }
}

/// Reject anything that does not start with `SELECT` after upper-casing.
///
/// Leading whitespace is not trimmed, so `"  SELECT ..."` is rejected too.
pub fn check_policy(sql: &str) -> Result<(), MarketError> {
    if sql.to_uppercase().starts_with("SELECT") {
        Ok(())
    } else {
        Err(MarketError::PolicyViolation(
            "Only SELECT queries are allowed".to_string(),
        ))
    }
}

/// Handle on the SQLite file. Each query opens its own read-only
/// connection, released when the call returns.
#[derive(Debug, Clone)]
pub struct MarketStore {
    path: PathBuf,
    row_limit: usize,
}

impl MarketStore {
    pub fn new<P: AsRef<Path>>(path: P, row_limit: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            row_limit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn row_limit(&self) -> usize {
        self.row_limit
    }

    /// Run a statement and shape the result for the tool caller
    pub fn execute(&self, sql: &str) -> QueryOutcome {
        match self.run(sql) {
            Ok((rows, total)) if rows.is_empty() => {
                debug!("Market query returned no rows ({} total)", total);
                QueryOutcome {
                    success: false,
                    data: rows,
                    total_rows: total,
                    truncated: false,
                    message: Some(NO_RESULTS_MESSAGE.to_string()),
                    error: None,
                    query: sql.to_string(),
                }
            }
            Ok((rows, total)) => {
                debug!("Market query returned {} of {} rows", rows.len(), total);
                QueryOutcome {
                    success: true,
                    truncated: total > rows.len(),
                    data: rows,
                    total_rows: total,
                    message: None,
                    error: None,
                    query: sql.to_string(),
                }
            }
            Err(e) => {
                warn!("Market query failed: {}", e);
                QueryOutcome::failure(sql, e.to_string())
            }
        }
    }

    fn run(&self, sql: &str) -> Result<(Vec<Map<String, Value>>, usize), MarketError> {
        check_policy(sql)?;

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([])?;
        let mut data = Vec::new();
        let mut total = 0;

        while let Some(row) = rows.next()? {
            total += 1;
            if data.len() < self.row_limit {
                let mut obj = Map::with_capacity(columns.len());
                for (i, name) in columns.iter().enumerate() {
                    obj.insert(name.clone(), to_json(row.get_ref(i)?));
                }
                data.push(obj);
            } else if total >= COUNT_CAP {
                break;
            }
        }

        Ok((data, total))
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}
