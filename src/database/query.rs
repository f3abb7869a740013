//! Query execution and result handling.
//!
//! Statements are classified by their leading keyword only. `SHOW` output is
//! returned as tab-separated lines, `SELECT` output as a comma-separated table
//! with a header line, and anything else is run to completion and acknowledged
//! with a fixed message.

use super::auth::truncate_for_log;
use super::connection::EngineConnection;
use super::types::{display_row, Row};
use crate::constants::{
    LINE_SEPARATOR, LOG_QUERY_TRUNCATE_LENGTH, SHOW_FIELD_SEPARATOR, STATEMENT_SUCCESS_MESSAGE,
    TABULAR_FIELD_SEPARATOR,
};
use crate::error::EngineError;
use std::fmt;
use tracing::debug;

/// Shape of output a statement is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SHOW ...`: rows without a header.
    Show,
    /// `SELECT ...`: header plus rows.
    Select,
    /// Everything else (DDL, DML, session statements).
    Other,
}

impl StatementKind {
    /// Classify a statement by its leading keyword, ignoring case and
    /// surrounding whitespace.
    pub fn classify(statement: &str) -> Self {
        let trimmed = statement.trim();
        if starts_with_keyword(trimmed, "SHOW")
            && trimmed[4..].starts_with(|c: char| c.is_whitespace())
        {
            StatementKind::Show
        } else if starts_with_keyword(trimmed, "SELECT") {
            StatementKind::Select
        } else {
            StatementKind::Other
        }
    }
}

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    s.get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}

/// Result of a query execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Column names plus stringified rows.
    Tabular {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },

    /// A single free-text message.
    Informational(String),
}

impl QueryResult {
    /// Build a tabular result from raw engine rows.
    pub fn tabular(columns: Vec<String>, rows: &[Row]) -> Self {
        QueryResult::Tabular {
            columns,
            rows: rows.iter().map(|r| display_row(r)).collect(),
        }
    }

    /// Build the informational result for `SHOW` output.
    pub fn show(rows: &[Row]) -> Self {
        let lines: Vec<String> = rows
            .iter()
            .map(|r| display_row(r).join(SHOW_FIELD_SEPARATOR))
            .collect();
        QueryResult::Informational(lines.join(LINE_SEPARATOR))
    }

    /// Acknowledgement for statements whose rows are not read.
    pub fn acknowledged() -> Self {
        QueryResult::Informational(STATEMENT_SUCCESS_MESSAGE.to_string())
    }

    /// Whether the result is tabular.
    pub fn is_tabular(&self) -> bool {
        matches!(self, QueryResult::Tabular { .. })
    }

    /// Number of data rows (zero for informational results).
    pub fn row_count(&self) -> usize {
        match self {
            QueryResult::Tabular { rows, .. } => rows.len(),
            QueryResult::Informational(_) => 0,
        }
    }

    /// Render as text.
    ///
    /// Tabular results render a comma-joined header line followed by one
    /// comma-joined line per row; informational results render their message.
    pub fn render(&self) -> String {
        match self {
            QueryResult::Tabular { columns, rows } => {
                let mut lines = Vec::with_capacity(rows.len() + 1);
                lines.push(columns.join(TABULAR_FIELD_SEPARATOR));
                lines.extend(rows.iter().map(|r| r.join(TABULAR_FIELD_SEPARATOR)));
                lines.join(LINE_SEPARATOR)
            }
            QueryResult::Informational(message) => message.clone(),
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Query executor for running SQL statements on a connection.
pub struct QueryExecutor;

impl QueryExecutor {
    /// Execute a statement and classify its output.
    ///
    /// Any engine failure during submission or fetch is returned unchanged.
    pub async fn execute(
        conn: &mut dyn EngineConnection,
        statement: &str,
    ) -> Result<QueryResult, EngineError> {
        let kind = StatementKind::classify(statement);
        debug!(
            "Executing {:?} statement: {}",
            kind,
            truncate_for_log(statement, LOG_QUERY_TRUNCATE_LENGTH)
        );

        conn.execute(statement).await?;

        let result = match kind {
            StatementKind::Show => {
                let rows = conn.fetch_all().await?;
                QueryResult::show(&rows)
            }
            StatementKind::Select => Self::fetch_tabular(conn).await?,
            StatementKind::Other => {
                // Wait for completion; a failure on a later page still counts.
                conn.fetch_all().await?;
                QueryResult::acknowledged()
            }
        };

        debug!("Statement completed: {} row(s)", result.row_count());
        Ok(result)
    }

    /// Execute a statement and return its output as a table, whatever its kind.
    pub async fn execute_tabular(
        conn: &mut dyn EngineConnection,
        statement: &str,
    ) -> Result<QueryResult, EngineError> {
        debug!(
            "Executing tabular statement: {}",
            truncate_for_log(statement, LOG_QUERY_TRUNCATE_LENGTH)
        );
        conn.execute(statement).await?;
        Self::fetch_tabular(conn).await
    }

    /// Execute a statement and return its raw rows without classification.
    pub async fn execute_raw(
        conn: &mut dyn EngineConnection,
        statement: &str,
    ) -> Result<Vec<Row>, EngineError> {
        debug!(
            "Executing raw statement: {}",
            truncate_for_log(statement, LOG_QUERY_TRUNCATE_LENGTH)
        );
        conn.execute(statement).await?;
        conn.fetch_all().await
    }

    async fn fetch_tabular(conn: &mut dyn EngineConnection) -> Result<QueryResult, EngineError> {
        let columns = conn.column_names();
        let rows = conn.fetch_all().await?;
        Ok(QueryResult::tabular(columns, &rows))
    }
}
