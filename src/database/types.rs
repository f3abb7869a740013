//! Trino client protocol payloads and cell stringification.
//!
//! Every response of the statement endpoint is a `QueryResults` document;
//! clients follow `nextUri` until it disappears.

use crate::constants::NULL_DISPLAY;
use crate::error::{EngineError, EngineErrorKind};
use serde::Deserialize;
use serde_json::Value;

/// One row of engine output, in column order.
pub type Row = Vec<Value>;

/// A page of the Trino statement protocol.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    /// Query id assigned by the coordinator.
    pub id: String,

    /// URI of the next page; absent once the query is finished.
    #[serde(default)]
    pub next_uri: Option<String>,

    /// Result columns, present once the output shape is known.
    #[serde(default)]
    pub columns: Option<Vec<Column>>,

    /// Rows carried by this page.
    #[serde(default)]
    pub data: Option<Vec<Row>>,

    /// Execution statistics.
    #[serde(default)]
    pub stats: Option<StatementStats>,

    /// Failure details, when the query failed.
    #[serde(default)]
    pub error: Option<QueryErrorInfo>,

    /// Statement kind for non-query statements (e.g. `CREATE TABLE`).
    #[serde(default)]
    pub update_type: Option<String>,
}

impl QueryResults {
    /// Whether the coordinator has no further pages for this query.
    pub fn is_finished(&self) -> bool {
        self.next_uri.is_none()
    }

    /// Current query state as reported by the coordinator.
    pub fn state(&self) -> &str {
        self.stats.as_ref().map(|s| s.state.as_str()).unwrap_or("UNKNOWN")
    }

    /// Convert an embedded failure into an engine error.
    pub fn engine_error(&self) -> Option<EngineError> {
        self.error
            .as_ref()
            .map(|info| info.to_engine_error().with_query_id(self.id.clone()))
    }
}

/// A result column descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    /// Column label.
    pub name: String,

    /// Trino type signature, e.g. `varchar(25)`.
    #[serde(rename = "type", default)]
    pub type_name: String,
}

/// Subset of the statement statistics the client reads.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementStats {
    pub state: String,
}

/// Failure details attached to a failed query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryErrorInfo {
    pub message: String,

    #[serde(default)]
    pub error_code: Option<i64>,

    #[serde(default)]
    pub error_name: Option<String>,

    /// `USER_ERROR`, `INTERNAL_ERROR`, `INSUFFICIENT_RESOURCES` or `EXTERNAL`.
    #[serde(default)]
    pub error_type: Option<String>,
}

impl QueryErrorInfo {
    /// Classify the failure: `EXTERNAL` errors are external, the rest are query-level.
    pub fn kind(&self) -> EngineErrorKind {
        match self.error_type.as_deref() {
            Some("EXTERNAL") => EngineErrorKind::External,
            _ => EngineErrorKind::Query,
        }
    }

    /// Build the engine error for this failure.
    pub fn to_engine_error(&self) -> EngineError {
        let err = match self.kind() {
            EngineErrorKind::External => EngineError::external(self.message.clone()),
            EngineErrorKind::Query => EngineError::query(self.message.clone()),
        };
        match &self.error_name {
            Some(name) => err.with_error_name(name.clone()),
            None => err,
        }
    }
}

/// Render a cell as text.
///
/// Strings are emitted verbatim, NULL as `NULL`, scalars by their display
/// form and structured values (arrays, maps, rows) as compact JSON.
///
/// NULL and booleans come out as `NULL`, `true` and `false`, not the
/// `None`, `True` and `False` a Python DB-API client would print.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => NULL_DISPLAY.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Render every cell of a row.
pub fn display_row(row: &[Value]) -> Vec<String> {
    row.iter().map(display_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_running_page() {
        let page: QueryResults = serde_json::from_value(json!({
            "id": "20240101_000000_00001_abcde",
            "infoUri": "http://localhost:8080/ui/query.html?20240101_000000_00001_abcde",
            "nextUri": "http://localhost:8080/v1/statement/queued/20240101_000000_00001_abcde/x/1",
            "stats": {"state": "QUEUED", "queued": true}
        }))
        .unwrap();

        assert!(!page.is_finished());
        assert_eq!(page.state(), "QUEUED");
        assert!(page.columns.is_none());
        assert!(page.engine_error().is_none());
    }

    #[test]
    fn test_parse_data_page() {
        let page: QueryResults = serde_json::from_value(json!({
            "id": "q1",
            "columns": [
                {"name": "id", "type": "bigint", "typeSignature": {"rawType": "bigint"}},
                {"name": "name", "type": "varchar"}
            ],
            "data": [[1, "x"], [2, null]],
            "stats": {"state": "FINISHED"}
        }))
        .unwrap();

        assert!(page.is_finished());
        assert!(page.update_type.is_none());
        let columns = page.columns.unwrap();
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].type_name, "bigint");
        assert_eq!(page.data.unwrap().len(), 2);
    }

    #[test]
    fn test_parse_update_page() {
        let page: QueryResults = serde_json::from_value(json!({
            "id": "q3",
            "columns": [{"name": "rows", "type": "bigint"}],
            "data": [[12]],
            "updateType": "INSERT",
            "updateCount": 12,
            "stats": {"state": "FINISHED"}
        }))
        .unwrap();

        assert!(page.is_finished());
        assert_eq!(page.update_type.as_deref(), Some("INSERT"));
    }

    #[test]
    fn test_parse_failed_page() {
        let page: QueryResults = serde_json::from_value(json!({
            "id": "q2",
            "stats": {"state": "FAILED"},
            "error": {
                "message": "line 1:15: Table 'hive.sales.nope' does not exist",
                "errorCode": 46,
                "errorName": "TABLE_NOT_FOUND",
                "errorType": "USER_ERROR"
            }
        }))
        .unwrap();

        let err = page.engine_error().unwrap();
        assert_eq!(err.kind, EngineErrorKind::Query);
        assert_eq!(err.query_id.as_deref(), Some("q2"));
        assert_eq!(
            err.to_string(),
            "TABLE_NOT_FOUND: line 1:15: Table 'hive.sales.nope' does not exist"
        );
    }

    #[test]
    fn test_external_error_classification() {
        let info = QueryErrorInfo {
            message: "Hive metastore unavailable".to_string(),
            error_code: Some(16777216),
            error_name: Some("HIVE_METASTORE_ERROR".to_string()),
            error_type: Some("EXTERNAL".to_string()),
        };
        assert_eq!(info.kind(), EngineErrorKind::External);
        assert_eq!(info.to_engine_error().kind, EngineErrorKind::External);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("plain")), "plain");
        assert_eq!(display_value(&json!(null)), "NULL");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
        assert_eq!(display_value(&json!({"k": "v"})), r#"{"k":"v"}"#);
        assert_eq!(display_row(&[json!(1), json!("x")]), vec!["1", "x"]);
    }
}
