//! MCP Tools for Trino operations.
//!
//! A single tool is served:
//!
//! - `execute_sql`: Execute an arbitrary SQL statement and return its output as text

mod inputs;

pub use inputs::*;

use crate::constants::{EXECUTE_SQL_DESCRIPTION, EXECUTE_SQL_TOOL};
use rmcp::model::{JsonObject, Tool};
use std::sync::Arc;

/// JSON Schema for a tool input type, as an object map.
fn input_schema<T: schemars::JsonSchema>() -> Arc<JsonObject> {
    let schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
    match schema {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

/// Descriptor of the `execute_sql` tool.
pub fn execute_sql_tool() -> Tool {
    Tool::new(
        EXECUTE_SQL_TOOL,
        EXECUTE_SQL_DESCRIPTION,
        input_schema::<ExecuteSqlInput>(),
    )
}

/// Every tool this server exposes.
pub fn build_tool_list() -> Vec<Tool> {
    vec![execute_sql_tool()]
}
