//! Tool input types with JSON Schema generation.

use crate::constants::EXECUTE_SQL_TOOL;
use crate::error::ServerError;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input for the `execute_sql` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteSqlInput {
    /// The SQL query to execute.
    #[schemars(description = "The SQL query to execute")]
    pub query: String,
}

impl ExecuteSqlInput {
    /// Extract the input from raw tool arguments.
    ///
    /// The `query` argument must be present, a string, and not blank.
    pub fn from_arguments(arguments: Option<&JsonObject>) -> Result<Self, ServerError> {
        match arguments.and_then(|args| args.get("query")) {
            Some(Value::String(query)) if !query.trim().is_empty() => Ok(Self {
                query: query.clone(),
            }),
            _ => Err(ServerError::MissingArgument("query".to_string())),
        }
    }
}

/// A validated tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    /// Run an arbitrary statement.
    ExecuteSql(ExecuteSqlInput),
}

impl ToolInvocation {
    /// Validate a tool name and its arguments.
    ///
    /// Fails with `UnknownTool` for any name other than `execute_sql` and with
    /// `MissingArgument` when the query is absent or empty.
    pub fn parse(name: &str, arguments: Option<&JsonObject>) -> Result<Self, ServerError> {
        match name {
            EXECUTE_SQL_TOOL => Ok(Self::ExecuteSql(ExecuteSqlInput::from_arguments(
                arguments,
            )?)),
            other => Err(ServerError::UnknownTool(other.to_string())),
        }
    }

    /// Name of the invoked tool.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecuteSql(_) => EXECUTE_SQL_TOOL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_execute_sql() {
        let arguments = args(json!({"query": "SELECT 1"}));
        let invocation = ToolInvocation::parse("execute_sql", Some(&arguments)).unwrap();
        assert_eq!(
            invocation,
            ToolInvocation::ExecuteSql(ExecuteSqlInput {
                query: "SELECT 1".to_string()
            })
        );
        assert_eq!(invocation.name(), "execute_sql");
    }

    #[test]
    fn test_missing_query() {
        for arguments in [
            None,
            Some(args(json!({}))),
            Some(args(json!({"query": ""}))),
            Some(args(json!({"query": "   "}))),
            Some(args(json!({"query": 42}))),
            Some(args(json!({"sql": "SELECT 1"}))),
        ] {
            let err = ToolInvocation::parse("execute_sql", arguments.as_ref()).unwrap_err();
            assert!(matches!(err, ServerError::MissingArgument(ref a) if a == "query"));
        }
    }

    #[test]
    fn test_unknown_tool() {
        let arguments = args(json!({"query": "SELECT 1"}));
        let err = ToolInvocation::parse("drop_everything", Some(&arguments)).unwrap_err();
        assert!(matches!(err, ServerError::UnknownTool(ref n) if n == "drop_everything"));
    }

    #[test]
    fn test_unknown_tool_checked_before_arguments() {
        let err = ToolInvocation::parse("other_tool", None).unwrap_err();
        assert!(matches!(err, ServerError::UnknownTool(_)));
    }
}
