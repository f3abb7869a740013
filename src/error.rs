//! Error types for the Trino MCP Server.
//!
//! Engine failures are classified once into [`EngineError`] and carried
//! through [`ServerError`]; each request entry point decides whether to
//! absorb, surface, or inline them.

pub use rmcp::ErrorData as McpError;
use std::fmt;
use thiserror::Error;

/// Classification of a failure raised by the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// The engine rejected or failed the statement itself.
    Query,

    /// The failure originated outside the statement (network, cluster fault).
    External,
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineErrorKind::Query => write!(f, "query"),
            EngineErrorKind::External => write!(f, "external"),
        }
    }
}

/// A failure reported by the Trino engine or the transport to it.
#[derive(Debug, Clone)]
pub struct EngineError {
    /// Query-level or externally triggered.
    pub kind: EngineErrorKind,

    /// Engine-provided message.
    pub message: String,

    /// Trino error name (e.g. `SYNTAX_ERROR`), when reported.
    pub error_name: Option<String>,

    /// Trino query id, when the failure belongs to a submitted query.
    pub query_id: Option<String>,
}

impl EngineError {
    /// Create a query-level engine error.
    pub fn query(message: impl Into<String>) -> Self {
        Self {
            kind: EngineErrorKind::Query,
            message: message.into(),
            error_name: None,
            query_id: None,
        }
    }

    /// Create an externally triggered engine error.
    pub fn external(message: impl Into<String>) -> Self {
        Self {
            kind: EngineErrorKind::External,
            message: message.into(),
            error_name: None,
            query_id: None,
        }
    }

    /// Attach the Trino error name.
    pub fn with_error_name(mut self, name: impl Into<String>) -> Self {
        self.error_name = Some(name.into());
        self
    }

    /// Attach the Trino query id.
    pub fn with_query_id(mut self, id: impl Into<String>) -> Self {
        self.query_id = Some(id.into());
        self
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_name {
            Some(name) => write!(f, "{}: {}", name, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        EngineError::external(format!("HTTP error: {}", e))
    }
}

/// Domain-specific errors for the Trino MCP Server.
///
/// Named `ServerError` to avoid collision with the protocol's `McpError`.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine could not be reached or the client could not be built
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The engine rejected or failed a statement
    #[error("Query error: {0}")]
    Query(#[from] EngineError),

    /// Resource address does not use the expected scheme
    #[error("Invalid URI scheme: {0}")]
    InvalidScheme(String),

    /// Tool name is not served here
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Required tool argument is absent or empty
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// Engine failure surfaced to a caller that asked for specific data
    #[error("Database error: {0}")]
    Runtime(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a runtime error wrapping an engine failure message.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Whether this error is a request validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidScheme(_) | Self::UnknownTool(_) | Self::MissingArgument(_)
        )
    }

    /// Whether this error came from the engine or the path to it.
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Query(_))
    }
}

/// Convert ServerError to the protocol's error type.
///
/// Validation failures are the caller's fault and map to `invalid_params`;
/// everything else is reported as an internal error.
impl From<ServerError> for McpError {
    fn from(e: ServerError) -> Self {
        if e.is_validation() {
            McpError::invalid_params(e.to_string(), None)
        } else {
            McpError::internal_error(e.to_string(), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::query("line 1:1: mismatched input").with_error_name("SYNTAX_ERROR");
        assert_eq!(err.to_string(), "SYNTAX_ERROR: line 1:1: mismatched input");

        let err = EngineError::external("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.kind, EngineErrorKind::External);
    }

    #[test]
    fn test_error_classification() {
        assert!(ServerError::UnknownTool("x".into()).is_validation());
        assert!(ServerError::MissingArgument("query".into()).is_validation());
        assert!(ServerError::InvalidScheme("ftp://a".into()).is_validation());
        assert!(!ServerError::config("missing").is_validation());

        assert!(ServerError::from(EngineError::query("boom")).is_engine_failure());
        assert!(ServerError::connection("refused").is_engine_failure());
        assert!(!ServerError::runtime("boom").is_engine_failure());
    }

    #[test]
    fn test_protocol_error_mapping() {
        let err: McpError = ServerError::UnknownTool("drop_all".into()).into();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("drop_all"));

        let err: McpError = ServerError::runtime("table not found").into();
        assert_eq!(err.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
        assert!(err.message.contains("Database error: table not found"));
    }
}
