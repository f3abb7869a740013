//! Centralized constants for the Trino MCP Server.
//!
//! This module contains the fixed protocol strings and default values used
//! throughout the codebase, making them easy to find, understand, and modify.

use std::time::Duration;

// =============================================================================
// Connection Defaults
// =============================================================================

/// Default Trino coordinator host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Trino coordinator port.
pub const DEFAULT_PORT: u16 = 8080;

/// Client source reported to Trino in the `X-Trino-Source` header.
pub const CLIENT_SOURCE: &str = "trino-mcp-server";

/// Path of the statement endpoint of the Trino client REST protocol.
pub const STATEMENT_PATH: &str = "/v1/statement";

// =============================================================================
// Resource Constants
// =============================================================================

/// URI scheme prefix for table resources.
pub const RESOURCE_SCHEME: &str = "trino://";

/// Trailing path segment of a table resource URI.
pub const RESOURCE_DATA_SEGMENT: &str = "data";

/// MIME type of every table resource.
pub const RESOURCE_MIME_TYPE: &str = "text/plain";

/// Hard row cap applied when sampling a table resource.
pub const RESOURCE_SAMPLE_ROWS: usize = 100;

// =============================================================================
// Tool Constants
// =============================================================================

/// Name of the single SQL execution tool.
pub const EXECUTE_SQL_TOOL: &str = "execute_sql";

/// Description advertised for the SQL execution tool.
pub const EXECUTE_SQL_DESCRIPTION: &str = "Execute an SQL query on the Trino cluster";

/// Acknowledgement returned for statements that produce no row output.
pub const STATEMENT_SUCCESS_MESSAGE: &str = "Query executed successfully.";

// =============================================================================
// Result Rendering Constants
// =============================================================================

/// Separator between fields of a tabular (SELECT) row.
pub const TABULAR_FIELD_SEPARATOR: &str = ",";

/// Separator between fields of a SHOW row.
pub const SHOW_FIELD_SEPARATOR: &str = "\t";

/// Separator between rendered lines.
pub const LINE_SEPARATOR: &str = "\n";

/// Display text for SQL NULL cells.
pub const NULL_DISPLAY: &str = "NULL";

// =============================================================================
// Shutdown Constants
// =============================================================================

/// Default shutdown drain timeout in seconds.
pub const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 30;

/// Default shutdown drain timeout as Duration.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(DEFAULT_DRAIN_TIMEOUT_SECS);

/// Sleep interval during drain phase.
pub const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

// =============================================================================
// Logging Constants
// =============================================================================

/// Default truncation length for query logging.
pub const LOG_QUERY_TRUNCATE_LENGTH: usize = 200;
