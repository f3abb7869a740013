//! Engine connectivity and query execution.

pub mod auth;
mod connection;
mod query;
pub mod types;

pub use auth::{AuthMode, ConnectionSecurity, Transport};
pub use connection::{with_connection, Connector, EngineConnection, TrinoConnection, TrinoConnector};
pub use query::{QueryExecutor, QueryResult, StatementKind};
pub use types::{display_row, display_value, QueryResults, Row};
