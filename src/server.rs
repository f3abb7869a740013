//! MCP server struct definition and request dispatching.
//!
//! Each entry point resolves the connection profile afresh, opens a private
//! connection for the duration of the request and closes it before
//! returning. Engine failures are handled differently per entry point:
//!
//! - `list_resources` absorbs them and reports no resources
//! - `read_resource` surfaces them as a runtime failure
//! - `call_tool` reports them as text inside a successful result

use crate::config::{ConnectionProfile, EnvProfileResolver, ProfileResolver};
use crate::constants::LOG_QUERY_TRUNCATE_LENGTH;
use crate::database::auth::truncate_for_log;
use crate::database::{with_connection, Connector, QueryExecutor, TrinoConnector};
use crate::error::ServerError;
use crate::resources::{build_resource_list, list_tables, parse_resource_uri, read_table_sample};
use crate::shutdown::InFlightRequests;
use crate::tools::{build_tool_list, ToolInvocation};
use rmcp::model::{JsonObject, Resource, Tool};
use std::sync::Arc;
use tracing::{error, info, warn};

/// The Trino MCP Server instance.
///
/// Cloning is cheap; clones share the resolver, connector and request
/// tracker.
#[derive(Clone)]
pub struct TrinoMcpServer {
    /// Source of the connection profile, consulted on every request.
    pub(crate) resolver: Arc<dyn ProfileResolver>,

    /// Opens one engine connection per request.
    pub(crate) connector: Arc<dyn Connector>,

    /// Requests currently being served.
    pub(crate) requests: InFlightRequests,
}

impl TrinoMcpServer {
    /// Create a server talking to Trino with the given profile source.
    pub fn new(resolver: Arc<dyn ProfileResolver>) -> Self {
        Self::with_parts(resolver, Arc::new(TrinoConnector::new()))
    }

    /// Create a server that reads its profile from the environment on every request.
    pub fn from_env() -> Self {
        Self::new(Arc::new(EnvProfileResolver))
    }

    /// Create a server from an explicit profile source and connector.
    pub fn with_parts(resolver: Arc<dyn ProfileResolver>, connector: Arc<dyn Connector>) -> Self {
        Self {
            resolver,
            connector,
            requests: InFlightRequests::new(),
        }
    }

    /// Get the in-flight request tracker.
    pub fn requests(&self) -> &InFlightRequests {
        &self.requests
    }

    /// Resolve the current connection profile.
    pub fn profile(&self) -> Result<ConnectionProfile, ServerError> {
        self.resolver.resolve()
    }

    /// List the tools. No connection is needed.
    pub fn list_tools(&self) -> Vec<Tool> {
        build_tool_list()
    }

    /// List one resource per table of the configured namespace.
    ///
    /// Engine failures yield an empty list; configuration errors are returned.
    pub async fn list_resources(&self) -> Result<Vec<Resource>, ServerError> {
        let _guard = self.requests.begin();
        let profile = self.profile()?;

        let list_profile = profile.clone();
        let listed = with_connection(self.connector.as_ref(), &profile, move |conn| {
            Box::pin(async move { list_tables(conn, &list_profile).await })
        })
        .await
        .and_then(|tables| tables.map_err(ServerError::from));

        let tables = match listed {
            Ok(tables) => tables,
            Err(e) if e.is_engine_failure() => {
                error!("Failed to list tables in {}: {}", profile.namespace(), e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        info!("Listed {} tables in {}", tables.len(), profile.namespace());
        Ok(build_resource_list(&tables))
    }

    /// Read the sample rows of the table a resource URI names.
    ///
    /// The URI is validated before any configuration or engine access.
    pub async fn read_resource(&self, uri: &str) -> Result<String, ServerError> {
        let _guard = self.requests.begin();
        let table =
            parse_resource_uri(uri).inspect_err(|e| warn!("Rejected resource {}: {}", uri, e))?;
        let profile = self.profile()?;

        info!("Reading resource {} from {}", uri, profile.namespace());
        let sample_profile = profile.clone();
        let sampled = with_connection(self.connector.as_ref(), &profile, move |conn| {
            Box::pin(async move { read_table_sample(conn, &sample_profile, &table).await })
        })
        .await?;

        sampled.map_err(|e| {
            error!("Failed to read resource {}: {}", uri, e);
            ServerError::runtime(e.to_string())
        })
    }

    /// Invoke a tool and return its text output.
    ///
    /// Name and arguments are validated before a connection is opened.
    /// Engine failures are returned as text, not as errors.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<String, ServerError> {
        let _guard = self.requests.begin();
        let invocation = ToolInvocation::parse(name, arguments)
            .inspect_err(|e| warn!("Rejected tool call {}: {}", name, e))?;
        let profile = self.profile()?;

        match invocation {
            ToolInvocation::ExecuteSql(input) => {
                let query = input.query;
                let statement = query.clone();
                let executed = with_connection(self.connector.as_ref(), &profile, move |conn| {
                    Box::pin(async move { QueryExecutor::execute(conn, &statement).await })
                })
                .await?;

                match executed {
                    Ok(result) => Ok(result.render()),
                    Err(e) => {
                        error!(
                            "Error executing query '{}': {}",
                            truncate_for_log(&query, LOG_QUERY_TRUNCATE_LENGTH),
                            e
                        );
                        Ok(format!("Error executing query: {}", e))
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for TrinoMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrinoMcpServer")
            .field("in_flight", &self.requests.count())
            .finish_non_exhaustive()
    }
}
