//! ServerHandler implementation for the Trino MCP Server.
//!
//! This module implements the rmcp `ServerHandler` trait which defines how
//! the server responds to MCP protocol requests. Every method delegates to
//! the dispatcher on [`TrinoMcpServer`] and converts its errors.

use crate::resources::resource_contents;
use crate::server::TrinoMcpServer;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListResourcesResult,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ReadResourceRequestParam,
    ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ErrorData;
use tracing::{debug, info};

impl ServerHandler for TrinoMcpServer {
    /// Server identification - called during initialization handshake.
    fn get_info(&self) -> ServerInfo {
        info!("MCP client requesting server info");

        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,

            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),

            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: Some("Trino MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },

            instructions: Some(build_instructions(self)),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: TrinoMcpServer::list_tools(self),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!("Tool call: {}", request.name);
        let text = TrinoMcpServer::call_tool(self, &request.name, request.arguments.as_ref()).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: TrinoMcpServer::list_resources(self).await?,
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let content = TrinoMcpServer::read_resource(self, &request.uri).await?;
        Ok(resource_contents(&request.uri, content))
    }
}

/// Build server instructions based on the current profile.
fn build_instructions(server: &TrinoMcpServer) -> String {
    let mut instructions = String::new();

    instructions.push_str("# Trino MCP Server\n\n");
    instructions.push_str("This server provides access to a Trino cluster.\n\n");

    if let Ok(profile) = server.profile() {
        instructions.push_str(&format!(
            "**Connected to:** `{}` on {}:{}\n\n",
            profile.namespace(),
            profile.host,
            profile.port
        ));
    }

    instructions.push_str("### Resources\n");
    instructions.push_str("- `trino://{table}/data`: the first 100 rows of each table, as comma-separated text\n\n");
    instructions.push_str("### Tools\n");
    instructions.push_str("- `execute_sql`: run any statement; SELECT returns a header line plus rows, SHOW returns tab-separated rows\n");
    instructions.push_str("- Unqualified table names resolve against the configured catalog and schema\n");

    instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{env, ConnectionProfile};
    use std::sync::Arc;

    #[test]
    fn test_get_info_advertises_tools_and_resources() {
        let profile = ConnectionProfile {
            host: "trino.internal".to_string(),
            port: 8080,
            user: "analyst".to_string(),
            password: None,
            catalog: "hive".to_string(),
            schema: "sales".to_string(),
        };
        let server = TrinoMcpServer::new(Arc::new(profile));
        let info = server.get_info();

        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_none());
        assert_eq!(info.server_info.name, "trino-mcp-server");

        let instructions = info.instructions.unwrap();
        assert!(instructions.contains("`hive.sales`"));
        assert!(instructions.contains("execute_sql"));
    }

    #[test]
    fn test_instructions_without_profile() {
        struct Unconfigured;
        impl crate::config::ProfileResolver for Unconfigured {
            fn resolve(&self) -> Result<ConnectionProfile, crate::error::ServerError> {
                Err(crate::error::ServerError::config(format!("{} is not set", env::USER)))
            }
        }

        let server = TrinoMcpServer::new(Arc::new(Unconfigured));
        let instructions = build_instructions(&server);
        assert!(!instructions.contains("Connected to"));
        assert!(instructions.contains("execute_sql"));
    }
}
