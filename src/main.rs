//! Trino MCP Server entry point.
//!
//! This binary starts the MCP server using stdio transport for integration
//! with Claude Desktop, Cursor, and other MCP clients.
//!
//! Features:
//! - `.env` loading before configuration is read
//! - Fail-fast configuration check at startup
//! - Graceful shutdown with request draining (SIGTERM, SIGINT)

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trino_mcp_server::shutdown::{install_signal_handlers, shutdown_controller_from_env};
use trino_mcp_server::{ConnectionProfile, TrinoMcpServer};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables win.
    dotenvy::dotenv().ok();

    // Initialize logging to stderr (stdout is reserved for JSON-RPC)
    init_logging();

    let version = env!("CARGO_PKG_VERSION");
    eprintln!("Trino MCP Server v{version} starting...");
    eprintln!("Transport: stdio");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] {}", info);
    }));

    // Validate configuration once before accepting requests; every request
    // resolves it again.
    let profile = ConnectionProfile::from_env().context("Invalid Trino configuration")?;
    info!("Configuration loaded: {}", profile);

    let shutdown_controller = shutdown_controller_from_env();
    install_signal_handlers(shutdown_controller.clone()).await;

    let server = TrinoMcpServer::from_env();
    let requests = server.requests().clone();
    eprintln!("Server initialized. Ready to accept requests...");

    let transport = rmcp::transport::stdio();
    let service = server.serve(transport).await?;

    let mut shutdown_signal = shutdown_controller.signal();

    tokio::select! {
        quit_reason = service.waiting() => {
            match quit_reason {
                Ok(reason) => eprintln!("Service stopped: {reason:?}"),
                Err(e) => eprintln!("Service error: {e}"),
            }
        }
        _ = shutdown_signal.recv() => {
            eprintln!("Shutdown signal received");
        }
    }

    eprintln!("Initiating graceful shutdown...");
    shutdown_controller.graceful_shutdown(&requests).await;
    eprintln!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing subscriber with stderr output.
///
/// Logs MUST go to stderr because stdout is used for JSON-RPC communication.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,trino_mcp_server=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
