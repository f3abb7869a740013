//! # Trino MCP Server
//!
//! A Model Context Protocol (MCP) server for Trino.
//!
//! This crate provides:
//! - **Resources**: One per table of the configured catalog and schema, read as a row sample
//! - **Tools**: `execute_sql` for running arbitrary statements
//!
//! ## Architecture
//!
//! Requests are served one connection each: the profile is resolved from the
//! environment, a fresh Trino connection is opened, and it is closed before
//! the response is returned. Nothing is pooled or cached between requests.

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod handlers;
pub mod resources;
pub mod server;
pub mod shutdown;
pub mod tools;

pub use config::{ConnectionProfile, EnvProfileResolver, ProfileResolver};
pub use error::{EngineError, EngineErrorKind, McpError, ServerError};
pub use server::TrinoMcpServer;
