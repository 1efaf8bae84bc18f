//! MCP Server for Advisify
//!
//! Exposes adviser recommendations as tools over stdio.

mod server;

pub use server::run_mcp_server;
