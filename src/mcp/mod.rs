//! Model Context Protocol (MCP) server handling and JSON-RPC implementations
//!
//! Provides envelope parsing, method routing and error mapping for the `/mcp` endpoint.

pub mod rpc;
pub mod server;
