//! HTTP transport layer for the Model Context Protocol
//!
//! Provides the external routing: the `/mcp` endpoint, the status page and health checks.

pub mod handlers;
