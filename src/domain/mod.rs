//! News lookups exposed as MCP tools
//!
//! Tool descriptors, argument handling and the text rendering of results.

pub mod format;
pub mod tools;
