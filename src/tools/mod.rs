//! Tool implementations.
//!
//! `search` holds the DuckDuckGo client used by both the CLI and the MCP
//! `search` tool; `parse` turns provider responses into uniform records.

pub mod parse;
pub mod search;

pub use search::*;
