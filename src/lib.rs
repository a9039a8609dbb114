//! # DuckDuckGo search for the terminal and for MCP clients
//!
//! This crate exposes DuckDuckGo web search through two surfaces that share
//! one validation path, one search client and one result shape:
//!
//! - `duckduckgo-cli`, a command-line search tool
//! - `duckduckgo-mcp`, a Model Context Protocol server offering a `search`
//!   tool, a `duckduckgo://regions` resource and two prompt templates
//!
//! ## Quick Start
//!
//! ### Direct search
//!
//! ```rust,no_run
//! use duckduckgo::{Category, SearchQuery, tools::search::SearchClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SearchClient::new()?;
//!     let query = SearchQuery::new("Rust programming")
//!         .with_max_results(5)
//!         .with_category(Category::News);
//!     let response = client.search(&query).await?;
//!     for result in response.results {
//!         println!("{} - {}", result.title, result.url);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### As an MCP server
//!
//! ```rust,no_run
//! use duckduckgo::{DuckDuckGoServer, ServerConfig, TransportType};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = DuckDuckGoServer::new(ServerConfig::default())?;
//!     server.run(TransportType::Stdio).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`]: parameters, validation, result records and errors
//! - [`tools`]: the DuckDuckGo client and response parsing
//! - [`server`]: MCP JSON-RPC handling over STDIO or SSE
//! - [`regions`]: region codes and the regions resource
//! - [`prompts`]: prompt templates
//! - [`output`]: terminal rendering
//! - [`config`]: shared command-line options and logging setup

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod output;
pub mod prompts;
pub mod regions;
pub mod server;
pub mod tools;
pub mod types;

// Re-export commonly used items at crate root
pub use server::{DuckDuckGoServer, ServerConfig, TransportType};
pub use tools::search::{SearchClient, SearchClientConfig};
pub use types::{
    Category, DuckDuckGoError, DuckDuckGoResult, SafeSearch, SearchQuery, SearchResponse,
    SearchResult, TimeLimit,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name for MCP protocol
pub const SERVER_NAME: &str = "DuckDuckGo Search";

/// Instructions sent to MCP clients on initialization
pub const SERVER_INSTRUCTIONS: &str = "A search server that provides access to DuckDuckGo search results. \
     Use the search tools to find information on the web.";
