//! duckduckgo-mcp - DuckDuckGo search as a Model Context Protocol server.

use clap::{Parser, ValueEnum};
use duckduckgo::{
    DuckDuckGoServer, ServerConfig, TransportType, VERSION,
    config::{ClientArgs, setup_logging},
};
use std::net::{IpAddr, SocketAddr};

/// DuckDuckGo MCP server
#[derive(Parser, Debug)]
#[command(
    name = "duckduckgo-mcp",
    version = VERSION,
    about = "Model Context Protocol server for DuckDuckGo search",
    long_about = "Serves the DuckDuckGo `search` tool, the `duckduckgo://regions` resource and the \
                  `search_assistant` / `research_planner` prompts to MCP clients.\n\n\
                  Logs are written to stderr so the STDIO transport stays clean."
)]
struct Cli {
    /// Transport type to use
    #[arg(short, long, value_enum, default_value = "stdio")]
    transport: TransportOption,

    /// Port for SSE transport (only used with --transport sse)
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind to for SSE transport
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable all logging output
    #[arg(short, long)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(flatten)]
    client: ClientArgs,
}

/// Transport options
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum TransportOption {
    /// Standard input/output (for MCP clients)
    #[default]
    Stdio,
    /// Server-Sent Events over HTTP
    Sse,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, "info", cli.log_json);

    let transport = match cli.transport {
        TransportOption::Stdio => TransportType::Stdio,
        TransportOption::Sse => TransportType::Sse {
            addr: SocketAddr::new(cli.host, cli.port),
        },
    };

    let config = ServerConfig {
        client: cli.client.into(),
    };

    let server = DuckDuckGoServer::new(config)?;
    server.run(transport).await?;
    Ok(())
}
