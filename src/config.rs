//! Command-line and environment configuration shared by both binaries.

use crate::tools::search::{DDG_HTML_URL, DDG_SITE_URL, SearchClientConfig, USER_AGENT};
use clap::Args;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};

/// Options controlling how the search client talks to DuckDuckGo
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Per-request timeout in seconds
    #[arg(long, env = "DUCKDUCKGO_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Seconds spent retrying rate-limited or failed requests
    #[arg(long, env = "DUCKDUCKGO_RETRY_SECS", default_value = "30")]
    pub retry_secs: u64,

    /// Text search endpoint
    #[arg(long, env = "DUCKDUCKGO_HTML_URL", default_value = DDG_HTML_URL, hide = true)]
    pub html_url: String,

    /// Site root used for image, video and news searches
    #[arg(long, env = "DUCKDUCKGO_SITE_URL", default_value = DDG_SITE_URL, hide = true)]
    pub site_url: String,
}

impl From<ClientArgs> for SearchClientConfig {
    fn from(args: ClientArgs) -> Self {
        Self {
            html_url: args.html_url,
            site_url: args.site_url,
            timeout: Duration::from_secs(args.timeout),
            max_retry_elapsed: Duration::from_secs(args.retry_secs),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Set up logging on stderr
///
/// `RUST_LOG` takes precedence; otherwise `quiet` disables logging,
/// `verbose` enables debug output and `default_level` applies.
pub fn setup_logging(verbose: bool, quiet: bool, default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("off")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(default_level)
        }
    });

    // stdout carries results or JSON-RPC, so logs always go to stderr
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
