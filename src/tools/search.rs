//! DuckDuckGo search client.
//!
//! Text results come from DuckDuckGo's HTML interface. Images, videos and
//! news come from the JSON endpoints behind duckduckgo.com, which need a
//! per-query `vqd` token fetched from the landing page first.

use crate::regions::is_known_region;
use crate::tools::parse::{self, RawRecord};
use crate::types::{
    Category, DuckDuckGoError, DuckDuckGoResult, SafeSearch, SearchQuery, SearchResponse,
    SearchResult, TimeLimit,
};
use backoff::{ExponentialBackoff, future::retry};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Default user agent for requests
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// DuckDuckGo HTML search URL
pub const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo site root, host of the vqd landing page and JSON endpoints
pub const DDG_SITE_URL: &str = "https://duckduckgo.com/";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time budget for retrying transient failures
pub const DEFAULT_RETRY_ELAPSED: Duration = Duration::from_secs(30);

/// Pages fetched at most per search
const MAX_PAGES: usize = 5;

/// Configuration for [`SearchClient`]
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    /// Text search endpoint
    pub html_url: String,

    /// Site root for the vqd token and vertical endpoints
    pub site_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Total time spent retrying transient failures
    pub max_retry_elapsed: Duration,

    /// User agent header
    pub user_agent: String,
}

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self {
            html_url: DDG_HTML_URL.to_string(),
            site_url: DDG_SITE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retry_elapsed: DEFAULT_RETRY_ELAPSED,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// HTTP client for making search requests
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    html_url: Url,
    site_url: Url,
    max_retry_elapsed: Duration,
}

impl SearchClient {
    /// Create a search client with the default configuration
    pub fn new() -> DuckDuckGoResult<Self> {
        Self::with_config(SearchClientConfig::default())
    }

    /// Create a search client from an explicit configuration
    pub fn with_config(config: SearchClientConfig) -> DuckDuckGoResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(DuckDuckGoError::HttpError)?;

        Ok(Self {
            client,
            html_url: Url::parse(&config.html_url)?,
            site_url: Url::parse(&config.site_url)?,
            max_retry_elapsed: config.max_retry_elapsed,
        })
    }

    /// Run a search and reshape the results into uniform records
    ///
    /// The query is validated first; nothing is sent for an invalid query.
    #[instrument(skip(self, query), fields(query = %query.query, category = %query.category))]
    pub async fn search(&self, query: &SearchQuery) -> DuckDuckGoResult<SearchResponse> {
        query.validate()?;

        let region = query.effective_region();
        if !is_known_region(region) {
            warn!(region = %region, "Region is not a known DuckDuckGo region code");
        }

        info!(
            region = %region,
            safesearch = %query.safesearch,
            max_results = query.max_results,
            "Performing search"
        );

        let results = match query.category {
            Category::Text => self.search_text(query).await?,
            Category::Images => self.search_vertical(query, Vertical::Images).await?,
            Category::Videos => self.search_vertical(query, Vertical::Videos).await?,
            Category::News => self.search_vertical(query, Vertical::News).await?,
        };

        info!(result_count = results.len(), "Search completed");

        Ok(SearchResponse::new(query.query.clone(), results))
    }

    /// Search the HTML endpoint, following "Next" forms until enough results
    async fn search_text(&self, query: &SearchQuery) -> DuckDuckGoResult<Vec<SearchResult>> {
        let mut params = text_params(query);
        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(query.max_results);

        for page in 0..MAX_PAGES {
            let html = self
                .send_with_retry(|| self.client.post(self.html_url.clone()).form(&params))
                .await?;

            let parsed = parse::parse_html_page(&html);
            debug!(page, records = parsed.records.len(), "Parsed results page");

            if parsed.records.is_empty() {
                break;
            }
            parse::collect_results(
                parsed.records,
                Category::Text,
                &mut seen,
                &mut results,
                query.max_results,
            );

            if results.len() >= query.max_results {
                break;
            }
            match parsed.next_page {
                Some(next) => params = next,
                None => break,
            }
        }

        Ok(results)
    }

    /// Search one of the JSON vertical endpoints
    async fn search_vertical(
        &self,
        query: &SearchQuery,
        vertical: Vertical,
    ) -> DuckDuckGoResult<Vec<SearchResult>> {
        let vqd = self.fetch_vqd(&query.query).await?;
        let endpoint = self.site_url.join(vertical.path())?;
        let base_params = vertical_params(query, vertical, &vqd);

        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(query.max_results);
        let mut offset: Option<String> = None;

        for page in 0..MAX_PAGES {
            let mut params = base_params.clone();
            if let Some(ref s) = offset {
                params.push(("s".to_string(), s.clone()));
            }

            let body = self
                .send_with_retry(|| {
                    self.client
                        .get(endpoint.clone())
                        .query(&params)
                        .header(reqwest::header::REFERER, self.site_url.as_str())
                })
                .await?;

            let parsed = parse::parse_vertical_page(&body).map_err(|e| {
                error!(error = %e, "Unexpected vertical search payload");
                DuckDuckGoError::SearchError(format!("unexpected response: {}", e))
            })?;
            debug!(page, records = parsed.results.len(), "Parsed vertical page");

            let next_offset = parsed.next_offset();
            if parsed.results.is_empty() {
                break;
            }
            parse::collect_results(
                parsed.results,
                query.category,
                &mut seen,
                &mut results,
                query.max_results,
            );

            if results.len() >= query.max_results {
                break;
            }
            match next_offset {
                Some(s) => offset = Some(s),
                None => break,
            }
        }

        Ok(results)
    }

    /// Fetch the vqd token required by the JSON endpoints
    async fn fetch_vqd(&self, keywords: &str) -> DuckDuckGoResult<String> {
        let html = self
            .send_with_retry(|| self.client.get(self.site_url.clone()).query(&[("q", keywords)]))
            .await?;

        parse::extract_vqd(&html).ok_or_else(|| {
            DuckDuckGoError::SearchError("could not obtain vqd token for query".to_string())
        })
    }

    /// Send a request with exponential backoff on transient failures
    async fn send_with_retry<F>(&self, build: F) -> DuckDuckGoResult<String>
    where
        F: Fn() -> RequestBuilder,
    {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_retry_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = build().send().await.map_err(|e| {
                warn!(error = %e, "Search request failed, retrying...");
                backoff::Error::transient(DuckDuckGoError::from_reqwest(e))
            })?;

            let status = response.status();

            // DuckDuckGo answers 202 with an anomaly page when it throttles.
            if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::ACCEPTED {
                warn!(status = %status, "Search was rate limited");
                return Err(backoff::Error::transient(DuckDuckGoError::RateLimitExceeded));
            }

            if !status.is_success() {
                warn!(status = %status, "Search returned non-success status");
                return Err(backoff::Error::permanent(DuckDuckGoError::SearchError(
                    format!("HTTP {}", status),
                )));
            }

            response.text().await.map_err(|e| {
                error!(error = %e, "Failed to read response body");
                backoff::Error::permanent(DuckDuckGoError::from_reqwest(e))
            })
        })
        .await
    }
}

/// Run a single search with a default client
///
/// # Example
///
/// ```rust,no_run
/// use duckduckgo::{SearchQuery, tools::search::perform_search};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let response = perform_search(&SearchQuery::new("Rust programming")).await?;
///     println!("Found {} results", response.total_results);
///     Ok(())
/// }
/// ```
pub async fn perform_search(query: &SearchQuery) -> DuckDuckGoResult<SearchResponse> {
    let client = SearchClient::new()?;
    client.search(query).await
}

/// Form parameters for the first HTML results page
pub(crate) fn text_params(query: &SearchQuery) -> Vec<(String, String)> {
    let kp = match query.safesearch {
        SafeSearch::On => "1",
        SafeSearch::Moderate => "-1",
        SafeSearch::Off => "-2",
    };

    let mut params = vec![
        ("q".to_string(), query.query.clone()),
        ("b".to_string(), String::new()),
        ("kl".to_string(), query.effective_region().to_string()),
        ("kp".to_string(), kp.to_string()),
    ];

    if let Some(timelimit) = query.timelimit {
        params.push(("df".to_string(), timelimit.letter().to_string()));
    }

    params
}

/// Categories served by the vqd-gated JSON endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Vertical {
    Images,
    Videos,
    News,
}

impl Vertical {
    fn path(self) -> &'static str {
        match self {
            Vertical::Images => "i.js",
            Vertical::Videos => "v.js",
            Vertical::News => "news.js",
        }
    }
}

/// Query parameters for the JSON vertical endpoints
pub(crate) fn vertical_params(
    query: &SearchQuery,
    vertical: Vertical,
    vqd: &str,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("l".to_string(), query.effective_region().to_string()),
        ("o".to_string(), "json".to_string()),
        ("q".to_string(), query.query.clone()),
        ("vqd".to_string(), vqd.to_string()),
    ];

    match vertical {
        Vertical::Images => {
            let p = match query.safesearch {
                SafeSearch::On | SafeSearch::Moderate => "1",
                SafeSearch::Off => "-1",
            };
            let time = query
                .timelimit
                .map(|t| format!("time:{}", image_time(t)))
                .unwrap_or_default();
            params.push(("f".to_string(), format!("{},,,,,", time)));
            params.push(("p".to_string(), p.to_string()));
        },
        Vertical::Videos => {
            let time = match query.timelimit {
                Some(TimeLimit::Year) => {
                    warn!("Video search does not support a year limit, ignoring it");
                    String::new()
                },
                Some(t) => format!("publishedAfter:{}", t.letter()),
                None => String::new(),
            };
            params.push(("f".to_string(), format!("{},,,", time)));
            params.push(("p".to_string(), vertical_safesearch(query.safesearch).to_string()));
        },
        Vertical::News => {
            params.push(("noamp".to_string(), "1".to_string()));
            params.push(("p".to_string(), vertical_safesearch(query.safesearch).to_string()));
            match query.timelimit {
                Some(TimeLimit::Year) => {
                    warn!("News search does not support a year limit, ignoring it");
                },
                Some(t) => params.push(("df".to_string(), t.letter().to_string())),
                None => {},
            }
        },
    }

    params
}

fn vertical_safesearch(level: SafeSearch) -> &'static str {
    match level {
        SafeSearch::On => "1",
        SafeSearch::Moderate => "-1",
        SafeSearch::Off => "-2",
    }
}

fn image_time(limit: TimeLimit) -> &'static str {
    match limit {
        TimeLimit::Day => "Day",
        TimeLimit::Week => "Week",
        TimeLimit::Month => "Month",
        TimeLimit::Year => "Year",
    }
}

/// Reshape raw records of one category, for callers with their own data
pub fn shape_results(
    records: Vec<RawRecord>,
    category: Category,
    max_results: usize,
) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(max_results.min(records.len()));
    parse::collect_results(records, category, &mut seen, &mut out, max_results);
    out
}
