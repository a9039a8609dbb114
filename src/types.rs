//! Common types and data structures shared by the CLI and the MCP server.
//!
//! This module contains:
//! - The error type used across the crate
//! - Search parameter enums and the validated [`SearchQuery`]
//! - The uniform [`SearchResult`] / [`SearchResponse`] records

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for crate operations
pub type DuckDuckGoResult<T> = Result<T, DuckDuckGoError>;

/// Smallest accepted `max_results`
pub const MIN_RESULTS: usize = 1;

/// Largest accepted `max_results`
pub const MAX_RESULTS: usize = 50;

/// `max_results` used when the caller does not pass one
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Region sent to DuckDuckGo when none is given
pub const DEFAULT_REGION: &str = "us-en";

/// Errors that can occur while searching or serving requests
#[derive(Error, Debug)]
pub enum DuckDuckGoError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The provider answered but the search could not be completed
    #[error("Search failed: {0}")]
    SearchError(String),

    /// Invalid arguments provided
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Unknown resource or prompt
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, please try again later")]
    RateLimitExceeded,

    /// Timeout occurred
    #[error("Operation timed out")]
    Timeout,
}

impl DuckDuckGoError {
    /// Map a reqwest error, keeping timeouts distinguishable
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DuckDuckGoError::Timeout
        } else {
            DuckDuckGoError::HttpError(err)
        }
    }

    /// Whether the error was raised before any request left the process
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self, DuckDuckGoError::InvalidArguments(_))
    }
}

/// Safe search filtering levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    /// Strict filtering
    On,
    /// Moderate filtering
    Moderate,
    /// No filtering (default)
    #[default]
    Off,
}

impl SafeSearch {
    /// Accepted spellings, for error messages and schemas
    pub const VALUES: [&'static str; 3] = ["on", "moderate", "off"];

    /// Lower-case name as used on both surfaces
    pub fn as_str(&self) -> &'static str {
        match self {
            SafeSearch::On => "on",
            SafeSearch::Moderate => "moderate",
            SafeSearch::Off => "off",
        }
    }
}

impl std::fmt::Display for SafeSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SafeSearch {
    type Err = DuckDuckGoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on" => Ok(SafeSearch::On),
            "moderate" => Ok(SafeSearch::Moderate),
            "off" => Ok(SafeSearch::Off),
            _ => Err(invalid_choice("safesearch", s, &Self::VALUES)),
        }
    }
}

/// Restricts results to a recent time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeLimit {
    /// Past day
    Day,
    /// Past week
    Week,
    /// Past month
    Month,
    /// Past year
    Year,
}

impl TimeLimit {
    /// Accepted spellings, for error messages and schemas
    pub const VALUES: [&'static str; 4] = ["day", "week", "month", "year"];

    /// Full lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeLimit::Day => "day",
            TimeLimit::Week => "week",
            TimeLimit::Month => "month",
            TimeLimit::Year => "year",
        }
    }

    /// Single-letter code used by the text and news endpoints
    pub fn letter(&self) -> &'static str {
        match self {
            TimeLimit::Day => "d",
            TimeLimit::Week => "w",
            TimeLimit::Month => "m",
            TimeLimit::Year => "y",
        }
    }
}

impl std::fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeLimit {
    type Err = DuckDuckGoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "d" => Ok(TimeLimit::Day),
            "week" | "w" => Ok(TimeLimit::Week),
            "month" | "m" => Ok(TimeLimit::Month),
            "year" | "y" => Ok(TimeLimit::Year),
            _ => Err(invalid_choice("timelimit", s, &Self::VALUES)),
        }
    }
}

/// Kind of results to search for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Web pages (default)
    #[default]
    Text,
    /// Images
    Images,
    /// Videos
    Videos,
    /// News articles
    News,
}

impl Category {
    /// Accepted spellings, for error messages and schemas
    pub const VALUES: [&'static str; 4] = ["text", "images", "videos", "news"];

    /// Lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Images => "images",
            Category::Videos => "videos",
            Category::News => "news",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = DuckDuckGoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Category::Text),
            "images" => Ok(Category::Images),
            "videos" => Ok(Category::Videos),
            "news" => Ok(Category::News),
            _ => Err(invalid_choice("categories", s, &Self::VALUES)),
        }
    }
}

fn invalid_choice(field: &str, value: &str, allowed: &[&str]) -> DuckDuckGoError {
    DuckDuckGoError::InvalidArguments(format!(
        "invalid {} value '{}' (expected one of: {})",
        field,
        value.trim(),
        allowed.join(", ")
    ))
}

/// A single search request, shared by the CLI and the MCP tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search query string
    pub query: String,

    /// Maximum number of results to return (1-50)
    pub max_results: usize,

    /// Region code, e.g. `us-en`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Safe search filtering level
    pub safesearch: SafeSearch,

    /// Optional time window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timelimit: Option<TimeLimit>,

    /// Result category
    pub category: Category,
}

impl SearchQuery {
    /// Create a query with default options
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
            region: None,
            safesearch: SafeSearch::default(),
            timelimit: None,
            category: Category::default(),
        }
    }

    /// Set the maximum number of results
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the region; blank strings clear it
    pub fn with_region(mut self, region: Option<impl Into<String>>) -> Self {
        self.region = region
            .map(Into::<String>::into)
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self
    }

    /// Set the safe search level
    pub fn with_safesearch(mut self, safesearch: SafeSearch) -> Self {
        self.safesearch = safesearch;
        self
    }

    /// Set the time limit
    pub fn with_timelimit(mut self, timelimit: Option<TimeLimit>) -> Self {
        self.timelimit = timelimit;
        self
    }

    /// Set the result category
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Region actually sent to the provider
    pub fn effective_region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Check the query before any request is made
    pub fn validate(&self) -> DuckDuckGoResult<()> {
        if self.query.trim().is_empty() {
            return Err(DuckDuckGoError::InvalidArguments(
                "query must not be empty".to_string(),
            ));
        }

        check_max_results(self.max_results as i64)?;
        Ok(())
    }
}

fn check_max_results(value: i64) -> DuckDuckGoResult<usize> {
    if value < MIN_RESULTS as i64 || value > MAX_RESULTS as i64 {
        return Err(DuckDuckGoError::InvalidArguments(format!(
            "max_results must be between {} and {} (got {})",
            MIN_RESULTS, MAX_RESULTS, value
        )));
    }
    Ok(value as usize)
}

/// Raw arguments of the MCP `search` tool, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchToolArgs {
    /// The search query string
    pub query: String,

    /// Maximum number of results (1-50)
    #[serde(default)]
    pub max_results: Option<i64>,

    /// Result category
    #[serde(default)]
    pub categories: Option<String>,

    /// Region code
    #[serde(default)]
    pub region: Option<String>,

    /// Safe search level
    #[serde(default)]
    pub safesearch: Option<String>,

    /// Time limit
    #[serde(default)]
    pub timelimit: Option<String>,
}

impl TryFrom<SearchToolArgs> for SearchQuery {
    type Error = DuckDuckGoError;

    fn try_from(args: SearchToolArgs) -> Result<Self, Self::Error> {
        let max_results = match args.max_results {
            Some(n) => check_max_results(n)?,
            None => DEFAULT_MAX_RESULTS,
        };

        let category = match args.categories.as_deref() {
            Some(c) => c.parse()?,
            None => Category::default(),
        };

        let safesearch = match args.safesearch.as_deref() {
            Some(s) => s.parse()?,
            None => SafeSearch::default(),
        };

        let timelimit = match args.timelimit.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(t) => Some(t.parse()?),
        };

        let query = SearchQuery::new(args.query)
            .with_max_results(max_results)
            .with_region(args.region)
            .with_safesearch(safesearch)
            .with_timelimit(timelimit)
            .with_category(category);

        query.validate()?;
        Ok(query)
    }
}

/// A single search result, identical on every surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title of the result
    pub title: String,

    /// URL of the result
    pub url: String,

    /// Body or snippet of the result
    pub body: String,
}

/// Complete search response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The search query that was executed
    pub query: String,

    /// Number of results returned
    pub total_results: usize,

    /// The results, in provider order
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    /// Create a new search response
    pub fn new(query: String, results: Vec<SearchResult>) -> Self {
        Self {
            query,
            total_results: results.len(),
            results,
        }
    }
}

/// JSON Schema for the `search` tool arguments
pub fn search_args_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query string"
            },
            "max_results": {
                "type": "integer",
                "description": "Maximum number of results to return (1-50)",
                "default": DEFAULT_MAX_RESULTS,
                "minimum": MIN_RESULTS,
                "maximum": MAX_RESULTS
            },
            "categories": {
                "type": "string",
                "enum": Category::VALUES,
                "description": "Result type to search: text (default), images, videos, or news",
                "default": "text"
            },
            "region": {
                "type": ["string", "null"],
                "description": "Region code (e.g., 'us-en', 'uk-en', 'de-de')"
            },
            "safesearch": {
                "type": "string",
                "enum": SafeSearch::VALUES,
                "description": "Safe search level",
                "default": "off"
            },
            "timelimit": {
                "type": ["string", "null"],
                "enum": [TimeLimit::VALUES[0], TimeLimit::VALUES[1], TimeLimit::VALUES[2], TimeLimit::VALUES[3], null],
                "description": "Time limit for results"
            }
        },
        "required": ["query"]
    })
}
