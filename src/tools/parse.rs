//! Parsing of DuckDuckGo responses into raw records, and reshaping of raw
//! records into uniform [`SearchResult`]s.
//!
//! Raw records are loose JSON objects, keyed the way each endpoint names
//! things (`href`, `url`, `content`, `image`, `body`, `excerpt`, ...).
//! [`normalize_record`] is the single place that turns any of them into a
//! `{title, url, body}` record.

use crate::types::{Category, SearchResult};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// A provider record before normalization
pub type RawRecord = Map<String, Value>;

/// Title used when a record has none
pub const NO_TITLE: &str = "No title";

/// URL used when a record has none
pub const NO_URL: &str = "No URL";

/// Body used when a record has none
pub const NO_BODY: &str = "No body";

/// Keys tried, in order, for the result URL
const URL_KEYS: [&str; 4] = ["href", "url", "content", "image"];

/// Keys tried, in order, for the result body
const BODY_KEYS: [&str; 3] = ["body", "description", "excerpt"];

/// Tracking links DuckDuckGo interleaves with organic results
const AD_REDIRECT_PREFIX: &str = "https://duckduckgo.com/y.js";

lazy_static! {
    /// Selector for search results
    static ref RESULT_SELECTOR: Selector = Selector::parse("div.result").unwrap();

    /// Selector for result title
    static ref TITLE_SELECTOR: Selector = Selector::parse("a.result__a").unwrap();

    /// Selector for result snippet
    static ref SNIPPET_SELECTOR: Selector = Selector::parse(".result__snippet").unwrap();

    /// Selector for the pagination forms
    static ref NAV_FORM_SELECTOR: Selector = Selector::parse("div.nav-link form").unwrap();

    /// Selector for named form inputs
    static ref INPUT_SELECTOR: Selector = Selector::parse("input[name]").unwrap();

    /// Selector for submit buttons
    static ref SUBMIT_SELECTOR: Selector = Selector::parse("input[type=\"submit\"]").unwrap();

    /// Regex for the vqd token embedded in the landing page
    static ref VQD_REGEX: Regex = Regex::new(r#"vqd=["']?([\w-]+)"#).unwrap();
}

/// Results and the next page form of one HTML results page
#[derive(Debug, Default)]
pub struct HtmlPage {
    /// Organic results, ads and tracking links removed
    pub records: Vec<RawRecord>,

    /// Form fields to POST for the next page, if any
    pub next_page: Option<Vec<(String, String)>>,
}

/// One page of a JSON vertical endpoint (`i.js`, `v.js`, `news.js`)
#[derive(Debug, Default, Deserialize)]
pub struct VerticalPage {
    /// Raw result objects
    #[serde(default)]
    pub results: Vec<RawRecord>,

    /// Relative URL of the next page
    #[serde(default)]
    pub next: Option<String>,
}

impl VerticalPage {
    /// Offset (`s` parameter) of the next page
    pub fn next_offset(&self) -> Option<String> {
        let next = self.next.as_deref()?;
        let query = next.split_once('?').map(|(_, q)| q).unwrap_or(next);

        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "s")
            .map(|(_, value)| value.into_owned())
    }
}

/// Parse the HTML results page returned by the text endpoint
pub fn parse_html_page(html: &str) -> HtmlPage {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for element in document.select(&RESULT_SELECTOR) {
        if is_ad(&element) {
            continue;
        }

        let title_element = match element.select(&TITLE_SELECTOR).next() {
            Some(el) => el,
            None => continue,
        };

        let title = clean_text(&title_element.text().collect::<String>());
        let href = match title_element.value().attr("href") {
            Some(href) => extract_actual_url(href),
            None => continue,
        };

        if href.is_empty() || !href.starts_with("http") || href.starts_with(AD_REDIRECT_PREFIX) {
            continue;
        }

        let body = element
            .select(&SNIPPET_SELECTOR)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .unwrap_or_default();

        let mut record = RawRecord::new();
        record.insert("title".to_string(), Value::String(title));
        record.insert("href".to_string(), Value::String(href));
        record.insert("body".to_string(), Value::String(body));
        records.push(record);
    }

    if records.is_empty() {
        debug!("No organic results found in HTML page");
    }

    HtmlPage {
        records,
        next_page: parse_next_page(&document),
    }
}

fn is_ad(element: &ElementRef<'_>) -> bool {
    element
        .value()
        .classes()
        .any(|class| class == "result--ad")
}

/// Hidden fields of the "Next" pagination form
fn parse_next_page(document: &Html) -> Option<Vec<(String, String)>> {
    document
        .select(&NAV_FORM_SELECTOR)
        .filter(|form| {
            form.select(&SUBMIT_SELECTOR)
                .any(|submit| submit.value().attr("value") == Some("Next"))
        })
        .last()
        .map(|form| {
            form.select(&INPUT_SELECTOR)
                .filter(|input| input.value().attr("type") != Some("submit"))
                .filter_map(|input| {
                    let name = input.value().attr("name")?;
                    let value = input.value().attr("value").unwrap_or_default();
                    Some((name.to_string(), value.to_string()))
                })
                .collect()
        })
}

/// Extract the vqd token from the DuckDuckGo landing page
pub fn extract_vqd(html: &str) -> Option<String> {
    VQD_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a JSON vertical page
pub fn parse_vertical_page(body: &str) -> serde_json::Result<VerticalPage> {
    serde_json::from_str(body)
}

fn first_non_empty<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Reshape a raw provider record into a uniform result
pub fn normalize_record(record: &RawRecord) -> SearchResult {
    let title = record
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(NO_TITLE);

    SearchResult {
        title: title.to_string(),
        url: first_non_empty(record, &URL_KEYS).unwrap_or(NO_URL).to_string(),
        body: first_non_empty(record, &BODY_KEYS).unwrap_or(NO_BODY).to_string(),
    }
}

/// Record key that identifies a distinct result in each category
///
/// Image records point at their host page through `url`, so several images
/// from one page share it; the image link itself tells them apart.
pub fn identity_key(category: Category) -> &'static str {
    match category {
        Category::Text => "href",
        Category::Images => "image",
        Category::Videos => "content",
        Category::News => "url",
    }
}

/// Normalize records, dropping repeats and stopping at `max_results`
///
/// Repeats are detected on the category's [`identity_key`], falling back to
/// the normalized URL for records that lack it.
pub fn collect_results(
    records: impl IntoIterator<Item = RawRecord>,
    category: Category,
    seen: &mut HashSet<String>,
    out: &mut Vec<SearchResult>,
    max_results: usize,
) {
    let key = identity_key(category);

    for record in records {
        if out.len() >= max_results {
            break;
        }

        let result = normalize_record(&record);
        let identity = first_non_empty(&record, &[key])
            .map(str::to_string)
            .or_else(|| (result.url != NO_URL).then(|| result.url.clone()));

        if let Some(identity) = identity
            && !seen.insert(identity)
        {
            continue;
        }
        out.push(result);
    }
}

/// Extract the actual URL from DuckDuckGo's redirect URL
pub fn extract_actual_url(href: &str) -> String {
    // Redirects look like //duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...
    if href.contains("uddg=")
        && let Some(encoded_url) = href.split("uddg=").nth(1)
        && let Some(decoded) = encoded_url.split('&').next()
    {
        return urlencoding::decode(decoded)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| href.to_string());
    }

    if href.starts_with("//") {
        return format!("https:{}", href);
    }

    href.to_string()
}

/// Collapse runs of whitespace in text extracted from the results page
///
/// Entities are already decoded by the HTML parser, so the text is taken
/// literally.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RESULTS_PAGE: &str = r##"
<html><body>
<div class="result results_links result--ad">
  <h2 class="result__title"><a class="result__a" href="https://duckduckgo.com/y.js?ad_domain=shop.example">Buy things</a></h2>
  <a class="result__snippet">Sponsored</a>
</div>
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title"><a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">Rust Programming Language</a></h2>
  <a class="result__snippet" href="#">A language empowering everyone to build reliable &amp; efficient software.</a>
</div>
<div class="result results_links web-result">
  <h2 class="result__title"><a class="result__a" href="https://doc.rust-lang.org/book/">The   Rust Book</a></h2>
</div>
<div class="result results_links web-result">
  <h2 class="result__title"><a class="result__a" href="/relative">Not a link</a></h2>
</div>
<div class="nav-link">
  <form action="/html/" method="post">
    <input type="submit" class="btn btn--alt" value="Next" />
    <input type="hidden" name="q" value="rust" />
    <input type="hidden" name="s" value="10" />
    <input type="hidden" name="dc" value="11" />
    <input type="hidden" name="vqd" value="4-123" />
    <input name="kl" value="us-en" type="hidden" />
  </form>
</div>
</body></html>
"##;

    #[test]
    fn test_parse_html_page() {
        let page = parse_html_page(RESULTS_PAGE);
        assert_eq!(page.records.len(), 2);

        let first = normalize_record(&page.records[0]);
        assert_eq!(first.title, "Rust Programming Language");
        assert_eq!(first.url, "https://www.rust-lang.org/");
        assert!(first.body.contains("reliable & efficient"));

        let second = normalize_record(&page.records[1]);
        assert_eq!(second.title, "The Rust Book");
        assert_eq!(second.body, NO_BODY);
    }

    #[test]
    fn test_parse_next_page_form() {
        let page = parse_html_page(RESULTS_PAGE);
        let next = page.next_page.expect("next page form");

        assert!(next.iter().any(|(k, v)| k == "s" && v == "10"));
        assert!(next.iter().any(|(k, v)| k == "kl" && v == "us-en"));
        assert!(next.iter().all(|(k, _)| !k.is_empty()));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let html = r#"<div class="nav-link"><form><input type="submit" value="Previous" /><input type="hidden" name="s" value="0" /></form></div>"#;
        assert!(parse_html_page(html).next_page.is_none());
    }

    #[test]
    fn test_extract_actual_url() {
        let ddg_url = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpath&rut=abc";
        assert_eq!(extract_actual_url(ddg_url), "https://example.com/path");
        assert_eq!(extract_actual_url("//example.com/path"), "https://example.com/path");
        assert_eq!(extract_actual_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_extract_vqd() {
        assert_eq!(
            extract_vqd(r#"<script>DDG.deep.initialize('/d.js?q=rust&vqd="4-1234567890"&kl=wt-wt');</script>"#),
            Some("4-1234567890".to_string())
        );
        assert_eq!(
            extract_vqd("nrj('/d.js?q=rust&vqd=4-987&p=1')"),
            Some("4-987".to_string())
        );
        assert_eq!(extract_vqd("<html>nothing here</html>"), None);
    }

    #[test]
    fn test_normalize_record_fallbacks() {
        let records = [
            json!({"href": "https://example.com"}),
            json!({"title": "Only title"}),
            json!({"body": "Only body"}),
        ];

        let results: Vec<SearchResult> = records
            .iter()
            .map(|r| normalize_record(r.as_object().unwrap()))
            .collect();

        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        let bodies: Vec<&str> = results.iter().map(|r| r.body.as_str()).collect();

        assert_eq!(titles, ["No title", "Only title", "No title"]);
        assert_eq!(urls, ["https://example.com", "No URL", "No URL"]);
        assert_eq!(bodies, ["No body", "No body", "Only body"]);
    }

    #[test]
    fn test_normalize_vertical_records() {
        let video = json!({
            "title": "Intro to Rust",
            "content": "https://www.youtube.com/watch?v=abc",
            "description": "A short intro",
            "duration": "12:01"
        });
        let result = normalize_record(video.as_object().unwrap());
        assert_eq!(result.url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(result.body, "A short intro");

        let image = json!({
            "title": "Ferris",
            "image": "https://img.example/ferris.png",
            "url": "https://rustacean.net/",
            "thumbnail": "https://tse.example/th.jpg"
        });
        let result = normalize_record(image.as_object().unwrap());
        assert_eq!(result.url, "https://rustacean.net/");
        assert_eq!(result.body, NO_BODY);

        let news = json!({"title": "Rust 2.0?", "url": "https://news.example/a", "excerpt": "Not yet.", "date": 1700000000});
        let result = normalize_record(news.as_object().unwrap());
        assert_eq!(result.body, "Not yet.");
    }

    #[test]
    fn test_empty_url_falls_through() {
        let record = json!({"href": "", "url": "https://fallback.example"});
        let result = normalize_record(record.as_object().unwrap());
        assert_eq!(result.url, "https://fallback.example");
    }

    #[test]
    fn test_collect_results_dedup_and_limit() {
        let records: Vec<RawRecord> = [
            json!({"title": "a", "href": "https://a.example"}),
            json!({"title": "a again", "href": "https://a.example"}),
            json!({"title": "b", "href": "https://b.example"}),
            json!({"title": "c", "href": "https://c.example"}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        collect_results(records, Category::Text, &mut seen, &mut out, 2);

        let titles: Vec<&str> = out.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["a", "b"]);
    }

    fn records(values: Vec<serde_json::Value>) -> Vec<RawRecord> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_images_from_one_page_are_kept() {
        let page = "https://en.wikipedia.org/wiki/Rust";
        let images = records(vec![
            json!({"title": "Ferris 1", "image": "https://img.example/1.png", "url": page}),
            json!({"title": "Ferris 2", "image": "https://img.example/2.png", "url": page}),
            json!({"title": "Ferris 3", "image": "https://img.example/3.png", "url": page}),
            json!({"title": "Ferris 1 again", "image": "https://img.example/1.png", "url": page}),
        ]);

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        collect_results(images, Category::Images, &mut seen, &mut out, 10);

        let titles: Vec<&str> = out.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Ferris 1", "Ferris 2", "Ferris 3"]);
        assert!(out.iter().all(|r| r.url == page));
    }

    #[test]
    fn test_dedup_falls_back_to_url() {
        let news = records(vec![
            json!({"title": "a", "url": "https://news.example/a"}),
            json!({"title": "a mirror", "href": "https://news.example/a"}),
            json!({"title": "untitled"}),
            json!({"title": "untitled too"}),
        ]);

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        collect_results(news, Category::News, &mut seen, &mut out, 10);

        let titles: Vec<&str> = out.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["a", "untitled", "untitled too"]);
    }

    #[test]
    fn test_vertical_page_next_offset() {
        let page = parse_vertical_page(
            r#"{"results": [{"title": "x"}], "next": "i.js?q=rust&o=json&p=1&s=100&u=bing&l=us-en"}"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.next_offset(), Some("100".to_string()));

        let last = parse_vertical_page(r#"{"results": []}"#).unwrap();
        assert_eq!(last.next_offset(), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Multiple   spaces \n here "), "Multiple spaces here");
        assert_eq!(clean_text("&lt;html&gt;"), "&lt;html&gt;");
    }

    #[test]
    fn test_escaped_entities_survive_parsing() {
        let html = r#"<div class="result"><a class="result__a" href="https://example.com/">Use &amp;lt;div&amp;gt; &amp; friends</a><a class="result__snippet">Write &amp;amp; read</a></div>"#;
        let page = parse_html_page(html);
        let result = normalize_record(&page.records[0]);

        assert_eq!(result.title, "Use &lt;div&gt; & friends");
        assert_eq!(result.body, "Write &amp; read");
    }
}
