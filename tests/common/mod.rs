//! Fixtures shared by the integration test binaries.
#![allow(dead_code)]

use duckduckgo::tools::search::{SearchClient, SearchClientConfig};
use std::time::Duration;
use wiremock::MockServer;

/// A text result as `(title, url, snippet)`
pub type Row<'a> = (&'a str, &'a str, &'a str);

/// Render a DuckDuckGo-style HTML results page
pub fn html_page(rows: &[Row<'_>], next_offset: Option<usize>) -> String {
    let mut html = String::from("<html><body>\n");

    for (title, url, snippet) in rows {
        html.push_str(&format!(
            r#"<div class="result results_links web-result">
  <h2 class="result__title"><a class="result__a" href="//duckduckgo.com/l/?uddg={}&amp;rut=x">{}</a></h2>
  <a class="result__snippet">{}</a>
</div>
"#,
            urlencoding::encode(url),
            title,
            snippet
        ));
    }

    if let Some(offset) = next_offset {
        html.push_str(&format!(
            r#"<div class="nav-link"><form action="/html/" method="post">
  <input type="submit" class="btn btn--alt" value="Next" />
  <input type="hidden" name="q" value="rust" />
  <input type="hidden" name="s" value="{}" />
  <input type="hidden" name="dc" value="{}" />
</form></div>
"#,
            offset,
            offset + 1
        ));
    }

    html.push_str("</body></html>\n");
    html
}

/// Landing page carrying a vqd token
pub fn vqd_page(token: &str) -> String {
    format!(
        r#"<html><script>DDG.deep.initialize('/d.js?q=rust&vqd="{}"&kl=wt-wt');</script></html>"#,
        token
    )
}

/// Client configuration pointing at the mock server, without retry delays
pub fn mock_config(server: &MockServer) -> SearchClientConfig {
    SearchClientConfig {
        html_url: format!("{}/html/", server.uri()),
        site_url: format!("{}/", server.uri()),
        timeout: Duration::from_secs(5),
        max_retry_elapsed: Duration::ZERO,
        ..Default::default()
    }
}

/// Search client pointing at the mock server
pub fn mock_client(server: &MockServer) -> SearchClient {
    SearchClient::with_config(mock_config(server)).expect("mock client")
}
