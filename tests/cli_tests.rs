//! Tests for the `duckduckgo-cli` binary.

mod common;

use assert_cmd::Command;
use common::{html_page, mock_config, vqd_page};
use duckduckgo::{
    SearchQuery, SearchResult,
    server::{DuckDuckGoHandler, JsonRpcRequest},
    tools::search::SearchClient,
};
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_duckduckgo-cli"));
    cmd.env_remove("RUST_LOG")
        .env_remove("DUCKDUCKGO_REGION")
        .env_remove("DUCKDUCKGO_SAFESEARCH");
    cmd
}

/// CLI pointed at the mock server
fn mocked_cli(server: &MockServer) -> Command {
    let mut cmd = cli();
    cmd.env("DUCKDUCKGO_HTML_URL", format!("{}/html/", server.uri()))
        .env("DUCKDUCKGO_SITE_URL", format!("{}/", server.uri()))
        .env("DUCKDUCKGO_RETRY_SECS", "0");
    cmd
}

async fn mount_text_results(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            &[
                ("pytest documentation", "https://docs.pytest.org/", "pytest: helps you write better programs."),
                ("unittest", "https://docs.python.org/3/library/unittest.html", "Unit testing framework."),
                ("Real Python", "https://realpython.com/python-testing/", "Getting started with testing in Python."),
            ],
            None,
        )))
        .mount(server)
        .await;
}

mod informational_tests {
    use super::*;

    #[test]
    fn test_list_regions_json() {
        let output = cli().args(["--list-regions", "--json"]).output().unwrap();
        assert!(output.status.success());

        let payload: Value = serde_json::from_slice(&output.stdout).unwrap();
        let regions = payload["regions"].as_array().unwrap();
        assert_eq!(payload["count"].as_u64().unwrap() as usize, regions.len());
        assert!(regions.iter().any(|r| r["code"] == "wt-wt"));
    }

    #[test]
    fn test_list_regions_text() {
        cli()
            .args(["--list-regions", "--no-color"])
            .assert()
            .success()
            .stdout(predicate::str::contains("us-en").and(predicate::str::contains("United States")));
    }

    #[test]
    fn test_list_prompts() {
        cli()
            .args(["--list-prompts", "--no-color"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("search_assistant")
                    .and(predicate::str::contains("research_planner"))
                    .and(predicate::str::contains("query (required)")),
            );
    }

    #[test]
    fn test_render_research_planner() {
        cli()
            .args(["--prompt", "research-planner", "--depth", "comprehensive", "quantum", "computing"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("8-12 detailed questions")
                    .and(predicate::str::contains("Topic: quantum computing"))
                    .and(predicate::str::contains("Research Depth: comprehensive")),
            );
    }

    #[test]
    fn test_render_search_assistant() {
        cli()
            .args(["--prompt", "search-assistant", "--context", "for beginners", "rust"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("Additional context: for beginners")
                    .and(predicate::str::contains("[SEARCH_RESULTS]")),
            );
    }

    #[test]
    fn test_context_requires_prompt() {
        cli().args(["--context", "x", "rust"]).assert().failure();
    }
}

mod argument_tests {
    use super::*;

    #[test]
    fn test_query_is_required() {
        cli().assert().failure();
    }

    #[test]
    fn test_max_results_out_of_range() {
        for value in ["0", "51"] {
            cli()
                .args(["-m", value, "rust"])
                .assert()
                .failure()
                .code(1)
                .stderr(predicate::str::contains("max_results must be between 1 and 50"));
        }
    }

    #[test]
    fn test_invalid_choices_rejected() {
        for args in [
            ["--safesearch", "strict"],
            ["--timelimit", "decade"],
            ["--categories", "maps"],
        ] {
            cli()
                .args(args)
                .arg("rust")
                .assert()
                .failure()
                .stderr(predicate::str::contains("invalid value"));
        }
    }
}

mod search_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_json_output() {
        let server = MockServer::start().await;
        mount_text_results(&server).await;

        let output = mocked_cli(&server)
            .args(["python", "testing", "-m", "2", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let results: Vec<SearchResult> = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "pytest documentation");
        assert_eq!(results[1].url, "https://docs.python.org/3/library/unittest.html");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_text_output() {
        let server = MockServer::start().await;
        mount_text_results(&server).await;

        mocked_cli(&server)
            .args(["python testing", "-m", "1", "--no-color"])
            .assert()
            .success()
            .stdout(
                "1. pytest documentation\n   URL: https://docs.pytest.org/\n   pytest: helps you write better programs.\n\n",
            );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html_page(&[], None)))
            .mount(&server)
            .await;

        mocked_cli(&server)
            .args(["zzqxj", "--no-color"])
            .assert()
            .success()
            .stdout("No results found.\n");

        mocked_cli(&server)
            .args(["zzqxj", "--json"])
            .assert()
            .success()
            .stdout("[]\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_news_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(vqd_page("4-cli")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/news.js"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"title": "Headline", "url": "https://news.example/1", "excerpt": "Summary."}]
            })))
            .mount(&server)
            .await;

        let output = mocked_cli(&server)
            .args(["rust", "-c", "news", "-t", "w", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let results: Vec<SearchResult> = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(
            results,
            vec![SearchResult {
                title: "Headline".to_string(),
                url: "https://news.example/1".to_string(),
                body: "Summary.".to_string(),
            }]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_provider_failure_exits_with_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        mocked_cli(&server)
            .args(["rust", "--no-color"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Error: Search failed: HTTP 500"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_line_without_color_flags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let output = mocked_cli(&server).args(["rust", "--quiet"]).output().unwrap();
        assert_eq!(output.status.code(), Some(1));

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        assert_eq!(lines.len(), 1, "expected one error line, got: {:?}", lines);
        assert!(lines[0].contains("Error:"));
        assert!(lines[0].contains("Search failed: HTTP 500"));
        assert!(!lines[0].contains('✗'));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cli_and_mcp_return_identical_records() {
        let server = MockServer::start().await;
        mount_text_results(&server).await;

        let output = mocked_cli(&server)
            .args(["python testing", "-m", "3", "-s", "moderate", "-r", "uk-en", "--json"])
            .output()
            .unwrap();
        let cli_results: Vec<SearchResult> = serde_json::from_slice(&output.stdout).unwrap();

        let client = SearchClient::with_config(mock_config(&server)).unwrap();
        let handler = DuckDuckGoHandler::with_client(client.clone());
        let response = handler
            .handle_request(JsonRpcRequest {
                jsonrpc: "2.0".to_string(),
                id: Some(json!(1)),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": "search",
                    "arguments": {
                        "query": "python testing",
                        "max_results": 3,
                        "safesearch": "moderate",
                        "region": "uk-en"
                    }
                })),
            })
            .await;
        let mcp_results: Vec<SearchResult> =
            serde_json::from_value(response.result.unwrap()["structuredContent"]["results"].clone())
                .unwrap();

        assert_eq!(cli_results, mcp_results);

        let direct = client
            .search(
                &SearchQuery::new("python testing")
                    .with_max_results(3)
                    .with_region(Some("uk-en")),
            )
            .await
            .unwrap();
        assert_eq!(direct.results, cli_results);
    }
}
