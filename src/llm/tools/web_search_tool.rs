use crate::config::ToolSettings;
use crate::error::{ConciergeError, Result};
use crate::llm::tools::{LlmTool, ToolArguments, ToolDescriptor, ToolName};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const SNIPPET_CHARS: usize = 200;
pub const NO_RESULTS: &str = "No search results found.";

/// A web search result from DuckDuckGo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The title of the search result
    pub title: String,
    /// The URL of the search result
    pub url: String,
    /// A snippet/description of the search result
    pub snippet: String,
}

/// Tool for searching the web using DuckDuckGo
///
/// This tool searches DuckDuckGo's lite endpoint and returns organic search results as
/// numbered plain text. It does not require an API key. Unlike the weather tool there is
/// no offline fallback: a provider failure is reported as a failure.
#[derive(Clone)]
pub struct WebSearchTool {
    client: reqwest::Client,
    search_url: String,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(search_url: impl Into<String>, max_results: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            search_url: search_url.into(),
            max_results: max_results.max(1),
        })
    }

    pub fn from_settings(settings: &ToolSettings) -> Result<Self> {
        Self::new(
            settings.search_url.clone(),
            settings.search_max_results,
            settings.provider_timeout,
        )
    }

    /// Perform the web search
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ConciergeError::TimeoutError(format!("search provider did not answer in time: {}", e))
                } else {
                    ConciergeError::HttpError(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(ConciergeError::ApiError(format!(
                "HTTP request failed with status {}",
                response.status()
            )));
        }

        let html = response.text().await?;

        let results = Self::parse_results(&html, limit)?;
        debug!(query = query, results = results.len(), "Web search complete");
        Ok(results)
    }

    /// Parse HTML results from DuckDuckGo lite
    fn parse_results(html: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let document = Html::parse_document(html);

        let link_selector = Selector::parse("a.result-link")
            .map_err(|e| ConciergeError::ParseError(format!("Invalid selector: {:?}", e)))?;
        let snippet_selector = Selector::parse("td.result-snippet")
            .map_err(|e| ConciergeError::ParseError(format!("Invalid selector: {:?}", e)))?;

        let links: Vec<_> = document.select(&link_selector).collect();
        let snippets: Vec<_> = document.select(&snippet_selector).collect();

        let results = links
            .iter()
            .enumerate()
            .filter_map(|(i, link)| {
                let href = link.value().attr("href")?;
                let title = link.text().collect::<Vec<_>>().join(" ");
                let snippet = snippets
                    .get(i)
                    .map(|s| Self::clean_text(&s.text().collect::<Vec<_>>().join(" ")))
                    .unwrap_or_default();

                Some(SearchResult {
                    title: Self::clean_text(&title),
                    url: Self::decode_url(href),
                    snippet,
                })
            })
            .take(limit)
            .collect();

        Ok(results)
    }

    /// Decode DuckDuckGo redirect URLs
    fn decode_url(url: &str) -> String {
        // DuckDuckGo uses redirect URLs like //duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com
        if url.contains("uddg=") {
            url.split("uddg=")
                .nth(1)
                .and_then(|s| s.split('&').next())
                .map(|s| urlencoding::decode(s).unwrap_or_default().to_string())
                .unwrap_or_else(|| url.to_string())
        } else {
            url.to_string()
        }
    }

    /// Collapse whitespace and decode the HTML entities DuckDuckGo leaves behind
    fn clean_text(text: &str) -> String {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

        text.replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
    }

    fn truncate(text: &str) -> String {
        match text.char_indices().nth(SNIPPET_CHARS) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_string(),
        }
    }

    /// Render results as the numbered text block handed to the model.
    pub fn format_results(results: &[SearchResult]) -> String {
        if results.is_empty() {
            return NO_RESULTS.to_string();
        }

        let blocks: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "{}. {}\n   {}\n   Source: {}\n",
                    i + 1,
                    r.title,
                    Self::truncate(&r.snippet),
                    r.url
                )
            })
            .collect();

        format!("Web Search Results:\n{}", blocks.join("\n"))
    }
}

#[async_trait]
impl LlmTool for WebSearchTool {
    fn name(&self) -> ToolName {
        ToolName::WebSearch
    }

    async fn run(&self, args: &ToolArguments) -> Result<String> {
        let query = args
            .get("query")
            .ok_or_else(|| ConciergeError::InvalidArgument("query parameter is required".to_string()))?
            .trim();

        if query.is_empty() {
            return Err(ConciergeError::InvalidArgument(
                "query parameter cannot be empty".to_string(),
            ));
        }

        // The model may ask for fewer results, never more than configured
        let limit = args
            .get("max_results")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .map_or(self.max_results, |n| n.min(self.max_results));

        let results = self.search(query, limit).await?;
        Ok(Self::format_results(&results))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function(
            self.name(),
            "Search the web for current information such as wine news, trends, and events outside the winery. Returns titles, snippets, and source URLs.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "How many results to return (capped by the server)"
                    }
                },
                "required": ["query"]
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn sample_html() -> String {
        r#"
        <!DOCTYPE html>
        <html>
        <body>
            <table>
                <tr>
                    <td>
                        <a class="result-link" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.napavintners.com%2F">Napa Valley Vintners</a>
                    </td>
                </tr>
                <tr>
                    <td class="result-snippet">The non-profit trade association of Napa Valley wineries.</td>
                </tr>
                <tr>
                    <td>
                        <a class="result-link" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.winespectator.com%2F">Wine Spectator</a>
                    </td>
                </tr>
                <tr>
                    <td class="result-snippet">Wine news &amp; ratings.</td>
                </tr>
                <tr>
                    <td>
                        <a class="result-link" href="https://example.com/harvest">2024 Harvest Report</a>
                    </td>
                </tr>
                <tr>
                    <td class="result-snippet">An early harvest across the valley.</td>
                </tr>
            </table>
        </body>
        </html>
        "#
        .to_string()
    }

    fn tool(url: &str, max_results: usize) -> WebSearchTool {
        WebSearchTool::new(url, max_results, Duration::from_secs(5)).unwrap()
    }

    fn query_args(query: &str) -> ToolArguments {
        let mut args = ToolArguments::new();
        args.insert("query".to_string(), query.to_string());
        args
    }

    #[test]
    fn test_parse_results() {
        let results = WebSearchTool::parse_results(&sample_html(), 10).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Napa Valley Vintners");
        assert_eq!(results[0].url, "https://www.napavintners.com/");
        assert!(results[0].snippet.contains("trade association"));
        assert_eq!(results[1].snippet, "Wine news & ratings.");
        assert_eq!(results[2].url, "https://example.com/harvest");
    }

    #[test]
    fn test_parse_respects_limit() {
        let results = WebSearchTool::parse_results(&sample_html(), 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_parse_skips_links_without_href() {
        let html = "<html><body><a class=\"result-link\">No href</a></body></html>";
        let results = WebSearchTool::parse_results(html, 3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_decode_url() {
        let url = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpath&rut=abc";
        assert_eq!(WebSearchTool::decode_url(url), "https://example.com/path");
        assert_eq!(WebSearchTool::decode_url("https://example.com/direct"), "https://example.com/direct");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(WebSearchTool::clean_text("  Multiple   spaces  "), "Multiple spaces");
        assert_eq!(WebSearchTool::clean_text("&lt;tag&gt;"), "<tag>");
        assert_eq!(WebSearchTool::clean_text("it&#39;s"), "it's");
    }

    #[test]
    fn test_format_results() {
        let results = vec![SearchResult {
            title: "Harvest".to_string(),
            url: "https://example.com".to_string(),
            snippet: "x".repeat(250),
        }];

        let text = WebSearchTool::format_results(&results);

        assert!(text.starts_with("Web Search Results:\n1. Harvest\n"));
        assert!(text.contains(&format!("   {}...\n", "x".repeat(200))));
        assert!(text.contains("Source: https://example.com"));
    }

    #[test]
    fn test_format_no_results() {
        assert_eq!(WebSearchTool::format_results(&[]), NO_RESULTS);
    }

    #[tokio::test]
    async fn test_run_missing_query() {
        let result = tool("http://127.0.0.1:9", 3).run(&ToolArguments::new()).await;
        assert!(result.unwrap_err().to_string().contains("query parameter is required"));
    }

    #[tokio::test]
    async fn test_run_empty_query() {
        let result = tool("http://127.0.0.1:9", 3).run(&query_args("  ")).await;
        assert!(result.unwrap_err().to_string().contains("query parameter cannot be empty"));
    }

    #[tokio::test]
    async fn test_run_success_caps_results() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/lite/")
            .match_query(Matcher::UrlEncoded("q".into(), "napa wine news".into()))
            .with_status(200)
            .with_body(sample_html())
            .create_async()
            .await;

        let url = format!("{}/lite/", server.url());
        let text = tool(&url, 2).run(&query_args("napa wine news")).await.unwrap();

        mock.assert_async().await;
        assert!(text.contains("1. Napa Valley Vintners"));
        assert!(text.contains("2. Wine Spectator"));
        assert!(!text.contains("3. "));
    }

    #[tokio::test]
    async fn test_run_max_results_cannot_exceed_cap() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/lite/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(sample_html())
            .create_async()
            .await;

        let mut args = query_args("napa");
        args.insert("max_results".to_string(), "50".to_string());
        let url = format!("{}/lite/", server.url());
        let text = tool(&url, 1).run(&args).await.unwrap();

        assert!(text.contains("1. Napa Valley Vintners"));
        assert!(!text.contains("2. "));
    }

    #[tokio::test]
    async fn test_run_zero_results_is_success() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/lite/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html><body><table></table></body></html>")
            .create_async()
            .await;

        let url = format!("{}/lite/", server.url());
        let text = tool(&url, 3).run(&query_args("zzzz")).await.unwrap();

        assert_eq!(text, NO_RESULTS);
    }

    #[tokio::test]
    async fn test_run_http_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/lite/")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let url = format!("{}/lite/", server.url());
        let result = tool(&url, 3).run(&query_args("wine trends")).await;

        mock.assert_async().await;
        match result {
            Err(ConciergeError::ApiError(msg)) => assert!(msg.contains("500")),
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_descriptor() {
        let descriptor = tool("http://localhost", 3).descriptor();

        assert_eq!(descriptor.function.name, "web_search");
        assert_eq!(descriptor.function.parameters["required"][0], "query");
    }
}
