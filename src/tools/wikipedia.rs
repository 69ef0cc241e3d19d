//! Encyclopedia lookup through the MediaWiki API.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use super::{Tool, ToolError};

/// Queries longer than this are cut before searching.
const MAX_QUERY_CHARS: usize = 300;
/// Number of search hits summarized per lookup.
const TOP_K_RESULTS: usize = 3;
/// Cap on the combined summary text.
const MAX_CONTENT_CHARS: usize = 4000;

pub const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

#[derive(Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: Option<serde_json::Value>,
}

/// Minimal MediaWiki search client.
pub struct WikipediaClient {
    http: reqwest::Client,
    api_url: String,
}

impl WikipediaClient {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
        }
    }

    /// Search and summarize the top hits.
    pub async fn run(&self, query: &str) -> Result<String, ToolError> {
        let query: String = query.chars().take(MAX_QUERY_CHARS).collect();
        let titles = self.search(&query).await?;

        let mut summaries = Vec::new();
        for title in titles.iter().take(TOP_K_RESULTS) {
            if let Some(extract) = self.intro_extract(title).await? {
                summaries.push(format!("Page: {}\nSummary: {}", title, extract));
            }
        }

        if summaries.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        Ok(summaries
            .join("\n\n")
            .chars()
            .take(MAX_CONTENT_CHARS)
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ToolError> {
        let url = format!(
            "{}?action=query&list=search&format=json&srlimit={}&srsearch={}",
            self.api_url,
            TOP_K_RESULTS,
            urlencoding::encode(query)
        );

        let response: SearchResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn intro_extract(&self, title: &str) -> Result<Option<String>, ToolError> {
        let url = format!(
            "{}?action=query&prop=extracts&exintro=1&explaintext=1&redirects=1&format=json&titles={}",
            self.api_url,
            urlencoding::encode(title)
        );

        let response: ExtractResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let extract = response
            .query
            .and_then(|q| q.pages.into_values().find(|p| p.missing.is_none()))
            .and_then(|p| p.extract)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if extract.is_none() {
            tracing::debug!(%title, "Wikipedia page has no extract; skipping");
        }
        Ok(extract)
    }
}

/// The `Wikipedia` tool.
pub struct WikipediaTool {
    client: WikipediaClient,
}

impl WikipediaTool {
    pub fn new(client: WikipediaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "Wikipedia"
    }

    fn description(&self) -> &str {
        "A tool for searching the Internet to find the various information on the topics mentioned"
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        self.client.run(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_for(server: &MockServer) -> WikipediaTool {
        let url = format!("{}/w/api.php", server.uri());
        WikipediaTool::new(WikipediaClient::new(reqwest::Client::new(), &url))
    }

    #[tokio::test]
    async fn test_summarizes_search_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "golden ratio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": [{"title": "Golden ratio"}, {"title": "Fibonacci sequence"}]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("titles", "Golden ratio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": {"12": {"title": "Golden ratio", "extract": "Two quantities are in the golden ratio..."}}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("titles", "Fibonacci sequence"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": {"34": {"title": "Fibonacci sequence", "extract": "Each number is the sum of the two preceding ones."}}}
            })))
            .mount(&server)
            .await;

        let out = tool_for(&server).run("golden ratio").await.unwrap();
        assert_eq!(
            out,
            "Page: Golden ratio\nSummary: Two quantities are in the golden ratio...\n\n\
             Page: Fibonacci sequence\nSummary: Each number is the sum of the two preceding ones."
        );
    }

    #[tokio::test]
    async fn test_no_hits_reports_no_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": []}
            })))
            .mount(&server)
            .await;

        let out = tool_for(&server).run("qwxzv").await.unwrap();
        assert_eq!(out, NO_RESULTS);
    }

    #[tokio::test]
    async fn test_long_query_is_cut_to_300_chars() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "é".repeat(MAX_QUERY_CHARS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = tool_for(&server).run(&"é".repeat(350)).await.unwrap();
        assert_eq!(out, NO_RESULTS);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_only_top_three_hits_are_summarized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": [
                    {"title": "Ratio"}, {"title": "Proportion"}, {"title": "Fraction"},
                    {"title": "Percentage"}, {"title": "Rate"}
                ]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": {"1": {"extract": "A comparison of quantities."}}}
            })))
            .expect(3)
            .mount(&server)
            .await;

        let out = tool_for(&server).run("ratio").await.unwrap();
        assert_eq!(out.matches("Page: ").count(), 3);
        assert!(out.contains("Page: Fraction"));
        assert!(!out.contains("Page: Percentage"));
        assert!(!out.contains("Page: Rate"));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_output_is_cut_to_4000_chars_on_char_boundary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": [{"title": "Alpha"}, {"title": "Beta"}, {"title": "Gamma"}]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": {"1": {"extract": "π≈3.14 ".repeat(400)}}}
            })))
            .mount(&server)
            .await;

        let out = tool_for(&server).run("pi").await.unwrap();
        assert_eq!(out.chars().count(), MAX_CONTENT_CHARS);
        assert!(out.len() > MAX_CONTENT_CHARS);
        assert!(out.starts_with("Page: Alpha\nSummary: π≈3.14"));
        assert!(out.contains("Page: Beta"));
    }

    #[tokio::test]
    async fn test_server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = tool_for(&server).run("anything").await.unwrap_err();
        assert!(matches!(err, ToolError::Search(_)));
    }
}
