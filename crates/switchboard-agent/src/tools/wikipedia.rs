// ABOUTME: The wikipedia tool: searches English Wikipedia and returns intro summaries of the top pages.
// ABOUTME: Uses the MediaWiki action API; output is capped to keep tool results small.

use serde_json::{Value, json};

use super::{ToolError, ToolOutput, string_arg};

const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const TOP_K_RESULTS: usize = 3;
const MAX_QUERY_CHARS: usize = 300;
const MAX_OUTPUT_CHARS: usize = 4000;

/// Returned when the search has no hits or none of the pages has a summary.
pub const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

/// Wikipedia search-and-summarize tool.
#[derive(Debug, Clone)]
pub struct WikipediaTool {
    http: reqwest::Client,
    api_url: String,
}

impl WikipediaTool {
    pub const NAME: &'static str = "wikipedia";
    pub const DESCRIPTION: &'static str = "A wrapper around Wikipedia. Useful for when you need to \
        answer general questions about people, places, companies, facts, historical events, or \
        other subjects. Input should be a search query.";

    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Point the tool at a different MediaWiki API endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn parameters() -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Query to look up on Wikipedia."
                }
            },
            "required": ["query"]
        })
    }

    pub(crate) async fn invoke(&self, arguments: &Value) -> Result<ToolOutput, ToolError> {
        let query = string_arg(arguments, &["query"])?;
        let query = truncate_chars(&query, MAX_QUERY_CHARS);

        let titles = self.search(&query).await?;
        let mut pages = Vec::new();
        for title in titles {
            if let Some(summary) = self.summary(&title).await? {
                pages.push((title, summary));
            }
        }

        tracing::debug!(query = %query, pages = pages.len(), "wikipedia lookup completed");
        Ok(ToolOutput::Text(format_pages(&pages, MAX_OUTPUT_CHARS)))
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ToolError> {
        let limit = TOP_K_RESULTS.to_string();
        let body: Value = self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_search_titles(&body))
    }

    async fn summary(&self, title: &str) -> Result<Option<String>, ToolError> {
        let body: Value = self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("format", "json"),
                ("titles", title),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_extract(&body))
    }
}

/// Titles from a `list=search` response, in rank order.
pub fn parse_search_titles(body: &Value) -> Vec<String> {
    body.pointer("/query/search")
        .and_then(|s| s.as_array())
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit.get("title").and_then(|t| t.as_str()))
                .take(TOP_K_RESULTS)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// The first non-empty plain-text extract from a `prop=extracts` response.
pub fn parse_extract(body: &Value) -> Option<String> {
    body.pointer("/query/pages")
        .and_then(|p| p.as_object())?
        .values()
        .filter_map(|page| page.get("extract").and_then(|e| e.as_str()))
        .map(str::trim)
        .find(|extract| !extract.is_empty())
        .map(String::from)
}

/// Render pages as `Page:`/`Summary:` blocks, capped at `max_chars`.
pub fn format_pages(pages: &[(String, String)], max_chars: usize) -> String {
    if pages.is_empty() {
        return NO_RESULTS.to_string();
    }
    let joined = pages
        .iter()
        .map(|(title, summary)| format!("Page: {}\nSummary: {}", title, summary))
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(&joined, max_chars)
}

/// Cut to at most `max_chars` characters without splitting a UTF-8 sequence.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
