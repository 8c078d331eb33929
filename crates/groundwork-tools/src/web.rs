// ABOUTME: Web search tool backed by the Tavily search API.
// ABOUTME: Formats results as Title/URL/Content blocks the model can cite from.

use async_trait::async_trait;
use serde_json::{Value, json};

use groundwork_agent::registry::ResearchTool;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
const DEFAULT_RESULT_LIMIT: u64 = 5;

/// Search the web via Tavily. Supports an optional result limit and
/// date-range filter.
pub struct WebSearch {
    client: reqwest::Client,
    api_key: String,
}

impl WebSearch {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl ResearchTool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web using the Tavily API"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query string"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results to return"
                },
                "start_date": {
                    "type": "string",
                    "description": "Filter results from this date (format: YYYY-MM-DD)"
                },
                "end_date": {
                    "type": "string",
                    "description": "Filter results until this date (format: YYYY-MM-DD, optional)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let limit = args["limit"].as_u64().unwrap_or(DEFAULT_RESULT_LIMIT);
        let start_date = args["start_date"].as_str().unwrap_or("");
        let end_date = args["end_date"].as_str().unwrap_or("");

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "query": query,
                "max_results": limit,
                "start_date": start_date,
                "end_date": end_date,
            }))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Error performing web search: {}", e))?;

        let data: Value = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Error performing web search: {}", e))?;

        Ok(format_search_results(&data))
    }
}

/// Render a Tavily response document as Title/URL/Content blocks.
fn format_search_results(data: &Value) -> String {
    let mut output = String::new();

    if let Some(results) = data.get("results").and_then(|r| r.as_array()) {
        for result in results {
            let title = result.get("title").and_then(|t| t.as_str()).unwrap_or("");
            let url = result.get("url").and_then(|u| u.as_str()).unwrap_or("");
            let content = result
                .get("content")
                .and_then(|c| c.as_str())
                .unwrap_or("");

            output.push_str(&format!(
                "Title: {}\nURL: {}\nContent: {}\n\n",
                title, url, content
            ));
        }
    }

    if output.is_empty() {
        "No results found. Try modifying the query.".to_string()
    } else {
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_results_as_title_url_content_blocks() {
        let data = json!({
            "results": [
                {
                    "title": "Tokio",
                    "url": "https://tokio.rs",
                    "content": "An asynchronous runtime for Rust"
                },
                {
                    "title": "Smol",
                    "url": "https://github.com/smol-rs/smol",
                    "content": "A small async runtime"
                }
            ]
        });

        let output = format_search_results(&data);
        assert!(output.contains("Title: Tokio"));
        assert!(output.contains("URL: https://tokio.rs"));
        assert!(output.contains("Content: A small async runtime"));
        assert_eq!(output.matches("Title:").count(), 2);
    }

    #[test]
    fn empty_results_produce_retry_hint() {
        let output = format_search_results(&json!({"results": []}));
        assert_eq!(output, "No results found. Try modifying the query.");

        let output = format_search_results(&json!({}));
        assert_eq!(output, "No results found. Try modifying the query.");
    }

    #[test]
    fn tolerates_results_with_missing_fields() {
        let data = json!({"results": [{"title": "Only a title"}]});
        let output = format_search_results(&data);
        assert!(output.contains("Title: Only a title"));
        assert!(output.contains("URL: \n"));
    }

    #[tokio::test]
    async fn missing_query_argument_is_an_error() {
        let tool = WebSearch::new("tvly-test".to_string());
        let err = tool.execute(json!({"limit": 3})).await.unwrap_err();
        assert!(err.to_string().contains("query"));
    }
}
