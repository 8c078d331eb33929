// ABOUTME: Academic paper search against the arXiv Atom API.
// ABOUTME: Parses the feed with plain string extraction and formats per-paper blocks.

use async_trait::async_trait;
use serde_json::{Value, json};

use groundwork_agent::registry::ResearchTool;

const ARXIV_QUERY_URL: &str = "http://export.arxiv.org/api/query";
const DEFAULT_MAX_RESULTS: u64 = 5;
const ABSTRACT_PREVIEW_CHARS: usize = 500;
const AUTHOR_DISPLAY_CAP: usize = 3;

/// Search academic papers on arXiv, sorted by relevance.
pub struct ArxivSearch {
    client: reqwest::Client,
}

impl ArxivSearch {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ArxivSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResearchTool for ArxivSearch {
    fn name(&self) -> &str {
        "arxiv_search"
    }

    fn description(&self) -> &str {
        "Search academic papers on arXiv"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query string"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of papers to return"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let max_results = args["max_results"].as_u64().unwrap_or(DEFAULT_MAX_RESULTS);

        let response = self
            .client
            .get(ARXIV_QUERY_URL)
            .query(&[
                ("search_query", format!("all:{}", query).as_str()),
                ("start", "0"),
                ("max_results", max_results.to_string().as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Error searching arXiv: {}", e))?;

        let feed = response
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("Error searching arXiv: {}", e))?;

        Ok(format_atom_feed(&feed))
    }
}

/// Render an Atom feed as per-paper Title/Authors/Published/URL/Abstract
/// blocks.
fn format_atom_feed(feed: &str) -> String {
    let mut output = String::new();

    for entry in feed.split("<entry>").skip(1) {
        let Some(title) = tag_text(entry, "title") else {
            continue;
        };
        let summary = tag_text(entry, "summary").unwrap_or_default();
        let published = tag_text(entry, "published")
            .map(|p| p.chars().take(10).collect::<String>())
            .unwrap_or_default();
        let url = tag_text(entry, "id").unwrap_or_default();

        let authors: Vec<String> = entry
            .split("<author>")
            .skip(1)
            .filter_map(|chunk| tag_text(chunk, "name"))
            .collect();
        let mut authors_str = authors
            .iter()
            .take(AUTHOR_DISPLAY_CAP)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if authors.len() > AUTHOR_DISPLAY_CAP {
            authors_str.push_str(" et al.");
        }

        let abstract_preview: String = summary.chars().take(ABSTRACT_PREVIEW_CHARS).collect();

        output.push_str(&format!(
            "Title: {}\nAuthors: {}\nPublished: {}\nURL: {}\nAbstract: {}...\n\n",
            title, authors_str, published, url, abstract_preview
        ));
    }

    if output.is_empty() {
        "No results found. Try modifying the query.".to_string()
    } else {
        output
    }
}

/// Extract the trimmed, entity-decoded text of the first `<tag>...</tag>`
/// element in a chunk.
fn tag_text(chunk: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let after_open = chunk.split(&open).nth(1)?;
    let inner = after_open.split(&close).next()?;
    Some(xml_decode(inner.trim()))
}

fn xml_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
