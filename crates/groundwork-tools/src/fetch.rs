// ABOUTME: URL fetch tool with a fallback chain: arXiv rewrite, PDF delegation,
// ABOUTME: plain HTML extraction, and a reader-service fallback for JS-rendered pages.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use groundwork_agent::registry::ResearchTool;

const READER_BASE_URL: &str = "https://r.jina.ai";
const WEBPAGE_TIMEOUT: Duration = Duration::from_secs(10);
const READER_TIMEOUT: Duration = Duration::from_secs(30);
const MIN_SUFFICIENT_CHARS: usize = 200;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; Groundwork/0.1)";

/// Fetch and extract content from a URL, auto-detecting the URL type.
///
/// arXiv links are rewritten to their PDF form and delegated to the
/// reader service (which extracts PDF text server-side), as are direct
/// PDF links. Everything else is fetched as HTML; when the extracted
/// text looks incomplete (JavaScript-required markers, near-empty body)
/// the reader service renders the page instead.
pub struct FetchUrl {
    client: reqwest::Client,
}

impl FetchUrl {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
        }
    }

    async fn fetch(&self, url: &str) -> String {
        if url.contains("arxiv") {
            return self.fetch_arxiv_paper(url).await;
        }

        if url.ends_with(".pdf") {
            return self.fetch_with_reader(url).await;
        }

        let content = self.fetch_webpage(url).await;
        if is_content_sufficient(&content) {
            return content;
        }

        self.fetch_with_reader(url).await
    }

    /// Fetch an HTML page and extract its readable text.
    async fn fetch_webpage(&self, url: &str) -> String {
        let response = match self
            .client
            .get(url)
            .timeout(WEBPAGE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return format!("Error fetching webpage: {}", e),
        };

        match response.text().await {
            Ok(body) => extract_text_from_html(&body),
            Err(e) => format!("Error fetching webpage: {}", e),
        }
    }

    /// Rewrite any arXiv URL to its PDF form and delegate to the reader.
    async fn fetch_arxiv_paper(&self, arxiv_url: &str) -> String {
        let pdf_url = match arxiv_pdf_url(arxiv_url) {
            Some(url) => url,
            None => return "Invalid arXiv URL".to_string(),
        };

        self.fetch_with_reader(&pdf_url).await
    }

    /// Fetch through the Jina reader service, which renders JavaScript
    /// and extracts PDF text, returning markdown.
    async fn fetch_with_reader(&self, url: &str) -> String {
        let response = match self
            .client
            .get(format!("{}/{}", READER_BASE_URL, url))
            .header("Accept", "text/markdown")
            .timeout(READER_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return format!("Error fetching URL with reader: {}", e),
        };

        match response.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "No content extracted.".to_string(),
            Err(e) => format!("Error fetching URL with reader: {}", e),
        }
    }
}

impl Default for FetchUrl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResearchTool for FetchUrl {
    fn name(&self) -> &str {
        "fetch_url"
    }

    fn description(&self) -> &str {
        "Fetch and extract content from a URL."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to fetch content from"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let url = args["url"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'url' argument"))?;

        Ok(self.fetch(url).await)
    }
}

/// Convert any arXiv URL to its PDF form.
/// http://arxiv.org/abs/2404.04365 -> http://arxiv.org/pdf/2404.04365.pdf
fn arxiv_pdf_url(arxiv_url: &str) -> Option<String> {
    if arxiv_url.contains("/abs/") {
        return Some(format!("{}.pdf", arxiv_url.replace("/abs/", "/pdf/")));
    }

    if arxiv_url.contains("/pdf/") || arxiv_url.contains("/html/") {
        let url = arxiv_url.replace("/html/", "/pdf/");
        return Some(if url.ends_with(".pdf") {
            url
        } else {
            format!("{}.pdf", url)
        });
    }

    None
}

/// Decide whether extracted page content is complete enough to hand to
/// the model, or whether the JS-rendering fallback should run.
fn is_content_sufficient(content: &str) -> bool {
    let lowered = content.to_lowercase();

    let javascript_indicators = [
        "javascript is required",
        "enable javascript",
        "javascript must be enabled",
        "please enable js",
        "this page requires javascript",
    ];
    if javascript_indicators
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return false;
    }

    content.trim().len() >= MIN_SUFFICIENT_CHARS
}

/// Extract readable text from HTML: drop script/style/nav/footer/header
/// elements, strip the remaining tags, decode entities, and collapse
/// whitespace to one trimmed line per text run.
fn extract_text_from_html(html: &str) -> String {
    let mut text = html.to_string();
    for tag in ["script", "style", "nav", "footer", "header"] {
        text = strip_element(&text, tag);
    }

    let mut result = String::new();
    let mut in_tag = false;
    for c in text.chars() {
        if c == '<' {
            in_tag = true;
        } else if c == '>' {
            in_tag = false;
            result.push('\n');
        } else if !in_tag {
            result.push(c);
        }
    }

    let decoded = html_decode(&result);
    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove every `<tag ...>...</tag>` element from the document.
fn strip_element(html: &str, tag: &str) -> String {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut text = html.to_string();

    while let Some(start) = text.find(&open) {
        match text[start..].find(&close) {
            Some(end) => {
                text = format!("{}{}", &text[..start], &text[start + end + close.len()..]);
            }
            None => break,
        }
    }

    text
}

fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}
