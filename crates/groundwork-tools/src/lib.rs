// ABOUTME: The three research tools a default workflow run registers: web search,
// ABOUTME: arXiv search, and URL fetch with a fallback chain.

pub mod arxiv;
pub mod fetch;
pub mod web;

use std::sync::Arc;

use groundwork_agent::registry::ToolRegistry;
use groundwork_core::config::ResearchConfig;

pub use arxiv::ArxivSearch;
pub use fetch::FetchUrl;
pub use web::WebSearch;

/// Build the registry the research-execution phase runs with: web
/// search, arXiv search, and URL fetch, in that order.
pub fn default_registry(config: &ResearchConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WebSearch::new(config.tavily_api_key.clone())));
    registry.register(Arc::new(ArxivSearch::new()));
    registry.register(Arc::new(FetchUrl::new()));
    registry
}
