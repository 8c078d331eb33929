// ABOUTME: Tool trait and the fixed name-to-implementation registry the orchestrator draws from.
// ABOUTME: Declarations for the model's tool schema derive from the registered tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

/// A research tool callable by the model. `execute` takes the keyword
/// arguments the model supplied and returns result text; implementations
/// are expected to encode their own failures as readable text, and the
/// orchestrator converts any `Err` that does escape into an error
/// payload rather than failing the round.
#[async_trait]
pub trait ResearchTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Fixed mapping from tool name to implementation. Registration order
/// is preserved in the declaration list sent to the model.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ResearchTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn ResearchTool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ResearchTool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Function declarations for every registered tool, in registration
    /// order.
    pub fn declarations(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::EchoTool;

    #[test]
    fn registry_lookup_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::named("web_search")));
        registry.register(Arc::new(EchoTool::named("fetch_url")));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("web_search").is_some());
        assert!(registry.get("fetch_url").is_some());
        assert!(registry.get("unknown_tool").is_none());
    }

    #[test]
    fn declarations_preserve_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::named("web_search")));
        registry.register(Arc::new(EchoTool::named("arxiv_search")));
        registry.register(Arc::new(EchoTool::named("fetch_url")));

        let declarations = registry.declarations();
        let names: Vec<&str> = declarations
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["web_search", "arxiv_search", "fetch_url"]);

        for declaration in &declarations {
            assert!(declaration["description"].is_string());
            assert_eq!(declaration["parameters"]["type"], "object");
        }
    }
}
