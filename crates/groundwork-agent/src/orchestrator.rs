// ABOUTME: The tool-calling orchestrator: drives bounded request/execute/respond rounds
// ABOUTME: until the model produces a final text answer or the iteration cap forces one.

use groundwork_core::config::ReasoningEffort;
use groundwork_core::conversation::{Conversation, Turn};
use groundwork_core::error::WorkflowError;
use groundwork_core::events::{ToolCallEvent, WorkflowObserver};

use crate::client::ModelClient;
use crate::extract::{self, ModelReply};
use crate::registry::ToolRegistry;

/// Drives one angle investigation: request a completion with the full
/// tool schema, execute any requested tools in model order, feed the
/// results back, and repeat until the model answers in text.
///
/// The iteration cap is the sole bound on this loop. When it is reached
/// without a text answer, one final request goes out with an empty tool
/// schema to force a summary; no tool round ever runs after the cap.
pub struct Orchestrator<'a> {
    client: &'a dyn ModelClient,
    registry: &'a ToolRegistry,
    max_iterations: u32,
    effort: ReasoningEffort,
    observer: &'a dyn WorkflowObserver,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        client: &'a dyn ModelClient,
        registry: &'a ToolRegistry,
        max_iterations: u32,
        effort: ReasoningEffort,
        observer: &'a dyn WorkflowObserver,
    ) -> Self {
        Self {
            client,
            registry,
            max_iterations,
            effort,
            observer,
        }
    }

    /// Run the loop to completion and return the model's final text.
    pub async fn run(&self, mut conversation: Conversation) -> Result<String, WorkflowError> {
        let declarations = self.registry.declarations();
        let mut iterations = 0u32;

        while iterations < self.max_iterations {
            iterations += 1;
            tracing::debug!(iteration = iterations, "requesting completion");

            let raw = self
                .client
                .generate(&conversation, &declarations, self.effort)
                .await?;

            match extract::extract_reply(&raw)? {
                ModelReply::Text(text) => {
                    tracing::debug!(iterations, "final message generated");
                    return Ok(text);
                }
                ModelReply::ToolCalls(calls) => {
                    conversation.push(Turn::model_calls(&calls));

                    let mut results = Vec::new();
                    for call in &calls {
                        let Some(tool) = self.registry.get(&call.name) else {
                            // Unregistered names are skipped without a
                            // result entry; the model sees one entry per
                            // resolved request.
                            tracing::warn!(
                                tool = %call.name,
                                "model requested unregistered tool, skipping"
                            );
                            continue;
                        };

                        tracing::debug!(tool = %call.name, args = %call.args, "executing tool");
                        let result = match tool.execute(call.args.clone()).await {
                            Ok(output) => output,
                            Err(e) => format!("Error: {}", e),
                        };

                        self.observer.tool_call(ToolCallEvent::new(
                            &call.name,
                            call.args.clone(),
                            &result,
                        ));
                        results.push((call.name.clone(), result));
                    }

                    if !results.is_empty() {
                        conversation.push(Turn::tool_results(results));
                    }
                }
            }
        }

        tracing::warn!(
            limit = self.max_iterations,
            "reached maximum tool iterations, requesting final summary without tools"
        );

        let raw = self.client.generate(&conversation, &[], self.effort).await?;
        match extract::extract_reply(&raw)? {
            ModelReply::Text(text) => Ok(text),
            ModelReply::ToolCalls(_) => Err(WorkflowError::MalformedResponse(
                "model returned tool calls to a request with no tools".to_string(),
            )),
        }
    }
}
