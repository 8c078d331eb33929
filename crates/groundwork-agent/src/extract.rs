// ABOUTME: Response normalizer: pulls text or tool-invocation batches out of raw responses
// ABOUTME: and parses phase output as strict JSON, tolerating markdown fencing.

use serde_json::Value;

use groundwork_core::conversation::ToolInvocation;
use groundwork_core::error::WorkflowError;

/// Characters of offending text carried in parse-error previews.
const PREVIEW_CAP: usize = 100;

/// What a completion response boils down to: either a final text answer
/// or a batch of tool invocations to execute.
#[derive(Debug, Clone)]
pub enum ModelReply {
    Text(String),
    ToolCalls(Vec<ToolInvocation>),
}

/// Extract the reply from a raw response document.
///
/// Looks at the first candidate's content parts. Text in the first part
/// wins; otherwise every part must be a function call and the batch is
/// returned for execution. Missing structure is a malformed response.
pub fn extract_reply(raw: &Value) -> Result<ModelReply, WorkflowError> {
    let candidates = raw
        .get("candidates")
        .and_then(|c| c.as_array())
        .ok_or_else(|| {
            WorkflowError::MalformedResponse("missing candidates array in response".to_string())
        })?;

    let candidate = candidates.first().ok_or_else(|| {
        WorkflowError::MalformedResponse("empty candidates array".to_string())
    })?;

    let parts = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            WorkflowError::MalformedResponse("missing content parts in candidate".to_string())
        })?;

    if let Some(text) = parts
        .first()
        .and_then(|part| part.get("text"))
        .and_then(|t| t.as_str())
    {
        return Ok(ModelReply::Text(text.to_string()));
    }

    let mut calls = Vec::new();
    for part in parts {
        let function_call = part.get("functionCall").ok_or_else(|| {
            WorkflowError::MalformedResponse(
                "content part is neither text nor functionCall".to_string(),
            )
        })?;

        let name = function_call
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| {
                WorkflowError::MalformedResponse("functionCall missing name".to_string())
            })?;

        calls.push(ToolInvocation {
            name: name.to_string(),
            args: function_call
                .get("args")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({})),
        });
    }

    if calls.is_empty() {
        return Err(WorkflowError::MalformedResponse(
            "candidate content has no parts".to_string(),
        ));
    }

    Ok(ModelReply::ToolCalls(calls))
}

/// Parse phase output text as strict JSON.
///
/// Tolerates models that wrap the payload in prose or a fenced
/// ```json block: when the fence marker is present, only the content
/// between the first pair of fences is parsed. Blank text and malformed
/// payloads are hard failures; there is no partial recovery.
pub fn parse_json(text: &str) -> Result<Value, WorkflowError> {
    let content = match text.split_once("```json") {
        Some((_, after_fence)) => after_fence
            .split_once("```")
            .map(|(block, _)| block)
            .unwrap_or(after_fence),
        None => text,
    }
    .trim();

    if content.is_empty() {
        return Err(WorkflowError::EmptyContent);
    }

    serde_json::from_str(content).map_err(|_| WorkflowError::JsonParse {
        preview: preview(content),
    })
}

/// Parse phase output into its typed result struct, validating the
/// schema eagerly so missing keys surface as a single error here rather
/// than a deferred lookup failure deep in pipeline logic.
pub fn parse_phase<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, WorkflowError> {
    let value = parse_json(text)?;
    serde_json::from_value(value).map_err(|source| WorkflowError::PhaseSchema {
        preview: preview(text.trim()),
        source,
    })
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CAP).collect()
}
