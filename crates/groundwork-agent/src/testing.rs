// ABOUTME: Test utilities for groundwork-agent: a scripted model client, canned-response
// ABOUTME: builders, stub tools, and a recording observer. Used by tests, never in production paths.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use groundwork_core::config::ReasoningEffort;
use groundwork_core::conversation::Conversation;
use groundwork_core::error::WorkflowError;
use groundwork_core::events::{PhaseEvent, ToolCallEvent, WorkflowObserver};

use crate::client::ModelClient;
use crate::registry::ResearchTool;

/// Build a raw response carrying a single text part.
pub fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"}
        }]
    })
}

/// Build a raw response carrying one functionCall part per (name, args)
/// pair, in order.
pub fn tool_call_response(calls: &[(&str, Value)]) -> Value {
    let parts: Vec<Value> = calls
        .iter()
        .map(|(name, args)| json!({"functionCall": {"name": name, "args": args}}))
        .collect();
    json!({
        "candidates": [{
            "content": {"parts": parts, "role": "model"}
        }]
    })
}

/// One recorded `generate` call: the conversation as sent (serialized)
/// and how many tool declarations accompanied it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub conversation: Value,
    pub tool_count: usize,
}

/// A model client that replays a scripted sequence of raw responses and
/// records every request it receives. Returns a backend error when the
/// script runs dry, so a test that over-calls fails loudly.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client that always has one text response, for single-exchange
    /// phases.
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![text_response(text)])
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(
        &self,
        conversation: &Conversation,
        tools: &[Value],
        _effort: ReasoningEffort,
    ) -> Result<Value, WorkflowError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            conversation: serde_json::to_value(conversation).unwrap(),
            tool_count: tools.len(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| WorkflowError::Backend("scripted client exhausted".to_string()))
    }
}

/// A tool that succeeds, echoing its own name and arguments, and
/// optionally appends its name to a shared call log so tests can assert
/// execution order.
pub struct EchoTool {
    name: String,
    log: Option<Arc<Mutex<Vec<String>>>>,
}

impl EchoTool {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log: None,
        }
    }

    pub fn with_log(name: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            log: Some(log),
        }
    }
}

#[async_trait]
impl ResearchTool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echoes its arguments back as the result"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Echoed back verbatim"}
            },
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(self.name.clone());
        }
        Ok(format!("echo {}: {}", self.name, args))
    }
}

/// A tool whose `execute` always returns an error, for verifying that
/// tool failures become result text instead of crashing the round.
pub struct FailingTool {
    name: String,
}

impl FailingTool {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl ResearchTool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("connection reset by peer"))
    }
}

/// Observer that records everything it is told and answers clarification
/// requests with a preset string.
pub struct RecordingObserver {
    pub phases: Mutex<Vec<PhaseEvent>>,
    pub tool_calls: Mutex<Vec<ToolCallEvent>>,
    pub clarification_requests: Mutex<Vec<String>>,
    answer: String,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::with_answer("")
    }

    pub fn with_answer(answer: &str) -> Self {
        Self {
            phases: Mutex::new(Vec::new()),
            tool_calls: Mutex::new(Vec::new()),
            clarification_requests: Mutex::new(Vec::new()),
            answer: answer.to_string(),
        }
    }

    pub fn clarification_count(&self) -> usize {
        self.clarification_requests.lock().unwrap().len()
    }
}

impl Default for RecordingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowObserver for RecordingObserver {
    fn phase_update(&self, event: PhaseEvent) {
        self.phases.lock().unwrap().push(event);
    }

    fn tool_call(&self, event: ToolCallEvent) {
        self.tool_calls.lock().unwrap().push(event);
    }

    fn clarification(&self, questions: &str) -> String {
        self.clarification_requests
            .lock()
            .unwrap()
            .push(questions.to_string());
        self.answer.clone()
    }
}
