// ABOUTME: Workflow progress events and the observer interface front ends plug into.
// ABOUTME: Console and no-op implementations cover CLI and headless use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum characters of a tool result carried in a ToolCallEvent.
const RESULT_PREVIEW_CAP: usize = 100;

/// Execution status of a workflow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl PhaseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::Running => "running",
            PhaseStatus::Completed => "completed",
            PhaseStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Emitted on every phase transition. `phase` uses the workflow's
/// numbering ("1", "1.1", "2", "3", "4", "5").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEvent {
    pub phase: String,
    pub name: String,
    pub status: PhaseStatus,
    pub data: Option<Value>,
    pub message: Option<String>,
}

impl PhaseEvent {
    pub fn new(phase: &str, name: &str, status: PhaseStatus) -> Self {
        Self {
            phase: phase.to_string(),
            name: name.to_string(),
            status,
            data: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Emitted once per executed tool invocation during research execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallEvent {
    pub tool_name: String,
    pub arguments: Value,
    pub result_preview: String,
    pub timestamp: DateTime<Utc>,
}

impl ToolCallEvent {
    /// Build an event from a full tool result, truncating the preview
    /// to the first 100 characters.
    pub fn new(tool_name: &str, arguments: Value, result: &str) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            arguments,
            result_preview: result.chars().take(RESULT_PREVIEW_CAP).collect(),
            timestamp: Utc::now(),
        }
    }
}

/// Observer interface for workflow progress. Front ends implement this
/// to receive phase transitions, tool calls, and clarification requests;
/// the clarification callback blocks the pipeline until it returns.
pub trait WorkflowObserver: Send + Sync {
    fn phase_update(&self, event: PhaseEvent);
    fn tool_call(&self, event: ToolCallEvent);
    fn clarification(&self, questions: &str) -> String;
}

/// Default observer for CLI mode: prints progress lines to stdout and
/// reads clarification answers from stdin.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl WorkflowObserver for ConsoleObserver {
    fn phase_update(&self, event: PhaseEvent) {
        println!(
            "[{}] Phase {}: {}",
            event.status, event.phase, event.name
        );
        if let Some(message) = &event.message {
            println!("  {}", message);
        }
    }

    fn tool_call(&self, event: ToolCallEvent) {
        println!("Tool call: {}({})", event.tool_name, event.arguments);
        println!("  Result: {}...", event.result_preview);
    }

    fn clarification(&self, questions: &str) -> String {
        println!("\nClarification needed:");
        println!("{}", questions);
        print!("Your answers: ");
        use std::io::Write;
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return String::new();
        }
        answer.trim_end().to_string()
    }
}

/// Observer that ignores every event and answers clarifications with
/// an empty string. For headless runs and tests.
#[derive(Debug, Default)]
pub struct NullObserver;

impl WorkflowObserver for NullObserver {
    fn phase_update(&self, _event: PhaseEvent) {}

    fn tool_call(&self, _event: ToolCallEvent) {}

    fn clarification(&self, _questions: &str) -> String {
        String::new()
    }
}
