// ABOUTME: Conversation data model: ordered turns of text, tool-call, and tool-result parts.
// ABOUTME: Serializes directly to the generateContent `contents` wire shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a turn. The wire protocol knows only these two roles;
/// tool results travel inside `user` turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// Result payload nested inside a function-response part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResult {
    pub result: String,
}

/// One content part of a turn. Externally tagged so each variant
/// serializes to an object with a single wire key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Part {
    #[serde(rename = "text")]
    Text(String),

    #[serde(rename = "functionCall")]
    FunctionCall { name: String, args: Value },

    #[serde(rename = "functionResponse")]
    FunctionResponse {
        name: String,
        response: FunctionResult,
    },
}

/// A tool invocation requested by the model: a registry name plus the
/// keyword arguments the tool should be called with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub args: Value,
}

/// A single conversation turn: a role and its ordered content parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    /// A user turn carrying plain prompt text.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A model turn echoing back the batch of tool invocations it requested.
    pub fn model_calls(calls: &[ToolInvocation]) -> Self {
        Self {
            role: Role::Model,
            parts: calls
                .iter()
                .map(|call| Part::FunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                })
                .collect(),
        }
    }

    /// A user turn carrying one result entry per executed tool invocation.
    pub fn tool_results(results: Vec<(String, String)>) -> Self {
        Self {
            role: Role::User,
            parts: results
                .into_iter()
                .map(|(name, result)| Part::FunctionResponse {
                    name,
                    response: FunctionResult { result },
                })
                .collect(),
        }
    }
}

/// An ordered sequence of turns. Serializes transparently as the turn
/// array, so it can be embedded as `contents` without conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a conversation with a single user prompt.
    pub fn opening(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user_text(prompt)],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
