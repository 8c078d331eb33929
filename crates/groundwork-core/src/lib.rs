// ABOUTME: Core library for groundwork, containing the conversation model, phase results, and events.
// ABOUTME: This crate defines the shared data model used across all groundwork components.

pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod phase;

pub use config::{ConfigError, ReasoningEffort, ResearchConfig};
pub use conversation::{Conversation, Part, Role, ToolInvocation, Turn};
pub use error::WorkflowError;
pub use events::{
    ConsoleObserver, NullObserver, PhaseEvent, PhaseStatus, ToolCallEvent, WorkflowObserver,
};
pub use phase::{AngleFindings, Reflection, ResearchAngle, ResearchPlan, Understanding};
