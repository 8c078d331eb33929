// ABOUTME: Typed result structs for each workflow phase, parsed from model JSON output.
// ABOUTME: Validation happens eagerly at the parse boundary; a missing key fails the phase.

use serde::{Deserialize, Serialize};

/// Output of the query-understanding phase. The clarification round
/// re-produces this shape without the clarification fields, so those
/// two default when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct Understanding {
    pub topic: String,
    pub aspects: Vec<String>,
    pub constraints: Vec<String>,
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub needs_clarification: bool,
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
}

/// One focused research question derived from the overall query.
/// Immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchAngle {
    pub angle: String,
    pub success_criteria: String,
    pub why_needed: String,
}

/// Output of the planning phase: the set of angles to investigate.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchPlan {
    pub research_angles: Vec<ResearchAngle>,
}

/// Output of one angle investigation: a synthesized summary plus the
/// source URLs it references.
#[derive(Debug, Clone, Deserialize)]
pub struct AngleFindings {
    pub final_summary: String,
    pub sources_used: Vec<String>,
}

/// Output of the reflection phase: sufficiency judgment and, when
/// insufficient, the follow-up angles for the second execution round.
#[derive(Debug, Clone, Deserialize)]
pub struct Reflection {
    pub is_sufficient: bool,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub new_angles: Vec<ResearchAngle>,
}
