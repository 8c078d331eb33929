// ABOUTME: Error taxonomy for the research workflow.
// ABOUTME: Every failure a phase can hit maps to one variant; none are retried by the core.

use thiserror::Error;

/// Errors raised by the model client, the response normalizer, and the
/// phase pipeline. All of these are fatal to the in-flight phase: the
/// pipeline performs no recovery beyond its single sanctioned
/// reflection-triggered re-execution round.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The completion backend request failed (HTTP, auth, rate limit,
    /// or transport error).
    #[error("model backend error: {0}")]
    Backend(String),

    /// The completion response lacked the expected nested structure
    /// (candidates, content, parts).
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// A phase expected JSON output but the model returned blank text.
    #[error("empty content received, cannot parse JSON")]
    EmptyContent,

    /// A phase's text output failed strict JSON parsing. Carries a
    /// truncated preview of the offending text for diagnostics.
    #[error("failed to parse JSON response, content preview: {preview}")]
    JsonParse { preview: String },

    /// The parsed JSON was missing keys required by the phase's schema.
    #[error("phase output did not match the expected schema (preview: {preview}): {source}")]
    PhaseSchema {
        preview: String,
        #[source]
        source: serde_json::Error,
    },
}
