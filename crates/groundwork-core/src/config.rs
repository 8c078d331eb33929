// ABOUTME: Configuration loading and validation for the research workflow.
// ABOUTME: Constructed once at process start and passed by reference; never global state.

use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MAX_TOOL_ITERATIONS: u32 = 20;
const DEFAULT_REPORTS_DIR: &str = "reports";

/// Errors that can occur during configuration loading. All of them are
/// fatal at startup; no partial run happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required. Set it in a .env file or the environment.")]
    MissingKey(&'static str),

    #[error("THINKING_LEVEL must be one of low, medium, high (got: {0})")]
    InvalidThinkingLevel(String),

    #[error("MAX_TOOL_ITERATIONS must be a positive integer (got: {0})")]
    InvalidIterationLimit(String),
}

/// Reasoning-effort hint passed with every completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasoningEffort {
    Low,
    #[default]
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl std::str::FromStr for ReasoningEffort {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(ConfigError::InvalidThinkingLevel(other.to_string())),
        }
    }
}

/// Workflow configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    pub gemini_api_key: String,
    pub tavily_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub reasoning_effort: ReasoningEffort,
    pub max_tool_iterations: u32,
    pub reports_dir: PathBuf,
}

impl ResearchConfig {
    /// Load configuration from environment variables.
    ///
    /// Required: GEMINI_API_KEY, TAVILY_API_KEY (a literal "default_value"
    /// placeholder counts as missing).
    /// Optional: GEMINI_MODEL, GEMINI_BASE_URL, THINKING_LEVEL,
    /// MAX_TOOL_ITERATIONS, GROUNDWORK_REPORTS_DIR.
    pub fn from_env() -> Result<Self, ConfigError> {
        let gemini_api_key = required_key("GEMINI_API_KEY")?;
        let tavily_api_key = required_key("TAVILY_API_KEY")?;

        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let gemini_base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let reasoning_effort = match std::env::var("THINKING_LEVEL") {
            Ok(level) => level.parse()?,
            Err(_) => ReasoningEffort::default(),
        };

        let max_tool_iterations = match std::env::var("MAX_TOOL_ITERATIONS") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidIterationLimit(raw))?,
            Err(_) => DEFAULT_MAX_TOOL_ITERATIONS,
        };

        let reports_dir = std::env::var("GROUNDWORK_REPORTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_REPORTS_DIR));

        Ok(Self {
            gemini_api_key,
            tavily_api_key,
            gemini_model,
            gemini_base_url,
            reasoning_effort,
            max_tool_iterations,
            reports_dir,
        })
    }
}

/// Read a required key, rejecting empty values and the `.env.example`
/// placeholder.
fn required_key(name: &'static str) -> Result<String, ConfigError> {
    let value = std::env::var(name)
        .unwrap_or_default()
        .trim()
        .to_string();

    if value.is_empty() || value == "default_value" {
        return Err(ConfigError::MissingKey(name));
    }

    Ok(value)
}
