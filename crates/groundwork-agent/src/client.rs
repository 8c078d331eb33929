// ABOUTME: Model client trait and the Gemini generateContent adapter.
// ABOUTME: Builds conversation + tool-schema requests and maps HTTP failures to descriptive errors.

use async_trait::async_trait;
use serde_json::{Value, json};

use groundwork_core::config::{ReasoningEffort, ResearchConfig};
use groundwork_core::conversation::Conversation;
use groundwork_core::error::WorkflowError;

/// A completion backend. Takes the full conversation, the tool schemas
/// the model may call, and a reasoning-effort hint; returns the raw
/// response document for the normalizer to pick apart.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(
        &self,
        conversation: &Conversation,
        tools: &[Value],
        effort: ReasoningEffort,
    ) -> Result<Value, WorkflowError>;
}

/// Google Gemini client. Calls the generateContent API, attaching
/// function declarations when tools are supplied and a thinking-level
/// hint on every request.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client from validated configuration.
    pub fn new(config: &ResearchConfig) -> Self {
        Self::with_settings(
            config.gemini_api_key.clone(),
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
        )
    }

    /// Create a client with explicit settings (tests, proxies).
    pub fn with_settings(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Build the JSON request body for the generateContent API.
    pub fn build_request_body(
        conversation: &Conversation,
        tools: &[Value],
        effort: ReasoningEffort,
    ) -> Value {
        let mut body = json!({
            "contents": conversation,
            "generationConfig": {
                "thinkingConfig": {
                    "thinkingLevel": effort.as_str()
                }
            }
        });

        if !tools.is_empty() {
            body["tools"] = json!([{ "functionDeclarations": tools }]);
        }

        body
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        conversation: &Conversation,
        tools: &[Value],
        effort: ReasoningEffort,
    ) -> Result<Value, WorkflowError> {
        let body = Self::build_request_body(conversation, tools, effort);
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| WorkflowError::Backend(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(WorkflowError::Backend("rate limited".to_string()));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(WorkflowError::Backend(
                "unauthorized: check GEMINI_API_KEY".to_string(),
            ));
        }

        if status.is_server_error() {
            return Err(WorkflowError::Backend(format!("server error: {}", status)));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(WorkflowError::Backend(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| WorkflowError::Backend(format!("failed to read response JSON: {}", e)))
    }
}
