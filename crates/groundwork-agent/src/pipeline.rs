// ABOUTME: The phase pipeline: Understand, Clarify, Plan, Execute, Reflect, Synthesize.
// ABOUTME: Owns the accumulated research state and performs at most one reflection-triggered re-execution.

use groundwork_core::config::ResearchConfig;
use groundwork_core::conversation::Conversation;
use groundwork_core::error::WorkflowError;
use groundwork_core::events::{PhaseEvent, PhaseStatus, WorkflowObserver};
use groundwork_core::phase::{AngleFindings, Reflection, ResearchAngle, ResearchPlan, Understanding};

use crate::client::ModelClient;
use crate::extract::{self, ModelReply};
use crate::orchestrator::Orchestrator;
use crate::prompts;
use crate::registry::ToolRegistry;

const PHASE_UNDERSTAND: (&str, &str) = ("1", "Understanding Query");
const PHASE_CLARIFY: (&str, &str) = ("1.1", "Clarification");
const PHASE_PLAN: (&str, &str) = ("2", "Research Planning");
const PHASE_EXECUTE: (&str, &str) = ("3", "Research Execution");
const PHASE_REFLECT: (&str, &str) = ("4", "Reflection");
const PHASE_SYNTHESIZE: (&str, &str) = ("5", "Final Report");

/// Research gathered across the run. Appended to after every execution
/// round; sources keep duplicates.
#[derive(Debug, Default)]
struct ResearchState {
    synthesis: String,
    sources: Vec<String>,
    angles_investigated: Vec<String>,
}

/// Sequences the research workflow over one model client, tool registry,
/// and observer. Holds no mutable state itself; each `run` owns its own
/// accumulated research state.
pub struct ResearchPipeline<'a> {
    client: &'a dyn ModelClient,
    registry: &'a ToolRegistry,
    config: &'a ResearchConfig,
    observer: &'a dyn WorkflowObserver,
}

impl<'a> ResearchPipeline<'a> {
    pub fn new(
        client: &'a dyn ModelClient,
        registry: &'a ToolRegistry,
        config: &'a ResearchConfig,
        observer: &'a dyn WorkflowObserver,
    ) -> Self {
        Self {
            client,
            registry,
            config,
            observer,
        }
    }

    /// Run the full workflow and return the final markdown report.
    ///
    /// A pre-supplied `clarification` bypasses the observer's
    /// clarification callback entirely. Any phase failure aborts the run;
    /// there is no retry beyond the single sanctioned reflection round.
    pub async fn run(
        &self,
        query: &str,
        clarification: Option<&str>,
    ) -> Result<String, WorkflowError> {
        let mut understanding = self
            .understand(query)
            .await
            .map_err(|e| self.fail(PHASE_UNDERSTAND, e))?;

        if understanding.needs_clarification {
            understanding = self
                .clarify(query, &understanding, clarification)
                .await
                .map_err(|e| self.fail(PHASE_CLARIFY, e))?;
        }

        let plan = self
            .plan(&understanding)
            .await
            .map_err(|e| self.fail(PHASE_PLAN, e))?;

        let mut state = ResearchState::default();
        self.execute(query, &plan.research_angles, &mut state)
            .await
            .map_err(|e| self.fail(PHASE_EXECUTE, e))?;

        let reflection = self
            .reflect(query, &state)
            .await
            .map_err(|e| self.fail(PHASE_REFLECT, e))?;

        if !reflection.is_sufficient {
            // Second and final execution round. Sufficiency is not
            // re-checked afterwards; the workflow moves on regardless.
            self.execute(query, &reflection.new_angles, &mut state)
                .await
                .map_err(|e| self.fail(PHASE_EXECUTE, e))?;
        }

        self.synthesize(query, &state)
            .await
            .map_err(|e| self.fail(PHASE_SYNTHESIZE, e))
    }

    async fn understand(&self, query: &str) -> Result<Understanding, WorkflowError> {
        self.emit(PHASE_UNDERSTAND, PhaseStatus::Running, None);

        let text = self.request_text(prompts::understand(query)).await?;
        let understanding: Understanding = extract::parse_phase(&text)?;

        self.emit(
            PHASE_UNDERSTAND,
            PhaseStatus::Completed,
            Some(format!(
                "Clarification needed: {}",
                understanding.needs_clarification
            )),
        );
        Ok(understanding)
    }

    async fn clarify(
        &self,
        query: &str,
        prior: &Understanding,
        presupplied: Option<&str>,
    ) -> Result<Understanding, WorkflowError> {
        self.emit(PHASE_CLARIFY, PhaseStatus::Running, None);

        let answer = match presupplied {
            Some(answer) => answer.to_string(),
            None => self
                .observer
                .clarification(&prior.clarifying_questions.join("\n")),
        };

        let text = self
            .request_text(prompts::clarify(query, prior, &answer))
            .await?;
        let updated: Understanding = extract::parse_phase(&text)?;

        self.emit(PHASE_CLARIFY, PhaseStatus::Completed, None);
        Ok(updated)
    }

    async fn plan(&self, understanding: &Understanding) -> Result<ResearchPlan, WorkflowError> {
        self.emit(PHASE_PLAN, PhaseStatus::Running, None);

        let text = self.request_text(prompts::plan(understanding)).await?;
        let plan: ResearchPlan = extract::parse_phase(&text)?;

        self.emit(
            PHASE_PLAN,
            PhaseStatus::Completed,
            Some(format!(
                "Created {} research angles",
                plan.research_angles.len()
            )),
        );
        Ok(plan)
    }

    /// One execution round: a full orchestrator run per angle, in order,
    /// appending findings to the accumulated state.
    async fn execute(
        &self,
        query: &str,
        angles: &[ResearchAngle],
        state: &mut ResearchState,
    ) -> Result<(), WorkflowError> {
        self.emit(PHASE_EXECUTE, PhaseStatus::Running, None);

        let angles_before = state.angles_investigated.len();
        let sources_before = state.sources.len();

        for (idx, angle) in angles.iter().enumerate() {
            self.emit(
                PHASE_EXECUTE,
                PhaseStatus::Running,
                Some(format!(
                    "Investigating angle {}/{}: {}",
                    idx + 1,
                    angles.len(),
                    angle.angle
                )),
            );

            state.angles_investigated.push(angle.angle.clone());

            let prompt = prompts::execute(query, &angle.angle, &angle.success_criteria);
            let orchestrator = Orchestrator::new(
                self.client,
                self.registry,
                self.config.max_tool_iterations,
                self.config.reasoning_effort,
                self.observer,
            );
            let text = orchestrator.run(Conversation::opening(prompt)).await?;
            let findings: AngleFindings = extract::parse_phase(&text)?;

            state.synthesis.push_str("\n\n");
            state.synthesis.push_str(&findings.final_summary);
            state.sources.extend(findings.sources_used);
        }

        self.emit(
            PHASE_EXECUTE,
            PhaseStatus::Completed,
            Some(format!(
                "Investigated {} angles, found {} sources",
                state.angles_investigated.len() - angles_before,
                state.sources.len() - sources_before
            )),
        );
        Ok(())
    }

    async fn reflect(&self, query: &str, state: &ResearchState) -> Result<Reflection, WorkflowError> {
        self.emit(PHASE_REFLECT, PhaseStatus::Running, None);

        let prompt = prompts::reflect(query, &state.angles_investigated, &state.synthesis);
        let text = self.request_text(prompt).await?;
        let reflection: Reflection = extract::parse_phase(&text)?;

        let message = if reflection.is_sufficient {
            "Research sufficient"
        } else {
            "Additional research needed"
        };
        self.emit(PHASE_REFLECT, PhaseStatus::Completed, Some(message.to_string()));
        Ok(reflection)
    }

    async fn synthesize(&self, query: &str, state: &ResearchState) -> Result<String, WorkflowError> {
        self.emit(PHASE_SYNTHESIZE, PhaseStatus::Running, None);

        let prompt = prompts::synthesize(query, &state.synthesis, &state.sources);
        let report = self.request_text(prompt).await?;

        self.emit(PHASE_SYNTHESIZE, PhaseStatus::Completed, None);
        Ok(report)
    }

    /// Single request/response exchange with no tools; the reply must be
    /// text.
    async fn request_text(&self, prompt: String) -> Result<String, WorkflowError> {
        let raw = self
            .client
            .generate(
                &Conversation::opening(prompt),
                &[],
                self.config.reasoning_effort,
            )
            .await?;

        match extract::extract_reply(&raw)? {
            ModelReply::Text(text) => Ok(text),
            ModelReply::ToolCalls(_) => Err(WorkflowError::MalformedResponse(
                "expected a text reply to a request without tools".to_string(),
            )),
        }
    }

    fn emit(&self, phase: (&str, &str), status: PhaseStatus, message: Option<String>) {
        let mut event = PhaseEvent::new(phase.0, phase.1, status);
        if let Some(message) = message {
            event = event.with_message(message);
        }
        self.observer.phase_update(event);
    }

    fn fail(&self, phase: (&str, &str), error: WorkflowError) -> WorkflowError {
        self.emit(phase, PhaseStatus::Failed, Some(error.to_string()));
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingObserver, ScriptedClient, text_response};
    use groundwork_core::config::ReasoningEffort;
    use serde_json::Value;
    use std::path::PathBuf;

    fn test_config() -> ResearchConfig {
        ResearchConfig {
            gemini_api_key: "test-key".to_string(),
            tavily_api_key: "test-key".to_string(),
            gemini_model: "gemini-3-flash-preview".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            reasoning_effort: ReasoningEffort::Medium,
            max_tool_iterations: 20,
            reports_dir: PathBuf::from("reports"),
        }
    }

    fn understanding_response(needs_clarification: bool) -> Value {
        text_response(&format!(
            r#"{{
                "topic": "Rust async runtimes",
                "aspects": ["scheduling"],
                "constraints": [],
                "assumptions": ["tokio focus"],
                "needs_clarification": {},
                "clarifying_questions": {}
            }}"#,
            needs_clarification,
            if needs_clarification {
                r#"["Which runtimes?", "What depth?"]"#
            } else {
                "[]"
            }
        ))
    }

    fn clarified_response() -> Value {
        text_response(
            r#"{
                "topic": "Rust async runtimes",
                "aspects": ["scheduling", "io"],
                "constraints": [],
                "assumptions": ["tokio and smol"]
            }"#,
        )
    }

    fn plan_response(angle_count: usize) -> Value {
        let angles: Vec<String> = (0..angle_count)
            .map(|i| {
                format!(
                    r#"{{"angle": "angle {i}", "success_criteria": "criteria {i}", "why_needed": "reason {i}"}}"#
                )
            })
            .collect();
        text_response(&format!(
            r#"{{"research_angles": [{}]}}"#,
            angles.join(", ")
        ))
    }

    fn findings_response(summary: &str, sources: &[&str]) -> Value {
        let source_list: Vec<String> = sources.iter().map(|s| format!("\"{}\"", s)).collect();
        text_response(&format!(
            r#"{{"final_summary": "{}", "sources_used": [{}]}}"#,
            summary,
            source_list.join(", ")
        ))
    }

    fn reflection_response(is_sufficient: bool, new_angles: usize) -> Value {
        let angles: Vec<String> = (0..new_angles)
            .map(|i| {
                format!(
                    r#"{{"angle": "new angle {i}", "success_criteria": "fill gap {i}", "why_needed": "gap {i}"}}"#
                )
            })
            .collect();
        text_response(&format!(
            r#"{{"is_sufficient": {}, "reasoning": "because", "new_angles": [{}]}}"#,
            is_sufficient,
            angles.join(", ")
        ))
    }

    fn first_turn_text(request: &crate::testing::RecordedRequest) -> String {
        request.conversation[0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn scenario_a_no_clarification_goes_straight_to_plan() {
        let client = ScriptedClient::new(vec![
            understanding_response(false),
            plan_response(1),
            findings_response("summary", &["https://a.example"]),
            reflection_response(true, 0),
            text_response("# Final Report"),
        ]);
        let registry = ToolRegistry::new();
        let config = test_config();
        let observer = RecordingObserver::new();
        let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

        let report = pipeline.run("compare runtimes", None).await.unwrap();

        assert_eq!(report, "# Final Report");
        assert_eq!(observer.clarification_count(), 0);
        assert_eq!(client.request_count(), 5);
    }

    #[tokio::test]
    async fn scenario_b_clarification_callback_invoked_once() {
        let client = ScriptedClient::new(vec![
            understanding_response(true),
            clarified_response(),
            plan_response(1),
            findings_response("summary", &[]),
            reflection_response(true, 0),
            text_response("# Final Report"),
        ]);
        let registry = ToolRegistry::new();
        let config = test_config();
        let observer = RecordingObserver::with_answer("tokio and smol please");
        let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

        pipeline.run("compare runtimes", None).await.unwrap();

        assert_eq!(observer.clarification_count(), 1);
        let questions = &observer.clarification_requests.lock().unwrap()[0];
        assert!(questions.contains("Which runtimes?"));
        assert!(questions.contains("What depth?"));

        // The answer flows into the clarify request's prompt.
        let requests = client.requests();
        let clarify_prompt = first_turn_text(&requests[1]);
        assert!(clarify_prompt.contains("tokio and smol please"));
    }

    #[tokio::test]
    async fn scenario_b_presupplied_clarification_bypasses_callback() {
        let client = ScriptedClient::new(vec![
            understanding_response(true),
            clarified_response(),
            plan_response(1),
            findings_response("summary", &[]),
            reflection_response(true, 0),
            text_response("# Final Report"),
        ]);
        let registry = ToolRegistry::new();
        let config = test_config();
        let observer = RecordingObserver::with_answer("should never be used");
        let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

        pipeline
            .run("compare runtimes", Some("prefer tokio"))
            .await
            .unwrap();

        assert_eq!(observer.clarification_count(), 0);
        let requests = client.requests();
        let clarify_prompt = first_turn_text(&requests[1]);
        assert!(clarify_prompt.contains("prefer tokio"));
    }

    #[tokio::test]
    async fn scenario_c_four_angles_run_four_orchestrations() {
        let client = ScriptedClient::new(vec![
            understanding_response(false),
            plan_response(4),
            findings_response("fragment one", &["https://dup.example"]),
            findings_response("fragment two", &["https://dup.example"]),
            findings_response("fragment three", &["https://three.example"]),
            findings_response("fragment four", &[]),
            reflection_response(true, 0),
            text_response("# Final Report"),
        ]);
        let registry = ToolRegistry::new();
        let config = test_config();
        let observer = RecordingObserver::new();
        let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

        pipeline.run("compare runtimes", None).await.unwrap();

        // 1 understand + 1 plan + 4 angle runs + 1 reflect + 1 synthesize
        assert_eq!(client.request_count(), 8);

        let requests = client.requests();

        // All four fragments reach the reflection prompt.
        let reflect_prompt = first_turn_text(&requests[6]);
        for fragment in ["fragment one", "fragment two", "fragment three", "fragment four"] {
            assert!(reflect_prompt.contains(fragment));
        }

        // Duplicate sources are preserved in the synthesis prompt.
        let synthesize_prompt = first_turn_text(&requests[7]);
        let dup_count = synthesize_prompt.matches("https://dup.example").count();
        assert_eq!(dup_count, 2, "duplicate sources must not be deduplicated");
    }

    #[tokio::test]
    async fn scenario_e_sufficient_reflection_skips_second_round() {
        let client = ScriptedClient::new(vec![
            understanding_response(false),
            plan_response(2),
            findings_response("one", &[]),
            findings_response("two", &[]),
            reflection_response(true, 0),
            text_response("# Final Report"),
        ]);
        let registry = ToolRegistry::new();
        let config = test_config();
        let observer = RecordingObserver::new();
        let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

        pipeline.run("compare runtimes", None).await.unwrap();

        // No second execution round: exactly 6 requests.
        assert_eq!(client.request_count(), 6);

        let execute_completions: Vec<PhaseEvent> = observer
            .phases
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.phase == "3" && e.status == PhaseStatus::Completed)
            .cloned()
            .collect();
        assert_eq!(execute_completions.len(), 1);
    }

    #[tokio::test]
    async fn insufficient_reflection_triggers_exactly_one_more_round() {
        let client = ScriptedClient::new(vec![
            understanding_response(false),
            plan_response(1),
            findings_response("round one findings", &["https://r1.example"]),
            reflection_response(false, 1),
            findings_response("round two findings", &["https://r2.example"]),
            text_response("# Final Report"),
        ]);
        let registry = ToolRegistry::new();
        let config = test_config();
        let observer = RecordingObserver::new();
        let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

        let report = pipeline.run("compare runtimes", None).await.unwrap();
        assert_eq!(report, "# Final Report");

        // understand, plan, round-1 angle, reflect, round-2 angle,
        // synthesize. No second reflection happens.
        assert_eq!(client.request_count(), 6);

        // Both rounds' findings and sources reach the synthesis prompt.
        let requests = client.requests();
        let synthesize_prompt = first_turn_text(&requests[5]);
        assert!(synthesize_prompt.contains("round one findings"));
        assert!(synthesize_prompt.contains("round two findings"));
        assert!(synthesize_prompt.contains("https://r1.example"));
        assert!(synthesize_prompt.contains("https://r2.example"));
    }

    #[tokio::test]
    async fn angle_findings_wrapped_in_fences_still_parse() {
        let fenced = text_response(
            "Here is what I found.\n```json\n{\"final_summary\": \"fenced summary\", \"sources_used\": []}\n```",
        );
        let client = ScriptedClient::new(vec![
            understanding_response(false),
            plan_response(1),
            fenced,
            reflection_response(true, 0),
            text_response("# Final Report"),
        ]);
        let registry = ToolRegistry::new();
        let config = test_config();
        let observer = RecordingObserver::new();
        let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

        pipeline.run("compare runtimes", None).await.unwrap();

        let requests = client.requests();
        let reflect_prompt = first_turn_text(&requests[3]);
        assert!(reflect_prompt.contains("fenced summary"));
    }

    #[tokio::test]
    async fn plan_parse_failure_aborts_with_failed_event() {
        let client = ScriptedClient::new(vec![
            understanding_response(false),
            text_response("this is not the JSON you are looking for"),
        ]);
        let registry = ToolRegistry::new();
        let config = test_config();
        let observer = RecordingObserver::new();
        let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

        let result = pipeline.run("compare runtimes", None).await;
        assert!(matches!(result, Err(WorkflowError::JsonParse { .. })));

        let phases = observer.phases.lock().unwrap();
        let failed: Vec<&PhaseEvent> = phases
            .iter()
            .filter(|e| e.status == PhaseStatus::Failed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].phase, "2");
    }

    #[tokio::test]
    async fn phase_events_run_in_workflow_order() {
        let client = ScriptedClient::new(vec![
            understanding_response(false),
            plan_response(1),
            findings_response("summary", &[]),
            reflection_response(true, 0),
            text_response("# Final Report"),
        ]);
        let registry = ToolRegistry::new();
        let config = test_config();
        let observer = RecordingObserver::new();
        let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

        pipeline.run("compare runtimes", None).await.unwrap();

        let phases = observer.phases.lock().unwrap();
        let completed_order: Vec<String> = phases
            .iter()
            .filter(|e| e.status == PhaseStatus::Completed)
            .map(|e| e.phase.clone())
            .collect();
        assert_eq!(completed_order, ["1", "2", "3", "4", "5"]);

        let execute_events: Vec<&PhaseEvent> = phases
            .iter()
            .filter(|e| e.phase == "3" && e.status == PhaseStatus::Running)
            .collect();
        // One round-start event plus one per-angle progress event.
        assert_eq!(execute_events.len(), 2);
        assert!(
            execute_events[1]
                .message
                .as_deref()
                .unwrap()
                .contains("Investigating angle 1/1")
        );
    }
}
