// ABOUTME: Prompt templates for the six workflow phases.
// ABOUTME: Each render function formats the caller's state into the phase's request text.

use groundwork_core::phase::Understanding;

fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Phase 1: analyze the query and decide whether clarification is needed.
pub fn understand(user_query: &str) -> String {
    format!(
        "You are a research assistant analyzing a query before beginning research.\n\n\
        Analyze this query and extract:\n\
        1. The main topic\n\
        2. Specific aspects the user wants covered\n\
        3. Any constraints (time period, depth, source types)\n\
        4. Whether clarification is needed (only if genuinely ambiguous)\n\n\
        If clarification is needed, ask up to 3 focused questions.\n\
        If not needed, state your assumptions clearly.\n\n\
        Query: {user_query}\n\n\
        Respond with ONLY valid JSON:\n\
        {{\n\
            \"topic\": \"main subject\",\n\
            \"aspects\": [\"specific areas to cover\"],\n\
            \"constraints\": [\"any limitations\"],\n\
            \"needs_clarification\": true/false,\n\
            \"clarifying_questions\": [\"if needed\"],\n\
            \"assumptions\": [\"assumptions you're making\"]\n\
        }}"
    )
}

/// Phase 1.1: fold the user's clarification answers into the understanding.
pub fn clarify(user_query: &str, prior: &Understanding, user_answers: &str) -> String {
    format!(
        "You are a research assistant finalizing your understanding of a query.\n\n\
        Original query: {user_query}\n\n\
        Your initial understanding:\n\
        {{\n\
            \"topic\": {topic},\n\
            \"aspects\": {aspects},\n\
            \"constraints\": {constraints},\n\
            \"assumptions\": {assumptions}\n\
        }}\n\n\
        Your clarifying questions: {questions}\n\n\
        User's answers: {user_answers}\n\n\
        Update your understanding based on their responses. Keep what was correct, \
        modify what needs changing, add any new information.\n\n\
        Respond with ONLY valid JSON:\n\
        {{\n\
            \"topic\": \"main subject (updated if needed)\",\n\
            \"aspects\": [\"updated areas to cover\"],\n\
            \"constraints\": [\"updated limitations\"],\n\
            \"assumptions\": [\"final assumptions incorporating user's answers\"]\n\
        }}",
        topic = serde_json::to_string(&prior.topic).unwrap_or_default(),
        aspects = json_list(&prior.aspects),
        constraints = json_list(&prior.constraints),
        assumptions = json_list(&prior.assumptions),
        questions = json_list(&prior.clarifying_questions),
    )
}

/// Phase 2: turn the understanding into distinct research angles.
pub fn plan(understanding: &Understanding) -> String {
    format!(
        "You are a research assistant creating a research plan.\n\n\
        Query understanding:\n\
        - Topic: {topic}\n\
        - Aspects to cover: {aspects}\n\
        - Constraints: {constraints}\n\
        - Assumptions: {assumptions}\n\n\
        Create 3-6 distinct research angles that collectively cover the query. Each angle should be:\n\
        - Specific enough to guide a focused search\n\
        - Non-overlapping with other angles\n\
        - Answerable through research (not opinion)\n\n\
        Respond with ONLY valid JSON:\n\
        {{\n\
            \"research_angles\": [\n\
                {{\n\
                    \"angle\": \"<specific question or area to investigate>\",\n\
                    \"why_needed\": \"<how this contributes to answering the overall query>\",\n\
                    \"success_criteria\": \"<what specific information or evidence would complete this angle>\"\n\
                }}\n\
            ]\n\
        }}",
        topic = understanding.topic,
        aspects = json_list(&understanding.aspects),
        constraints = json_list(&understanding.constraints),
        assumptions = json_list(&understanding.assumptions),
    )
}

/// Phase 3: investigate one angle with the research tools.
pub fn execute(user_query: &str, angle: &str, success_criteria: &str) -> String {
    format!(
        "You are a research assistant investigating one angle of a research query.\n\n\
        User Query: {user_query}\n\
        Angle: {angle}\n\
        Success Criteria: {success_criteria}\n\n\
        Use the available tools to gather information. When the success criteria is met, \
        stop using tools and provide your final summary.\n\n\
        Available tools:\n\n\
        - web_search: Search the web\n\
        - arxiv_search: Search academic papers on arXiv\n\
        - fetch_url: Fetch content from URLs\n\n\
        If you have gathered enough information, respond with ONLY valid JSON:\n\
        {{\n\
            \"final_summary\": \"<summarize all relevant information for this angle>\",\n\
            \"sources_used\": [\"<only URLs referenced in the summary>\"]\n\
        }}\n\n\
        Otherwise, continue using tools to gather more information."
    )
}

/// Phase 4: judge whether the gathered research suffices.
pub fn reflect(user_query: &str, angles_investigated: &[String], synthesized_info: &str) -> String {
    format!(
        "You are a research assistant reflecting on the research quality.\n\n\
        Original Query: {user_query}\n\n\
        Research Plan (Angles Investigated):\n\
        {angles}\n\n\
        Synthesized Information:\n\
        {synthesized_info}\n\n\
        Evaluate whether the gathered information adequately answers the user's query.\n\n\
        Respond with ONLY valid JSON:\n\
        {{\n\
            \"is_sufficient\": <true or false>,\n\
            \"reasoning\": \"<why the information is sufficient or what's missing>\",\n\
            \"new_angles\": [\n\
                {{\n\
                    \"angle\": \"<area to investigate>\",\n\
                    \"why_needed\": \"<what gap this fills>\",\n\
                    \"success_criteria\": \"<what would complete this angle>\"\n\
                }}\n\
            ]\n\
        }}\n\n\
        If is_sufficient is true, new_angles should be an empty array.",
        angles = json_list(angles_investigated),
    )
}

/// Phase 5: produce the final markdown report.
pub fn synthesize(user_query: &str, synthesized_info: &str, sources: &[String]) -> String {
    format!(
        "You are a research assistant creating a final report.\n\n\
        User Query: {user_query}\n\n\
        Synthesized Information:\n\
        {synthesized_info}\n\n\
        Sources Used:\n\
        {sources}\n\n\
        Create a well-structured final report in markdown format with the following structure:\n\n\
        # [Relevant Title Based on Query]\n\n\
        ## Executive Summary\n\
        Brief 2-3 sentence overview answering the core query.\n\n\
        ## Key Findings\n\
        Main findings organized by theme. Cite sources using [1], [2], etc.\n\n\
        ## Detailed Analysis\n\
        Deeper analysis connecting the findings with evidence from sources.\n\n\
        ## Conclusion\n\
        Direct, concise answer to the user's query with key takeaways.\n\n\
        ## References\n\
        Numbered list of all sources cited:\n\
        [1] Source title - URL\n\
        [2] Source title - URL\n\n\
        Important:\n\
        - Use proper markdown formatting (headers, bullet points, bold for emphasis)\n\
        - Cite sources inline using [1], [2] format\n\
        - Ensure all claims are supported by the synthesized information\n\
        - Keep the report focused and relevant to the user's query",
        sources = json_list(sources),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_understanding() -> Understanding {
        serde_json::from_value(serde_json::json!({
            "topic": "Rust async runtimes",
            "aspects": ["scheduling"],
            "constraints": ["last 3 years"],
            "assumptions": ["tokio focus"],
            "needs_clarification": true,
            "clarifying_questions": ["Which runtimes matter to you?"]
        }))
        .unwrap()
    }

    #[test]
    fn understand_prompt_embeds_query_and_schema() {
        let prompt = understand("compare rust async runtimes");
        assert!(prompt.contains("compare rust async runtimes"));
        assert!(prompt.contains("\"needs_clarification\""));
        assert!(prompt.contains("ONLY valid JSON"));
    }

    #[test]
    fn clarify_prompt_includes_questions_and_answers() {
        let prompt = clarify("query", &sample_understanding(), "tokio and smol");
        assert!(prompt.contains("Which runtimes matter to you?"));
        assert!(prompt.contains("tokio and smol"));
        assert!(prompt.contains("\"assumptions\""));
    }

    #[test]
    fn plan_prompt_lists_understanding_fields() {
        let prompt = plan(&sample_understanding());
        assert!(prompt.contains("Rust async runtimes"));
        assert!(prompt.contains("scheduling"));
        assert!(prompt.contains("\"research_angles\""));
    }

    #[test]
    fn execute_prompt_names_the_three_tools() {
        let prompt = execute("query", "scheduler design", "explain work stealing");
        assert!(prompt.contains("web_search"));
        assert!(prompt.contains("arxiv_search"));
        assert!(prompt.contains("fetch_url"));
        assert!(prompt.contains("scheduler design"));
        assert!(prompt.contains("\"final_summary\""));
    }

    #[test]
    fn reflect_prompt_embeds_angles_and_synthesis() {
        let prompt = reflect(
            "query",
            &["angle one".to_string(), "angle two".to_string()],
            "what we learned",
        );
        assert!(prompt.contains("angle one"));
        assert!(prompt.contains("what we learned"));
        assert!(prompt.contains("\"is_sufficient\""));
    }

    #[test]
    fn synthesize_prompt_embeds_sources() {
        let prompt = synthesize(
            "query",
            "everything we learned",
            &["https://a.example".to_string()],
        );
        assert!(prompt.contains("https://a.example"));
        assert!(prompt.contains("## References"));
    }
}
