//! Prompt builders for query analysis and synthesis.

use crate::types::SubtaskResult;
use std::fmt::Write;

/// Sources per subagent quoted in the synthesis prompt.
const SOURCES_PER_SUBAGENT_IN_PROMPT: usize = 2;

/// Ask the model to decompose `query` into distinct research angles, as JSON.
pub fn analysis_prompt(query: &str, fanout: Option<usize>) -> String {
    let allocation = match fanout {
        Some(n) => format!("Use exactly {} subagents.", n),
        None => "Choose between 2 and 6 subagents: 2-3 for simple topics, 3-4 for topics \
                 needing several perspectives, 5-6 for complex multi-faceted topics."
            .to_string(),
    };

    format!(
        r#"Plan a multi-agent web research strategy for this query.

Query: "{query}"

{allocation}

Respond with JSON only, shaped like:
{{
    "complexity_score": <1-5>,
    "num_subagents": <2-6>,
    "subtasks": [
        {{"id": 1, "focus": "<search focus>", "rationale": "<why this angle matters>"}}
    ],
    "explanation": "<why this allocation fits the query>",
    "estimated_sources": <6-30>
}}

Each focus is used verbatim as a web search query, so keep it specific and
make sure no two subtasks overlap."#
    )
}

/// Combine every subagent's findings into one synthesis request.
pub fn synthesis_prompt(query: &str, results: &[SubtaskResult], total_sources: u64) -> String {
    let mut prompt = format!("Research question: {}\n\nFindings by subagent:\n", query);

    for result in results {
        let _ = writeln!(
            prompt,
            "\nSubagent {} ({}):",
            result.subtask, result.search_focus
        );
        if result.sources.is_empty() {
            prompt.push_str("- no usable sources found\n");
        }
        for source in result.sources.iter().take(SOURCES_PER_SUBAGENT_IN_PROMPT) {
            let _ = writeln!(prompt, "- {}: {}", source.title, source.content);
        }
    }

    let _ = write!(
        prompt,
        r#"
Write a research report that answers the question using these findings.
Structure it as:

SUMMARY: two or three sentences with the most important insights.

KEY FINDINGS: one bullet per subagent focus, plus any insight that only
appears when the findings are read together.

COVERAGE: {} sources were analyzed across {} subagents; note any gaps."#,
        total_sources,
        results.len()
    );

    prompt
}
