//! Query decomposition.
//!
//! A [`Planner`] turns a research query into 2-6 distinct search focuses.
//! Planning never fails: when the model call errors or its answer cannot be
//! used, the fixed templates from [`default_plan`] take over and the plan is
//! flagged as a fallback.

use super::prompts;
use crate::llm::{CompletionOptions, LLMClient};
use crate::types::ComplexityAnalysis;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub const MIN_SUBTASKS: usize = 2;
pub const MAX_SUBTASKS: usize = 6;
const DEFAULT_SUBTASKS: usize = 3;

/// One research angle assigned to a subagent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSubtask {
    pub id: u32,
    pub focus: String,
    pub rationale: String,
}

/// Ordered decomposition of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchPlan {
    pub subtasks: Vec<PlannedSubtask>,
    pub complexity_score: u8,
    pub explanation: String,
    pub estimated_sources: u32,
    /// The default templates replaced the planner's own answer
    pub fallback: bool,
}

impl ResearchPlan {
    pub fn len(&self) -> usize {
        self.subtasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtasks.is_empty()
    }

    pub fn analysis(&self) -> ComplexityAnalysis {
        ComplexityAnalysis {
            complexity_score: self.complexity_score,
            num_subagents: self.subtasks.len(),
            explanation: self.explanation.clone(),
            estimated_sources: self.estimated_sources,
            fallback: self.fallback,
        }
    }
}

#[async_trait]
pub trait Planner: Send + Sync {
    /// Decompose `query`. `fanout`, when given, fixes the number of subtasks.
    async fn plan(&self, query: &str, fanout: Option<usize>, model: Option<&str>) -> ResearchPlan;
}

/// Clamp a requested subtask count into the supported range.
pub fn clamp_fanout(fanout: usize) -> usize {
    fanout.clamp(MIN_SUBTASKS, MAX_SUBTASKS)
}

/// Fixed decomposition templates for `count` subtasks (3 when out of range).
pub fn default_subtasks(query: &str, count: usize) -> Vec<PlannedSubtask> {
    let templates: &[(&str, &str)] = match count {
        2 => &[
            ("fundamentals and core concepts", "Establish foundational understanding"),
            ("applications and real-world use", "Explore practical implementations"),
        ],
        4 => &[
            ("core concepts and fundamentals", "Establish base understanding"),
            ("current implementations and tools", "Review existing solutions"),
            ("challenges and limitations", "Identify pain points"),
            ("future outlook and innovations", "Explore emerging trends"),
        ],
        5 => &[
            ("foundational theory and history", "Historical context and basics"),
            ("technical architecture and mechanics", "Understand how it works"),
            ("current market leaders and solutions", "Review competitive landscape"),
            ("use cases and success stories", "Real-world applications"),
            ("future developments and roadmap", "What's coming next"),
        ],
        6 => &[
            ("fundamental concepts and definitions", "Build vocabulary and basics"),
            ("technical implementation details", "Deep technical dive"),
            ("industry adoption and case studies", "Market validation"),
            ("comparison with alternatives", "Competitive analysis"),
            ("challenges, risks, and ethics", "Critical evaluation"),
            ("future trajectory and predictions", "Forward-looking insights"),
        ],
        _ => &[
            ("fundamentals and principles", "Build foundational knowledge"),
            ("latest developments and trends", "Understand current state"),
            ("applications and implications", "Explore real-world impact"),
        ],
    };

    templates
        .iter()
        .zip(1u32..)
        .map(|((suffix, rationale), id)| PlannedSubtask {
            id,
            focus: format!("{} {}", query, suffix),
            rationale: rationale.to_string(),
        })
        .collect()
}

/// Moderate-complexity plan built from the default templates.
pub fn default_plan(query: &str, count: usize, reason: &str) -> ResearchPlan {
    let subtasks = default_subtasks(query, clamp_fanout(count));
    ResearchPlan {
        explanation: format!(
            "Default allocation applied ({}). Standard {}-agent approach for balanced coverage.",
            reason,
            subtasks.len()
        ),
        subtasks,
        complexity_score: 3,
        estimated_sources: 15,
        fallback: true,
    }
}

/// Always answers with the default templates; useful without a model.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticPlanner;

#[async_trait]
impl Planner for StaticPlanner {
    async fn plan(&self, query: &str, fanout: Option<usize>, _model: Option<&str>) -> ResearchPlan {
        let count = fanout.map(clamp_fanout).unwrap_or(DEFAULT_SUBTASKS);
        ResearchPlan {
            subtasks: default_subtasks(query, count),
            complexity_score: 3,
            explanation: format!("Fixed {}-agent allocation", count),
            estimated_sources: 15,
            fallback: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    complexity_score: Option<i64>,
    num_subagents: Option<i64>,
    #[serde(default)]
    subtasks: Vec<RawSubtask>,
    explanation: Option<String>,
    estimated_sources: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawSubtask {
    #[serde(default)]
    focus: String,
    #[serde(default)]
    rationale: Option<String>,
}

/// Pull the JSON object out of a reply that may be wrapped in markdown fences.
fn extract_json(response: &str) -> &str {
    if let Some((_, rest)) = response.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some((_, rest)) = response.split_once("```") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => response.trim(),
    }
}

fn distinct_focuses(subtasks: &[RawSubtask]) -> bool {
    let mut seen = HashSet::new();
    subtasks.iter().all(|s| {
        let key = s.focus.trim().to_lowercase();
        !key.is_empty() && seen.insert(key)
    })
}

/// Turn a model reply into a plan, or explain why it cannot be used.
fn plan_from_response(
    query: &str,
    response: &str,
    fanout: Option<usize>,
) -> Result<ResearchPlan, String> {
    let raw: RawAnalysis = serde_json::from_str(extract_json(response))
        .map_err(|e| format!("analysis was not valid JSON: {}", e))?;

    let complexity_score = raw.complexity_score.unwrap_or(3).clamp(1, 5) as u8;
    let suggested = raw.num_subagents.unwrap_or(DEFAULT_SUBTASKS as i64).clamp(2, 6) as usize;
    let count = fanout.map(clamp_fanout).unwrap_or(suggested);
    let estimated_sources = raw.estimated_sources.unwrap_or(15).clamp(6, 30) as u32;
    let explanation = raw
        .explanation
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| format!("{}-agent allocation", count));

    if raw.subtasks.len() != count || !distinct_focuses(&raw.subtasks) {
        debug!(
            returned = raw.subtasks.len(),
            expected = count,
            "Planner subtasks unusable, substituting default templates"
        );
        return Ok(ResearchPlan {
            subtasks: default_subtasks(query, count),
            complexity_score,
            explanation,
            estimated_sources,
            fallback: true,
        });
    }

    let subtasks = raw
        .subtasks
        .into_iter()
        .zip(1u32..)
        .map(|(s, id)| PlannedSubtask {
            id,
            focus: s.focus.trim().to_string(),
            rationale: s.rationale.unwrap_or_default(),
        })
        .collect();

    Ok(ResearchPlan {
        subtasks,
        complexity_score,
        explanation,
        estimated_sources,
        fallback: false,
    })
}

/// Planner that asks an LLM to analyse query complexity and pick focuses.
pub struct LlmPlanner {
    llm: Arc<dyn LLMClient>,
    options: CompletionOptions,
}

impl LlmPlanner {
    pub fn new(llm: Arc<dyn LLMClient>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, query: &str, fanout: Option<usize>, model: Option<&str>) -> ResearchPlan {
        let prompt = prompts::analysis_prompt(query, fanout.map(clamp_fanout));
        let options = self.options.clone().with_model(model.map(str::to_string));

        let outcome = match self.llm.complete(&prompt, &options).await {
            Ok(response) => plan_from_response(query, &response, fanout),
            Err(e) => Err(format!("analysis error: {}", e)),
        };

        outcome.unwrap_or_else(|reason| {
            warn!(%reason, "Query analysis failed, using default plan");
            default_plan(query, fanout.unwrap_or(DEFAULT_SUBTASKS), &reason)
        })
    }
}
