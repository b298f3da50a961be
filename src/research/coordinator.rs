use super::planner::{LlmPlanner, PlannedSubtask, Planner, ResearchPlan};
use super::prompts;
use super::worker::WorkerDispatch;
use crate::activity::{ActivityLog, ActivitySessionRegistry, EventKind, ResearchStatus};
use crate::event_data;
use crate::llm::{CompletionOptions, LLMClient, OpenAICompatClient};
use crate::search::create_provider;
use crate::types::{AppError, Result, ResearchResult, SubtaskResult};
use crate::utils::toml_config::MultiscoutConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Per-run knobs.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Fixed number of subtasks; the planner decides when unset
    pub fanout: Option<usize>,
    pub results_per_agent: usize,
    /// Synthesis model override
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub parallel_subagents: bool,
    pub run_timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.2,
            parallel_subagents: true,
            run_timeout: Duration::from_secs(300),
        }
    }
}

impl CoordinatorSettings {
    pub fn from_config(config: &MultiscoutConfig) -> Self {
        Self {
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            parallel_subagents: config.research.parallel_subagents,
            run_timeout: Duration::from_secs(config.research.run_timeout_secs),
        }
    }
}

/// Fails the log if a run is dropped before it reached a terminal state.
struct CancelGuard {
    log: Option<Arc<ActivityLog>>,
}

impl CancelGuard {
    fn arm(log: &Arc<ActivityLog>) -> Self {
        Self {
            log: Some(Arc::clone(log)),
        }
    }

    fn disarm(mut self) {
        self.log = None;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if let Some(log) = self.log.take()
            && !log.is_terminal()
        {
            warn!("Research run dropped before finishing");
            log.fail("Research cancelled");
        }
    }
}

/// Drives one research run through planning, dispatch, aggregation and
/// synthesis, reporting every step to the session's [`ActivityLog`].
pub struct ResearchCoordinator {
    planner: Arc<dyn Planner>,
    worker: WorkerDispatch,
    synthesizer: Arc<dyn LLMClient>,
    settings: CoordinatorSettings,
}

impl ResearchCoordinator {
    pub fn new(
        planner: Arc<dyn Planner>,
        worker: WorkerDispatch,
        synthesizer: Arc<dyn LLMClient>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            planner,
            worker,
            synthesizer,
            settings,
        }
    }

    /// Wire the configured LLM and search providers into a coordinator.
    ///
    /// The same client plans and synthesizes, with separate token budgets.
    pub fn from_config(config: &MultiscoutConfig) -> Result<Self> {
        let llm: Arc<dyn LLMClient> = Arc::new(OpenAICompatClient::from_config(&config.llm)?);
        let planner = LlmPlanner::new(
            Arc::clone(&llm),
            CompletionOptions::new(config.llm.planner_max_tokens, config.llm.planner_temperature),
        );
        let worker = WorkerDispatch::new(create_provider(&config.search)?).with_limits(
            config.research.min_source_chars,
            config.research.max_content_chars,
        );

        info!(
            search = worker.provider_name(),
            model = llm.model_name(),
            "Research coordinator ready"
        );
        Ok(Self::new(
            Arc::new(planner),
            worker,
            llm,
            CoordinatorSettings::from_config(config),
        ))
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn search_provider(&self) -> &str {
        self.worker.provider_name()
    }

    /// Run against the session `session_id` of `registry`.
    pub async fn run_in_session(
        &self,
        registry: &ActivitySessionRegistry,
        session_id: &str,
        query: &str,
        options: RunOptions,
    ) -> Result<ResearchResult> {
        self.run(query, options, registry.get(Some(session_id))).await
    }

    /// Execute a full research run, recording progress in `log`.
    ///
    /// On failure the log ends in status `error` with a "Research failed"
    /// event and the error is returned. Dropping the future mid-run marks
    /// the log as cancelled.
    pub async fn run(
        &self,
        query: &str,
        options: RunOptions,
        log: Arc<ActivityLog>,
    ) -> Result<ResearchResult> {
        let guard = CancelGuard::arm(&log);

        let outcome =
            match tokio::time::timeout(self.settings.run_timeout, self.pipeline(query, &options, &log))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(AppError::Timeout(format!(
                    "Research did not finish within {}s",
                    self.settings.run_timeout.as_secs()
                ))),
            };

        if let Err(e) = &outcome {
            error!(error = %e, query, "Research run failed");
            log.fail(format!("Research failed: {}", e));
        }
        guard.disarm();
        outcome
    }

    async fn pipeline(
        &self,
        query: &str,
        options: &RunOptions,
        log: &Arc<ActivityLog>,
    ) -> Result<ResearchResult> {
        log.reset(Some(query.to_string()));
        log.log(
            format!("Starting research: {}", query),
            EventKind::Start,
            event_data! { "query" => query },
        );
        info!(query, "Research started");

        log.set_status(ResearchStatus::Planning);
        log.info("Analyzing query complexity");
        let plan = self
            .planner
            .plan(query, options.fanout, options.model.as_deref())
            .await;
        self.record_plan(&plan, log);

        log.set_status(ResearchStatus::Executing);
        let limit = options.results_per_agent.max(1);
        let results = if self.settings.parallel_subagents {
            self.dispatch_concurrent(&plan, limit, log).await?
        } else {
            self.dispatch_sequential(&plan, limit, log).await?
        };

        let total_sources: u64 = results.iter().map(SubtaskResult::source_count).sum();
        log.log(
            format!(
                "Combined {} sources from {} subagents",
                total_sources,
                results.len()
            ),
            EventKind::Progress,
            event_data! {
                "total_sources" => total_sources,
                "subagents" => results.len(),
            },
        );

        log.set_status(ResearchStatus::Synthesizing);
        log.info("Synthesizing findings");
        let prompt = prompts::synthesis_prompt(query, &results, total_sources);
        let completion = CompletionOptions::new(self.settings.max_tokens, self.settings.temperature)
            .with_model(options.model.clone());
        let synthesis = self.synthesizer.complete(&prompt, &completion).await?;

        // The final event must land before the log turns terminal so streams drain it.
        log.log(
            "Research complete",
            EventKind::Complete,
            event_data! {
                "total_sources" => total_sources,
                "subagents" => results.len(),
            },
        );
        log.complete();
        info!(query, total_sources, subagents = results.len(), "Research complete");

        Ok(ResearchResult {
            query: query.to_string(),
            total_sources,
            synthesis,
            analysis: plan.analysis(),
            model: options
                .model
                .clone()
                .unwrap_or_else(|| self.synthesizer.model_name().to_string()),
            subtask_results: results,
        })
    }

    fn record_plan(&self, plan: &ResearchPlan, log: &ActivityLog) {
        if plan.fallback {
            log.log(
                "Using default research plan",
                EventKind::Info,
                event_data! { "reason" => &plan.explanation },
            );
        }
        log.log(
            format!("Defined {} subtasks", plan.len()),
            EventKind::Info,
            event_data! {
                "count" => plan.len(),
                "complexity" => plan.complexity_score,
                "estimated_sources" => plan.estimated_sources,
                "fallback" => plan.fallback,
            },
        );
        info!(
            subtasks = plan.len(),
            complexity = plan.complexity_score,
            fallback = plan.fallback,
            "Research plan ready"
        );
    }

    async fn dispatch_concurrent(
        &self,
        plan: &ResearchPlan,
        limit: usize,
        log: &Arc<ActivityLog>,
    ) -> Result<Vec<SubtaskResult>> {
        let mut set = JoinSet::new();
        for subtask in plan.subtasks.iter().cloned() {
            set.spawn(run_subtask(
                self.worker.clone(),
                Arc::clone(log),
                subtask,
                limit,
            ));
        }

        let mut results = Vec::with_capacity(plan.len());
        while let Some(joined) = set.join_next().await {
            let outcome = joined
                .map_err(|e| AppError::Internal(format!("Subagent task failed: {}", e)))
                .and_then(std::convert::identity);
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    // Siblings must be gone before the caller fails the log.
                    set.shutdown().await;
                    return Err(e);
                }
            }
        }

        results.sort_by_key(|r| r.subtask);
        Ok(results)
    }

    async fn dispatch_sequential(
        &self,
        plan: &ResearchPlan,
        limit: usize,
        log: &Arc<ActivityLog>,
    ) -> Result<Vec<SubtaskResult>> {
        let mut results = Vec::with_capacity(plan.len());
        for subtask in plan.subtasks.iter().cloned() {
            results.push(run_subtask(self.worker.clone(), Arc::clone(log), subtask, limit).await?);
        }
        Ok(results)
    }
}

async fn run_subtask(
    worker: WorkerDispatch,
    log: Arc<ActivityLog>,
    subtask: PlannedSubtask,
    limit: usize,
) -> Result<SubtaskResult> {
    let id = subtask.id;
    log.update_subagent(
        id,
        event_data! {
            "status" => "started",
            "search_focus" => &subtask.focus,
            "rationale" => &subtask.rationale,
            "requested" => limit,
        },
    );
    log.log(
        format!("Subagent {} researching: {}", id, subtask.focus),
        EventKind::Progress,
        event_data! { "subtask" => id },
    );

    let result = match worker.execute(&log, id, &subtask.focus, limit).await {
        Ok(result) => result,
        Err(e) => {
            log.update_subagent(id, event_data! { "status" => "failed" });
            return Err(e);
        }
    };

    let count = result.source_count();
    log.update_subagent(
        id,
        event_data! { "status" => "completed", "sources" => count },
    );
    log.add_sources(i64::try_from(count).unwrap_or(i64::MAX));
    log.log(
        format!("Subagent {} found {} sources", id, count),
        EventKind::Progress,
        event_data! { "subtask" => id, "sources" => count },
    );

    Ok(result)
}
