//! Multi-Agent Research Coordination
//!
//! A research run splits one question into several search focuses, hands
//! each focus to a subagent, and synthesizes the collected sources into a
//! single report.
//!
//! # Architecture
//!
//! - [`planner::Planner`] - Decomposes the query into 2-6 subtasks
//! - [`worker::WorkerDispatch`] - Runs one subtask's search and filters hits
//! - [`coordinator::ResearchCoordinator`] - Drives the run and reports progress
//!   to an [`ActivityLog`](crate::activity::ActivityLog)
//!
//! # Usage
//!
//! ```ignore
//! use multiscout::research::{ResearchCoordinator, RunOptions};
//!
//! let session_id = registry.create_session(query);
//! let result = coordinator
//!     .run_in_session(&registry, &session_id, query, RunOptions {
//!         fanout: Some(4),
//!         results_per_agent: 2,
//!         model: None,
//!     })
//!     .await?;
//!
//! println!("{}", result.synthesis);
//! ```
//!
//! # Research Workflow
//!
//! 1. **Planning** - Analyse complexity and choose distinct search focuses
//! 2. **Executing** - Subagents search concurrently (or one by one)
//! 3. **Aggregation** - Results are ordered by subtask id and counted
//! 4. **Synthesizing** - One LLM call combines the findings
//!
//! Each step moves the session status forward; any failure ends the session
//! in `error`.

/// Run orchestration and the research state machine.
pub mod coordinator;
/// Query decomposition.
pub mod planner;
/// Prompt templates.
pub mod prompts;
/// Single-subtask search execution.
pub mod worker;

pub use coordinator::{CoordinatorSettings, ResearchCoordinator, RunOptions};
pub use planner::{LlmPlanner, PlannedSubtask, Planner, ResearchPlan, StaticPlanner};
pub use worker::WorkerDispatch;
