#![allow(dead_code)]

pub mod mocks;

use mocks::{MockLLMClient, MockSearch};
use multiscout::research::{
    CoordinatorSettings, Planner, ResearchCoordinator, StaticPlanner, WorkerDispatch,
};
use std::sync::Arc;

/// Coordinator wired to mocks, using the fixed default plan.
pub fn coordinator_with(
    search: Arc<MockSearch>,
    synthesizer: Arc<MockLLMClient>,
    parallel: bool,
) -> ResearchCoordinator {
    coordinator_with_planner(Arc::new(StaticPlanner), search, synthesizer, parallel)
}

pub fn coordinator_with_planner(
    planner: Arc<dyn Planner>,
    search: Arc<MockSearch>,
    synthesizer: Arc<MockLLMClient>,
    parallel: bool,
) -> ResearchCoordinator {
    ResearchCoordinator::new(
        planner,
        WorkerDispatch::new(search),
        synthesizer,
        CoordinatorSettings {
            parallel_subagents: parallel,
            ..Default::default()
        },
    )
}
