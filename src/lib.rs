//! # Multiscout - Multi-Agent Web Research Server
//!
//! Multiscout answers a research question by splitting it into focused
//! sub-queries, searching each one with its own subagent, and synthesizing
//! the collected sources into a single report. Every run records its
//! progress in a session-scoped activity log that clients can poll or
//! stream while the run is in flight.
//!
//! ## Overview
//!
//! Multiscout can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `multiscout-server` binary
//! 2. **As a library** - Drive [`ResearchCoordinator`] from your own code
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use multiscout::{ActivitySessionRegistry, MultiscoutConfig, ResearchCoordinator};
//! use multiscout::research::RunOptions;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MultiscoutConfig::load("multiscout.toml")?;
//!     let coordinator = ResearchCoordinator::from_config(&config)?;
//!     let sessions = ActivitySessionRegistry::new();
//!
//!     let query = "How do solid state batteries work?";
//!     let session_id = sessions.create_session(query);
//!     let result = coordinator
//!         .run_in_session(&sessions, &session_id, query, RunOptions {
//!             results_per_agent: 2,
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     println!("{}", result.synthesis);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `swagger-ui` | Serve interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`activity`] - Session-scoped activity logs and event streaming
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - API key middleware
//! - [`cli`] - Command-line parsing and terminal output
//! - [`llm`] - OpenAI-compatible LLM client
//! - [`research`] - Planning, subagent dispatch and synthesis
//! - [`search`] - Exa and DuckDuckGo search providers
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration with hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Per-session activity tracking.
pub mod activity;
/// HTTP API handlers and routes.
pub mod api;
/// API key authentication.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Multi-agent research coordination.
pub mod research;
/// Web search providers.
pub mod search;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use activity::{ActivityLog, ActivitySessionRegistry, ActivitySnapshot};
pub use llm::{LLMClient, OpenAICompatClient};
pub use research::{ResearchCoordinator, RunOptions};
pub use search::SearchProvider;
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, MultiscoutConfig};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Activity logs keyed by session id
    pub sessions: Arc<ActivitySessionRegistry>,
    /// Research pipeline shared by all requests
    pub coordinator: Arc<ResearchCoordinator>,
}

impl AppState {
    pub fn new(config_manager: Arc<ConfigManager>, coordinator: ResearchCoordinator) -> Self {
        Self {
            config_manager,
            sessions: Arc::new(ActivitySessionRegistry::new()),
            coordinator: Arc::new(coordinator),
        }
    }

    /// Build state with providers created from the current configuration.
    pub fn from_config(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let coordinator = ResearchCoordinator::from_config(&config_manager.config())?;
        Ok(Self::new(config_manager, coordinator))
    }
}
