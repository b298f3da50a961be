//! Web search providers
//!
//! Subagents gather material through the [`SearchProvider`] trait. Two
//! providers ship with the crate:
//!
//! - [`exa::ExaSearch`] - Exa's search API, returning page text per result
//! - [`web::WebSearch`] - DuckDuckGo via daedra; needs no API key, but only
//!   returns result snippets
//!
//! Provider failures are returned as [`AppError::Search`](crate::types::AppError::Search)
//! and are never retried here.

/// Exa search API client.
pub mod exa;
/// DuckDuckGo search through daedra.
pub mod web;

use crate::types::{AppError, Result};
use crate::utils::toml_config::{SearchConfig, SearchProviderKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use exa::ExaSearch;
pub use web::WebSearch;

/// One raw search hit, before subagent filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    /// Page text or snippet; may be empty
    pub text: String,
    pub url: Option<String>,
}

impl SearchItem {
    pub fn new(title: impl Into<String>, text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            url,
        }
    }
}

/// Source of search results for a focused query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return at most `limit` results for `query`, best first
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchItem>>;

    /// Short provider name for logs and health output
    fn name(&self) -> &str;
}

/// Build the provider selected in the `[search]` section.
pub fn create_provider(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>> {
    match config.provider {
        SearchProviderKind::Exa => {
            let api_key = std::env::var(&config.api_key_env)
                .ok()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "Exa search selected but {} is not set",
                        config.api_key_env
                    ))
                })?;
            Ok(Arc::new(ExaSearch::from_config(config, api_key)?))
        }
        SearchProviderKind::Web => Ok(Arc::new(WebSearch::new())),
    }
}
