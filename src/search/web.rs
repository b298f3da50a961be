//! Web search implementation using daedra
//!
//! daedra queries DuckDuckGo. Results carry a short description rather than
//! page text; the description is used as the item's text.

use super::{SearchItem, SearchProvider};
use crate::types::{AppError, Result};
use async_trait::async_trait;

/// Key-less web search powered by daedra
pub struct WebSearch;

impl WebSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&daedra::SearchResult> for SearchItem {
    fn from(r: &daedra::SearchResult) -> Self {
        let url = r.url.trim();
        SearchItem {
            title: r.title.trim().to_string(),
            text: r.description.trim().to_string(),
            url: (!url.is_empty()).then(|| url.to_string()),
        }
    }
}

#[async_trait]
impl SearchProvider for WebSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchItem>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: limit,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("Web search failed: {}", e)))?;

        Ok(response.data.iter().take(limit).map(SearchItem::from).collect())
    }

    fn name(&self) -> &str {
        "web"
    }
}
