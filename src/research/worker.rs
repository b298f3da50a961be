use crate::activity::{ActivityLog, EventKind};
use crate::event_data;
use crate::search::{SearchItem, SearchProvider};
use crate::types::{Result, Source, SubtaskResult};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_MIN_SOURCE_CHARS: usize = 30;
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 300;

/// Runs one subtask's search and turns raw hits into [`Source`]s.
#[derive(Clone)]
pub struct WorkerDispatch {
    search: Arc<dyn SearchProvider>,
    min_source_chars: usize,
    max_content_chars: usize,
}

impl WorkerDispatch {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            min_source_chars: DEFAULT_MIN_SOURCE_CHARS,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }

    pub fn with_limits(mut self, min_source_chars: usize, max_content_chars: usize) -> Self {
        self.min_source_chars = min_source_chars;
        self.max_content_chars = max_content_chars;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.search.name()
    }

    /// Keep an item only if its trimmed text is longer than the minimum;
    /// the stored content is cut to the first `max_content_chars` characters.
    pub fn normalize(&self, item: &SearchItem) -> Option<Source> {
        let text = item.text.trim();
        if text.chars().count() <= self.min_source_chars {
            return None;
        }

        Some(Source {
            title: item.title.clone(),
            content: text.chars().take(self.max_content_chars).collect(),
            url: item.url.clone(),
        })
    }

    /// Ask the provider for `limit` results and record each kept source
    /// in `log`. Search failures propagate unchanged.
    pub async fn execute(
        &self,
        log: &ActivityLog,
        subtask_id: u32,
        query: &str,
        limit: usize,
    ) -> Result<SubtaskResult> {
        let items = self.search.search(query, limit).await?;
        debug!(subtask_id, returned = items.len(), "Search returned");

        let mut sources = Vec::with_capacity(items.len());
        for item in &items {
            let Some(source) = self.normalize(item) else {
                continue;
            };
            log.log(
                format!("Source collected: {}", source.title),
                EventKind::Source,
                event_data! {
                    "subtask" => subtask_id,
                    "title" => &source.title,
                    "has_url" => source.url.is_some(),
                },
            );
            sources.push(source);
        }

        Ok(SubtaskResult {
            subtask: subtask_id,
            search_focus: query.to_string(),
            sources,
        })
    }
}
