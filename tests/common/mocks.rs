//! Mock implementations for testing.
//!
//! This module provides mock LLM clients and search providers that can be
//! used across different test files without duplication.

use async_trait::async_trait;
use multiscout::llm::{CompletionOptions, LLMClient};
use multiscout::search::{SearchItem, SearchProvider};
use multiscout::types::{AppError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock LLM client with a canned response.
///
/// Every prompt and completion option it receives is recorded so tests can
/// inspect what the pipeline sent.
///
/// ```ignore
/// let client = MockLLMClient::new("SUMMARY: ...");
/// let client = MockLLMClient::failing();
/// ```
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    calls: Mutex<Vec<(String, CompletionOptions)>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Options received so far, in call order.
    pub fn options(&self) -> Vec<CompletionOptions> {
        self.calls.lock().iter().map(|(_, o)| o.clone()).collect()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        self.calls
            .lock()
            .push((prompt.to_string(), options.clone()));
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock search provider producing deterministic results per query.
///
/// Each call returns `limit` items whose text mentions the query.
pub struct MockSearch {
    delay: Option<Duration>,
    should_fail: bool,
    short_first: bool,
    calls: AtomicUsize,
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearch {
    pub fn new() -> Self {
        Self {
            delay: None,
            should_fail: false,
            short_first: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering, so concurrent dispatch actually overlaps.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    /// Create a provider that always returns a search error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    /// Make the first item of every answer a snippet too short to keep.
    pub fn with_short_snippet() -> Self {
        Self {
            short_first: true,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(AppError::Search("Mock search failure".to_string()));
        }

        let real = if self.short_first {
            limit.saturating_sub(1)
        } else {
            limit
        };
        let mut items: Vec<SearchItem> = (0..real)
            .map(|i| {
                SearchItem::new(
                    format!("{} result {}", query, i + 1),
                    format!(
                        "A detailed article about {} covering point number {}.",
                        query,
                        i + 1
                    ),
                    Some(format!("https://example.com/{}/{}", query.len(), i)),
                )
            })
            .collect();
        if self.short_first && limit > 0 {
            items.insert(0, SearchItem::new("Stub", "too short", None));
        }
        Ok(items)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
