use super::{SearchItem, SearchProvider};
use crate::types::{AppError, Result};
use crate::utils::toml_config::SearchConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exa search client (`POST /search` with page contents).
pub struct ExaSearch {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    max_characters: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    search_type: &'a str,
    num_results: usize,
    contents: ExaContents,
}

#[derive(Serialize)]
struct ExaContents {
    text: ExaTextOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaTextOptions {
    max_characters: usize,
}

#[derive(Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Deserialize)]
struct ExaResult {
    title: Option<String>,
    url: Option<String>,
    text: Option<String>,
}

impl ExaSearch {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::build(api_base.into(), api_key.into(), 1000, Duration::from_secs(60))
    }

    pub fn from_config(config: &SearchConfig, api_key: String) -> Result<Self> {
        Self::build(
            config.api_base.clone(),
            api_key,
            config.max_characters,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn build(
        api_base: String,
        api_key: String,
        max_characters: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            max_characters,
        })
    }
}

#[async_trait]
impl SearchProvider for ExaSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchItem>> {
        let request = ExaRequest {
            query,
            search_type: "auto",
            num_results: limit,
            contents: ExaContents {
                text: ExaTextOptions {
                    max_characters: self.max_characters,
                },
            },
        };

        let response = self
            .http
            .post(format!("{}/search", self.api_base))
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Exa request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!("Exa returned {}: {}", status, body)));
        }

        let parsed: ExaResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Invalid Exa response: {}", e)))?;

        Ok(parsed
            .results
            .into_iter()
            .take(limit)
            .map(|r| SearchItem {
                title: r.title.unwrap_or_default(),
                text: r.text.unwrap_or_default(),
                url: r.url.filter(|u| !u.is_empty()),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "exa"
    }
}
