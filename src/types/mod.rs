use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// Body of `POST /api/research` and `POST /api/research/start`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchRequest {
    /// Research question or topic (3-500 characters)
    pub query: String,
    /// Search results requested per subagent (1-5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_results_per_agent: Option<usize>,
    /// Fixed number of subagents (2-6); planned dynamically when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fanout: Option<usize>,
    /// Model identifier from `/api/models`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResearchResponse {
    pub query: String,
    pub subagents: usize,
    pub total_sources: u64,
    pub synthesis: String,
    pub session_id: String,
    pub subagent_results: Vec<SubtaskResult>,
    pub complexity_analysis: ComplexityAnalysis,
    pub model: String,
    pub duration_ms: u64,
}

impl ResearchResponse {
    pub fn from_result(result: ResearchResult, session_id: String, duration_ms: u64) -> Self {
        Self {
            query: result.query,
            subagents: result.subtask_results.len(),
            total_sources: result.total_sources,
            synthesis: result.synthesis,
            session_id,
            subagent_results: result.subtask_results,
            complexity_analysis: result.analysis,
            model: result.model,
            duration_ms,
        }
    }
}

/// Response of `POST /api/research/start`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResearchStarted {
    pub session_id: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub search_provider: String,
    pub default_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub provider: String,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default_model: String,
}

// ============= Research Types =============

/// One normalized search hit kept by a subagent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Source {
    pub title: String,
    pub content: String,
    pub url: Option<String>,
}

/// What a single subagent produced for its search focus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubtaskResult {
    pub subtask: u32,
    pub search_focus: String,
    pub sources: Vec<Source>,
}

impl SubtaskResult {
    pub fn source_count(&self) -> u64 {
        self.sources.len() as u64
    }
}

/// Summary of how the query was decomposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComplexityAnalysis {
    pub complexity_score: u8,
    pub num_subagents: usize,
    pub explanation: String,
    pub estimated_sources: u32,
    /// True when the default plan replaced the planner's answer
    pub fallback: bool,
}

/// Output of one complete research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResult {
    pub query: String,
    pub subtask_results: Vec<SubtaskResult>,
    pub total_sources: u64,
    pub synthesis: String,
    pub analysis: ComplexityAnalysis,
    pub model: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match self {
            AppError::LLM(msg) | AppError::Search(msg) => {
                tracing::error!("Provider failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Research operation failed. Please try again later.".to_string(),
                )
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Config(msg) | AppError::Internal(msg) => {
                tracing::error!("Internal failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
