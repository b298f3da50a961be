use crate::{
    AppState,
    research::RunOptions,
    types::{AppError, ResearchRequest, ResearchResponse, ResearchStarted, Result},
    utils::toml_config::MultiscoutConfig,
};
use axum::{Json, extract::State, http::StatusCode};
use std::time::Instant;
use tracing::{error, info};

pub const MIN_QUERY_CHARS: usize = 3;
pub const MAX_QUERY_CHARS: usize = 500;
pub const MAX_RESULTS_PER_AGENT: usize = 5;

/// Check a request against the input limits and the configured models.
///
/// Returns the trimmed query and the options for the run.
pub fn validate_request(
    request: ResearchRequest,
    config: &MultiscoutConfig,
) -> Result<(String, RunOptions)> {
    let query = request.query.trim();
    let length = query.chars().count();
    if length < MIN_QUERY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Query must be at least {} characters",
            MIN_QUERY_CHARS
        )));
    }
    if length > MAX_QUERY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }

    let results_per_agent = request
        .num_results_per_agent
        .unwrap_or(config.research.default_results_per_agent);
    if !(1..=MAX_RESULTS_PER_AGENT).contains(&results_per_agent) {
        return Err(AppError::InvalidInput(format!(
            "num_results_per_agent must be between 1 and {}",
            MAX_RESULTS_PER_AGENT
        )));
    }

    if let Some(fanout) = request.fanout
        && !(2..=6).contains(&fanout)
    {
        return Err(AppError::InvalidInput(
            "fanout must be between 2 and 6".to_string(),
        ));
    }

    if let Some(model) = &request.model
        && config.find_model(model).is_none()
    {
        return Err(AppError::InvalidInput(format!("Unknown model '{}'", model)));
    }

    Ok((
        query.to_string(),
        RunOptions {
            fanout: request.fanout,
            results_per_agent,
            model: request.model,
        },
    ))
}

/// Run multi-agent research and wait for the report
#[utoipa::path(
    post,
    path = "/api/research",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Research completed", body = ResearchResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Provider failure"),
        (status = 504, description = "Run timed out")
    ),
    tag = "research",
    security(("api_key" = []))
)]
pub async fn deep_research(
    State(state): State<AppState>,
    Json(payload): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>> {
    let (query, options) = validate_request(payload, &state.config_manager.config())?;
    let start = Instant::now();

    let session_id = state.sessions.create_session(&query);
    info!(%session_id, "Research session created");

    let result = state
        .coordinator
        .run_in_session(&state.sessions, &session_id, &query, options)
        .await?;

    Ok(Json(ResearchResponse::from_result(
        result,
        session_id,
        start.elapsed().as_millis() as u64,
    )))
}

/// Start research in the background and return its session id
#[utoipa::path(
    post,
    path = "/api/research/start",
    request_body = ResearchRequest,
    responses(
        (status = 202, description = "Research started", body = ResearchStarted),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid API key")
    ),
    tag = "research",
    security(("api_key" = []))
)]
pub async fn start_research(
    State(state): State<AppState>,
    Json(payload): Json<ResearchRequest>,
) -> Result<(StatusCode, Json<ResearchStarted>)> {
    let (query, options) = validate_request(payload, &state.config_manager.config())?;

    let session_id = state.sessions.create_session(&query);
    info!(%session_id, "Background research session created");

    let task_session = session_id.clone();
    tokio::spawn(async move {
        if let Err(e) = state
            .coordinator
            .run_in_session(&state.sessions, &task_session, &query, options)
            .await
        {
            error!(session_id = %task_session, error = %e, "Background research failed");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(ResearchStarted { session_id })))
}
