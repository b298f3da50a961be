use crate::{
    AppState,
    types::{HealthResponse, ModelsResponse},
};
use axum::{Json, extract::State};

/// Service liveness and provider summary
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        search_provider: state.coordinator.search_provider().to_string(),
        default_model: state.config_manager.config().llm.default_model.clone(),
    })
}

/// Models available for per-request selection
#[utoipa::path(
    get,
    path = "/api/models",
    responses((status = 200, description = "Configured models", body = ModelsResponse)),
    tag = "health"
)]
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let config = state.config_manager.config();
    Json(ModelsResponse {
        models: config.model_infos(),
        default_model: config.llm.default_model.clone(),
    })
}
