//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Research (`/api/research`)
//! - `POST /api/research` - Run research and wait for the report
//! - `POST /api/research/start` - Start research in the background, returns a session id
//!
//! ## Activity (`/api/activity`)
//! - `GET /api/activity?session_id=` - Snapshot of a session's progress
//! - `GET /api/activity/stream/{session_id}` - Server-sent events for a session
//!
//! ## Health (`/api/health`, `/api/models`)
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/models` - Models selectable per request
//!
//! # Authentication
//!
//! Research endpoints require the `X-API-Key` header when an API key is
//! configured (see [`auth`](crate::auth)).
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

/// OpenAPI document for the HTTP API.
#[derive(OpenApi)]
#[openapi(
    info(title = "Multiscout API", description = "Multi-agent web research"),
    paths(
        handlers::research::deep_research,
        handlers::research::start_research,
        handlers::activity::get_activity,
        handlers::activity::activity_stream,
        handlers::health::health,
        handlers::health::list_models,
    ),
    components(schemas(
        crate::types::ResearchRequest,
        crate::types::ResearchResponse,
        crate::types::ResearchStarted,
        crate::types::SubtaskResult,
        crate::types::Source,
        crate::types::ComplexityAnalysis,
        crate::types::HealthResponse,
        crate::types::ModelInfo,
        crate::types::ModelsResponse,
        crate::activity::ActivitySnapshot,
        crate::activity::ActivityEvent,
        crate::activity::EventKind,
        crate::activity::ResearchStatus,
    )),
    modifiers(&ApiKeyAddon),
    tags(
        (name = "research", description = "Research runs"),
        (name = "activity", description = "Session progress"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

struct ApiKeyAddon;

impl Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}
