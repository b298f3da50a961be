use crate::AppState;
use crate::api::handlers::{activity, health, research};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/models", get(health::list_models))
        .route("/activity", get(activity::get_activity))
        .route(
            "/activity/stream/{session_id}",
            get(activity::activity_stream),
        );

    let protected_routes = Router::new()
        .route("/research", post(research::deep_research))
        .route("/research/start", post(research::start_research))
        .layer(middleware::from_fn_with_state(
            state,
            crate::auth::middleware::api_key_middleware,
        ));

    public_routes.merge(protected_routes)
}

/// Full application: the API under `/api`, request tracing, and the
/// Swagger UI when the `swagger-ui` feature is enabled.
pub fn app(state: AppState) -> Router {
    let router = Router::new().nest("/api", create_router(state.clone()));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", crate::api::ApiDoc::openapi()),
        )
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
