use crate::{
    AppState,
    activity::{ActivitySnapshot, event_stream},
    types::{ActivityQuery, AppError, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use tracing::{debug, warn};

/// Snapshot of a session's activity
///
/// Without `session_id` the shared fallback log is returned.
#[utoipa::path(
    get,
    path = "/api/activity",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Current activity", body = ActivitySnapshot)
    ),
    tag = "activity"
)]
pub async fn get_activity(
    State(state): State<AppState>,
    Query(params): Query<ActivityQuery>,
) -> Json<ActivitySnapshot> {
    Json(state.sessions.snapshot(params.session_id.as_deref()))
}

/// Stream a session's events as server-sent events
#[utoipa::path(
    get,
    path = "/api/activity/stream/{session_id}",
    params(("session_id" = String, Path, description = "Session to follow")),
    responses(
        (status = 200, description = "text/event-stream of activity events"),
        (status = 404, description = "Unknown session")
    ),
    tag = "activity"
)]
pub async fn activity_stream(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    if !state.sessions.contains(&session_id) {
        return Err(AppError::NotFound(format!(
            "Session '{}' not found",
            session_id
        )));
    }

    debug!(%session_id, "Activity stream opened");
    let log = state.sessions.get(Some(&session_id));
    let settings = state.config_manager.config().activity.stream_settings();

    let stream = event_stream(log, settings).filter_map(|event| async move {
        match Event::default().json_data(&event) {
            Ok(sse) => Some(Ok(sse)),
            Err(e) => {
                warn!(error = %e, "Dropping unserializable activity event");
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
