use action_core::types::Event;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// POST /events: deliver one event to the hub and answer with the first
/// handler reply, or 204 when no subscriber replied.
pub async fn publish_event(
    State(app): State<AppState>,
    Json(event): Json<Event>,
) -> Result<Response, AppError> {
    tracing::debug!(event = %event.id, topic = %event.topic, "event received");
    let hub = app.hub.clone();
    // Handlers block on the remote directory.
    let reply = tokio::task::spawn_blocking(move || hub.publish(&event)).await?;

    Ok(match reply {
        Some(value) => Json(value).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
