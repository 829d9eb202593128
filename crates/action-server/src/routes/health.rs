use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::state::AppState;

/// GET /health
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "subscriptions": app.hub.subscriptions().len(),
        "uptime_secs": (Utc::now() - app.started_at).num_seconds(),
    }))
}
