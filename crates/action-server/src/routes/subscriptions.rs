use action_core::hub::SubscriptionInfo;
use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /subscriptions: active subscriptions in registration order.
pub async fn list_subscriptions(State(app): State<AppState>) -> Json<Vec<SubscriptionInfo>> {
    Json(app.hub.subscriptions())
}
