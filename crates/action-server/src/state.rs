use action_core::EventHub;
use chrono::{DateTime, Utc};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: EventHub,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(hub: EventHub) -> Self {
        Self {
            hub,
            started_at: Utc::now(),
        }
    }
}
