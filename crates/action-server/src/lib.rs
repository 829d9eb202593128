pub mod error;
pub mod routes;
pub mod state;

use action_core::EventHub;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

/// Build the axum Router for the hub transport.
/// Used by `serve()` and available for integration testing.
pub fn build_router(hub: EventHub) -> Router {
    let app_state = state::AppState::new(hub);

    Router::new()
        .route("/events", post(routes::events::publish_event))
        .route(
            "/subscriptions",
            get(routes::subscriptions::list_subscriptions),
        )
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Service hub events on `addr` until the process is interrupted.
pub async fn serve(hub: EventHub, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(hub, listener).await
}

/// Like `serve`, on a listener the caller already bound (e.g. port 0).
pub async fn serve_on(hub: EventHub, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let app = build_router(hub);

    tracing::info!("waiting for hub events on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("hub transport stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
