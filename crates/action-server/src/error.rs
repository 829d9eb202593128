use action_core::ActionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<ActionError>() {
            Some(ActionError::InvalidSubscription { .. })
            | Some(ActionError::MalformedEvent { .. }) => StatusCode::BAD_REQUEST,
            Some(ActionError::Remote(_)) => StatusCode::BAD_GATEWAY,
            Some(ActionError::Config(_))
            | Some(ActionError::Io(_))
            | Some(ActionError::Yaml(_))
            | None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
