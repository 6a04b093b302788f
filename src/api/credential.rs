use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::ArrivaError;
use crate::server::state::AppState;

/// POST /ephemeral-key - Issue a short-lived realtime credential.
///
/// The provider body is returned under `data` with the provider status.
/// Any failure becomes a generic 500; provider detail only reaches the log.
pub async fn handler(State(state): State<AppState>) -> Response {
    match state.upstream.issue_credential().await {
        Ok(upstream) => {
            let body = serde_json::json!({ "data": upstream.body });
            (upstream.status, Json(body)).into_response()
        }
        Err(e @ ArrivaError::MissingApiKey(_)) => e.into_response(),
        Err(e) => {
            tracing::error!(upstream = state.upstream.name(), "Error fetching ephemeral key: {e}");
            match e {
                ArrivaError::Upstream { .. } => e.into_response(),
                other => ArrivaError::upstream("ephemeral key", other.to_string()).into_response(),
            }
        }
    }
}
