use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ArrivaError;
use crate::server::state::AppState;
use crate::upstream::NearbySearchQuery;

/// Callable-style request envelope: `{"data": {"params": {...}, "token": "..."}}`
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub data: SearchData,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchData {
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// POST /nearby-places - Forward an allow-listed nearby search.
pub async fn handler(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
    // The gate already accepted the body; an empty or odd body means no params
    let request: SearchRequest = serde_json::from_slice(&body).unwrap_or_default();

    let query = match NearbySearchQuery::from_params(&request.data.params) {
        Ok(q) => q,
        Err(e) => {
            tracing::warn!("Rejected nearby search: {e}");
            return e.into_response();
        }
    };

    match state.upstream.search_places(&query).await {
        Ok(upstream) => {
            let body = serde_json::json!({ "data": upstream.body });
            (upstream.status, Json(body)).into_response()
        }
        Err(e @ ArrivaError::MissingApiKey(_)) => e.into_response(),
        Err(e) => {
            tracing::error!(upstream = state.upstream.name(), "Error fetching nearby places: {e}");
            ArrivaError::upstream("nearby places", e.to_string()).into_response()
        }
    }
}
