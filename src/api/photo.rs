use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::ArrivaError;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    pub photo_reference: Option<String>,
    pub maxwidth: Option<String>,
}

/// GET /place-photo - Stream a place photo without exposing the API key.
pub async fn handler(State(state): State<AppState>, Query(query): Query<PhotoQuery>) -> Response {
    let Some(photo_reference) = query.photo_reference.filter(|r| !r.is_empty()) else {
        return ArrivaError::Validation("Missing 'photo_reference'".into()).into_response();
    };

    let max_width = match query.maxwidth.as_deref().filter(|w| !w.is_empty()) {
        None => state.config.default_photo_max_width,
        Some(raw) => match raw.parse::<u32>() {
            Ok(w) if w > 0 => w,
            _ => {
                return ArrivaError::Validation(format!("Invalid 'maxwidth': {raw}"))
                    .into_response()
            }
        },
    };

    match state.upstream.fetch_photo(&photo_reference, max_width).await {
        Ok(photo) => {
            let mut response = Body::from_stream(photo.body).into_response();
            if let Some(content_type) = photo.content_type {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type);
            }
            response
        }
        Err(e) => {
            tracing::error!(upstream = state.upstream.name(), "Error fetching photo: {e}");
            e.into_response()
        }
    }
}
