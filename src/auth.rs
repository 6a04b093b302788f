//! Shared-token gate for every relay route
//!
//! A request is authorized when it carries the configured shared token either
//! in the JSON body at `data.token` or in the `token` query parameter. The
//! body wins when both are present. Anything else is answered with 401 and
//! never reaches a handler.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use http_body_util::LengthLimitError;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use subtle::ConstantTimeEq;

use crate::error::ArrivaError;
use crate::server::state::AppState;

/// Pull the client token out of a request body and/or query string.
///
/// Non-JSON bodies and empty tokens count as absent.
pub fn extract_token(body: &[u8], query: Option<&str>) -> Option<String> {
    let from_body = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("data")?.get("token")?.as_str().map(str::to_owned))
        .filter(|t| !t.is_empty());

    from_body.or_else(|| {
        let query = query?;
        url_form_pairs(query)
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v)
            .filter(|t| !t.is_empty())
    })
}

fn url_form_pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    reqwest::Url::parse(&format!("http://relay.invalid/?{query}"))
        .map(|url| url.query_pairs().into_owned().collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
}

/// Exact equality against the configured token. No configured token means
/// nothing matches.
pub fn token_matches(expected: Option<&str>, given: Option<&str>) -> bool {
    match (expected, given) {
        (Some(expected), Some(given)) if !expected.is_empty() => {
            expected.as_bytes().ct_eq(given.as_bytes()).into()
        }
        _ => false,
    }
}

/// axum middleware enforcing the shared token.
pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.config.max_body_bytes).await {
        Ok(b) => b,
        Err(e) => {
            let source = e.into_inner();
            if source.is::<LengthLimitError>() {
                tracing::warn!(
                    path = %parts.uri.path(),
                    limit = state.config.max_body_bytes,
                    "Request body too large"
                );
                return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
            }
            tracing::warn!(path = %parts.uri.path(), "Failed to read request body: {source}");
            return ArrivaError::Unauthorized.into_response();
        }
    };

    let token = extract_token(&bytes, parts.uri.query());
    if !token_matches(state.config.auth_token.as_deref(), token.as_deref()) {
        tracing::warn!(
            path = %parts.uri.path(),
            token_present = token.is_some(),
            "Unauthorized request: Missing or invalid token"
        );
        return ArrivaError::Unauthorized.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
