//! HTTP upstream integration tests
//!
//! Runs a loopback stand-in for the AI and places providers and points
//! `HttpUpstream` at it, so the real request building, status handling and
//! photo streaming are exercised end to end through the relay router.

use std::sync::{Arc, Mutex};

use arriva::config::RelayConfig;
use arriva::error::ArrivaError;
use arriva::server::{router, state::AppState};
use arriva::upstream::{HttpUpstream, NearbySearchQuery, Upstream};
use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "relay-token";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

/// Requests seen by the stand-in provider: (path, query or body)
#[derive(Clone, Default)]
struct Provider {
    credential_status: Option<StatusCode>,
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl Provider {
    fn record(&self, path: &str, detail: impl Into<String>) {
        self.seen
            .lock()
            .unwrap()
            .push((path.to_string(), detail.into()));
    }

    fn seen(&self, path: &str) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, d)| d.clone())
            .collect()
    }
}

async fn client_secrets(
    State(provider): State<Provider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    provider.record("client_secrets", format!("{auth} {body}"));

    match provider.credential_status {
        Some(status) if !status.is_success() => (
            status,
            Json(json!({"error": {"message": "Invalid API key sk-provider-detail"}})),
        )
            .into_response(),
        _ => Json(json!({"value": "ek_loopback", "expires_at": 4_102_444_800_i64})).into_response(),
    }
}

async fn nearby(State(provider): State<Provider>, RawQuery(query): RawQuery) -> Response {
    provider.record("nearbysearch", query.unwrap_or_default());
    (
        StatusCode::OK,
        Json(json!({"status": "ZERO_RESULTS", "results": [], "html_attributions": []})),
    )
        .into_response()
}

async fn photo(State(provider): State<Provider>, RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    provider.record("photo", query.clone());
    if query.contains("photo_reference=GONE") {
        return (StatusCode::NOT_FOUND, "no such photo").into_response();
    }
    ([(header::CONTENT_TYPE, "image/png")], PNG).into_response()
}

async fn spawn_provider(provider: Provider) -> String {
    let app = Router::new()
        .route("/v1/realtime/client_secrets", post(client_secrets))
        .route("/place/nearbysearch/json", get(nearby))
        .route("/place/photo", get(photo))
        .with_state(provider);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

fn relay_config(provider_base: &str) -> RelayConfig {
    RelayConfig {
        auth_token: Some(TOKEN.to_string()),
        openai_api_key: Some("sk-test".to_string()),
        places_api_key: Some("pk-test".to_string()),
        openai_base_url: format!("{provider_base}/v1"),
        places_base_url: format!("{provider_base}/place"),
        ..Default::default()
    }
}

async fn relay(provider: Provider) -> Router {
    let base = spawn_provider(provider).await;
    let config = relay_config(&base);
    let upstream = Arc::new(HttpUpstream::new(&config));
    router::build(AppState::new(upstream, Arc::new(config)))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(resp: Response) -> bytes::Bytes {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap()
}

#[tokio::test]
async fn test_credential_issued_with_bearer_key() {
    let provider = Provider::default();
    let app = relay(provider.clone()).await;

    let resp = app
        .oneshot(post_json("/ephemeral-key", json!({"data": {"token": TOKEN}})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["data"]["value"], "ek_loopback");

    let seen = provider.seen("client_secrets");
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with("Bearer sk-test "));
    assert!(seen[0].contains(r#""model":"gpt-realtime""#));
    assert!(seen[0].contains(r#""type":"realtime""#));
}

#[tokio::test]
async fn test_credential_provider_rejection_is_generic_500() {
    let provider = Provider {
        credential_status: Some(StatusCode::FORBIDDEN),
        ..Default::default()
    };
    let app = relay(provider).await;

    let resp = app
        .oneshot(post_json("/ephemeral-key", json!({"data": {"token": TOKEN}})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_bytes(resp).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({"error": "Failed to fetch ephemeral key"}));
    assert!(!String::from_utf8_lossy(&body).contains("sk-provider-detail"));
}

#[tokio::test]
async fn test_credential_rejection_error_variant() {
    let provider = Provider {
        credential_status: Some(StatusCode::FORBIDDEN),
        ..Default::default()
    };
    let base = spawn_provider(provider).await;
    let upstream = HttpUpstream::new(&relay_config(&base));

    match upstream.issue_credential().await {
        Err(ArrivaError::Upstream { operation, reason }) => {
            assert_eq!(operation, "ephemeral key");
            assert!(reason.contains("403"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_nearby_search_relayed_verbatim() {
    let provider = Provider::default();
    let app = relay(provider.clone()).await;

    let resp = app
        .oneshot(post_json(
            "/nearby-places",
            json!({"data": {"token": TOKEN, "params": {
                "location": "45.4642,9.19",
                "keyword": "museum",
                "radius": 1000.0,
                "openNow": true
            }}}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(
        json["data"],
        json!({"status": "ZERO_RESULTS", "results": [], "html_attributions": []})
    );

    let seen = provider.seen("nearbysearch");
    assert_eq!(seen.len(), 1);
    let query = &seen[0];
    assert!(query.starts_with("key=pk-test&"));
    assert!(query.contains("keyword=museum"));
    assert!(query.contains("radius=1000&") || query.ends_with("radius=1000"));
    assert!(query.contains("opennow=true"));
    assert!(!query.contains("token"));
}

#[tokio::test]
async fn test_search_places_direct() {
    let provider = Provider::default();
    let base = spawn_provider(provider.clone()).await;
    let upstream = HttpUpstream::new(&relay_config(&base));

    let params = json!({"keyword": "cafe"});
    let query = NearbySearchQuery::from_params(params.as_object().unwrap()).unwrap();
    let result = upstream.search_places(&query).await.unwrap();

    assert_eq!(result.status, StatusCode::OK);
    assert_eq!(result.body["status"], "ZERO_RESULTS");
    assert_eq!(provider.seen("nearbysearch"), vec!["key=pk-test&keyword=cafe"]);
}

#[tokio::test]
async fn test_photo_streamed_with_content_type() {
    let provider = Provider::default();
    let app = relay(provider.clone()).await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri(format!("/place-photo?photo_reference=ABC&token={TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(&body_bytes(resp).await[..], PNG);

    let seen = provider.seen("photo");
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("photo_reference=ABC"));
    assert!(seen[0].contains("maxwidth=800"));
    assert!(seen[0].contains("key=pk-test"));
}

#[tokio::test]
async fn test_photo_provider_status_passthrough() {
    let provider = Provider::default();
    let app = relay(provider).await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri(format!("/place-photo?photo_reference=GONE&token={TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"Not Found");
}
