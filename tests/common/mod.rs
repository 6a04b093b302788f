//! In-process upstream fake shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arriva::config::RelayConfig;
use arriva::error::{ArrivaError, Result};
use arriva::server::state::AppState;
use arriva::upstream::{NearbySearchQuery, PhotoStream, Upstream, UpstreamJson};
use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode};
use bytes::Bytes;
use futures::StreamExt;
use serde_json::{json, Value};

pub const TOKEN: &str = "shared-test-token";
pub const EPHEMERAL_SECRET: &str = "ek_live_secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    Issue,
    ProviderDown,
    MissingKey,
}

pub struct FakeUpstream {
    pub credential_mode: CredentialMode,
    pub search_status: StatusCode,
    pub search_body: Value,
    pub photo_status: StatusCode,
    pub credential_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub photo_calls: AtomicUsize,
    pub searches: Mutex<Vec<NearbySearchQuery>>,
    pub photos: Mutex<Vec<(String, u32)>>,
}

impl Default for FakeUpstream {
    fn default() -> Self {
        Self {
            credential_mode: CredentialMode::Issue,
            search_status: StatusCode::OK,
            search_body: json!({
                "status": "OK",
                "results": [
                    {"name": "Trattoria Milanese", "photos": [{"photo_reference": "PHOTO_1"}]},
                    {"name": "Osteria del Binari"}
                ]
            }),
            photo_status: StatusCode::OK,
            credential_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            photo_calls: AtomicUsize::new(0),
            searches: Mutex::new(Vec::new()),
            photos: Mutex::new(Vec::new()),
        }
    }
}

impl FakeUpstream {
    pub fn total_calls(&self) -> usize {
        self.credential_calls.load(Ordering::SeqCst)
            + self.search_calls.load(Ordering::SeqCst)
            + self.photo_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn issue_credential(&self) -> Result<UpstreamJson> {
        self.credential_calls.fetch_add(1, Ordering::SeqCst);
        match self.credential_mode {
            CredentialMode::Issue => Ok(UpstreamJson {
                status: StatusCode::OK,
                body: json!({
                    "value": EPHEMERAL_SECRET,
                    "expires_at": 4_102_444_800_i64,
                    "session": {"type": "realtime", "model": "gpt-realtime"}
                }),
            }),
            CredentialMode::ProviderDown => Err(ArrivaError::upstream(
                "ephemeral key",
                "provider responded 503 Service Unavailable",
            )),
            CredentialMode::MissingKey => Err(ArrivaError::MissingApiKey("OpenAI")),
        }
    }

    async fn search_places(&self, query: &NearbySearchQuery) -> Result<UpstreamJson> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.searches.lock().unwrap().push(query.clone());
        Ok(UpstreamJson {
            status: self.search_status,
            body: self.search_body.clone(),
        })
    }

    async fn fetch_photo(&self, photo_reference: &str, max_width: u32) -> Result<PhotoStream> {
        self.photo_calls.fetch_add(1, Ordering::SeqCst);
        self.photos
            .lock()
            .unwrap()
            .push((photo_reference.to_string(), max_width));

        if !self.photo_status.is_success() {
            return Err(ArrivaError::UpstreamStatus {
                status: self.photo_status,
                text: self.photo_status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let chunks = vec![
            Ok(Bytes::from_static(b"\xff\xd8jpeg-")),
            Ok(Bytes::from_static(b"bytes")),
        ];
        Ok(PhotoStream {
            content_type: Some(HeaderValue::from_static("image/jpeg")),
            body: futures::stream::iter(chunks).boxed(),
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn test_config() -> RelayConfig {
    RelayConfig {
        auth_token: Some(TOKEN.to_string()),
        ..Default::default()
    }
}

pub fn test_state(upstream: Arc<FakeUpstream>, config: RelayConfig) -> AppState {
    AppState::new(upstream, Arc::new(config))
}
