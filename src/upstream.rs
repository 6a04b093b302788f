//! Upstream providers behind the relay
//!
//! The relay talks to two providers: the conversational-AI provider (for
//! ephemeral realtime credentials) and the places provider (nearby search
//! and photos). Handlers only see the [`Upstream`] trait, so tests and
//! alternative deployments can swap the HTTP implementation out.

use std::fmt;

use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode};
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::{Map, Value};

use crate::config::RelayConfig;
use crate::error::{ArrivaError, Result};

/// Keys a client may forward to the nearby-search endpoint
pub const ALLOWED_SEARCH_PARAMS: &[&str] = &[
    "location", "keyword", "radius", "opennow", "type", "name", "language", "rankby", "minprice",
    "maxprice", "pagetoken",
];

/// JSON body plus status relayed from a provider
#[derive(Debug, Clone)]
pub struct UpstreamJson {
    pub status: StatusCode,
    pub body: Value,
}

/// Streaming image body relayed from the photo endpoint
pub struct PhotoStream {
    pub content_type: Option<HeaderValue>,
    pub body: BoxStream<'static, std::result::Result<Bytes, reqwest::Error>>,
}

impl fmt::Debug for PhotoStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoStream")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Validated query for the nearby-search endpoint.
///
/// Built at the relay boundary from client-supplied parameters. Only keys in
/// [`ALLOWED_SEARCH_PARAMS`] pass (`openNow` is accepted as an alias of
/// `opennow`), values must be scalars, and the open-now flag is only
/// forwarded when true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NearbySearchQuery {
    pairs: Vec<(String, String)>,
}

impl NearbySearchQuery {
    pub fn from_params(params: &Map<String, Value>) -> Result<Self> {
        let mut pairs = Vec::with_capacity(params.len());
        for (key, value) in params {
            let canonical = if key == "openNow" { "opennow" } else { key.as_str() };
            if !ALLOWED_SEARCH_PARAMS.contains(&canonical) {
                return Err(ArrivaError::Validation(format!(
                    "Unsupported search parameter '{key}'"
                )));
            }

            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Number(n) => render_number(n),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ArrivaError::Validation(format!(
                        "Search parameter '{key}' must be a scalar"
                    )));
                }
            };

            if canonical == "opennow" {
                // The places API treats the mere presence of opennow as true
                if matches!(value, Value::Bool(true)) || rendered == "true" {
                    pairs.push(("opennow".to_string(), "true".to_string()));
                }
                continue;
            }
            pairs.push((canonical.to_string(), rendered));
        }
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Whole numbers go out without a fraction (`1000.0` as `1000`)
fn render_number(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

/// Provider access used by the relay handlers
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Request an ephemeral realtime credential
    async fn issue_credential(&self) -> Result<UpstreamJson>;

    /// Nearby places search; any provider status is relayed
    async fn search_places(&self, query: &NearbySearchQuery) -> Result<UpstreamJson>;

    /// Open a photo download without buffering it
    async fn fetch_photo(&self, photo_reference: &str, max_width: u32) -> Result<PhotoStream>;

    /// Upstream name for logs
    fn name(&self) -> &str;
}

/// [`Upstream`] backed by the real provider HTTP APIs
pub struct HttpUpstream {
    client: reqwest::Client,
    openai_api_key: Option<String>,
    places_api_key: Option<String>,
    openai_base_url: String,
    places_base_url: String,
    realtime_model: String,
}

impl HttpUpstream {
    pub fn new(config: &RelayConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &RelayConfig) -> Self {
        Self {
            client,
            openai_api_key: config.openai_api_key.clone().filter(|k| !k.is_empty()),
            places_api_key: config.places_api_key.clone().filter(|k| !k.is_empty()),
            openai_base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            places_base_url: config.places_base_url.trim_end_matches('/').to_string(),
            realtime_model: config.realtime_model.clone(),
        }
    }

    fn openai_key(&self) -> Result<&str> {
        self.openai_api_key.as_deref().ok_or_else(|| {
            tracing::error!("OpenAI API key not configured");
            ArrivaError::MissingApiKey("OpenAI")
        })
    }

    fn places_key(&self) -> Result<&str> {
        self.places_api_key.as_deref().ok_or_else(|| {
            tracing::error!("Places API key not configured");
            ArrivaError::MissingApiKey("Places")
        })
    }

    /// Credential issuance endpoint
    pub fn credential_url(&self) -> String {
        format!("{}/realtime/client_secrets", self.openai_base_url)
    }

    /// Request body asking for one realtime session of the configured model
    pub fn credential_request_body(&self) -> Value {
        serde_json::json!({
            "session": {
                "type": "realtime",
                "model": self.realtime_model,
            }
        })
    }

    /// Nearby search URL with the API key first, then the forwarded query
    pub fn search_url(&self, key: &str, query: &NearbySearchQuery) -> Result<reqwest::Url> {
        let mut url = parse_url(&format!("{}/nearbysearch/json", self.places_base_url))?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("key", key);
            for (k, v) in query.pairs() {
                q.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Photo URL for a reference and width
    pub fn photo_url(&self, key: &str, photo_reference: &str, max_width: u32) -> Result<reqwest::Url> {
        let mut url = parse_url(&format!("{}/photo", self.places_base_url))?;
        url.query_pairs_mut()
            .append_pair("photo_reference", photo_reference)
            .append_pair("maxwidth", &max_width.to_string())
            .append_pair("key", key);
        Ok(url)
    }
}

fn parse_url(raw: &str) -> Result<reqwest::Url> {
    reqwest::Url::parse(raw).map_err(|e| ArrivaError::Config(format!("Invalid URL {raw}: {e}")))
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn issue_credential(&self) -> Result<UpstreamJson> {
        let key = self.openai_key()?;
        let response = self
            .client
            .post(self.credential_url())
            .bearer_auth(key)
            .json(&self.credential_request_body())
            .send()
            .await
            .map_err(|e| ArrivaError::upstream("ephemeral key", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArrivaError::upstream(
                "ephemeral key",
                format!("provider responded {status}"),
            ));
        }
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| ArrivaError::upstream("ephemeral key", e.to_string()))?;
        Ok(UpstreamJson { status, body })
    }

    async fn search_places(&self, query: &NearbySearchQuery) -> Result<UpstreamJson> {
        let key = self.places_key()?;
        let url = self.search_url(key, query)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArrivaError::upstream("nearby places", e.to_string()))?;

        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| ArrivaError::upstream("nearby places", e.to_string()))?;
        Ok(UpstreamJson { status, body })
    }

    async fn fetch_photo(&self, photo_reference: &str, max_width: u32) -> Result<PhotoStream> {
        let key = self.places_key()?;
        let url = self.photo_url(key, photo_reference, max_width)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArrivaError::UpstreamStatus {
                status,
                text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .cloned();
        Ok(PhotoStream {
            content_type,
            body: response.bytes_stream().boxed(),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
