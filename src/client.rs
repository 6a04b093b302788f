//! HTTP client for the relay, as used by the voice front end
//!
//! Every call wraps its payload in the callable envelope
//! `{"data": {..., "token": "<shared token>"}}` and unwraps the relay's
//! `{"data": ...}` response.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{ArrivaError, Result};
use crate::photo::PhotoLinker;
use crate::session::{CredentialIssuer, EphemeralKey};
use crate::tools::{NearbySearchParams, PlacesSearch};

/// Client for a running relay
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl RelayClient {
    /// `base_url` is the relay root, e.g. `http://127.0.0.1:5001`
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Photo link builder sharing this client's relay and token
    pub fn photo_linker(&self) -> Result<PhotoLinker> {
        PhotoLinker::new(&self.base_url, self.token.clone())
    }

    fn envelope(&self, mut data: Map<String, Value>) -> Value {
        if let Some(token) = &self.token {
            data.insert("token".to_string(), Value::String(token.clone()));
        }
        serde_json::json!({ "data": data })
    }

    async fn call(&self, path: &str, data: Map<String, Value>) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self.http.post(&url).json(&self.envelope(data)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::debug!(%url, %status, "Relay call failed");
            return Err(ArrivaError::UpstreamStatus { status, text });
        }

        let mut body: Value = resp.json().await?;
        Ok(body
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// Request a fresh realtime credential
    pub async fn ephemeral_key(&self) -> Result<EphemeralKey> {
        let data = self.call("ephemeral-key", Map::new()).await?;
        EphemeralKey::from_provider_json(&data)
    }

    /// Run a nearby search; returns the provider JSON
    pub async fn nearby_places(&self, params: &NearbySearchParams) -> Result<Value> {
        let mut data = Map::new();
        data.insert("params".to_string(), serde_json::to_value(params)?);
        self.call("nearby-places", data).await
    }
}

#[async_trait]
impl CredentialIssuer for RelayClient {
    async fn issue_credential(&self) -> Result<EphemeralKey> {
        self.ephemeral_key().await
    }
}

#[async_trait]
impl PlacesSearch for RelayClient {
    async fn search_nearby_places(&self, params: &NearbySearchParams) -> Result<Value> {
        self.nearby_places(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_carries_token() {
        let client = RelayClient::new("http://relay.local/", Some("tok".into()));
        assert_eq!(client.base_url(), "http://relay.local");

        let mut data = Map::new();
        data.insert("params".into(), serde_json::json!({"keyword": "cafe"}));
        let body = client.envelope(data);
        assert_eq!(body["data"]["token"], "tok");
        assert_eq!(body["data"]["params"]["keyword"], "cafe");
    }

    #[test]
    fn test_envelope_without_token() {
        let client = RelayClient::new("http://relay.local", None);
        let body = client.envelope(Map::new());
        assert_eq!(body, serde_json::json!({"data": {}}));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = RelayClient::new("http://relay.local", Some("very-secret".into()));
        assert!(!format!("{client:?}").contains("very-secret"));
    }

    #[test]
    fn test_photo_linker_uses_base_and_token() {
        let client = RelayClient::new("http://relay.local", Some("tok".into()));
        let url = client.photo_linker().unwrap().photo_url("R1");
        assert_eq!(url, "http://relay.local/place-photo?photo_reference=R1&token=tok");
    }
}
