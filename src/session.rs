//! Realtime voice session lifecycle
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected --close--> Disconnected
//!                               \--error--> Disconnected
//! ```
//!
//! The realtime audio transport itself lives outside this crate and is
//! reached through [`RealtimeTransport`]. A second `connect` while a session
//! is connecting or connected is rejected.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::agent::RealtimeAgent;
use crate::bridge::EventBridge;
use crate::error::{ArrivaError, Result};
use crate::tools::{travel_tools, PlacesSearch};

/// Model requested from the realtime transport unless configured otherwise
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-realtime";

/// Short-lived provider credential for one realtime connection
#[derive(Clone, PartialEq, Eq)]
pub struct EphemeralKey {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl EphemeralKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Parse the provider's issuance body (`{"value": "...", "expires_at": <unix secs>}`)
    pub fn from_provider_json(body: &Value) -> Result<Self> {
        let value = body
            .get("value")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ArrivaError::upstream("ephemeral key", "response has no credential value"))?;

        let mut key = Self::new(value);
        if let Some(ts) = body.get("expires_at").and_then(Value::as_i64) {
            if let Some(at) = Utc.timestamp_opt(ts, 0).single() {
                key = key.with_expiry(at);
            }
        }
        Ok(key)
    }

    /// The secret itself; only the transport should read it
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl fmt::Debug for EphemeralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKey")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of realtime credentials (normally the relay client)
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn issue_credential(&self) -> Result<EphemeralKey>;
}

/// Parameters for opening a realtime connection
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub api_key: EphemeralKey,
    pub model: String,
}

/// External realtime audio transport
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    /// Open a connection for `agent`; audio I/O is bound by the transport
    async fn connect(
        &self,
        agent: Arc<RealtimeAgent>,
        options: ConnectOptions,
    ) -> Result<Box<dyn RealtimeConnection>>;
}

/// An open realtime connection
#[async_trait]
pub trait RealtimeConnection: Send {
    async fn close(&mut self) -> Result<()>;
}

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Disconnected => "disconnected",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
        };
        f.write_str(s)
    }
}

enum SessionState {
    Disconnected,
    Connecting,
    Connected(Box<dyn RealtimeConnection>),
}

impl SessionState {
    fn status(&self) -> SessionStatus {
        match self {
            SessionState::Disconnected => SessionStatus::Disconnected,
            SessionState::Connecting => SessionStatus::Connecting,
            SessionState::Connected(_) => SessionStatus::Connected,
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// A connect in flight. Dropping it unfinished (the connect future was
/// cancelled) puts the session back to `Disconnected`.
struct PendingConnect<'a> {
    state: &'a Mutex<SessionState>,
    finished: bool,
}

impl<'a> PendingConnect<'a> {
    fn begin(state: &'a Mutex<SessionState>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, next: SessionState) {
        *lock(self.state) = next;
        self.finished = true;
    }
}

impl Drop for PendingConnect<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock(self.state) = SessionState::Disconnected;
            tracing::warn!("Connect abandoned before completion");
        }
    }
}

/// One user's voice session with the travel agent
pub struct VoiceSession {
    issuer: Arc<dyn CredentialIssuer>,
    transport: Arc<dyn RealtimeTransport>,
    bridge: Arc<EventBridge>,
    places: Arc<dyn PlacesSearch>,
    model: String,
    state: Mutex<SessionState>,
}

impl VoiceSession {
    pub fn new(
        issuer: Arc<dyn CredentialIssuer>,
        transport: Arc<dyn RealtimeTransport>,
        bridge: Arc<EventBridge>,
        places: Arc<dyn PlacesSearch>,
    ) -> Self {
        Self {
            issuer,
            transport,
            bridge,
            places,
            model: DEFAULT_REALTIME_MODEL.to_string(),
            state: Mutex::new(SessionState::Disconnected),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn status(&self) -> SessionStatus {
        lock(&self.state).status()
    }

    /// Issue a credential, build the agent for `travel_plans`, and connect.
    ///
    /// Any failure, or dropping the returned future before it completes,
    /// leaves the session disconnected; there is no retry.
    pub async fn connect(&self, travel_plans: &str) -> Result<()> {
        {
            let mut state = lock(&self.state);
            if !matches!(*state, SessionState::Disconnected) {
                tracing::warn!(status = %state.status(), "Connect rejected: session already active");
                return Err(ArrivaError::SessionActive);
            }
            *state = SessionState::Connecting;
        }
        let pending = PendingConnect::begin(&self.state);
        tracing::info!(model = %self.model, "Connecting realtime session");

        match self.open(travel_plans).await {
            Ok(connection) => {
                pending.finish(SessionState::Connected(connection));
                tracing::info!("Realtime session connected");
                Ok(())
            }
            Err(e) => {
                pending.finish(SessionState::Disconnected);
                tracing::error!("Realtime session failed to connect: {e}");
                Err(e)
            }
        }
    }

    async fn open(&self, travel_plans: &str) -> Result<Box<dyn RealtimeConnection>> {
        let api_key = self.issuer.issue_credential().await?;
        if api_key.is_expired(Utc::now()) {
            return Err(ArrivaError::upstream(
                "ephemeral key",
                "credential expired before connect",
            ));
        }
        let tools = travel_tools(Arc::clone(&self.bridge), Arc::clone(&self.places));
        let agent = Arc::new(RealtimeAgent::travel(travel_plans, tools));
        let options = ConnectOptions {
            api_key,
            model: self.model.clone(),
        };
        self.transport.connect(agent, options).await
    }

    /// Close the open connection. The session is disconnected afterwards
    /// even if the transport reports an error while closing.
    pub async fn close(&self) -> Result<()> {
        let mut connection = {
            let mut state = lock(&self.state);
            match std::mem::replace(&mut *state, SessionState::Disconnected) {
                SessionState::Connected(connection) => connection,
                other => {
                    *state = other;
                    return Err(ArrivaError::NotConnected);
                }
            }
        };

        let result = connection.close().await;
        match &result {
            Ok(()) => tracing::info!("Realtime session closed"),
            Err(e) => tracing::warn!("Realtime session closed with error: {e}"),
        }
        result
    }
}
