//! # arriva
//!
//! Voice travel assistant: a token-gated relay in front of the AI and places
//! providers, the agent's tool layer, and the realtime session lifecycle.
//!
//! ## Overview
//!
//! The relay keeps provider API keys on the server. Clients present a shared
//! token and get back short-lived realtime credentials, nearby-search results,
//! and streamed place photos. On the client side, a [`VoiceSession`] connects a
//! [`RealtimeAgent`] whose tools publish UI updates through an [`EventBridge`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use arriva::{EventBridge, EventKind, UiEvent};
//!
//! let bridge = Arc::new(EventBridge::new());
//! let _sub = bridge.subscribe_scoped(EventKind::Message, |event| {
//!     if let UiEvent::Message(markdown) = event {
//!         println!("{markdown}");
//!     }
//! });
//! bridge.publish(&UiEvent::Message("## Hello".into()));
//! ```
//!
//! ## Architecture
//!
//! - **server / api / auth**: axum relay: shared-token gate plus three proxy routes
//! - **Upstream** trait: provider access behind the relay handlers
//! - **EventBridge**: synchronous tool-to-UI event channel
//! - **Tool** trait / **ToolRegistry**: agent-callable functions
//! - **VoiceSession**: credential issuance and realtime connect/close
//! - **MessageBoard** / **TravelAssistant**: headless view model and controller

pub mod agent;
pub mod api;
pub mod auth;
pub mod bridge;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod photo;
pub mod server;
pub mod session;
pub mod tools;
pub mod ui;
pub mod upstream;

// Re-export core types
pub use agent::RealtimeAgent;
pub use bridge::{EventBridge, EventKind, ListenerId, Subscription, UiEvent};
pub use client::RelayClient;
pub use config::RelayConfig;
pub use error::{ArrivaError, Result};
pub use photo::PhotoLinker;
pub use session::{
    ConnectOptions, CredentialIssuer, EphemeralKey, RealtimeConnection, RealtimeTransport,
    SessionStatus, VoiceSession,
};
pub use tools::{Tool, ToolOutcome, ToolRegistry};
pub use ui::{BoardSnapshot, MessageBoard, TravelAssistant};
pub use upstream::{HttpUpstream, Upstream};
