//! In-process event bridge between the tool layer and the UI model
//!
//! `EventBridge` is a small synchronous publish/subscribe channel. Tools
//! publish [`UiEvent`]s; the UI model subscribes to them. One bridge is
//! created per mounted UI and shared through an `Arc`.
//!
//! Delivery is synchronous and ordered: every listener registered for an
//! event kind at publish time is invoked, in registration order, before
//! `publish` returns. Nothing is buffered for listeners that subscribe later.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Kind of event a listener subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Message,
    Thinking,
}

impl EventKind {
    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::Thinking => "thinking",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event published by a tool for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Replace the visible message with this markdown
    Message(String),
    /// The agent is waiting on a slow call
    Thinking,
}

impl UiEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::Message(_) => EventKind::Message,
            UiEvent::Thinking => EventKind::Thinking,
        }
    }
}

/// Identifies a registered listener so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&UiEvent) + Send + Sync>;

/// Synchronous publish/subscribe channel for [`UiEvent`]s
pub struct EventBridge {
    listeners: Mutex<HashMap<EventKind, Vec<(ListenerId, Listener)>>>,
    next_id: AtomicU64,
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridge")
            .field("message_listeners", &self.listener_count(EventKind::Message))
            .field("thinking_listeners", &self.listener_count(EventKind::Thinking))
            .finish()
    }
}

impl EventBridge {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EventKind, Vec<(ListenerId, Listener)>>> {
        // A poisoned lock only means a subscriber panicked mid-update; the map is still valid
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a listener for `kind`
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&UiEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        tracing::debug!(event = %kind, listener = id.0, "Listener subscribed");
        id
    }

    /// Register a listener that is removed when the returned handle drops
    pub fn subscribe_scoped<F>(self: &Arc<Self>, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&UiEvent) + Send + Sync + 'static,
    {
        let id = self.subscribe(kind, listener);
        Subscription {
            bridge: Arc::clone(self),
            kind,
            id,
        }
    }

    /// Remove a listener. Returns true if it was registered.
    pub fn unsubscribe(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let Some(list) = listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            listeners.remove(&kind);
        }
        if removed {
            tracing::debug!(event = %kind, listener = id.0, "Listener unsubscribed");
        }
        removed
    }

    /// Deliver `event` to every listener of its kind, in registration order.
    ///
    /// Listeners run outside the internal lock, so they may subscribe or
    /// unsubscribe. A panicking listener is logged and skipped.
    /// Returns the number of listeners invoked.
    pub fn publish(&self, event: &UiEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<(ListenerId, Listener)> = match self.lock().get(&kind) {
            Some(list) => list.clone(),
            None => return 0,
        };

        for (id, listener) in &snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                tracing::warn!(event = %kind, listener = id.0, "Event listener panicked");
            }
        }
        snapshot.len()
    }

    /// Number of listeners currently registered for `kind`
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.lock().get(&kind).map_or(0, Vec::len)
    }
}

/// Listener registration that unsubscribes on drop
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    bridge: Arc<EventBridge>,
    kind: EventKind,
    id: ListenerId,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bridge.unsubscribe(self.kind, self.id);
    }
}
