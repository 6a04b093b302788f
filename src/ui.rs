//! Headless view model for the voice front end
//!
//! [`MessageBoard`] mirrors what the page shows: one markdown message and a
//! "thinking" indicator, both driven by [`EventBridge`] events.
//! [`TravelAssistant`] is the connect/disconnect controller around it.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::bridge::{EventBridge, EventKind, Subscription, UiEvent};
use crate::error::{ArrivaError, Result};
use crate::photo::PhotoLinker;
use crate::session::{SessionStatus, VoiceSession};

/// Travel plans shown in the editor before the user types anything
pub const DEFAULT_TRAVEL_PLANS: &str =
    "Travelling solo to Milan for 3 days, staying in VIU Hotel Milan";

/// Message shown once a session connects
pub const GREETING: &str = "## Connected!\n Try asking things like:\n - Where could I eat near my hotel?\n - What museums can I visit during my stay?";

/// Alert raised when a connect attempt fails
pub const CONNECTION_ALERT: &str = "Connection Error. Sorry. Got the right token?";

/// Message shown after the user disconnects
pub const FAREWELL: &str = "## Disconnected. See you later!";

/// Point-in-time copy of the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub message: String,
    pub thinking: bool,
    /// Bumped on every change
    pub revision: u64,
}

#[derive(Debug, Default)]
struct BoardState {
    message: String,
    thinking: bool,
    revision: u64,
}

impl BoardState {
    fn set_message(&mut self, markdown: String) {
        self.message = markdown;
        self.thinking = false;
        self.revision += 1;
    }

    fn set_thinking(&mut self) {
        self.thinking = true;
        self.revision += 1;
    }
}

fn lock(state: &Mutex<BoardState>) -> MutexGuard<'_, BoardState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Current message plus thinking indicator, fed by the event bridge.
///
/// Listeners stay registered for as long as the board lives.
pub struct MessageBoard {
    state: Arc<Mutex<BoardState>>,
    linker: PhotoLinker,
    _subscriptions: [Subscription; 2],
}

impl std::fmt::Debug for MessageBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBoard")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl MessageBoard {
    pub fn mount(bridge: &Arc<EventBridge>, linker: PhotoLinker) -> Self {
        let state = Arc::new(Mutex::new(BoardState::default()));

        let on_message = {
            let state = Arc::clone(&state);
            let linker = linker.clone();
            bridge.subscribe_scoped(EventKind::Message, move |event| {
                if let UiEvent::Message(markdown) = event {
                    lock(&state).set_message(linker.rewrite(markdown));
                }
            })
        };
        let on_thinking = {
            let state = Arc::clone(&state);
            bridge.subscribe_scoped(EventKind::Thinking, move |_| lock(&state).set_thinking())
        };

        Self {
            state,
            linker,
            _subscriptions: [on_message, on_thinking],
        }
    }

    /// Replace the message directly, as the controller does for status text
    pub fn show(&self, markdown: &str) {
        lock(&self.state).set_message(self.linker.rewrite(markdown));
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let state = lock(&self.state);
        BoardSnapshot {
            message: state.message.clone(),
            thinking: state.thinking,
            revision: state.revision,
        }
    }
}

/// Connect/disconnect controller for one voice session
pub struct TravelAssistant {
    session: VoiceSession,
    board: MessageBoard,
    travel_plans: String,
    alert: Option<String>,
}

impl TravelAssistant {
    pub fn new(session: VoiceSession, board: MessageBoard) -> Self {
        Self {
            session,
            board,
            travel_plans: DEFAULT_TRAVEL_PLANS.to_string(),
            alert: None,
        }
    }

    pub fn travel_plans(&self) -> &str {
        &self.travel_plans
    }

    pub fn set_travel_plans(&mut self, plans: impl Into<String>) {
        self.travel_plans = plans.into();
    }

    pub fn board(&self) -> &MessageBoard {
        &self.board
    }

    /// Alert from the last failed connect, if any
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Start a session for the current travel plans
    pub async fn connect(&mut self) -> Result<()> {
        self.alert = None;
        match self.session.connect(&self.travel_plans).await {
            Ok(()) => {
                self.board.show(GREETING);
                Ok(())
            }
            // Already connected; nothing on screen changes
            Err(e @ ArrivaError::SessionActive) => Err(e),
            Err(e) => {
                self.alert = Some(CONNECTION_ALERT.to_string());
                Err(e)
            }
        }
    }

    /// End the session and show the farewell message
    pub async fn disconnect(&mut self) -> Result<()> {
        match self.session.close().await {
            Err(e @ ArrivaError::NotConnected) => Err(e),
            result => {
                self.board.show(FAREWELL);
                result
            }
        }
    }
}
