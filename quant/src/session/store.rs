use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nanoid::nanoid;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::models::{Turn, TurnKind};

const EVENT_BUFFER_CAPACITY: usize = 64;

/// Notification emitted whenever the transcript length or the awaiting flag
/// changes. Views subscribe and re-render from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TurnAppended { index: usize, kind: TurnKind },
    AwaitingChanged(bool),
    Detached,
}

/// Result of trying to open a new turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The user turn was appended; the payload is the message to send.
    Accepted(String),
    /// Input was empty after trimming.
    Rejected,
    /// A request is already in flight.
    Busy,
    /// The session has been torn down.
    Detached,
}

/// Transcript plus the transient flags of one page visit.
#[derive(Debug)]
pub struct Session {
    id: String,
    turns: Vec<Turn>,
    input: String,
    is_awaiting_response: bool,
    has_started: bool,
    detached: bool,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (events, _receiver) = broadcast::channel(EVENT_BUFFER_CAPACITY);
        Self {
            id: nanoid!(),
            turns: Vec::new(),
            input: String::new(),
            is_awaiting_response: false,
            has_started: false,
            detached: false,
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last_assistant(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.kind() == TurnKind::Assistant)
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.is_awaiting_response
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        if !self.detached {
            self.input = text.into();
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; the state is still authoritative.
        let _ = self.events.send(event);
    }

    /// Validate input and open a turn: append the user turn, mark the session
    /// started and awaiting, and clear the input buffer.
    pub fn begin_turn(&mut self, raw_input: &str) -> Admission {
        if self.detached {
            return Admission::Detached;
        }
        if self.is_awaiting_response {
            debug!(session_id = %self.id, "Submission refused while awaiting response");
            return Admission::Busy;
        }

        let message = raw_input.trim();
        if message.is_empty() {
            return Admission::Rejected;
        }

        let message = message.to_string();
        self.push(Turn::user(message.clone()));
        self.has_started = true;
        self.input.clear();
        self.set_awaiting(true);

        Admission::Accepted(message)
    }

    /// Append an assistant turn. Returns false (and leaves the transcript
    /// untouched) when the session is detached or the turn is a user turn.
    pub fn append_assistant(&mut self, turn: Turn) -> bool {
        if self.detached {
            debug!(session_id = %self.id, turn_id = turn.id(), "Discarding turn for detached session");
            return false;
        }
        if turn.is_user() {
            warn!(session_id = %self.id, "Refusing to append a user turn as a reply");
            return false;
        }

        self.push(turn);
        true
    }

    /// Clear the awaiting flag after a request settles.
    pub fn settle(&mut self) {
        if !self.detached {
            self.set_awaiting(false);
        }
    }

    /// Tear the session down. Every later mutation becomes a no-op.
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.emit(SessionEvent::Detached);
    }

    fn push(&mut self, turn: Turn) {
        let kind = turn.kind();
        self.turns.push(turn);
        self.emit(SessionEvent::TurnAppended {
            index: self.turns.len() - 1,
            kind,
        });
    }

    fn set_awaiting(&mut self, awaiting: bool) {
        if self.is_awaiting_response != awaiting {
            self.is_awaiting_response = awaiting;
            self.emit(SessionEvent::AwaitingChanged(awaiting));
        }
    }
}

/// Shared handle to a [`Session`]. The lock is only ever held for short,
/// synchronous state transitions.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.lock().subscribe()
    }

    pub fn detach(&self) {
        self.lock().detach();
    }
}
