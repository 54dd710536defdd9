use std::sync::Arc;

use tracing::{debug, error, info};

use super::store::{Admission, SessionHandle};
use crate::gateway::{AnalysisGateway, AnalysisRequest, FlowRequest, GatewayRequest};
use crate::models::Turn;

/// Which gateway path a dispatcher sends turns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// `/run-flow`, text replies bound to a scraped profile.
    Conversational,
    /// `/analysis`, text plus optional chart data.
    Analytical,
}

impl DispatchMode {
    /// Speaker label for assistant turns in this mode.
    pub fn assistant_label(&self) -> &'static str {
        match self {
            DispatchMode::Conversational => "Quant Ai",
            DispatchMode::Analytical => "AI Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input; nothing happened.
    Rejected,
    /// Another turn is still awaiting its reply.
    Busy,
    /// The session was torn down before or during the request.
    Detached,
    /// The reply was appended as an assistant turn.
    Replied { turn_id: String },
    /// The request failed and the fallback turn was appended.
    Fallback { turn_id: String },
}

/// Clears the awaiting flag when dropped, whichever way the turn ends.
struct SettleGuard {
    session: SessionHandle,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        self.session.lock().settle();
    }
}

/// Runs one turn at a time against the gateway and records the outcome in a
/// session transcript.
#[derive(Clone)]
pub struct TurnDispatcher {
    gateway: Arc<dyn AnalysisGateway>,
    session: SessionHandle,
    mode: DispatchMode,
}

impl TurnDispatcher {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, session: SessionHandle, mode: DispatchMode) -> Self {
        Self {
            gateway,
            session,
            mode,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    fn request_for(&self, message: String) -> GatewayRequest {
        match self.mode {
            DispatchMode::Conversational => GatewayRequest::RunFlow(FlowRequest {
                message,
                clear_context: true,
            }),
            DispatchMode::Analytical => GatewayRequest::Analysis(AnalysisRequest { message }),
        }
    }

    /// Submit one user turn and wait for its reply.
    ///
    /// Exactly one assistant turn follows every accepted user turn: the mapped
    /// reply on success, or the fixed fallback turn on any failure. The
    /// awaiting flag is cleared on every exit path.
    pub async fn submit(&self, raw_input: &str) -> SubmitOutcome {
        let message = match self.session.lock().begin_turn(raw_input) {
            Admission::Accepted(message) => message,
            Admission::Rejected => return SubmitOutcome::Rejected,
            Admission::Busy => return SubmitOutcome::Busy,
            Admission::Detached => return SubmitOutcome::Detached,
        };
        let _settle = SettleGuard {
            session: self.session.clone(),
        };

        let request = self.request_for(message);
        debug!(endpoint = request.endpoint(), "Dispatching turn");

        let (turn, failed) = match self.gateway.send(&request).await.and_then(Turn::from_reply) {
            Ok(turn) => (turn, false),
            Err(e) => {
                error!(
                    endpoint = request.endpoint(),
                    transport = e.is_transport(),
                    error = %e,
                    "Turn failed, appending fallback reply"
                );
                (Turn::fallback(), true)
            }
        };

        let turn_id = turn.id().to_string();
        if !self.session.lock().append_assistant(turn) {
            info!(turn_id = %turn_id, "Reply arrived after session was detached");
            return SubmitOutcome::Detached;
        }

        if failed {
            SubmitOutcome::Fallback { turn_id }
        } else {
            SubmitOutcome::Replied { turn_id }
        }
    }
}
