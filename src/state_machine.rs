use serde::Serialize;
use std::fmt;

/// Lifecycle of the floating surface session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionState {
    #[default]
    Closed,
    Opening,
    Open,
    FallbackOpen,
}

impl SessionState {
    /// A session counts as active while either presentation is showing.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Open | SessionState::FallbackOpen)
    }
}

#[derive(Debug, Clone)]
pub struct StateTransitionError {
    from: SessionState,
    to: SessionState,
    message: String,
}

impl StateTransitionError {
    pub fn from_state(&self) -> SessionState {
        self.from
    }

    pub fn to_state(&self) -> SessionState {
        self.to
    }
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid session transition from {:?} to {:?}: {}",
            self.from, self.to, self.message
        )
    }
}

impl std::error::Error for StateTransitionError {}

/// State machine for the floating surface session with validation
#[derive(Debug, Default)]
pub struct SessionStateMachine {
    current_state: SessionState,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self {
            current_state: SessionState::Closed,
        }
    }

    pub fn current(&self) -> SessionState {
        self.current_state
    }

    /// Validate and perform state transition
    pub fn transition_to(&mut self, new_state: SessionState) -> Result<(), StateTransitionError> {
        if self.is_valid_transition(self.current_state, new_state) {
            log::info!(
                "[SESSION] {:?} -> {:?}",
                self.current_state,
                new_state
            );
            let old_state = self.current_state;
            self.current_state = new_state;

            match (old_state, new_state) {
                (SessionState::Opening, SessionState::FallbackOpen) => {
                    log::warn!("[SESSION] Running in degraded media picture-in-picture mode");
                }
                (SessionState::Opening, SessionState::Closed) => {
                    log::info!("[SESSION] Open attempt ended without a surface");
                }
                _ => {}
            }

            Ok(())
        } else {
            log::error!(
                "[SESSION] Transition INVALID: {:?} -> {:?}",
                self.current_state,
                new_state
            );
            Err(StateTransitionError {
                from: self.current_state,
                to: new_state,
                message: "Transition not allowed by session rules".to_string(),
            })
        }
    }

    fn is_valid_transition(&self, from: SessionState, to: SessionState) -> bool {
        match (from, to) {
            (SessionState::Closed, SessionState::Opening) => true,

            (SessionState::Opening, SessionState::Open) => true,
            (SessionState::Opening, SessionState::FallbackOpen) => true,
            (SessionState::Opening, SessionState::Closed) => true, // Failed, cancelled or ambient exit

            (SessionState::Open, SessionState::Closed) => true,
            (SessionState::FallbackOpen, SessionState::Closed) => true,

            // Same state transitions (no-op)
            (a, b) if a == b => true,

            _ => false,
        }
    }

    pub fn can_open(&self) -> bool {
        matches!(self.current_state, SessionState::Closed)
    }

    pub fn is_active(&self) -> bool {
        self.current_state.is_active()
    }
}
