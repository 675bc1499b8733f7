//! Lifecycle of the instant-unstake-via-swap flow.

use crate::foundation::RestakeError;
use log::debug;
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SwapFlowState {
    Start,
    AllowanceChecking,
    /// Number of the corrective transaction in flight (1 or 2).
    AllowanceCorrecting(u8),
    SwapSubmitted,
    SwapConfirmed,
    UnwrapChecking,
    UnwrapSubmitted,
    UnwrapConfirmed,
    UnwrapSkipped,
    Done,
    Failed,
}

const VALID_TRANSITIONS: &[(SwapFlowState, SwapFlowState)] = &[
    (SwapFlowState::Start, SwapFlowState::AllowanceChecking),
    (SwapFlowState::AllowanceChecking, SwapFlowState::AllowanceCorrecting(1)),
    (SwapFlowState::AllowanceChecking, SwapFlowState::SwapSubmitted),
    (SwapFlowState::AllowanceCorrecting(1), SwapFlowState::AllowanceCorrecting(2)),
    (SwapFlowState::AllowanceCorrecting(1), SwapFlowState::SwapSubmitted),
    (SwapFlowState::AllowanceCorrecting(2), SwapFlowState::SwapSubmitted),
    (SwapFlowState::SwapSubmitted, SwapFlowState::SwapConfirmed),
    (SwapFlowState::SwapConfirmed, SwapFlowState::UnwrapChecking),
    (SwapFlowState::SwapConfirmed, SwapFlowState::UnwrapSkipped),
    (SwapFlowState::UnwrapChecking, SwapFlowState::UnwrapSubmitted),
    (SwapFlowState::UnwrapChecking, SwapFlowState::UnwrapSkipped),
    (SwapFlowState::UnwrapSubmitted, SwapFlowState::UnwrapConfirmed),
    (SwapFlowState::UnwrapConfirmed, SwapFlowState::Done),
    (SwapFlowState::UnwrapSkipped, SwapFlowState::Done),
];

impl SwapFlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapFlowState::Done | SwapFlowState::Failed)
    }
}

impl fmt::Display for SwapFlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapFlowState::AllowanceCorrecting(n) => write!(f, "AllowanceCorrecting({n})"),
            other => write!(f, "{other:?}"),
        }
    }
}

pub fn can_transition(from: SwapFlowState, to: SwapFlowState) -> bool {
    if from.is_terminal() {
        return false;
    }
    to == SwapFlowState::Failed || VALID_TRANSITIONS.contains(&(from, to))
}

/// Tracks the current state and the path taken, rejecting illegal moves.
#[derive(Clone, Debug)]
pub struct SwapFlowTracker {
    state: SwapFlowState,
    history: Vec<SwapFlowState>,
}

impl SwapFlowTracker {
    pub fn new() -> Self {
        Self { state: SwapFlowState::Start, history: vec![SwapFlowState::Start] }
    }

    pub fn state(&self) -> SwapFlowState {
        self.state
    }

    pub fn history(&self) -> &[SwapFlowState] {
        &self.history
    }

    pub fn advance(&mut self, next: SwapFlowState) -> Result<(), RestakeError> {
        if !can_transition(self.state, next) {
            return Err(RestakeError::Message(format!("invalid swap flow transition: {} -> {}", self.state, next)));
        }
        debug!("swap flow transition from={} to={}", self.state, next);
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Move to `Failed` unless already terminal.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = SwapFlowState::Failed;
            self.history.push(SwapFlowState::Failed);
        }
    }
}

impl Default for SwapFlowTracker {
    fn default() -> Self {
        Self::new()
    }
}
