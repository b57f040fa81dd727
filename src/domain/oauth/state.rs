/// What the identity provider sent back to the loopback listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Code(String),
    Denied(String),
}

/// Lifecycle of one browser login attempt.
///
/// `CodeReceived`, `ErrorReceived` and `TimedOut` are mutually exclusive
/// outcomes; each of them leads to `Closed` once the loopback listener is torn
/// down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthFlowState {
    Idle,
    ServerListening,
    AwaitingCallback,
    CodeReceived,
    ErrorReceived,
    TimedOut,
    Closed,
}

impl OAuthFlowState {
    pub fn can_advance_to(self, next: OAuthFlowState) -> bool {
        use OAuthFlowState::*;

        matches!(
            (self, next),
            (Idle, ServerListening)
                | (ServerListening, AwaitingCallback)
                | (AwaitingCallback, CodeReceived)
                | (AwaitingCallback, ErrorReceived)
                | (AwaitingCallback, TimedOut)
                | (ServerListening, Closed)
                | (CodeReceived, Closed)
                | (ErrorReceived, Closed)
                | (TimedOut, Closed)
        )
    }

    /// Move to `next`, logging the transition
    pub fn advance(self, next: OAuthFlowState) -> OAuthFlowState {
        debug_assert!(
            self.can_advance_to(next),
            "illegal OAuth flow transition {:?} -> {:?}",
            self,
            next
        );
        tracing::debug!(from = ?self, to = ?next, "OAuth flow transition");
        next
    }
}
