//! Credential gate state machine
//!
//! ```text
//!   Unchecked ──probe ok──────────────────────────▶ Authenticated
//!       │
//!   probe failed
//!       ▼
//!   Retrying(n) ──reconfigure + probe ok─────────▶ Authenticated
//!       │  ▲
//!       │  └── probe failed, user continues ── Retrying(n + 1)
//!       │
//!       └──── probe failed, user declines ───────▶ Aborted
//! ```
//!
//! Transitions are pure; the application layer performs the probe,
//! the reconfiguration and the question, and feeds the results back as events.

/// Observable state of the credential gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No probe issued yet
    Unchecked,
    /// Reference call succeeded (terminal)
    Authenticated,
    /// Reference call failed; `attempt` counts repair rounds, starting at 1
    Retrying { attempt: u32 },
    /// User declined to continue repairing (terminal)
    Aborted,
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    ProbeSucceeded,
    ProbeFailed,
    UserContinued,
    UserDeclined,
}

impl GateState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Aborted)
    }

    /// Apply an event.
    ///
    /// A failed probe while retrying keeps the state unchanged: the next
    /// transition is decided by the user.
    pub fn on(self, event: GateEvent) -> Self {
        match (self, event) {
            (Self::Authenticated, _) | (Self::Aborted, _) => self,
            (_, GateEvent::ProbeSucceeded) => Self::Authenticated,
            (Self::Unchecked, GateEvent::ProbeFailed) => Self::Retrying { attempt: 1 },
            (Self::Retrying { .. }, GateEvent::ProbeFailed) => self,
            (Self::Retrying { attempt }, GateEvent::UserContinued) => Self::Retrying {
                attempt: attempt + 1,
            },
            (Self::Retrying { .. }, GateEvent::UserDeclined) => Self::Aborted,
            // a decision without a failed probe has nothing to decide
            (Self::Unchecked, GateEvent::UserContinued | GateEvent::UserDeclined) => self,
        }
    }
}

/// Classify a reference-call result: success needs a clean exit AND output.
pub fn is_authenticated(exit_ok: bool, stdout: &str) -> bool {
    exit_ok && !stdout.trim().is_empty()
}
