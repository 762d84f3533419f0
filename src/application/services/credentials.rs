//! Credential gate driver
//!
//! Performs the I/O around the pure [`GateState`] machine: probe calls,
//! interactive reconfiguration and the continue question.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::events::{PipelineEvent, PipelineEventSink};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{is_authenticated, GateEvent, GateState};
use crate::infrastructure::traits::{CloudClient, Prompter};

/// Question asked after every failed repair round.
pub const CONTINUE_QUESTION: &str = "Credentials still invalid. Try again?";

/// Drives the credential gate until it reaches a terminal state.
pub struct CredentialGate {
    cloud: Arc<dyn CloudClient>,
    prompter: Arc<dyn Prompter>,
}

impl CredentialGate {
    pub fn new(cloud: Arc<dyn CloudClient>, prompter: Arc<dyn Prompter>) -> Self {
        Self { cloud, prompter }
    }

    /// Run the gate. Returns `Authenticated` or `Aborted`.
    ///
    /// Every repair round needs explicit consent; only prompt I/O errors are fatal.
    #[instrument(skip_all)]
    pub fn run(&self, events: &dyn PipelineEventSink) -> ApplicationResult<GateState> {
        let mut state = GateState::Unchecked.on(self.probe());

        while let GateState::Retrying { attempt } = state {
            events.on_event(PipelineEvent::ProbeFailed { attempt });

            if let Err(e) = self.cloud.configure() {
                warn!("configure failed: {}", e);
                events.on_event(PipelineEvent::ConfigureFailed {
                    message: e.to_string(),
                });
            }

            state = state.on(self.probe());
            if state.is_terminal() {
                break;
            }

            let again = self
                .prompter
                .confirm(CONTINUE_QUESTION)
                .with_context("read answer")?;
            let decision = if again {
                GateEvent::UserContinued
            } else {
                GateEvent::UserDeclined
            };
            debug!("run: attempt {} decision {:?}", attempt, decision);
            state = state.on(decision);
        }

        if state == GateState::Authenticated {
            events.on_event(PipelineEvent::Authenticated);
        }
        Ok(state)
    }

    /// Issue the reference call. An error running it counts as unauthenticated.
    fn probe(&self) -> GateEvent {
        match self.cloud.probe() {
            Ok(output) if is_authenticated(output.success, &output.stdout) => {
                GateEvent::ProbeSucceeded
            }
            Ok(output) => {
                debug!("probe: unauthenticated: {}", output.diagnostic());
                GateEvent::ProbeFailed
            }
            Err(e) => {
                debug!("probe: {}", e);
                GateEvent::ProbeFailed
            }
        }
    }
}
