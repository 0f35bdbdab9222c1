use std::fmt;

use crate::actor::ActorId;

pub type CoreResult<T> = Result<T, CoreError>;

/// The bug taxonomy the runtime can report at the end of an iteration.
///
/// Every variant carries the iteration index and step count it fired at so
/// that the structured log line and the returned [`crate::runtime::IterationOutcome`]
/// always agree on "where" a bug was found.
#[derive(thiserror::Error, Debug, Clone)]
pub enum CoreError {
    #[error("assertion failed at step {step} (iteration {iteration}): {message}")]
    AssertionFailure {
        iteration: u64,
        step: u64,
        message: String,
    },

    #[error("actor {actor:?} in state {state:?} has no handler for event {event_type} (iteration {iteration}, step {step})")]
    UnhandledEvent {
        iteration: u64,
        step: u64,
        actor: ActorId,
        state: String,
        event_type: String,
    },

    #[error("bad creation at step {step} (iteration {iteration}): {reason}")]
    BadCreation {
        iteration: u64,
        step: u64,
        reason: String,
    },

    #[error("bad send at step {step} (iteration {iteration}): {reason}")]
    BadSend {
        iteration: u64,
        step: u64,
        reason: String,
    },

    #[error("confirmed deadlock at step {step} (iteration {iteration}): no enabled operation remains and {blocked} operations are blocked")]
    Deadlock {
        iteration: u64,
        step: u64,
        blocked: usize,
    },

    #[error("potential deadlock at step {step} (iteration {iteration}): scheduler stalled past {timeout_ms}ms")]
    PotentialDeadlock {
        iteration: u64,
        step: u64,
        timeout_ms: u64,
    },

    #[error("liveness violation at step {step} (iteration {iteration}): monitor {monitor} stayed hot for {temperature} consecutive steps (threshold {threshold})")]
    LivenessViolation {
        iteration: u64,
        step: u64,
        monitor: String,
        temperature: u64,
        threshold: u64,
    },

    #[error("uncontrolled concurrency detected at step {step} (iteration {iteration}): {detail}")]
    UncontrolledConcurrency {
        iteration: u64,
        step: u64,
        detail: String,
    },

    #[error("replay mismatch at step {step}: expected {expected}, got {actual}")]
    ReplayMismatch {
        step: u64,
        expected: String,
        actual: String,
    },

    #[error("action at step {step} (iteration {iteration}) panicked: {message}")]
    ActionException {
        iteration: u64,
        step: u64,
        message: String,
    },
}

/// Payload recovered from a caught panic inside a handler body, matching
/// the teacher's `catch_unwind(AssertUnwindSafe(...))` pattern around its
/// mailbox-processing loop.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}#{}", name, self.value),
            None => write!(f, "{}#{}", self.type_tag, self.value),
        }
    }
}
