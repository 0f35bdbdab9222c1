//! Specification monitors: singleton observer state machines dispatched
//! synchronously (never via a mailbox, never across a scheduling point).

use crate::actor::Event;
use crate::error::CoreError;
use crate::runtime::context::Context;
use crate::statemachine::{StateKey, StateMachine};

/// Object-safe seam so the runtime can hold monitors of heterogeneous
/// state-key types in one registry. Implemented for every
/// [`StateMachine<S>`]; client code never implements this directly.
pub(crate) trait MonitorDispatch: Send {
    fn dispatch(&mut self, ctx: &Context, event: &Event) -> Result<(), CoreError>;
    fn is_hot(&self) -> bool;
    fn is_cold(&self) -> bool;
}

impl<S: StateKey> MonitorDispatch for StateMachine<S> {
    fn dispatch(&mut self, ctx: &Context, event: &Event) -> Result<(), CoreError> {
        StateMachine::dispatch(self, ctx, event)
    }

    fn is_hot(&self) -> bool {
        StateMachine::is_hot(self)
    }

    fn is_cold(&self) -> bool {
        StateMachine::is_cold(self)
    }
}

/// Per-monitor liveness bookkeeping: consecutive scheduling decisions
/// observed while hot. Reset to zero the moment the monitor is cold.
#[derive(Debug, Clone, Copy, Default)]
pub struct Temperature(pub u64);

impl Temperature {
    pub fn bump(&mut self, hot: bool, cold: bool) {
        if hot {
            self.0 += 1;
        } else if cold {
            self.0 = 0;
        }
    }

    pub fn exceeds(&self, threshold: u64) -> bool {
        threshold > 0 && self.0 > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_resets_on_cold_and_ignores_neither() {
        let mut t = Temperature::default();
        t.bump(true, false);
        t.bump(true, false);
        assert_eq!(t.0, 2);
        t.bump(false, true);
        assert_eq!(t.0, 0);
    }

    #[test]
    fn exceeds_respects_disabled_threshold() {
        let t = Temperature(1000);
        assert!(!t.exceeds(0), "threshold 0 disables liveness checks");
        assert!(t.exceeds(5));
    }
}
