use crate::runtime::operation::{OperationId, OperationSnapshot};
use crate::strategy::ExplorationStrategy;
use crate::trace::{ScheduleStep, Trace};

/// Drives the runtime strictly from a previously recorded [`Trace`].
/// Every request must agree with the next recorded step, else the
/// iteration fails with `CoreError::ReplayMismatch` (raised by the
/// runtime, not here — this strategy only reports the mismatch so the
/// caller can build that error with full context).
pub struct ReplayStrategy {
    trace: Trace,
    cursor: usize,
    mismatch: Option<(String, String)>,
}

impl ReplayStrategy {
    pub fn new(trace: Trace) -> Self {
        ReplayStrategy {
            trace,
            cursor: 0,
            mismatch: None,
        }
    }

    fn next_step(&mut self) -> Option<ScheduleStep> {
        let step = self.trace.steps.get(self.cursor).cloned();
        self.cursor += 1;
        step
    }
}

impl ExplorationStrategy for ReplayStrategy {
    fn initialize_iteration(&mut self, _iteration: u64) -> bool {
        self.cursor == 0
    }

    fn next_operation(
        &mut self,
        enabled: &[OperationSnapshot],
        _current: Option<OperationId>,
        _is_yielding: bool,
    ) -> Option<OperationId> {
        match self.next_step() {
            Some(ScheduleStep::SchedulingChoice { scheduled_operation_id }) => {
                let wanted = OperationId(scheduled_operation_id);
                if enabled.iter().any(|op| op.id == wanted) {
                    Some(wanted)
                } else {
                    self.mismatch = Some((
                        format!("SchedulingChoice({wanted})"),
                        format!("operation not enabled among {:?}", enabled.iter().map(|o| o.id).collect::<Vec<_>>()),
                    ));
                    None
                }
            }
            Some(other) => {
                self.mismatch = Some(("SchedulingChoice".to_string(), format!("{:?}", other)));
                None
            }
            None => {
                self.mismatch = Some(("a recorded step".to_string(), "end of trace".to_string()));
                None
            }
        }
    }

    fn next_boolean(&mut self) -> bool {
        match self.next_step() {
            Some(ScheduleStep::NondeterministicChoice { boolean_value: Some(b), .. }) => b,
            Some(other) => {
                self.mismatch = Some(("NondeterministicChoice(bool)".to_string(), format!("{:?}", other)));
                false
            }
            None => {
                self.mismatch = Some(("a recorded boolean choice".to_string(), "end of trace".to_string()));
                false
            }
        }
    }

    fn next_integer(&mut self, max_value: u64) -> u64 {
        match self.next_step() {
            Some(ScheduleStep::NondeterministicChoice { integer_value: Some(i), .. }) => {
                if max_value == 0 || i < max_value {
                    i
                } else {
                    self.mismatch = Some((
                        format!("integer below {max_value}"),
                        format!("recorded value {i}"),
                    ));
                    0
                }
            }
            Some(other) => {
                self.mismatch = Some(("NondeterministicChoice(int)".to_string(), format!("{:?}", other)));
                0
            }
            None => {
                self.mismatch = Some(("a recorded integer choice".to_string(), "end of trace".to_string()));
                0
            }
        }
    }

    fn step_count(&self) -> u64 {
        self.cursor as u64
    }

    fn max_steps_reached(&self) -> bool {
        self.cursor >= self.trace.steps.len()
    }

    fn is_fair(&self) -> bool {
        false
    }

    fn description(&self) -> String {
        format!(
            "Replay(seed={}, iteration={}, steps={})",
            self.trace.prelude.seed,
            self.trace.prelude.iteration,
            self.trace.steps.len()
        )
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.mismatch = None;
    }

    /// The last observed mismatch, if any: `(expected, actual)` as
    /// rendered strings, ready to be wrapped into `CoreError::ReplayMismatch`.
    fn take_mismatch(&mut self) -> Option<(String, String)> {
        self.mismatch.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;
    use crate::strategy::StrategyKind;
    use crate::trace::TracePrelude;

    fn op(id: u64) -> OperationSnapshot {
        OperationSnapshot {
            id: OperationId(id),
            name: format!("op{id}"),
            group: ActorId::new("T"),
        }
    }

    #[test]
    fn replays_the_recorded_sequence_exactly() {
        let mut trace = Trace::new(TracePrelude {
            strategy: StrategyKind::Random,
            seed: 1,
            iteration: 0,
        });
        trace.push(ScheduleStep::scheduling(OperationId(2)));
        trace.push(ScheduleStep::boolean_choice(true));

        let mut strategy = ReplayStrategy::new(trace);
        let enabled = vec![op(1), op(2)];

        assert_eq!(strategy.next_operation(&enabled, None, false), Some(OperationId(2)));
        assert!(strategy.next_boolean());
        assert!(strategy.take_mismatch().is_none());
    }

    #[test]
    fn reports_a_mismatch_when_the_operation_is_not_enabled() {
        let mut trace = Trace::new(TracePrelude {
            strategy: StrategyKind::Random,
            seed: 1,
            iteration: 0,
        });
        trace.push(ScheduleStep::scheduling(OperationId(99)));

        let mut strategy = ReplayStrategy::new(trace);
        let enabled = vec![op(1)];

        assert!(strategy.next_operation(&enabled, None, false).is_none());
        assert!(strategy.take_mismatch().is_some());
    }
}
