//! The reproducible trace format: an ordered record of every scheduling
//! and nondeterministic choice made during an iteration.

use serde::{Deserialize, Serialize};

use crate::runtime::operation::OperationId;
use crate::strategy::StrategyKind;

/// One record in the reproducible trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScheduleStep {
    SchedulingChoice { scheduled_operation_id: u64 },
    NondeterministicChoice { boolean_value: Option<bool>, integer_value: Option<u64> },
    FairNondeterministicChoice { boolean_value: Option<bool>, integer_value: Option<u64> },
}

impl ScheduleStep {
    pub fn scheduling(op: OperationId) -> Self {
        ScheduleStep::SchedulingChoice {
            scheduled_operation_id: op.0,
        }
    }

    pub fn boolean_choice(value: bool) -> Self {
        ScheduleStep::NondeterministicChoice {
            boolean_value: Some(value),
            integer_value: None,
        }
    }

    pub fn integer_choice(value: u64) -> Self {
        ScheduleStep::NondeterministicChoice {
            boolean_value: None,
            integer_value: Some(value),
        }
    }

    /// One line of the on-disk format: a tag followed by its payload.
    pub fn to_line(&self) -> String {
        match self {
            ScheduleStep::SchedulingChoice { scheduled_operation_id } => {
                format!("SC {}", scheduled_operation_id)
            }
            ScheduleStep::NondeterministicChoice { boolean_value, integer_value } => {
                format!("ND {}", Self::payload(*boolean_value, *integer_value))
            }
            ScheduleStep::FairNondeterministicChoice { boolean_value, integer_value } => {
                format!("FND {}", Self::payload(*boolean_value, *integer_value))
            }
        }
    }

    fn payload(boolean_value: Option<bool>, integer_value: Option<u64>) -> String {
        match (boolean_value, integer_value) {
            (Some(b), _) => format!("bool:{}", b),
            (_, Some(i)) => format!("int:{}", i),
            _ => "none".to_string(),
        }
    }

    pub fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(2, ' ');
        let tag = parts.next()?;
        let payload = parts.next()?;

        let parse_nd = |payload: &str| -> (Option<bool>, Option<u64>) {
            if let Some(rest) = payload.strip_prefix("bool:") {
                (rest.parse::<bool>().ok(), None)
            } else if let Some(rest) = payload.strip_prefix("int:") {
                (None, rest.parse::<u64>().ok())
            } else {
                (None, None)
            }
        };

        match tag {
            "SC" => payload.parse::<u64>().ok().map(|id| ScheduleStep::SchedulingChoice {
                scheduled_operation_id: id,
            }),
            "ND" => {
                let (b, i) = parse_nd(payload);
                Some(ScheduleStep::NondeterministicChoice {
                    boolean_value: b,
                    integer_value: i,
                })
            }
            "FND" => {
                let (b, i) = parse_nd(payload);
                Some(ScheduleStep::FairNondeterministicChoice {
                    boolean_value: b,
                    integer_value: i,
                })
            }
            _ => None,
        }
    }
}

/// The prelude of a recorded trace file: everything needed to replay it
/// besides the step sequence itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracePrelude {
    pub strategy: StrategyKind,
    pub seed: u64,
    pub iteration: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub prelude: TracePrelude,
    pub steps: Vec<ScheduleStep>,
}

impl Trace {
    pub fn new(prelude: TracePrelude) -> Self {
        Trace {
            prelude,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: ScheduleStep) {
        self.steps.push(step);
    }

    /// Renders the human-readable on-disk form: a JSON prelude line
    /// followed by one `SC`/`ND`/`FND` line per step.
    pub fn render(&self) -> String {
        let mut out = serde_json::to_string(&self.prelude).unwrap_or_default();
        out.push('\n');
        for step in &self.steps {
            out.push_str(&step.to_line());
            out.push('\n');
        }
        out
    }

    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines();
        let prelude: TracePrelude = serde_json::from_str(lines.next()?).ok()?;
        let steps = lines.filter_map(ScheduleStep::from_line).collect();
        Some(Trace { prelude, steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_round_trips_through_text() {
        let mut trace = Trace::new(TracePrelude {
            strategy: StrategyKind::Random,
            seed: 42,
            iteration: 0,
        });
        trace.push(ScheduleStep::scheduling(OperationId(1)));
        trace.push(ScheduleStep::boolean_choice(true));
        trace.push(ScheduleStep::integer_choice(7));

        let rendered = trace.render();
        let parsed = Trace::parse(&rendered).unwrap();

        assert_eq!(parsed.prelude.seed, 42);
        assert_eq!(parsed.steps, trace.steps);
    }
}
