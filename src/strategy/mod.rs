//! Pluggable exploration strategies: the policy behind every scheduling
//! decision and every nondeterministic choice.

mod fair_prioritization;
mod prioritization;
mod probabilistic;
mod random;
mod replay;

pub use fair_prioritization::FairPrioritizationStrategy;
pub use prioritization::PrioritizationStrategy;
pub use probabilistic::ProbabilisticStrategy;
pub use random::RandomStrategy;
pub use replay::ReplayStrategy;

use serde::{Deserialize, Serialize};

use crate::runtime::operation::{OperationId, OperationSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    Random,
    Probabilistic,
    Prioritization,
    FairPrioritization,
    Replay,
}

impl StrategyKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Some(StrategyKind::Random),
            "probabilistic" => Some(StrategyKind::Probabilistic),
            "prioritization" | "pct" => Some(StrategyKind::Prioritization),
            "fairprioritization" | "fair_prioritization" => Some(StrategyKind::FairPrioritization),
            "replay" => Some(StrategyKind::Replay),
            _ => None,
        }
    }
}

/// The single interface every exploration policy implements: random,
/// probabilistic, priority-based, and replay strategies are otherwise
/// indistinguishable to the runtime.
pub trait ExplorationStrategy: Send {
    /// Called once per iteration before any scheduling decision. Returning
    /// `false` tells the testing engine to stop running further
    /// iterations (used by `Replay`, which has exactly one trace to
    /// exhaust).
    fn initialize_iteration(&mut self, iteration: u64) -> bool;

    /// Choose the next operation among `enabled`. `current` is the
    /// operation that just yielded (`None` at the very start of an
    /// iteration); `is_yielding` is true when `current` voluntarily gave
    /// up its turn (an `Interleave` point) as opposed to blocking.
    fn next_operation(
        &mut self,
        enabled: &[OperationSnapshot],
        current: Option<OperationId>,
        is_yielding: bool,
    ) -> Option<OperationId>;

    fn next_boolean(&mut self) -> bool;

    fn next_integer(&mut self, max_value: u64) -> u64;

    fn step_count(&self) -> u64;

    fn max_steps_reached(&self) -> bool;

    fn is_fair(&self) -> bool;

    fn description(&self) -> String;

    /// Re-initializes internal state (PRNG, counters, priority lists) so
    /// that a subsequent run from the same seed reproduces the identical
    /// sequence a fresh instance would.
    fn reset(&mut self);

    /// The most recent replay disagreement, if any, as `(expected, actual)`
    /// rendered strings. Only [`ReplayStrategy`] ever returns `Some`; every
    /// other strategy can never diverge from a trace it isn't replaying.
    fn take_mismatch(&mut self) -> Option<(String, String)> {
        None
    }
}
