use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::runtime::operation::{OperationId, OperationSnapshot};
use crate::strategy::prioritization::PrioritizationStrategy;
use crate::strategy::ExplorationStrategy;

/// Runs [`PrioritizationStrategy`] for the first `max_unfair_steps`, then
/// falls through to uniform random for a "fair tail" so that every
/// Enabled operation is guaranteed to eventually run (the liveness
/// property §8 requires of a fair strategy).
pub struct FairPrioritizationStrategy {
    seed: u64,
    max_unfair_steps: u64,
    unfair: PrioritizationStrategy,
    fair_rng: StdRng,
    steps: u64,
    max_steps: u64,
}

impl FairPrioritizationStrategy {
    pub fn new(seed: u64, max_priority_changes: u32, max_unfair_steps: u64, max_steps: u64) -> Self {
        FairPrioritizationStrategy {
            seed,
            max_unfair_steps,
            unfair: PrioritizationStrategy::new(seed, max_priority_changes, max_unfair_steps, false),
            fair_rng: StdRng::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15),
            steps: 0,
            max_steps,
        }
    }

    fn in_unfair_phase(&self) -> bool {
        self.steps < self.max_unfair_steps
    }
}

impl ExplorationStrategy for FairPrioritizationStrategy {
    fn initialize_iteration(&mut self, iteration: u64) -> bool {
        self.steps = 0;
        self.unfair.initialize_iteration(iteration)
    }

    fn next_operation(
        &mut self,
        enabled: &[OperationSnapshot],
        current: Option<OperationId>,
        is_yielding: bool,
    ) -> Option<OperationId> {
        self.steps += 1;
        if enabled.is_empty() {
            return None;
        }

        if self.in_unfair_phase() {
            self.unfair.next_operation(enabled, current, is_yielding)
        } else {
            let idx = self.fair_rng.gen_range(0..enabled.len());
            Some(enabled[idx].id)
        }
    }

    fn next_boolean(&mut self) -> bool {
        if self.in_unfair_phase() {
            self.unfair.next_boolean()
        } else {
            self.fair_rng.gen_bool(0.5)
        }
    }

    fn next_integer(&mut self, max_value: u64) -> u64 {
        if max_value == 0 {
            return 0;
        }
        if self.in_unfair_phase() {
            self.unfair.next_integer(max_value)
        } else {
            self.fair_rng.gen_range(0..max_value)
        }
    }

    fn step_count(&self) -> u64 {
        self.steps
    }

    fn max_steps_reached(&self) -> bool {
        self.max_steps > 0 && self.steps >= self.max_steps
    }

    fn is_fair(&self) -> bool {
        true
    }

    fn description(&self) -> String {
        format!(
            "FairPrioritization(seed={}, max_unfair_steps={})",
            self.seed, self.max_unfair_steps
        )
    }

    fn reset(&mut self) {
        self.unfair.reset();
        self.fair_rng = StdRng::seed_from_u64(self.seed ^ 0x9E37_79B9_7F4A_7C15);
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;

    fn op(id: u64) -> OperationSnapshot {
        OperationSnapshot {
            id: OperationId(id),
            name: format!("op{id}"),
            group: ActorId::new("T"),
        }
    }

    #[test]
    fn falls_through_to_random_past_the_unfair_bound() {
        let mut strategy = FairPrioritizationStrategy::new(5, 1, 3, 0);
        strategy.initialize_iteration(0);
        let enabled = vec![op(1), op(2), op(3)];

        for _ in 0..3 {
            strategy.next_operation(&enabled, None, false);
        }
        assert!(!strategy.in_unfair_phase());
        assert!(strategy.next_operation(&enabled, None, false).is_some());
    }

    #[test]
    fn reports_itself_as_fair() {
        let strategy = FairPrioritizationStrategy::new(1, 1, 10, 0);
        assert!(strategy.is_fair());
    }
}
