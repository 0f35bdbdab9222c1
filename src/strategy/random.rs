use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::runtime::operation::{OperationId, OperationSnapshot};
use crate::strategy::ExplorationStrategy;

/// Uniform over Enabled, stateless apart from a seeded PRNG and step
/// counter.
pub struct RandomStrategy {
    seed: u64,
    rng: StdRng,
    steps: u64,
    max_steps: u64,
}

impl RandomStrategy {
    pub fn new(seed: u64, max_steps: u64) -> Self {
        RandomStrategy {
            seed,
            rng: StdRng::seed_from_u64(seed),
            steps: 0,
            max_steps,
        }
    }
}

impl ExplorationStrategy for RandomStrategy {
    fn initialize_iteration(&mut self, _iteration: u64) -> bool {
        self.steps = 0;
        true
    }

    fn next_operation(
        &mut self,
        enabled: &[OperationSnapshot],
        _current: Option<OperationId>,
        _is_yielding: bool,
    ) -> Option<OperationId> {
        self.steps += 1;
        if enabled.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..enabled.len());
        Some(enabled[idx].id)
    }

    fn next_boolean(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn next_integer(&mut self, max_value: u64) -> u64 {
        if max_value == 0 {
            0
        } else {
            self.rng.gen_range(0..max_value)
        }
    }

    fn step_count(&self) -> u64 {
        self.steps
    }

    fn max_steps_reached(&self) -> bool {
        self.max_steps > 0 && self.steps >= self.max_steps
    }

    fn is_fair(&self) -> bool {
        false
    }

    fn description(&self) -> String {
        format!("Random(seed={})", self.seed)
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_reproduces_the_same_sequence() {
        let mut a = RandomStrategy::new(7, 0);
        let seq_a: Vec<u64> = (0..20).map(|_| a.next_integer(1000)).collect();

        a.reset();
        let seq_b: Vec<u64> = (0..20).map(|_| a.next_integer(1000)).collect();

        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn same_seed_two_instances_match() {
        let mut a = RandomStrategy::new(99, 0);
        let mut b = RandomStrategy::new(99, 0);
        for _ in 0..50 {
            assert_eq!(a.next_boolean(), b.next_boolean());
        }
    }
}
