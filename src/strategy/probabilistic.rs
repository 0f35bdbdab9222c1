use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::runtime::operation::{OperationId, OperationSnapshot};
use crate::strategy::ExplorationStrategy;

/// With probability `(1 - 0.5^n)` keeps the current operation (if still
/// Enabled); otherwise picks uniformly at random. `n` is the configured
/// coin-flip count (the spec's `strategyBound`).
pub struct ProbabilisticStrategy {
    seed: u64,
    coin_flips: u32,
    rng: StdRng,
    steps: u64,
    max_steps: u64,
}

impl ProbabilisticStrategy {
    pub fn new(seed: u64, coin_flips: u32, max_steps: u64) -> Self {
        ProbabilisticStrategy {
            seed,
            coin_flips: coin_flips.max(1),
            rng: StdRng::seed_from_u64(seed),
            steps: 0,
            max_steps,
        }
    }

    fn keep_current_probability(&self) -> f64 {
        1.0 - 0.5f64.powi(self.coin_flips as i32)
    }
}

impl ExplorationStrategy for ProbabilisticStrategy {
    fn initialize_iteration(&mut self, _iteration: u64) -> bool {
        self.steps = 0;
        true
    }

    fn next_operation(
        &mut self,
        enabled: &[OperationSnapshot],
        current: Option<OperationId>,
        _is_yielding: bool,
    ) -> Option<OperationId> {
        self.steps += 1;
        if enabled.is_empty() {
            return None;
        }

        if let Some(current) = current {
            if enabled.iter().any(|op| op.id == current)
                && self.rng.gen_bool(self.keep_current_probability())
            {
                return Some(current);
            }
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
        format!("Probabilistic(seed={}, coin_flips={})", self.seed, self.coin_flips)
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: u64) -> OperationSnapshot {
        OperationSnapshot {
            id: OperationId(id),
            name: format!("op{id}"),
            group: crate::actor::ActorId::new("T"),
        }
    }

    #[test]
    fn higher_coin_flip_count_keeps_current_more_often() {
        let enabled = vec![op(1), op(2), op(3)];
        let mut low = ProbabilisticStrategy::new(1, 1, 0);
        let mut high = ProbabilisticStrategy::new(1, 8, 0);

        let mut low_keeps = 0;
        let mut high_keeps = 0;
        for _ in 0..500 {
            if low.next_operation(&enabled, Some(OperationId(1)), false) == Some(OperationId(1)) {
                low_keeps += 1;
            }
            if high.next_operation(&enabled, Some(OperationId(1)), false) == Some(OperationId(1)) {
                high_keeps += 1;
            }
        }

        assert!(high_keeps > low_keeps);
    }
}
