use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::runtime::operation::{GroupId, OperationId, OperationSnapshot};
use crate::strategy::ExplorationStrategy;

/// PCT-style prioritization: a descending priority list of operation
/// groups, perturbed at a handful of randomly sampled "priority-change
/// points" sampled once per iteration.
pub struct PrioritizationStrategy {
    seed: u64,
    max_priority_changes: u32,
    rng: StdRng,
    priority: Vec<GroupId>,
    change_points: HashSet<u64>,
    steps: u64,
    max_steps: u64,
    shared_state_reduction: bool,
}

impl PrioritizationStrategy {
    pub fn new(seed: u64, max_priority_changes: u32, max_steps: u64, shared_state_reduction: bool) -> Self {
        PrioritizationStrategy {
            seed,
            max_priority_changes,
            rng: StdRng::seed_from_u64(seed),
            priority: Vec::new(),
            change_points: HashSet::new(),
            steps: 0,
            max_steps,
            shared_state_reduction,
        }
    }

    fn resample_change_points(&mut self) {
        self.change_points.clear();
        let count = if self.max_priority_changes == 0 {
            0
        } else {
            self.rng.gen_range(0..=self.max_priority_changes)
        };
        let bound = self.max_steps.max(1);
        for _ in 0..count {
            self.change_points.insert(self.rng.gen_range(0..bound));
        }
    }

    fn absorb_new_groups(&mut self, enabled: &[OperationSnapshot]) {
        for op in enabled {
            if !self.priority.contains(&op.group) {
                let idx = if self.priority.is_empty() {
                    0
                } else {
                    self.rng.gen_range(0..=self.priority.len())
                };
                self.priority.insert(idx, op.group.clone());
            }
        }
    }

    fn demote(&mut self, group: &GroupId) {
        if let Some(pos) = self.priority.iter().position(|g| g == group) {
            let g = self.priority.remove(pos);
            self.priority.push(g);
        }
    }

    fn highest_priority_enabled<'a>(&self, enabled: &'a [OperationSnapshot]) -> Option<&'a GroupId> {
        self.priority.iter().find(|g| enabled.iter().any(|op| &op.group == *g))
    }
}

impl ExplorationStrategy for PrioritizationStrategy {
    fn initialize_iteration(&mut self, _iteration: u64) -> bool {
        self.steps = 0;
        self.priority.clear();
        self.resample_change_points();
        true
    }

    fn next_operation(
        &mut self,
        enabled: &[OperationSnapshot],
        current: Option<OperationId>,
        is_yielding: bool,
    ) -> Option<OperationId> {
        if enabled.is_empty() {
            self.steps += 1;
            return None;
        }

        self.absorb_new_groups(enabled);

        let is_change_point = self.change_points.contains(&self.steps);
        if is_change_point {
            if let Some(group) = self.highest_priority_enabled(enabled).cloned() {
                self.demote(&group);
            }
        } else if !self.shared_state_reduction && is_yielding {
            if let Some(current) = current {
                if let Some(op) = enabled.iter().find(|op| op.id == current) {
                    let group = op.group.clone();
                    self.demote(&group);
                }
            }
        }

        self.steps += 1;

        let group = self.highest_priority_enabled(enabled)?.clone();
        let members: Vec<&OperationSnapshot> = enabled.iter().filter(|op| op.group == group).collect();
        let idx = self.rng.gen_range(0..members.len());
        Some(members[idx].id)
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
        format!(
            "Prioritization(seed={}, max_priority_changes={})",
            self.seed, self.max_priority_changes
        )
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.priority.clear();
        self.change_points.clear();
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;

    fn op(id: u64, group: &ActorId) -> OperationSnapshot {
        OperationSnapshot {
            id: OperationId(id),
            name: format!("op{id}"),
            group: group.clone(),
        }
    }

    #[test]
    fn newly_seen_groups_are_absorbed_into_the_priority_list() {
        let mut strategy = PrioritizationStrategy::new(3, 2, 100, false);
        strategy.initialize_iteration(0);

        let a = ActorId::new("A");
        let b = ActorId::new("B");
        let enabled = vec![op(1, &a), op(2, &b)];

        let chosen = strategy.next_operation(&enabled, None, false);
        assert!(chosen.is_some());
        assert_eq!(strategy.priority.len(), 2);
    }

    #[test]
    fn reset_clears_accumulated_priority_state() {
        let mut strategy = PrioritizationStrategy::new(3, 2, 100, false);
        strategy.initialize_iteration(0);
        let a = ActorId::new("A");
        strategy.next_operation(&[op(1, &a)], None, false);
        assert!(!strategy.priority.is_empty());

        strategy.reset();
        assert!(strategy.priority.is_empty());
    }
}
