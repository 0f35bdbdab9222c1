use std::collections::HashMap;

use crate::statemachine::descriptor::{StateDescriptor, StateKey};
use crate::statemachine::StateMachine;

/// Assembles a [`StateMachine`] from explicitly authored
/// [`StateDescriptor`]s. Mirrors the teacher's `Props`/factory-argument
/// builders: every state is a value constructed by the machine's author,
/// never discovered by reflection.
pub struct StateMachineBuilder<S: StateKey> {
    descriptors: HashMap<S, StateDescriptor<S>>,
}

impl<S: StateKey> StateMachineBuilder<S> {
    pub fn new() -> Self {
        StateMachineBuilder {
            descriptors: HashMap::new(),
        }
    }

    /// Registers a state, replacing any earlier descriptor with the same
    /// key.
    pub fn state(mut self, descriptor: StateDescriptor<S>) -> Self {
        self.descriptors.insert(descriptor.key.clone(), descriptor);
        self
    }

    /// Validates exactly one start state is declared and builds the
    /// machine with its stack initialized to that state.
    pub fn build(self) -> Result<StateMachine<S>, String> {
        let starts: Vec<&S> = self
            .descriptors
            .values()
            .filter(|d| d.start)
            .map(|d| &d.key)
            .collect();

        let start = match starts.as_slice() {
            [one] => (*one).clone(),
            [] => return Err("state machine must declare exactly one start state, found none".to_string()),
            _ => {
                return Err(format!(
                    "state machine must declare exactly one start state, found {}",
                    starts.len()
                ))
            }
        };

        for descriptor in self.descriptors.values() {
            if let Some(parent) = &descriptor.parent {
                if !self.descriptors.contains_key(parent) {
                    return Err(format!(
                        "state {:?} declares parent {:?}, which is not registered",
                        descriptor.key, parent
                    ));
                }
            }
            if !descriptor.duplicate_handlers.is_empty() {
                return Err(format!(
                    "state {:?} declares more than one handler for event type(s): {}",
                    descriptor.key,
                    descriptor.duplicate_handlers.join(", ")
                ));
            }
        }

        Ok(StateMachine {
            descriptors: self.descriptors,
            stack: vec![start],
        })
    }
}

impl<S: StateKey> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
