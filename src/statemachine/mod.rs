//! The hierarchical state-machine interpreter layered over `Actor`.

pub mod builder;
pub mod descriptor;

pub use builder::StateMachineBuilder;
pub use descriptor::{ActionEffect, EntryExitFn, HandlerDecl, StateDescriptor, StateKey};

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use crate::actor::{Actor, ActorId, Event, WildCardEvent};
use crate::error::CoreError;
use crate::runtime::context::Context;

/// An actor whose handler is a hierarchical state interpreter. Built
/// exclusively through [`StateMachineBuilder`]; `S` is the machine's
/// author-defined state-identity type.
pub struct StateMachine<S: StateKey> {
    descriptors: HashMap<S, StateDescriptor<S>>,
    stack: Vec<S>,
}

impl<S: StateKey> StateMachine<S> {
    pub fn builder() -> StateMachineBuilder<S> {
        StateMachineBuilder::new()
    }

    /// The state at the top of the push/pop stack.
    pub fn current_state(&self) -> &S {
        self.stack.last().expect("stack is never empty after build()")
    }

    pub(crate) fn is_hot(&self) -> bool {
        self.descriptors
            .get(self.current_state())
            .map(|d| d.hot)
            .unwrap_or(false)
    }

    pub(crate) fn is_cold(&self) -> bool {
        self.descriptors
            .get(self.current_state())
            .map(|d| d.cold)
            .unwrap_or(false)
    }

    fn descriptor(&self, key: &S) -> &StateDescriptor<S> {
        self.descriptors
            .get(key)
            .expect("every reachable state key has a registered descriptor")
    }

    /// Dispatch algorithm, §4.3 steps 1-3: ignore, then handler lookup
    /// walking the *static* parent-inheritance chain of the current
    /// state (S3's fallback), then `UnhandledEvent` on exhaustion. The
    /// push/pop *stack* is mutated only by an executed `GotoHandler`
    /// (pop current, push target) — a deliberate reading of the distilled
    /// spec's ambiguity, recorded in `DESIGN.md`.
    pub fn dispatch(&mut self, ctx: &Context, event: &Event) -> Result<(), CoreError> {
        let type_id = event.type_id();
        let mut lookup_key = self.current_state().clone();

        loop {
            let descriptor = self.descriptor(&lookup_key);
            if descriptor.ignore.contains(&type_id) {
                return Ok(());
            }

            let decl = descriptor
                .handlers
                .get(&type_id)
                .or_else(|| descriptor.handlers.get(&TypeId::of::<WildCardEvent>()))
                .cloned();

            if let Some(decl) = decl {
                return self.run_handler(ctx, event, decl);
            }

            match self.descriptor(&lookup_key).parent.clone() {
                Some(parent) => lookup_key = parent,
                None => {
                    return Err(CoreError::UnhandledEvent {
                        iteration: ctx.current_iteration(),
                        step: ctx.current_step(),
                        actor: ctx.myself().clone(),
                        state: format!("{:?}", self.current_state()),
                        event_type: event.type_name().to_string(),
                    })
                }
            }
        }
    }

    fn run_handler(&mut self, ctx: &Context, event: &Event, decl: HandlerDecl<S>) -> Result<(), CoreError> {
        match decl {
            HandlerDecl::ActionHandler(action) => {
                let effect = action(ctx, event)?;
                match effect {
                    ActionEffect::None => Ok(()),
                    ActionEffect::Goto(target) => {
                        if ctx.did_raise() {
                            return Err(CoreError::AssertionFailure {
                                iteration: ctx.current_iteration(),
                                step: ctx.current_step(),
                                message: format!(
                                    "action for event {} both raised an event and requested a goto to {:?} (S1)",
                                    event.type_name(),
                                    target
                                ),
                            });
                        }
                        self.goto(ctx, target, None)
                    }
                }
            }
            HandlerDecl::GotoHandler { target, exit_lambda } => self.goto(ctx, target, exit_lambda),
        }
    }

    fn goto(&mut self, ctx: &Context, target: S, exit_lambda: Option<EntryExitFn>) -> Result<(), CoreError> {
        let current = self.stack.pop().expect("stack is never empty");
        if let Some(exit) = self.descriptor(&current).exit.clone() {
            exit(ctx)?;
            if ctx.did_raise() {
                return Err(CoreError::AssertionFailure {
                    iteration: ctx.current_iteration(),
                    step: ctx.current_step(),
                    message: format!("exit action of {:?} raised an event (S2)", current),
                });
            }
        }
        if let Some(lambda) = exit_lambda {
            lambda(ctx)?;
        }

        self.stack.push(target.clone());
        if let Some(entry) = self.descriptor(&target).entry.clone() {
            entry(ctx)?;
        }
        Ok(())
    }
}

impl<S: StateKey> Actor for StateMachine<S> {
    fn pre_start(&mut self, ctx: &Context) {
        let start = self.current_state().clone();
        if let Some(entry) = self.descriptor(&start).entry.clone() {
            let _ = entry(ctx);
        }
    }

    fn receive(&mut self, ctx: &Context, event: &Event, _sender: Option<ActorId>) -> Result<(), CoreError> {
        self.dispatch(ctx, event)
    }

    fn ignore_set(&self) -> HashSet<TypeId> {
        self.descriptor(self.current_state()).ignore.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
    enum Light {
        Red,
        Green,
    }

    struct Tick;

    #[test]
    fn exactly_one_start_state_is_required() {
        let builder: StateMachineBuilder<Light> =
            StateMachineBuilder::new().state(StateDescriptor::new(Light::Red));
        assert!(builder.build().is_err());
    }

    #[test]
    fn declaring_a_handler_twice_for_the_same_event_is_a_build_error() {
        let builder: StateMachineBuilder<Light> = StateMachineBuilder::new().state(
            StateDescriptor::new(Light::Red)
                .start()
                .goto_on::<Tick>(Light::Green)
                .on_event::<Tick, _>(|_ctx, _event| Ok(ActionEffect::None)),
        );
        assert!(builder.build().is_err());
    }

    #[test]
    fn goto_pops_and_pushes_the_target_state() {
        let machine: StateMachine<Light> = StateMachineBuilder::new()
            .state(
                StateDescriptor::new(Light::Red)
                    .start()
                    .goto_on::<Tick>(Light::Green),
            )
            .state(StateDescriptor::new(Light::Green))
            .build()
            .unwrap();

        assert_eq!(*machine.current_state(), Light::Red);
    }
}
