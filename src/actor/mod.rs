//! Actor identity, mailbox semantics, and the per-actor handler loop.

pub mod event;
pub mod id;
pub mod mailbox;

pub use event::{DefaultEvent, Event, EventGroup, HaltEvent, Quiescent, SendOptions, WildCardEvent};
pub use id::ActorId;
pub use mailbox::{Envelope, Mailbox, ReceiveFilter, ReceivePredicate};

use std::any::TypeId;
use std::collections::HashSet;

use crate::error::CoreError;
use crate::runtime::context::Context;

/// Behavior invoked by the runtime's handler loop.
///
/// A plain `Actor` dispatches every event to [`Actor::receive`] directly;
/// an actor layered with a [`crate::statemachine::StateMachine`] instead
/// routes through the interpreter, which itself implements this trait so
/// the runtime doesn't need to distinguish the two at the call site
/// (exactly the way the teacher's hierarchy of `Actor` implementations —
/// plain actors, channels, loggers — share one dispatch contract).
pub trait Actor: Send + 'static {
    /// Invoked once, before the first event is dispatched.
    fn pre_start(&mut self, _ctx: &Context) {}

    /// Invoked once, after the actor has halted.
    fn post_stop(&mut self) {}

    /// Dispatch a single event. `sender` is the id of whichever actor's
    /// `SendEvent` produced this event, if any.
    fn receive(&mut self, ctx: &Context, event: &Event, sender: Option<ActorId>)
        -> Result<(), CoreError>;

    /// The set of event types this actor currently ignores (I4). Checked
    /// fresh before every dequeue, so it may change between dispatches,
    /// e.g. as a state-machine transitions between states.
    fn ignore_set(&self) -> HashSet<TypeId> {
        HashSet::new()
    }

    /// The set of event types this actor currently defers (I5): left in
    /// place in the inbox rather than discarded or dispatched.
    fn defer_set(&self) -> HashSet<TypeId> {
        HashSet::new()
    }

    /// Whether this actor registers a default handler, synthesizing a
    /// [`DefaultEvent`] when the inbox has nothing taken-eligible.
    fn has_default_handler(&self) -> bool {
        false
    }
}
