use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::actor::id::ActorId;

/// A correlation token shared by causally related events.
///
/// Propagates from sender to a sent event unless overridden; a raised
/// event always inherits the event-group of the dispatch that raised it
/// (the decided policy for the spec's open question on raise-time group
/// propagation).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventGroup(Uuid);

impl EventGroup {
    pub fn new() -> Self {
        EventGroup(Uuid::new_v4())
    }
}

impl Default for EventGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventGroup({})", self.0)
    }
}

/// An immutable typed message carried through a mailbox or a raise.
///
/// Payloads are type-erased the way the teacher's `AnyMessage` erases a
/// boxed message, since the core must be able to hold events of
/// heterogeneous client-defined types in one inbox.
pub struct Event {
    type_id: TypeId,
    type_name: &'static str,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Event {
    pub fn new<T>(payload: T) -> Self
    where
        T: Any + Send + Sync + fmt::Debug,
    {
        Event {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            payload: Arc::new(payload),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl Clone for Event {
    fn clone(&self) -> Self {
        Event {
            type_id: self.type_id,
            type_name: self.type_name,
            payload: self.payload.clone(),
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({})", self.type_name)
    }
}

/// Dequeueing this event terminates its actor; see the halt sequence in
/// the actor module.
#[derive(Debug, Clone, Copy)]
pub struct HaltEvent;

/// Synthesized by the handler loop when the inbox is empty and a default
/// handler is registered for the current state.
#[derive(Debug, Clone, Copy)]
pub struct DefaultEvent;

/// Not an event type that is ever raised or sent; used only as a handler
/// table lookup key meaning "match any type not otherwise handled".
#[derive(Debug, Clone, Copy)]
pub struct WildCardEvent;

/// Delivered back to the caller of `Context::create_and_execute` /
/// `Context::send_and_execute` once the named actor reaches quiescence
/// (its handler returns with an empty mailbox, or it halts).
#[derive(Debug, Clone)]
pub struct Quiescent(pub ActorId);

/// Per-send options. `must_handle` means it is a bug if this event is
/// ever dropped (unknown target, halted target, or closed mailbox).
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    pub must_handle: bool,
}

impl SendOptions {
    pub fn must_handle() -> Self {
        SendOptions { must_handle: true }
    }
}
