use std::any::{Any, TypeId};
use std::cell::Cell;
use std::fmt::Debug;
use std::sync::Arc;

use crate::actor::{Actor, ActorId, Event, EventGroup, Quiescent, ReceiveFilter, SendOptions};
use crate::error::{CoreError, CoreResult};
use crate::runtime::RuntimeInner;

/// The handle a handler body uses to reach back into the runtime: send,
/// create, raise, request nondeterministic values, assert, and dispatch
/// to a monitor. Borrowed for the duration of one `Actor::receive` call;
/// never stored past it.
pub struct Context {
    pub(crate) inner: Arc<RuntimeInner>,
    pub(crate) actor_id: ActorId,
    pub(crate) group: Option<EventGroup>,
    raised: Cell<bool>,
}

impl Context {
    pub(crate) fn new(inner: Arc<RuntimeInner>, actor_id: ActorId, group: Option<EventGroup>) -> Self {
        Context {
            inner,
            actor_id,
            group,
            raised: Cell::new(false),
        }
    }

    /// Whether `raise` was called anywhere during the current dispatch;
    /// used by the state-machine interpreter to enforce S1/S2.
    pub(crate) fn did_raise(&self) -> bool {
        self.raised.get()
    }

    pub fn current_iteration(&self) -> u64 {
        self.inner.current_iteration()
    }

    pub fn current_step(&self) -> u64 {
        self.inner.current_step()
    }

    /// The id of the actor currently handling an event under this context.
    pub fn myself(&self) -> &ActorId {
        &self.actor_id
    }

    /// The event group flowing through the current dispatch; a raised
    /// event inherits it, per the decided policy in `SPEC_FULL.md` §9.
    pub fn current_group(&self) -> Option<EventGroup> {
        self.group
    }

    pub fn create<A: Actor>(&self, actor: A) -> CoreResult<ActorId> {
        self.inner.create_actor(Box::new(actor), None, None, self.group)
    }

    pub fn create_named<A: Actor>(&self, type_tag: impl Into<String>, name: impl Into<String>, actor: A) -> CoreResult<ActorId> {
        let id = ActorId::named(type_tag, name);
        self.inner.create_actor(Box::new(actor), Some(id), None, self.group)
    }

    pub fn send<T>(&self, target: &ActorId, payload: T) -> CoreResult<()>
    where
        T: std::any::Any + Send + Sync + std::fmt::Debug,
    {
        self.inner.send_event(
            target,
            Event::new(payload),
            self.group,
            Some(self.actor_id.clone()),
            SendOptions::default(),
        )
    }

    pub fn send_with_options<T>(&self, target: &ActorId, payload: T, opts: SendOptions) -> CoreResult<()>
    where
        T: std::any::Any + Send + Sync + std::fmt::Debug,
    {
        self.inner.send_event(
            target,
            Event::new(payload),
            self.group,
            Some(self.actor_id.clone()),
            opts,
        )
    }

    /// Stores `event` in the actor's raised slot (I1); consumed ahead of
    /// the inbox at the top of the next handler-loop iteration.
    pub fn raise<T>(&self, payload: T)
    where
        T: std::any::Any + Send + Sync + std::fmt::Debug,
    {
        self.raised.set(true);
        self.inner.raise_event(&self.actor_id, Event::new(payload), self.group);
    }

    /// Suspends until an inbox event of type `T` is available, per §4.1's
    /// `Receive` scheduling point: if one is already queued it is consumed
    /// without waiting, else the actor's operation enters `BlockedOnReceive`
    /// and the scheduler moves on to other operations until a matching
    /// `send` arrives.
    pub fn receive<T>(&self) -> CoreResult<T>
    where
        T: Any + Send + Sync + Clone + Debug,
    {
        self.receive_matching::<T>(None)
    }

    /// As [`Context::receive`], but only events satisfying `predicate`
    /// complete the wait; non-matching events of type `T` are left in the
    /// inbox for a later dequeue.
    pub fn receive_matching<T>(&self, predicate: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>) -> CoreResult<T>
    where
        T: Any + Send + Sync + Clone + Debug,
    {
        let erased: Option<Arc<dyn Fn(&Event) -> bool + Send + Sync>> = predicate.map(|p| {
            let erased: Arc<dyn Fn(&Event) -> bool + Send + Sync> =
                Arc::new(move |event: &Event| event.downcast_ref::<T>().map(|v| p(v)).unwrap_or(false));
            erased
        });
        let filter = ReceiveFilter::new([(TypeId::of::<T>(), erased)]);
        let envelope = self.inner.receive_event(&self.actor_id, filter)?;
        Ok(envelope
            .event
            .downcast_ref::<T>()
            .cloned()
            .expect("receive filter only matches the type it was installed for"))
    }

    pub fn random_boolean(&self) -> bool {
        self.inner.next_boolean()
    }

    pub fn random_integer(&self, max_value: u64) -> u64 {
        self.inner.next_integer(max_value)
    }

    pub fn assert(&self, predicate: bool, message: impl Into<String>) -> CoreResult<()> {
        if predicate {
            Ok(())
        } else {
            Err(self.inner.assertion_failure(message.into()))
        }
    }

    /// Dispatches `event` to the singleton monitor registered for `name`.
    /// Atomic by construction: the runtime lock is already held by the
    /// calling dispatch, and monitor dispatch itself never yields a
    /// scheduling point.
    pub fn monitor<T>(&self, name: &str, payload: T) -> CoreResult<()>
    where
        T: std::any::Any + Send + Sync + std::fmt::Debug,
    {
        self.inner.dispatch_monitor(name, Event::new(payload))
    }

    /// Creates `actor`, then blocks the caller until it reaches
    /// quiescence (its handler returns with an empty mailbox, or it
    /// halts), delivered back as a synthesized [`Quiescent`] event.
    pub fn create_and_execute<A: Actor>(&self, actor: A) -> CoreResult<ActorId> {
        let id = self.inner.create_actor(Box::new(actor), None, None, self.group)?;
        self.await_quiescent(&id)?;
        Ok(id)
    }

    /// As [`Context::send`], but blocks the caller until `target` reaches
    /// quiescence after handling `payload`.
    pub fn send_and_execute<T>(&self, target: &ActorId, payload: T) -> CoreResult<()>
    where
        T: std::any::Any + Send + Sync + std::fmt::Debug,
    {
        self.send(target, payload)?;
        self.await_quiescent(target)
    }

    fn await_quiescent(&self, target: &ActorId) -> CoreResult<()> {
        if self.inner.register_quiescence_interest(self.actor_id.clone(), target.clone()) {
            return Ok(());
        }
        let wanted = target.clone();
        let _: Quiescent = self.receive_matching(Some(Arc::new(move |q: &Quiescent| q.0 == wanted)))?;
        Ok(())
    }

    /// Requests that `target` halt: enqueues a `HaltEvent`, equivalent to
    /// `send(target, HaltEvent)`.
    pub fn halt(&self, target: &ActorId) -> CoreResult<()> {
        self.inner.send_event(
            target,
            Event::new(crate::actor::HaltEvent),
            self.group,
            Some(self.actor_id.clone()),
            SendOptions::default(),
        )
    }
}
