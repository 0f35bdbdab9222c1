//! The scheduler's private bookkeeping: the operation arena, the
//! per-actor mailboxes, and the monitor registry, all guarded by one
//! runtime lock (see [`crate::runtime::RuntimeInner`]).

use std::collections::HashMap;

use crate::actor::{Actor, ActorId, Envelope, Event, Mailbox, Quiescent, SendOptions};
use crate::error::CoreError;
use crate::monitor::{MonitorDispatch, Temperature};
use crate::runtime::operation::{GroupId, OperationId, OperationRecord, OperationSnapshot, OperationStatus};
use crate::trace::{Trace, TracePrelude};

pub(crate) struct ActorSlot {
    /// `None` only while this actor's own operation thread is mid-turn
    /// and has taken temporary ownership of the behavior to call
    /// `Actor::receive` without holding the runtime lock across it.
    pub actor: Option<Box<dyn Actor>>,
    pub mailbox: Mailbox,
    pub op_id: OperationId,
}

pub(crate) struct MonitorSlot {
    pub monitor: Box<dyn MonitorDispatch>,
    pub temperature: Temperature,
}

/// State shared by every Operation's thread and the driver thread
/// running the scheduling loop. Never reachable except through
/// `RuntimeInner::state`'s mutex.
pub(crate) struct SchedulerState {
    pub actors: HashMap<ActorId, ActorSlot>,
    pub operations: HashMap<OperationId, OperationRecord>,
    pub monitors: HashMap<String, MonitorSlot>,
    next_op_value: u64,
    pub current_op: Option<OperationId>,
    pub step_count: u64,
    pub iteration: u64,
    pub trace: Trace,
    pub terminated: bool,
    pub failure: Option<CoreError>,
    /// Actors awaiting another actor's quiescence (`CreateAndExecute` /
    /// `SendAndExecute`), keyed by the actor being awaited.
    pub quiescence_waiters: HashMap<ActorId, Vec<ActorId>>,
}

impl SchedulerState {
    pub fn new(iteration: u64, prelude: TracePrelude) -> Self {
        SchedulerState {
            actors: HashMap::new(),
            operations: HashMap::new(),
            monitors: HashMap::new(),
            next_op_value: 1,
            current_op: None,
            step_count: 0,
            iteration,
            trace: Trace::new(prelude),
            terminated: false,
            failure: None,
            quiescence_waiters: HashMap::new(),
        }
    }

    /// Wakes every actor waiting on `target`'s quiescence by delivering a
    /// [`Quiescent`] event to each, as an ordinary send. Called once per
    /// `target` whenever it returns from a handler with an empty mailbox,
    /// or halts.
    pub fn notify_quiescence(&mut self, target: &ActorId) {
        let Some(waiters) = self.quiescence_waiters.remove(target) else {
            return;
        };
        for waiter in waiters {
            if let Some(slot) = self.actors.get_mut(&waiter) {
                let _ = slot.mailbox.enqueue(Envelope::new(
                    Event::new(Quiescent(target.clone())),
                    None,
                    Some(target.clone()),
                    SendOptions::default(),
                ));
            }
        }
    }

    pub fn alloc_operation(&mut self, name: String, actor_id: Option<ActorId>) -> OperationId {
        let id = OperationId(self.next_op_value);
        self.next_op_value += 1;
        self.operations.insert(id, OperationRecord::new(id, name, actor_id));
        id
    }

    pub fn mark_completed(&mut self, op_id: OperationId) {
        if let Some(record) = self.operations.get_mut(&op_id) {
            record.status = OperationStatus::Completed;
        }
    }

    /// Whether `actor_id`'s operation currently has something to do:
    /// a dequeue-eligible event, or a registered default handler. An
    /// operation parked in an explicit `receive` is never enabled,
    /// regardless of its actor's mailbox contents.
    fn actor_is_enabled(&self, actor_id: &ActorId) -> bool {
        match self.actors.get(actor_id) {
            None => false,
            Some(slot) => {
                if self
                    .operations
                    .get(&slot.op_id)
                    .map(|op| op.status == OperationStatus::BlockedOnReceive)
                    .unwrap_or(false)
                {
                    return false;
                }
                match &slot.actor {
                    None => true, // mid-turn: was enabled when scheduled, still counts.
                    Some(actor) => {
                        slot.mailbox.has_raised()
                            || (slot.mailbox.has_inbox_messages() && !slot.mailbox.has_receive_filter())
                            || (slot.mailbox.is_empty() && actor.has_default_handler())
                    }
                }
            }
        }
    }

    /// A read-only snapshot the exploration strategy chooses from.
    pub fn enabled_snapshot(&self) -> Vec<OperationSnapshot> {
        self.actors
            .iter()
            .filter(|(id, _)| self.actor_is_enabled(id))
            .map(|(id, slot)| OperationSnapshot {
                id: slot.op_id,
                name: format!("{}", id),
                group: group_of(id),
            })
            .collect()
    }

    pub fn blocked_count(&self) -> usize {
        self.actors
            .iter()
            .filter(|(id, _)| !self.actor_is_enabled(id))
            .count()
    }

    pub fn all_halted(&self) -> bool {
        self.actors.is_empty()
    }
}

fn group_of(id: &ActorId) -> GroupId {
    id.clone()
}
