use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::actor::event::{Event, EventGroup, SendOptions};
use crate::actor::id::ActorId;

/// One entry in a mailbox's inbox: the event itself, its event group, and
/// delivery metadata (sender, must-handle).
#[derive(Clone)]
pub struct Envelope {
    pub event: Event,
    pub group: Option<EventGroup>,
    pub sender: Option<ActorId>,
    pub must_handle: bool,
}

impl Envelope {
    pub fn new(event: Event, group: Option<EventGroup>, sender: Option<ActorId>, opts: SendOptions) -> Self {
        Envelope {
            event,
            group,
            sender,
            must_handle: opts.must_handle,
        }
    }
}

/// A predicate gating which instances of an accepted type satisfy a
/// pending [`receive`](Mailbox::install_receive_filter).
pub type ReceivePredicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// The filter installed while a handler is suspended in an explicit
/// receive. At most one may be outstanding per actor (I2); installing a
/// second while one is active is a caller bug, not something `Mailbox`
/// silently tolerates.
#[derive(Clone, Default)]
pub struct ReceiveFilter {
    matchers: HashMap<TypeId, Option<ReceivePredicate>>,
}

impl ReceiveFilter {
    pub fn new(types: impl IntoIterator<Item = (TypeId, Option<ReceivePredicate>)>) -> Self {
        ReceiveFilter {
            matchers: types.into_iter().collect(),
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self.matchers.get(&event.type_id()) {
            Some(Some(predicate)) => predicate(event),
            Some(None) => true,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DequeueOutcome {
    /// A raised event was taken; it bypasses the inbox entirely (I1).
    Raised,
    /// An ordinary inbox event was taken.
    Dequeued,
    /// The inbox is empty (or contains only deferred events) and no
    /// default handler applies; there is nothing left to dispatch.
    Empty,
}

/// Per-actor FIFO of pending events plus at-most-one raised event.
///
/// Enqueue/dequeue are expected to run under the runtime lock (the same
/// lock the scheduler holds across a scheduling-visible step), so the
/// mailbox itself does not need its own synchronization primitives; it is
/// plain owned state, the same way the teacher's `Mailbox` is exclusively
/// owned by its `Actor`.
pub struct Mailbox {
    inbox: VecDeque<Envelope>,
    raised: Option<Envelope>,
    receive_filter: Option<ReceiveFilter>,
    closed: bool,
}

impl Mailbox {
    pub fn new() -> Self {
        Mailbox {
            inbox: VecDeque::new(),
            raised: None,
            receive_filter: None,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    /// (I3) a closed mailbox silently drops enqueues.
    pub fn enqueue(&mut self, envelope: Envelope) -> Result<(), Envelope> {
        if self.closed {
            return Err(envelope);
        }
        self.inbox.push_back(envelope);
        Ok(())
    }

    /// (I1) raised events take priority; at most one may be outstanding —
    /// a second `raise` before the first is consumed replaces it, since
    /// S1 already forbids an action from raising twice in one invocation,
    /// so in practice this path is only ever hit once per dispatch.
    pub fn raise(&mut self, envelope: Envelope) {
        self.raised = Some(envelope);
    }

    pub fn has_raised(&self) -> bool {
        self.raised.is_some()
    }

    pub fn has_inbox_messages(&self) -> bool {
        !self.inbox.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.raised.is_none() && self.inbox.is_empty()
    }

    pub fn install_receive_filter(&mut self, filter: ReceiveFilter) {
        debug_assert!(
            self.receive_filter.is_none(),
            "at most one outstanding receive filter per actor (I2)"
        );
        self.receive_filter = Some(filter);
    }

    pub fn clear_receive_filter(&mut self) {
        self.receive_filter = None;
    }

    pub fn has_receive_filter(&self) -> bool {
        self.receive_filter.is_some()
    }

    /// Scans the inbox in insertion order for an entry satisfying the
    /// installed receive filter, without waiting. Used both for the
    /// "already queued" fast path of `receive` and, after any enqueue,
    /// to check whether a blocked receiver should become enabled again.
    pub fn try_satisfy_receive(&mut self) -> Option<Envelope> {
        let filter = self.receive_filter.as_ref()?;
        let pos = self
            .inbox
            .iter()
            .position(|envelope| filter.matches(&envelope.event))?;
        let envelope = self.inbox.remove(pos).unwrap();
        self.receive_filter = None;
        Some(envelope)
    }

    /// Implements the handler-loop dequeue algorithm (§4.2 steps 1-2):
    /// raised event first (unless ignored), then the first inbox event
    /// that is neither deferred nor ignored, leaving deferred events in
    /// place (I5) and silently discarding ignored ones (I4).
    pub fn dequeue_next(
        &mut self,
        ignore: &HashSet<TypeId>,
        defer: &HashSet<TypeId>,
    ) -> (DequeueOutcome, Option<Envelope>) {
        while let Some(envelope) = self.raised.take() {
            if ignore.contains(&envelope.event.type_id()) {
                continue;
            }
            return (DequeueOutcome::Raised, Some(envelope));
        }

        let mut pos = 0;
        while pos < self.inbox.len() {
            let type_id = self.inbox[pos].event.type_id();
            if defer.contains(&type_id) {
                pos += 1;
                continue;
            }
            let envelope = self.inbox.remove(pos).unwrap();
            if ignore.contains(&type_id) {
                // Discarded, not redelivered; keep scanning from the same
                // position since the remainder shifted left by one.
                continue;
            }
            return (DequeueOutcome::Dequeued, Some(envelope));
        }

        (DequeueOutcome::Empty, None)
    }

    /// Drains the remaining inbox, invoking `on_drop` for each entry; used
    /// by the halt sequence (§4.2) to pass every leftover message through
    /// the drop-notification path before closing.
    pub fn drain_to<F: FnMut(Envelope)>(&mut self, mut on_drop: F) {
        if let Some(raised) = self.raised.take() {
            on_drop(raised);
        }
        while let Some(envelope) = self.inbox.pop_front() {
            on_drop(envelope);
        }
    }

    pub fn len(&self) -> usize {
        self.inbox.len() + self.raised.is_some() as usize
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::event::HaltEvent;

    fn env(n: u32) -> Envelope {
        Envelope::new(Event::new(n), None, None, SendOptions::default())
    }

    #[test]
    fn fifo_per_pair() {
        let mut mbox = Mailbox::new();
        mbox.enqueue(env(1)).unwrap();
        mbox.enqueue(env(2)).unwrap();
        mbox.enqueue(env(3)).unwrap();

        let empty_set = HashSet::new();
        let (_, a) = mbox.dequeue_next(&empty_set, &empty_set);
        let (_, b) = mbox.dequeue_next(&empty_set, &empty_set);
        let (_, c) = mbox.dequeue_next(&empty_set, &empty_set);

        assert_eq!(*a.unwrap().event.downcast_ref::<u32>().unwrap(), 1);
        assert_eq!(*b.unwrap().event.downcast_ref::<u32>().unwrap(), 2);
        assert_eq!(*c.unwrap().event.downcast_ref::<u32>().unwrap(), 3);
    }

    #[test]
    fn raised_takes_priority_over_inbox() {
        let mut mbox = Mailbox::new();
        mbox.enqueue(env(1)).unwrap();
        mbox.raise(Envelope::new(Event::new("raised"), None, None, SendOptions::default()));

        let empty_set = HashSet::new();
        let (outcome, taken) = mbox.dequeue_next(&empty_set, &empty_set);
        assert_eq!(outcome, DequeueOutcome::Raised);
        assert_eq!(*taken.unwrap().event.downcast_ref::<&str>().unwrap(), "raised");

        let (outcome, taken) = mbox.dequeue_next(&empty_set, &empty_set);
        assert_eq!(outcome, DequeueOutcome::Dequeued);
        assert_eq!(*taken.unwrap().event.downcast_ref::<u32>().unwrap(), 1);
    }

    #[test]
    fn deferred_events_are_retained_not_reordered() {
        let mut mbox = Mailbox::new();
        mbox.enqueue(env(1)).unwrap();
        mbox.enqueue(env(2)).unwrap();

        let empty_set = HashSet::new();
        let mut defer = HashSet::new();
        defer.insert(TypeId::of::<u32>());

        // Both events are u32 and deferred: nothing should be eligible.
        let (outcome, taken) = mbox.dequeue_next(&empty_set, &defer);
        assert_eq!(outcome, DequeueOutcome::Empty);
        assert!(taken.is_none());
        assert_eq!(mbox.len(), 2, "deferred events stay in place");

        defer.clear();
        let (outcome, taken) = mbox.dequeue_next(&empty_set, &defer);
        assert_eq!(outcome, DequeueOutcome::Dequeued);
        assert_eq!(*taken.unwrap().event.downcast_ref::<u32>().unwrap(), 1);
    }

    #[test]
    fn ignored_events_are_discarded_at_dequeue() {
        let mut mbox = Mailbox::new();
        mbox.enqueue(env(1)).unwrap();
        mbox.enqueue(Envelope::new(Event::new("real"), None, None, SendOptions::default()))
            .unwrap();

        let mut ignore = HashSet::new();
        ignore.insert(TypeId::of::<u32>());
        let defer = HashSet::new();

        let (outcome, taken) = mbox.dequeue_next(&ignore, &defer);
        assert_eq!(outcome, DequeueOutcome::Dequeued);
        assert_eq!(*taken.unwrap().event.downcast_ref::<&str>().unwrap(), "real");
    }

    #[test]
    fn closed_mailbox_drops_enqueues() {
        let mut mbox = Mailbox::new();
        mbox.close();
        assert!(mbox.enqueue(env(1)).is_err());
    }

    #[test]
    fn halt_event_is_an_ordinary_dequeue() {
        let mut mbox = Mailbox::new();
        mbox.enqueue(Envelope::new(Event::new(HaltEvent), None, None, SendOptions::default()))
            .unwrap();
        let empty = HashSet::new();
        let (outcome, taken) = mbox.dequeue_next(&empty, &empty);
        assert_eq!(outcome, DequeueOutcome::Dequeued);
        assert!(taken.unwrap().event.is::<HaltEvent>());
    }
}
