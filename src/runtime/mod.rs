//! The controlled runtime: operation lifecycle, the scheduling loop, and
//! the driver that runs a whole test iteration to completion.

pub mod context;
pub mod operation;
mod scheduler;

pub use context::Context;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::thread;
use std::time::{Duration, Instant};

use slog::Logger;

use crate::actor::mailbox::DequeueOutcome;
use crate::actor::{
    Actor, ActorId, DefaultEvent, Envelope, Event, EventGroup, HaltEvent, Mailbox, ReceiveFilter, SendOptions,
};
use crate::config::Config;
use crate::error::{panic_message, CoreError, CoreResult};
use crate::log::default_logger;
use crate::monitor::MonitorDispatch;
use crate::runtime::operation::{OperationId, OperationStatus};
use crate::runtime::scheduler::{ActorSlot, MonitorSlot, SchedulerState};
use crate::statemachine::{StateKey, StateMachine};
use crate::strategy::{
    ExplorationStrategy, FairPrioritizationStrategy, PrioritizationStrategy, ProbabilisticStrategy, RandomStrategy,
    ReplayStrategy, StrategyKind,
};
use crate::trace::{ScheduleStep, Trace, TracePrelude};

static NEXT_RUNTIME_TOKEN: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// The outcome of running one test iteration to completion.
#[derive(Debug, Clone)]
pub enum IterationOutcome {
    /// No bug was found; the run quiesced (every actor halted).
    Success { iteration: u64, steps: u64, trace: Trace },
    /// A `CoreError` was raised; carries the trace needed to replay it.
    BugFound { iteration: u64, error: CoreError, trace: Trace },
}

impl IterationOutcome {
    pub fn is_bug(&self) -> bool {
        matches!(self, IterationOutcome::BugFound { .. })
    }

    pub fn trace(&self) -> &Trace {
        match self {
            IterationOutcome::Success { trace, .. } => trace,
            IterationOutcome::BugFound { trace, .. } => trace,
        }
    }
}

/// The runtime's private shared state: one instance lives behind an
/// `Arc` for the duration of a single test iteration. Holds a `Weak`
/// back-reference to itself (built via `Arc::new_cyclic`) so operation
/// threads and `Context`s can be handed a proper `Arc<RuntimeInner>`
/// without the runtime owning a cycle into itself.
pub(crate) struct RuntimeInner {
    token: u64,
    self_weak: Weak<RuntimeInner>,
    state: Mutex<SchedulerState>,
    scheduler_cv: Condvar,
    strategy: Mutex<Box<dyn ExplorationStrategy>>,
    config: Config,
    logger: Logger,
}

impl RuntimeInner {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn self_arc(&self) -> Arc<RuntimeInner> {
        self.self_weak
            .upgrade()
            .expect("RuntimeInner always outlives any Context built from it")
    }

    pub(crate) fn current_iteration(&self) -> u64 {
        self.lock().iteration
    }

    pub(crate) fn current_step(&self) -> u64 {
        self.lock().step_count
    }

    pub(crate) fn next_boolean(&self) -> bool {
        let value = self.strategy.lock().unwrap().next_boolean();
        let mut state = self.lock();
        state.trace.push(ScheduleStep::boolean_choice(value));
        slog::trace!(self.logger, "nondeterministic boolean choice"; "value" => value, "step" => state.step_count);
        value
    }

    pub(crate) fn next_integer(&self, max_value: u64) -> u64 {
        let value = self.strategy.lock().unwrap().next_integer(max_value);
        let mut state = self.lock();
        state.trace.push(ScheduleStep::integer_choice(value));
        slog::trace!(self.logger, "nondeterministic integer choice"; "value" => value, "max" => max_value, "step" => state.step_count);
        value
    }

    pub(crate) fn assertion_failure(&self, message: String) -> CoreError {
        let state = self.lock();
        CoreError::AssertionFailure {
            iteration: state.iteration,
            step: state.step_count,
            message,
        }
    }

    /// Monitor dispatch is synchronous and non-suspending: it runs
    /// entirely inside this one critical section, so no scheduling
    /// point can occur between its entry and exit (§4.4, §5).
    pub(crate) fn dispatch_monitor(&self, name: &str, event: Event) -> CoreResult<()> {
        let threshold = self.config.liveness_temperature_threshold;
        let ctx = Context::new(self.self_arc(), ActorId::named("Monitor", name), None);

        let mut state = self.lock();
        let iteration = state.iteration;
        let step = state.step_count;
        let Some(slot) = state.monitors.get_mut(name) else {
            return Err(CoreError::BadSend {
                iteration,
                step,
                reason: format!("no monitor registered under name {name:?}"),
            });
        };

        let result = slot.monitor.dispatch(&ctx, &event);
        let hot = slot.monitor.is_hot();
        let cold = slot.monitor.is_cold();
        slot.temperature.bump(hot, cold);
        let exceeded = slot.temperature.exceeds(threshold);
        let temperature = slot.temperature.0;
        drop(state);

        result?;
        if exceeded {
            return Err(CoreError::LivenessViolation {
                iteration,
                step,
                monitor: name.to_string(),
                temperature,
                threshold,
            });
        }
        Ok(())
    }

    /// `Create`: allocates (or binds) an id, registers the actor and its
    /// operation, and wakes its operation thread so it becomes schedulable.
    pub(crate) fn create_actor(
        &self,
        actor: Box<dyn Actor>,
        id: Option<ActorId>,
        initial_event: Option<Event>,
        group: Option<EventGroup>,
    ) -> CoreResult<ActorId> {
        let mut id = id.unwrap_or_else(|| ActorId::new("Actor"));

        let mut state = self.lock();
        if id.bind(self.token).is_err() {
            return Err(CoreError::BadCreation {
                iteration: state.iteration,
                step: state.step_count,
                reason: format!("id {id:?} is already bound to a different runtime"),
            });
        }
        if state.actors.contains_key(&id) {
            return Err(CoreError::BadCreation {
                iteration: state.iteration,
                step: state.step_count,
                reason: format!("an actor with id {id:?} already exists"),
            });
        }

        let op_id = state.alloc_operation(format!("{id}"), Some(id.clone()));
        let mut mailbox = Mailbox::new();
        if let Some(event) = initial_event {
            let _ = mailbox.enqueue(Envelope::new(event, group, None, SendOptions::default()));
        }
        state.actors.insert(
            id.clone(),
            ActorSlot {
                actor: Some(actor),
                mailbox,
                op_id,
            },
        );
        // Creation is not itself a scheduling decision and must not appear
        // in the `SchedulingChoice` stream `ReplayStrategy` consumes — only
        // `run_to_completion`'s own choice of `chosen` is recorded.
        drop(state);

        let inner = self.self_arc();
        let actor_id = id.clone();
        thread::spawn(move || operation_loop(inner, op_id, actor_id));

        self.scheduler_cv.notify_all();
        Ok(id)
    }

    /// `SendEvent`: resolves the target, drops if absent or the mailbox
    /// is closed (raising an assertion when `opts.must_handle`), else
    /// enqueues and wakes the target's operation if it was idle.
    pub(crate) fn send_event(
        &self,
        target: &ActorId,
        event: Event,
        group: Option<EventGroup>,
        sender: Option<ActorId>,
        opts: SendOptions,
    ) -> CoreResult<()> {
        let mut state = self.lock();
        let (iteration, step) = (state.iteration, state.step_count);

        let Some(slot) = state.actors.get_mut(target) else {
            drop(state);
            return self.handle_drop(opts, iteration, step, "target actor does not exist");
        };

        let envelope = Envelope::new(event, group, sender, opts);
        let enqueued = slot.mailbox.enqueue(envelope);
        drop(state);

        match enqueued {
            Ok(()) => {
                self.scheduler_cv.notify_all();
                Ok(())
            }
            Err(_dropped) => self.handle_drop(opts, iteration, step, "target mailbox is closed"),
        }
    }

    fn handle_drop(&self, opts: SendOptions, iteration: u64, step: u64, reason: &str) -> CoreResult<()> {
        if opts.must_handle {
            Err(CoreError::AssertionFailure {
                iteration,
                step,
                message: format!("a must-handle event was dropped: {reason}"),
            })
        } else {
            slog::debug!(self.logger, "dropped event"; "reason" => reason);
            Ok(())
        }
    }

    pub(crate) fn raise_event(&self, actor_id: &ActorId, event: Event, group: Option<EventGroup>) {
        let mut state = self.lock();
        if let Some(slot) = state.actors.get_mut(actor_id) {
            slot.mailbox
                .raise(Envelope::new(event, group, Some(actor_id.clone()), SendOptions::default()));
        }
    }

    /// `Receive`: installs `filter` on the actor's mailbox, consuming an
    /// already-queued matching event without waiting; otherwise releases
    /// the scheduling baton, marks the operation `BlockedOnReceive`, and
    /// blocks the calling (operation) thread until `send_event` delivers a
    /// satisfying event.
    pub(crate) fn receive_event(&self, actor_id: &ActorId, filter: ReceiveFilter) -> CoreResult<Envelope> {
        let op_id;
        {
            let mut state = self.lock();
            let slot = state
                .actors
                .get_mut(actor_id)
                .expect("actor exists on the thread handling its own receive");
            slot.mailbox.install_receive_filter(filter);
            if let Some(envelope) = slot.mailbox.try_satisfy_receive() {
                return Ok(envelope);
            }
            op_id = slot.op_id;
            if let Some(op) = state.operations.get_mut(&op_id) {
                op.status = OperationStatus::BlockedOnReceive;
            }
            if state.current_op == Some(op_id) {
                state.current_op = None;
            }
        }
        self.scheduler_cv.notify_all();

        let mut state = self.lock();
        loop {
            if state.terminated {
                return Err(CoreError::AssertionFailure {
                    iteration: state.iteration,
                    step: state.step_count,
                    message: format!("{actor_id:?} was still awaiting a receive when the iteration ended"),
                });
            }
            let satisfied = state
                .actors
                .get_mut(actor_id)
                .and_then(|slot| slot.mailbox.try_satisfy_receive());
            if let Some(envelope) = satisfied {
                if let Some(op) = state.operations.get_mut(&op_id) {
                    op.status = OperationStatus::Enabled;
                }
                return Ok(envelope);
            }
            state = self.scheduler_cv.wait(state).unwrap();
        }
    }

    /// `CreateAndExecute`/`SendAndExecute`: checks whether `target` is
    /// already quiescent (halted, or idle with an empty mailbox and no
    /// outstanding receive), and if not, registers `waiter` to be woken via
    /// a `Quiescent` event once it becomes so. Must run in one critical
    /// section with the check, else a target that quiesces between the
    /// check and the registration would never wake its waiter — in
    /// practice impossible here since `waiter`'s own operation holds the
    /// scheduling baton for the whole call, but resolved properly anyway.
    pub(crate) fn register_quiescence_interest(&self, waiter: ActorId, target: ActorId) -> bool {
        let mut state = self.lock();
        let already_quiescent = match state.actors.get(&target) {
            None => true,
            Some(slot) => slot.mailbox.is_empty() && !slot.mailbox.has_receive_filter(),
        };
        if already_quiescent {
            return true;
        }
        state.quiescence_waiters.entry(target).or_default().push(waiter);
        false
    }

    pub(crate) fn register_monitor<S: StateKey>(&self, name: impl Into<String>, machine: StateMachine<S>) {
        let mut state = self.lock();
        state.monitors.insert(
            name.into(),
            MonitorSlot {
                monitor: Box::new(machine),
                temperature: Default::default(),
            },
        );
    }
}

/// One actor's dedicated operation thread: parks until scheduled, runs
/// exactly one handler-loop iteration (§4.2), then parks again — until
/// halted, at which point the thread exits and the operation is marked
/// Completed.
fn operation_loop(inner: Arc<RuntimeInner>, op_id: OperationId, actor_id: ActorId) {
    loop {
        {
            let mut state = inner.lock();
            while state.current_op != Some(op_id) && !state.terminated {
                state = inner.scheduler_cv.wait(state).unwrap();
            }
            if state.terminated {
                return;
            }
        }

        let halted = run_one_turn(&inner, &actor_id);

        {
            let mut state = inner.lock();
            if state.current_op == Some(op_id) {
                state.current_op = None;
            }
            if halted {
                state.mark_completed(op_id);
            }
        }
        inner.scheduler_cv.notify_all();

        if halted {
            return;
        }
    }
}

/// Whether `actor_id` has reached quiescence right now: its handler has
/// returned, its mailbox is empty, and it isn't mid-`Receive`. Used to
/// decide whether `CreateAndExecute`/`SendAndExecute` waiters should be
/// woken after a turn.
fn is_quiescent(state: &SchedulerState, actor_id: &ActorId) -> bool {
    state
        .actors
        .get(actor_id)
        .map(|slot| slot.mailbox.is_empty() && !slot.mailbox.has_receive_filter())
        .unwrap_or(false)
}

/// Runs exactly one dequeue-and-dispatch cycle for `actor_id` (§4.2
/// steps 1-4). Returns `true` if the actor halted during this turn.
fn run_one_turn(inner: &Arc<RuntimeInner>, actor_id: &ActorId) -> bool {
    let (mut actor, envelope, group) = {
        let mut state = inner.lock();
        let slot = state.actors.get_mut(actor_id).expect("actor exists while its operation is scheduled");
        let mut actor = slot.actor.take().expect("actor is not already mid-turn");

        let ignore = actor.ignore_set();
        let defer = actor.defer_set();
        let (outcome, envelope) = slot.mailbox.dequeue_next(&ignore, &defer);

        let envelope = match (outcome, envelope) {
            (DequeueOutcome::Empty, None) if actor.has_default_handler() => {
                Some(Envelope::new(Event::new(DefaultEvent), None, None, SendOptions::default()))
            }
            (_, envelope) => envelope,
        };

        let group = envelope.as_ref().and_then(|e| e.group);
        (actor, envelope, group)
    };

    let Some(envelope) = envelope else {
        // Nothing taken-eligible this turn; put the actor back untouched
        // and let the scheduler re-evaluate enabled-ness on the next round.
        let mut state = inner.lock();
        state.actors.get_mut(actor_id).unwrap().actor = Some(actor);
        if is_quiescent(&state, actor_id) {
            state.notify_quiescence(actor_id);
        }
        return false;
    };

    if envelope.event.is::<HaltEvent>() {
        actor.post_stop();
        let mut state = inner.lock();
        let mut slot = state.actors.remove(actor_id).expect("actor exists while halting");
        let dropped_count = slot.mailbox.len();
        slot.mailbox.drain_to(|_dropped| {
            slog::debug!(inner.logger, "dropped inbox entry on halt"; "actor" => format!("{actor_id}"));
        });
        slog::debug!(inner.logger, "actor halted"; "actor" => format!("{actor_id}"), "dropped" => dropped_count);
        state.notify_quiescence(actor_id);
        return true;
    }

    let ctx = Context::new(inner.clone(), actor_id.clone(), group);
    let sender = envelope.sender.clone();
    let iteration = inner.current_iteration();
    let step = inner.current_step();

    let result = panic::catch_unwind(AssertUnwindSafe(|| actor.receive(&ctx, &envelope.event, sender)));

    let outcome = match result {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err),
        Err(payload) => Some(CoreError::ActionException {
            iteration,
            step,
            message: panic_message(payload),
        }),
    };

    let mut state = inner.lock();
    if let Some(slot) = state.actors.get_mut(actor_id) {
        slot.actor = Some(actor);
    }
    if is_quiescent(&state, actor_id) {
        state.notify_quiescence(actor_id);
    }
    if let Some(err) = outcome {
        // A failure surfacing here while the iteration was already
        // terminated by the scheduler (e.g. a blocked receive unwound by
        // a confirmed deadlock) must not overwrite the original cause.
        if state.failure.is_none() {
            state.failure = Some(err);
        }
        state.terminated = true;
    }
    false
}

/// A test iteration's handle. Built fresh per iteration by
/// [`TestingEngine`]; client setup code calls [`Runtime::create`] /
/// [`Runtime::register_monitor`] on it, then the engine drives it to
/// completion.
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

impl Runtime {
    fn new(
        config: Config,
        strategy: Box<dyn ExplorationStrategy>,
        logger: Logger,
        iteration: u64,
        seed: u64,
        kind: StrategyKind,
    ) -> Self {
        let prelude = TracePrelude { strategy: kind, seed, iteration };
        let inner = Arc::new_cyclic(|weak| RuntimeInner {
            token: NEXT_RUNTIME_TOKEN.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
            self_weak: weak.clone(),
            state: Mutex::new(SchedulerState::new(iteration, prelude)),
            scheduler_cv: Condvar::new(),
            strategy: Mutex::new(strategy),
            config,
            logger,
        });
        Runtime { inner }
    }

    pub fn create<A: Actor>(&self, actor: A) -> CoreResult<ActorId> {
        self.inner.create_actor(Box::new(actor), None, None, None)
    }

    pub fn create_named<A: Actor>(&self, type_tag: impl Into<String>, name: impl Into<String>, actor: A) -> CoreResult<ActorId> {
        let id = ActorId::named(type_tag, name);
        self.inner.create_actor(Box::new(actor), Some(id), None, None)
    }

    pub fn send<T>(&self, target: &ActorId, payload: T) -> CoreResult<()>
    where
        T: std::any::Any + Send + Sync + std::fmt::Debug,
    {
        self.inner.send_event(target, Event::new(payload), None, None, SendOptions::default())
    }

    pub fn register_monitor<S: StateKey>(&self, name: impl Into<String>, machine: StateMachine<S>) {
        self.inner.register_monitor(name, machine)
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Drives the scheduling loop on the calling thread until every
    /// actor has halted, a confirmed deadlock is found, a step bound is
    /// hit, or a `CoreError` was raised by some operation's handler.
    pub fn run_to_completion(&self) -> IterationOutcome {
        let deadline = if self.inner.config.deadlock_timeout_ms > 0 {
            Some(Duration::from_millis(self.inner.config.deadlock_timeout_ms))
        } else {
            None
        };

        loop {
            let mut state = self.inner.lock();
            if state.terminated || state.all_halted() {
                break;
            }

            let enabled = state.enabled_snapshot();
            if enabled.is_empty() {
                let blocked = state.blocked_count();
                if blocked == 0 {
                    break;
                }
                state.failure = Some(CoreError::Deadlock {
                    iteration: state.iteration,
                    step: state.step_count,
                    blocked,
                });
                state.terminated = true;
                break;
            }

            let current = state.current_op;
            drop(state);

            let chosen = {
                let mut strategy = self.inner.strategy.lock().unwrap();
                strategy.next_operation(&enabled, current, current.is_some())
            };

            let mut state = self.inner.lock();
            let Some(chosen) = chosen else {
                let mut strategy = self.inner.strategy.lock().unwrap();
                if let Some((expected, actual)) = strategy.take_mismatch() {
                    state.failure = Some(CoreError::ReplayMismatch {
                        step: state.step_count,
                        expected,
                        actual,
                    });
                } else {
                    let hit_bound = strategy.max_steps_reached();
                    if hit_bound && self.inner.config.consider_depth_bound_hit_as_bug {
                        state.failure = Some(CoreError::Deadlock {
                            iteration: state.iteration,
                            step: state.step_count,
                            blocked: state.blocked_count(),
                        });
                    }
                }
                state.terminated = true;
                break;
            };

            state.step_count += 1;
            state.trace.push(ScheduleStep::scheduling(chosen));
            state.current_op = Some(chosen);
            self.inner.scheduler_cv.notify_all();

            let wait_started = Instant::now();
            loop {
                if state.current_op != Some(chosen) || state.terminated {
                    break;
                }
                let (next_state, timeout) = self
                    .inner
                    .scheduler_cv
                    .wait_timeout(state, Duration::from_millis(200))
                    .unwrap();
                state = next_state;
                if let Some(deadline) = deadline {
                    if timeout.timed_out() && wait_started.elapsed() >= deadline {
                        if self.inner.config.report_potential_deadlocks_as_bugs {
                            state.failure = Some(CoreError::PotentialDeadlock {
                                iteration: state.iteration,
                                step: state.step_count,
                                timeout_ms: self.inner.config.deadlock_timeout_ms,
                            });
                        }
                        state.terminated = true;
                        break;
                    }
                }
            }
        }

        let mut state = self.inner.lock();
        state.terminated = true;
        drop(state);
        self.inner.scheduler_cv.notify_all();

        let state = self.inner.lock();
        let iteration = state.iteration;
        let steps = state.step_count;
        let trace = Trace {
            prelude: state.trace.prelude.clone(),
            steps: state.trace.steps.clone(),
        };
        let failure = state.failure.clone();
        drop(state);

        match failure {
            Some(error) => IterationOutcome::BugFound { iteration, error, trace },
            None => IterationOutcome::Success { iteration, steps, trace },
        }
    }
}

/// Builds fresh [`Runtime`]s and drives `testingIterations` (or a
/// wall-clock timeout) worth of them, reporting bugs as they're found.
pub struct TestingEngine {
    config: Config,
    logger: Logger,
}

impl TestingEngine {
    pub fn new(config: Config) -> Self {
        let logger = default_logger(&config.log.level, &config.log.module_filter);
        TestingEngine { config, logger }
    }

    pub fn with_logger(config: Config, logger: Logger) -> Self {
        TestingEngine { config, logger }
    }

    fn build_strategy(&self, iteration: u64) -> (Box<dyn ExplorationStrategy>, u64) {
        let seed = self.config.random_seed.unwrap_or(iteration.wrapping_mul(0x9E37_79B9) ^ 0xA5A5_A5A5);
        let strategy: Box<dyn ExplorationStrategy> = match self.config.strategy {
            StrategyKind::Random => Box::new(RandomStrategy::new(seed, self.config.max_unfair_scheduling_steps)),
            StrategyKind::Probabilistic => Box::new(ProbabilisticStrategy::new(
                seed,
                self.config.strategy_bound.max(1),
                self.config.max_unfair_scheduling_steps,
            )),
            StrategyKind::Prioritization => Box::new(PrioritizationStrategy::new(
                seed,
                self.config.strategy_bound,
                self.config.max_unfair_scheduling_steps,
                self.config.is_shared_state_reduction_enabled,
            )),
            StrategyKind::FairPrioritization => Box::new(FairPrioritizationStrategy::new(
                seed,
                self.config.strategy_bound,
                self.config.max_unfair_scheduling_steps,
                self.config.max_fair_scheduling_steps,
            )),
            StrategyKind::Replay => {
                panic!("the Replay strategy is driven through TestingEngine::replay, not run()")
            }
        };
        (strategy, seed)
    }

    /// Runs `testingIterations` fresh iterations, each set up by calling
    /// `setup(&runtime)` once before driving it to completion. Stops
    /// early on the first bug unless `runTestIterationsToCompletion`.
    pub fn run<F>(&self, setup: F) -> Vec<IterationOutcome>
    where
        F: Fn(&Runtime) + Send + Sync,
    {
        let mut outcomes = Vec::new();
        let deadline = if self.config.testing_timeout_seconds > 0 {
            Some(Instant::now() + Duration::from_secs(self.config.testing_timeout_seconds as u64))
        } else {
            None
        };

        for iteration in 0..self.config.testing_iterations {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    break;
                }
            }

            let (mut strategy, seed) = self.build_strategy(iteration);
            if !strategy.initialize_iteration(iteration) {
                break;
            }

            let runtime = Runtime::new(
                self.config.clone(),
                strategy,
                self.logger.clone(),
                iteration,
                seed,
                self.config.strategy,
            );
            setup(&runtime);
            let outcome = runtime.run_to_completion();

            let is_bug = outcome.is_bug();
            slog::info!(
                self.logger,
                "iteration complete";
                "iteration" => iteration,
                "bug" => is_bug,
            );
            outcomes.push(outcome);

            if is_bug && !self.config.run_test_iterations_to_completion {
                break;
            }
        }

        outcomes
    }

    /// Replays a previously recorded trace: `setup` must reconstruct the
    /// exact same initial actor population as the run that produced it.
    pub fn replay<F>(&self, trace: Trace, setup: F) -> IterationOutcome
    where
        F: Fn(&Runtime),
    {
        let iteration = trace.prelude.iteration;
        let seed = trace.prelude.seed;
        let strategy: Box<dyn ExplorationStrategy> = Box::new(ReplayStrategy::new(trace));
        let runtime = Runtime::new(self.config.clone(), strategy, self.logger.clone(), iteration, seed, StrategyKind::Replay);
        setup(&runtime);
        runtime.run_to_completion()
    }
}
