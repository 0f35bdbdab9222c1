//! End-to-end scenarios driving the whole runtime: actor creation, event
//! exchange, assertions, explicit receive, monitors, and replay.

use actorcheck::runtime::Context;
use actorcheck::statemachine::{ActionEffect, StateDescriptor, StateMachine, StateMachineBuilder};
use actorcheck::strategy::StrategyKind;
use actorcheck::{Actor, ActorId, Config, CoreError, CoreResult, Event, IterationOutcome, TestingEngine};

#[derive(Debug, Clone, Copy)]
struct Ball;

struct PingActor {
    pong: ActorId,
    remaining: u32,
}

impl Actor for PingActor {
    fn receive(&mut self, ctx: &Context, event: &Event, _sender: Option<ActorId>) -> CoreResult<()> {
        if event.is::<Ball>() {
            if self.remaining == 0 {
                ctx.halt(&self.pong)?;
                let me = ctx.myself().clone();
                ctx.halt(&me)?;
            } else {
                self.remaining -= 1;
                ctx.send(&self.pong, Ball)?;
            }
        }
        Ok(())
    }
}

struct PongActor {
    ping: ActorId,
}

impl Actor for PongActor {
    fn receive(&mut self, ctx: &Context, event: &Event, _sender: Option<ActorId>) -> CoreResult<()> {
        if event.is::<Ball>() {
            ctx.send(&self.ping, Ball)?;
        }
        Ok(())
    }
}

#[test]
fn ping_pong_quiesces_successfully() {
    let mut config = Config::default();
    config.testing_iterations = 1;
    let engine = TestingEngine::new(config);

    // Named ids compare by name alone, so the two actors can each be
    // built with the other's id already in hand before either is created.
    let ping_id = ActorId::named("Ping", "ping");
    let pong_id = ActorId::named("Pong", "pong");

    let outcomes = engine.run(|runtime| {
        runtime
            .create_named("Pong", "pong", PongActor { ping: ping_id.clone() })
            .unwrap();
        let ping = runtime
            .create_named("Ping", "ping", PingActor { pong: pong_id.clone(), remaining: 4 })
            .unwrap();
        runtime.send(&ping, Ball).unwrap();
    });

    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        IterationOutcome::Success { .. } => {}
        IterationOutcome::BugFound { error, .. } => panic!("unexpected bug: {error}"),
    }
}

#[derive(Debug, Clone, Copy)]
struct Kickoff;

struct AsserterActor;

impl Actor for AsserterActor {
    fn receive(&mut self, ctx: &Context, event: &Event, _sender: Option<ActorId>) -> CoreResult<()> {
        if event.is::<Kickoff>() {
            ctx.assert(false, "invariant violated: this handler must never run to completion")?;
        }
        Ok(())
    }
}

#[test]
fn assertion_failure_is_reported_as_a_bug() {
    let mut config = Config::default();
    config.testing_iterations = 1;
    let engine = TestingEngine::new(config);

    let outcomes = engine.run(|runtime| {
        let id = runtime.create(AsserterActor).unwrap();
        runtime.send(&id, Kickoff).unwrap();
    });

    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        IterationOutcome::BugFound { error: CoreError::AssertionFailure { message, .. }, .. } => {
            assert!(message.contains("invariant violated"));
        }
        other => panic!("expected an assertion failure, got {other:?}"),
    }
}

#[derive(Debug, Clone)]
struct NeverSent;

struct WaiterActor;

impl Actor for WaiterActor {
    fn receive(&mut self, ctx: &Context, event: &Event, _sender: Option<ActorId>) -> CoreResult<()> {
        if event.is::<Kickoff>() {
            let _: NeverSent = ctx.receive()?;
        }
        Ok(())
    }
}

#[test]
fn two_actors_awaiting_each_other_deadlock() {
    let mut config = Config::default();
    config.testing_iterations = 1;
    // Rely only on the confirmed-deadlock path, not the wall-clock fallback.
    config.deadlock_timeout_ms = 0;
    let engine = TestingEngine::new(config);

    let outcomes = engine.run(|runtime| {
        let a = runtime.create(WaiterActor).unwrap();
        let b = runtime.create(WaiterActor).unwrap();
        runtime.send(&a, Kickoff).unwrap();
        runtime.send(&b, Kickoff).unwrap();
    });

    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        IterationOutcome::BugFound { error: CoreError::Deadlock { blocked, .. }, .. } => {
            assert_eq!(*blocked, 2);
        }
        other => panic!("expected a confirmed deadlock, got {other:?}"),
    }
}

#[derive(Debug, Clone, Copy)]
struct Tick;

struct LoopingActor {
    remaining: u32,
}

impl Actor for LoopingActor {
    fn receive(&mut self, ctx: &Context, event: &Event, _sender: Option<ActorId>) -> CoreResult<()> {
        if event.is::<Tick>() {
            ctx.monitor("stays-hot", Tick)?;
            if self.remaining == 0 {
                let me = ctx.myself().clone();
                ctx.halt(&me)?;
            } else {
                self.remaining -= 1;
                let me = ctx.myself().clone();
                ctx.send(&me, Tick)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
enum MonitorState {
    Hot,
}

/// A monitor whose sole state is declared hot and never transitions, so
/// its temperature climbs by one on every dispatched `Tick` and never
/// resets — eventually tripping the liveness threshold.
fn always_hot_monitor() -> StateMachine<MonitorState> {
    StateMachineBuilder::new()
        .state(
            StateDescriptor::new(MonitorState::Hot)
                .start()
                .hot()
                .on_event::<Tick, _>(|_ctx, _event| Ok(ActionEffect::None)),
        )
        .build()
        .unwrap()
}

#[test]
fn a_monitor_that_never_cools_reports_a_liveness_violation() {
    let mut config = Config::default();
    config.testing_iterations = 1;
    config.liveness_temperature_threshold = 3;
    let engine = TestingEngine::new(config);

    let outcomes = engine.run(|runtime| {
        runtime.register_monitor("stays-hot", always_hot_monitor());
        let id = runtime.create(LoopingActor { remaining: 50 }).unwrap();
        runtime.send(&id, Tick).unwrap();
    });

    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        IterationOutcome::BugFound { error: CoreError::LivenessViolation { monitor, .. }, .. } => {
            assert_eq!(monitor, "stays-hot");
        }
        other => panic!("expected a liveness violation, got {other:?}"),
    }
}

#[test]
fn replaying_a_recorded_trace_reproduces_the_same_bug() {
    let mut config = Config::default();
    config.testing_iterations = 1;
    config.random_seed = Some(7);
    let engine = TestingEngine::new(config.clone());

    let outcomes = engine.run(|runtime| {
        let id = runtime.create(AsserterActor).unwrap();
        runtime.send(&id, Kickoff).unwrap();
    });
    let original = outcomes.into_iter().next().unwrap();
    assert!(original.is_bug());

    let replay_engine = TestingEngine::new(config);
    let replayed = replay_engine.replay(original.trace().clone(), |runtime| {
        let id = runtime.create(AsserterActor).unwrap();
        runtime.send(&id, Kickoff).unwrap();
    });

    assert!(replayed.is_bug());
    match (&original, &replayed) {
        (
            IterationOutcome::BugFound { error: CoreError::AssertionFailure { message: m1, .. }, .. },
            IterationOutcome::BugFound { error: CoreError::AssertionFailure { message: m2, .. }, .. },
        ) => assert_eq!(m1, m2),
        _ => panic!("both runs should reproduce the same assertion failure"),
    }
}

#[derive(Debug, Clone, Copy)]
struct Unexpected;

struct SilentActor;

impl Actor for SilentActor {
    fn receive(&mut self, _ctx: &Context, _event: &Event, _sender: Option<ActorId>) -> CoreResult<()> {
        Ok(())
    }
}

#[test]
fn a_plain_actor_silently_absorbs_events_it_declares_no_handler_for() {
    // A plain `Actor` (not layered with a `StateMachine`) has no handler
    // table: every event reaches `receive` directly and it decides for
    // itself what to do with it. `UnhandledEvent` is specific to the
    // state-machine interpreter's dispatch, exercised by
    // `src/statemachine/mod.rs`'s own unit tests instead.
    let mut config = Config::default();
    config.testing_iterations = 1;
    let engine = TestingEngine::new(config);

    let outcomes = engine.run(|runtime| {
        let id = runtime.create(SilentActor).unwrap();
        runtime.send(&id, Unexpected).unwrap();
    });

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].is_bug());
}

#[test]
fn strategy_kind_parses_the_config_string() {
    assert_eq!(StrategyKind::parse("fair_prioritization"), Some(StrategyKind::FairPrioritization));
}

#[derive(Debug, Clone, Copy)]
struct Go;

struct RecordingChild {
    log: std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>,
}

impl Actor for RecordingChild {
    fn receive(&mut self, ctx: &Context, event: &Event, _sender: Option<ActorId>) -> CoreResult<()> {
        if event.is::<Go>() {
            self.log.lock().unwrap().push("child");
            let me = ctx.myself().clone();
            ctx.halt(&me)?;
        }
        Ok(())
    }
}

struct SupervisorActor {
    child: ActorId,
    log: std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>,
}

impl Actor for SupervisorActor {
    fn receive(&mut self, ctx: &Context, event: &Event, _sender: Option<ActorId>) -> CoreResult<()> {
        if event.is::<Kickoff>() {
            ctx.send_and_execute(&self.child, Go)?;
            self.log.lock().unwrap().push("supervisor");
        }
        Ok(())
    }
}

#[test]
fn send_and_execute_blocks_the_caller_until_the_target_quiesces() {
    let mut config = Config::default();
    config.testing_iterations = 1;
    let engine = TestingEngine::new(config);

    let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let outcomes = engine.run(|runtime| {
        let child = runtime.create(RecordingChild { log: log.clone() }).unwrap();
        let supervisor = runtime.create(SupervisorActor { child, log: log.clone() }).unwrap();
        runtime.send(&supervisor, Kickoff).unwrap();
    });

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].is_bug(), "unexpected bug: {outcomes:?}");
    assert_eq!(*log.lock().unwrap(), vec!["child", "supervisor"]);
}

struct SpawningSupervisor {
    log: std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>,
}

impl Actor for SpawningSupervisor {
    fn receive(&mut self, ctx: &Context, event: &Event, _sender: Option<ActorId>) -> CoreResult<()> {
        if event.is::<Kickoff>() {
            // `RecordingChild` never receives anything here, so it's
            // already quiescent the instant it's created: this exercises
            // `register_quiescence_interest`'s already-quiescent fast path.
            let _child = ctx.create_and_execute(RecordingChild { log: self.log.clone() })?;
            self.log.lock().unwrap().push("supervisor");
        }
        Ok(())
    }
}

#[test]
fn create_and_execute_returns_immediately_for_an_already_quiescent_child() {
    let mut config = Config::default();
    config.testing_iterations = 1;
    let engine = TestingEngine::new(config);

    let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let outcomes = engine.run(|runtime| {
        let supervisor = runtime.create(SpawningSupervisor { log: log.clone() }).unwrap();
        runtime.send(&supervisor, Kickoff).unwrap();
    });

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].is_bug(), "unexpected bug: {outcomes:?}");
    assert_eq!(*log.lock().unwrap(), vec!["supervisor"]);
}
