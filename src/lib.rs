#![crate_name = "actorcheck"]
#![deny(clippy::all)]
#![allow(clippy::new_ret_no_self)]
#![allow(clippy::large_enum_variant)]

//! A deterministic controlled scheduler for actor and hierarchical
//! state-machine programs.
//!
//! Client code describes a population of [`actor::Actor`]s (optionally driven
//! by a [`statemachine`] interpreter) that exchange events through
//! per-actor [`actor::mailbox::Mailbox`]es. A [`runtime::Runtime`] serializes
//! every scheduling decision and every nondeterministic choice behind a
//! pluggable [`strategy::ExplorationStrategy`], so that a whole test
//! iteration is reproducible given only a strategy and a seed.

pub mod actor;
pub mod config;
pub mod error;
pub mod log;
pub mod monitor;
pub mod runtime;
pub mod statemachine;
pub mod strategy;
pub mod trace;

pub use crate::{
    actor::{Actor, ActorId, Event, EventGroup},
    config::Config,
    error::{CoreError, CoreResult},
    runtime::{IterationOutcome, Runtime, TestingEngine},
};
