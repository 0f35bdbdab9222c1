use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::CoreResult;
use crate::runtime::context::Context;

/// A tag type usable as a state identity: a plain value (typically a
/// unit-like enum variant), never discovered by reflection.
pub trait StateKey: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static {}
impl<T> StateKey for T where T: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static {}

pub type EntryExitFn = Arc<dyn Fn(&Context) -> CoreResult<()> + Send + Sync>;

/// What an `ActionHandler`'s body returned: either nothing further, or a
/// request to transition (`RaiseGotoStateEvent`, in the distilled spec's
/// terms). Requesting both a goto and a raise in the same invocation is
/// invariant S1 and is rejected by the interpreter, not by this type.
pub enum ActionEffect<S: StateKey> {
    None,
    Goto(S),
}

#[derive(Clone)]
pub enum HandlerDecl<S: StateKey> {
    ActionHandler(Arc<dyn Fn(&Context, &crate::actor::Event) -> CoreResult<ActionEffect<S>> + Send + Sync>),
    GotoHandler { target: S, exit_lambda: Option<EntryExitFn> },
}

/// Everything known about one state, built explicitly at construction
/// time via [`crate::statemachine::StateMachineBuilder`] — never
/// discovered through runtime type introspection.
pub struct StateDescriptor<S: StateKey> {
    pub(crate) key: S,
    pub(crate) parent: Option<S>,
    pub(crate) start: bool,
    pub(crate) hot: bool,
    pub(crate) cold: bool,
    pub(crate) entry: Option<EntryExitFn>,
    pub(crate) exit: Option<EntryExitFn>,
    pub(crate) handlers: HashMap<TypeId, HandlerDecl<S>>,
    pub(crate) ignore: HashSet<TypeId>,
    /// Names of event types for which a second handler was declared on
    /// this descriptor, surfaced as a build error by
    /// [`crate::statemachine::StateMachineBuilder::build`].
    pub(crate) duplicate_handlers: Vec<&'static str>,
}

impl<S: StateKey> StateDescriptor<S> {
    pub fn new(key: S) -> Self {
        StateDescriptor {
            key,
            parent: None,
            start: false,
            hot: false,
            cold: false,
            entry: None,
            exit: None,
            handlers: HashMap::new(),
            ignore: HashSet::new(),
            duplicate_handlers: Vec::new(),
        }
    }

    fn note_if_duplicate<T: std::any::Any>(&mut self) {
        if self.handlers.contains_key(&TypeId::of::<T>()) {
            self.duplicate_handlers.push(std::any::type_name::<T>());
        }
    }

    pub fn start(mut self) -> Self {
        self.start = true;
        self
    }

    pub fn hot(mut self) -> Self {
        debug_assert!(!self.cold, "a state cannot be both hot and cold");
        self.hot = true;
        self
    }

    pub fn cold(mut self) -> Self {
        debug_assert!(!self.hot, "a state cannot be both hot and cold");
        self.cold = true;
        self
    }

    pub fn parent(mut self, parent: S) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn on_entry<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context) -> CoreResult<()> + Send + Sync + 'static,
    {
        self.entry = Some(Arc::new(f));
        self
    }

    pub fn on_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context) -> CoreResult<()> + Send + Sync + 'static,
    {
        self.exit = Some(Arc::new(f));
        self
    }

    /// Declares an `ActionHandler` for event type `T`. Declaring a second
    /// handler for the same type on the same descriptor is a configuration
    /// error, caught by [`crate::statemachine::StateMachineBuilder::build`].
    pub fn on_event<T, F>(mut self, action: F) -> Self
    where
        T: std::any::Any,
        F: Fn(&Context, &crate::actor::Event) -> CoreResult<ActionEffect<S>> + Send + Sync + 'static,
    {
        self.note_if_duplicate::<T>();
        self.handlers
            .insert(TypeId::of::<T>(), HandlerDecl::ActionHandler(Arc::new(action)));
        self
    }

    pub fn goto_on<T>(mut self, target: S) -> Self
    where
        T: std::any::Any,
    {
        self.note_if_duplicate::<T>();
        self.handlers.insert(
            TypeId::of::<T>(),
            HandlerDecl::GotoHandler { target, exit_lambda: None },
        );
        self
    }

    pub fn goto_on_with_exit<T, F>(mut self, target: S, exit_lambda: F) -> Self
    where
        T: std::any::Any,
        F: Fn(&Context) -> CoreResult<()> + Send + Sync + 'static,
    {
        self.note_if_duplicate::<T>();
        self.handlers.insert(
            TypeId::of::<T>(),
            HandlerDecl::GotoHandler {
                target,
                exit_lambda: Some(Arc::new(exit_lambda)),
            },
        );
        self
    }

    pub fn ignore<T: std::any::Any>(mut self) -> Self {
        self.ignore.insert(TypeId::of::<T>());
        self
    }
}
