use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ACTOR_VALUE: AtomicU64 = AtomicU64::new(1);

/// Value identity of an actor.
///
/// Two ids compare equal iff either both carry a name and the names match
/// (name-as-identity mode), or both carry no name and their numeric values
/// match (numeric mode). An id created with [`ActorId::unbound`] has no
/// owning runtime until [`ActorId::bind`] is called on it; binding is a
/// one-shot operation enforced by `runtime_token` going from `None` to
/// `Some`.
///
/// The back-reference to the owning runtime is a plain token (the
/// runtime's own monotonic instance id), not an owning pointer or an
/// `Arc`/`Weak` cycle — see the "cyclic references" re-architecture note:
/// cross-references in this port are indices, never owning pointers.
#[derive(Clone)]
pub struct ActorId {
    pub(crate) value: u64,
    pub(crate) type_tag: String,
    pub(crate) name: Option<String>,
    pub(crate) runtime_token: Option<u64>,
}

impl ActorId {
    /// Allocates a fresh numeric-identity id, unbound to any runtime.
    pub fn new(type_tag: impl Into<String>) -> Self {
        ActorId {
            value: NEXT_ACTOR_VALUE.fetch_add(1, Ordering::Relaxed),
            type_tag: type_tag.into(),
            name: None,
            runtime_token: None,
        }
    }

    /// Allocates a fresh name-identity id, unbound to any runtime.
    pub fn named(type_tag: impl Into<String>, name: impl Into<String>) -> Self {
        ActorId {
            value: NEXT_ACTOR_VALUE.fetch_add(1, Ordering::Relaxed),
            type_tag: type_tag.into(),
            name: Some(name.into()),
            runtime_token: None,
        }
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn is_bound(&self) -> bool {
        self.runtime_token.is_some()
    }

    /// Binds this id to a runtime instance, exactly once.
    ///
    /// Returns `Err` (the id is left unchanged) if already bound to a
    /// *different* runtime token; binding twice to the same token is a
    /// harmless no-op, matching idempotent re-registration during restart.
    pub(crate) fn bind(&mut self, token: u64) -> Result<(), ()> {
        match self.runtime_token {
            None => {
                self.runtime_token = Some(token);
                Ok(())
            }
            Some(existing) if existing == token => Ok(()),
            Some(_) => Err(()),
        }
    }

    pub(crate) fn runtime_token(&self) -> Option<u64> {
        self.runtime_token
    }
}

impl PartialEq for ActorId {
    fn eq(&self, other: &Self) -> bool {
        match (&self.name, &other.name) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.value == other.value,
            _ => false,
        }
    }
}

impl Eq for ActorId {}

impl std::hash::Hash for ActorId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match &self.name {
            Some(name) => name.hash(state),
            None => self.value.hash(state),
        }
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "ActorId({}:{})", self.type_tag, name),
            None => write!(f, "ActorId({}:#{})", self.type_tag, self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_compare_by_value() {
        let a = ActorId::new("Worker");
        let b = a.clone();
        assert_eq!(a, b);

        let c = ActorId::new("Worker");
        assert_ne!(a, c);
    }

    #[test]
    fn named_ids_compare_by_name() {
        let a = ActorId::named("Worker", "w1");
        let b = ActorId::named("Worker", "w1");
        assert_eq!(a, b, "same name should compare equal even with different numeric values");
    }

    #[test]
    fn mixed_mode_ids_never_match() {
        let named = ActorId::named("Worker", "w1");
        let numeric = ActorId::new("Worker");
        assert_ne!(named, numeric);
    }

    #[test]
    fn bind_is_one_shot() {
        let mut id = ActorId::new("Worker");
        assert!(id.bind(7).is_ok());
        assert!(id.bind(7).is_ok(), "rebinding to the same token is a no-op");
        assert!(id.bind(8).is_err(), "binding to a different runtime must fail");
    }
}
