use crate::actor::ActorId;

/// The scheduler's unit of dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub(crate) u64);

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    None,
    Enabled,
    BlockedOnReceive,
    BlockedOnResource,
    BlockedOnWaitAll,
    BlockedOnWaitAny,
    Delayed,
    Completed,
}

impl OperationStatus {
    pub fn is_enabled(&self) -> bool {
        matches!(self, OperationStatus::Enabled)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            OperationStatus::BlockedOnReceive
                | OperationStatus::BlockedOnResource
                | OperationStatus::BlockedOnWaitAll
                | OperationStatus::BlockedOnWaitAny
        )
    }
}

/// The scheduler's bookkeeping record for one Operation. Owned exclusively
/// by the runtime's operation arena, never shared outside the runtime
/// lock; every Operation thread parks on the single shared
/// `RuntimeInner::scheduler_cv` rather than a condvar of its own — see
/// the "baton pattern" note in `DESIGN.md`.
pub struct OperationRecord {
    pub id: OperationId,
    pub name: String,
    pub status: OperationStatus,
    pub actor_id: Option<ActorId>,
}

impl OperationRecord {
    pub fn new(id: OperationId, name: String, actor_id: Option<ActorId>) -> Self {
        OperationRecord {
            id,
            name,
            status: OperationStatus::None,
            actor_id,
        }
    }
}

/// A read-only view of an operation handed to an [`crate::strategy::ExplorationStrategy`].
#[derive(Debug, Clone)]
pub struct OperationSnapshot {
    pub id: OperationId,
    pub name: String,
    pub group: GroupId,
}

/// A correlation bucket used by priority-based strategies to coalesce
/// operations that should share priority. Grouping by owning actor is the
/// default (and only) policy in this port.
pub type GroupId = ActorId;
