//! # Actor Context
//!
//! Identifies who is performing an operation. Passed explicitly into every
//! mutating service call rather than read from ambient state, so the audit
//! columns (`created_by`, `changed_by`) are filled in deterministically and
//! tests can pin the actor.

/// The staff member (or system process) performing an operation.
#[derive(Debug, Clone, Default)]
pub struct ActorContext {
    /// Actor identifier stamped on audit columns. `None` records the write
    /// as anonymous rather than failing it.
    pub actor_id: Option<String>,
}

impl ActorContext {
    /// Context for a known staff member.
    pub fn staff(actor_id: impl Into<String>) -> Self {
        ActorContext {
            actor_id: Some(actor_id.into()),
        }
    }

    /// Context with no identified actor.
    pub fn anonymous() -> Self {
        ActorContext { actor_id: None }
    }

    /// The actor id as a borrowed str, for audit column binding.
    pub fn actor(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }
}
