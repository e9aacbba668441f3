use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Transport-agnostic domain event.
#[derive(Debug, Clone)]
pub enum TaskDomainEvent {
    Created {
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    },
    Updated {
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    },
    Deleted {
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    },
}

impl TaskDomainEvent {
    /// Owner of the task the event refers to.
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Created { user_id, .. }
            | Self::Updated { user_id, .. }
            | Self::Deleted { user_id, .. } => *user_id,
        }
    }
}
