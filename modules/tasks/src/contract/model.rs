use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// A user-owned unit of work. Ids and timestamps are store-assigned;
/// `user_id` is immutable and always the creating caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub completed: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a caller supplies when creating a task. Everything else
/// (id, owner, completion flag, timestamps) is assigned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
}

/// Partial update: `None` leaves the stored value unchanged, `Some`
/// overwrites it, including explicit `false` / empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

/// Write-side timestamp: `Server` tells the storage adapter to fill the
/// value from its own clock; `At` carries a caller-supplied instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stamp {
    Server,
    At(DateTime<Utc>),
}

impl Stamp {
    /// Materialize against the store clock.
    pub fn resolve(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Stamp::Server => now,
            Stamp::At(t) => t,
        }
    }

    /// Materialize against the store clock, never going below `floor`.
    /// Keeps `updated_at` monotonically non-decreasing across mutations.
    pub fn resolve_monotonic(self, now: DateTime<Utc>, floor: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Stamp::Server => now.max(floor),
            Stamp::At(t) => t,
        }
    }
}

/// Fully-formed write payload handed to the repository on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub completed: bool,
    pub user_id: Uuid,
    pub created_at: Stamp,
    pub updated_at: Stamp,
}

/// One full-state delivery of a user's task set, ordered ascending by due
/// date. Ties between equal due dates follow insertion order (stable but
/// otherwise unspecified); callers must not rely on it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    pub tasks: Vec<Task>,
}
