use crate::contract::model::{Stamp, Task, TaskRecord};
use async_trait::async_trait;
use uuid::Uuid;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait TasksRepository: Send + Sync {
    /// Load a task by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Task>>;

    /// Insert a fully-formed record; the store resolves `Stamp::Server`
    /// against its own clock and returns the materialized task.
    async fn insert(&self, record: TaskRecord) -> anyhow::Result<Task>;

    /// Persist a merged task (by primary key in `task.id`); `updated_at`
    /// is resolved by the store and never decreases. Returns the stored task.
    async fn update(&self, task: Task, updated_at: Stamp) -> anyhow::Result<Task>;

    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// All tasks owned by `user_id`, ordered ascending by due date.
    /// Equal due dates keep insertion order (stable, otherwise unspecified).
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Task>>;
}
