//! SeaORM-backed repository implementation for the domain port.
//!
//! This struct is generic over `C: ConnectionTrait`, so you can construct it
//! with a `DatabaseConnection` **or** a transactional connection.
//! The store clock lives here: `Stamp::Server` values in write payloads are
//! resolved against `Utc::now()`, with `updated_at` clamped so it never
//! decreases.

use anyhow::Context;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::contract::model::{Stamp, Task, TaskRecord};
use crate::domain::repo::TasksRepository;
use crate::infra::storage::entity::{ActiveModel as TaskAM, Column, Entity as TaskEntity};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmTasksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmTasksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> TasksRepository for SeaOrmTasksRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Task>> {
        let found = TaskEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        found.map(TryInto::try_into).transpose()
    }

    async fn insert(&self, record: TaskRecord) -> anyhow::Result<Task> {
        let now = Utc::now();
        let created_at = record.created_at.resolve(now);
        let updated_at = record.updated_at.resolve(now);

        let task = Task {
            id: record.id,
            title: record.title,
            description: record.description,
            due_date: record.due_date,
            priority: record.priority,
            completed: record.completed,
            user_id: record.user_id,
            created_at,
            updated_at,
        };

        let m = TaskAM {
            id: Set(task.id),
            title: Set(task.title.clone()),
            description: Set(task.description.clone()),
            due_date: Set(task.due_date),
            priority: Set(task.priority.as_str().to_string()),
            completed: Set(task.completed),
            user_id: Set(task.user_id),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        };
        let _ = m.insert(&self.conn).await.context("insert failed")?;
        Ok(task)
    }

    async fn update(&self, task: Task, updated_at: Stamp) -> anyhow::Result<Task> {
        let resolved = updated_at.resolve_monotonic(Utc::now(), task.updated_at);
        let task = Task {
            updated_at: resolved,
            ..task
        };

        let m = TaskAM {
            id: Set(task.id),
            title: Set(task.title.clone()),
            description: Set(task.description.clone()),
            due_date: Set(task.due_date),
            priority: Set(task.priority.as_str().to_string()),
            completed: Set(task.completed),
            user_id: Set(task.user_id),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        };
        let _ = m.update(&self.conn).await.context("update failed")?;
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = TaskEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Task>> {
        // Secondary keys stabilize ties between equal due dates as insertion
        // order; callers must not rely on that ordering.
        let rows = TaskEntity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::DueDate)
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("list_for_user failed")?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}
