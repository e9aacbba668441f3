use std::sync::Arc;

use serverkit::auth::SessionContext;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{NewTask, Stamp, Task, TaskPatch, TaskRecord};
use crate::domain::error::DomainError;
use crate::domain::events::TaskDomainEvent;
use crate::domain::ports::EventPublisher;
use crate::domain::repo::TasksRepository;

/// Domain service with business rules for task management.
/// Depends only on the repository and event ports, not on infra types.
/// Every operation takes the caller's session explicitly; there is no
/// ambient current-user state.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn TasksRepository>,
    events: Arc<dyn EventPublisher<TaskDomainEvent>>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_title_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_title_length: 200,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repo: Arc<dyn TasksRepository>,
        events: Arc<dyn EventPublisher<TaskDomainEvent>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            events,
            config,
        }
    }

    #[instrument(name = "tasks.service.get_task", skip(self, ctx), fields(task_id = %id))]
    pub async fn get_task(&self, ctx: &SessionContext, id: Uuid) -> Result<Task, DomainError> {
        debug!("Getting task by id");
        self.load_owned(ctx, id).await
    }

    #[instrument(name = "tasks.service.list_tasks", skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn list_tasks(&self, ctx: &SessionContext) -> Result<Vec<Task>, DomainError> {
        debug!("Listing tasks for user");
        let tasks = self
            .repo
            .list_for_user(ctx.user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!("Successfully listed {} tasks", tasks.len());
        Ok(tasks)
    }

    #[instrument(
        name = "tasks.service.create_task",
        skip(self, ctx, new_task),
        fields(user_id = %ctx.user_id)
    )]
    pub async fn create_task(
        &self,
        ctx: &SessionContext,
        new_task: NewTask,
    ) -> Result<Task, DomainError> {
        info!("Creating new task");

        self.validate_title(&new_task.title)?;

        // The store resolves both stamps from its clock; nothing in the
        // payload carries a caller-supplied time.
        let record = TaskRecord {
            id: Uuid::new_v4(),
            title: new_task.title,
            description: new_task.description,
            due_date: new_task.due_date,
            priority: new_task.priority,
            completed: false,
            user_id: ctx.user_id,
            created_at: Stamp::Server,
            updated_at: Stamp::Server,
        };

        let task = self
            .repo
            .insert(record)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        self.events.publish(&TaskDomainEvent::Created {
            id: task.id,
            user_id: task.user_id,
            at: task.created_at,
        });

        info!("Successfully created task with id={}", task.id);
        Ok(task)
    }

    #[instrument(
        name = "tasks.service.update_task",
        skip(self, ctx, patch),
        fields(task_id = %id)
    )]
    pub async fn update_task(
        &self,
        ctx: &SessionContext,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, DomainError> {
        info!("Updating task");

        self.validate_patch(&patch)?;

        // Existence first, then ownership; the first failing check
        // short-circuits before any mutation.
        let mut current = self.load_owned(ctx, id).await?;

        // Merge: only supplied fields overwrite, explicit falsy values included.
        if let Some(title) = patch.title {
            current.title = title;
        }
        if let Some(description) = patch.description {
            current.description = description;
        }
        if let Some(due_date) = patch.due_date {
            current.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            current.priority = priority;
        }
        if let Some(completed) = patch.completed {
            current.completed = completed;
        }

        let task = self
            .repo
            .update(current, Stamp::Server)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        self.events.publish(&TaskDomainEvent::Updated {
            id: task.id,
            user_id: task.user_id,
            at: task.updated_at,
        });

        info!("Successfully updated task");
        Ok(task)
    }

    #[instrument(name = "tasks.service.delete_task", skip(self, ctx), fields(task_id = %id))]
    pub async fn delete_task(&self, ctx: &SessionContext, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting task");

        let task = self.load_owned(ctx, id).await?;

        let deleted = self
            .repo
            .delete(task.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        if !deleted {
            return Err(DomainError::task_not_found(id));
        }

        self.events.publish(&TaskDomainEvent::Deleted {
            id,
            user_id: task.user_id,
            at: task.updated_at,
        });

        info!("Successfully deleted task");
        Ok(())
    }

    /// Convenience wrapper over `update_task` flipping only the completion flag.
    #[instrument(name = "tasks.service.set_completed", skip(self, ctx), fields(task_id = %id))]
    pub async fn set_completed(
        &self,
        ctx: &SessionContext,
        id: Uuid,
        completed: bool,
    ) -> Result<Task, DomainError> {
        self.update_task(
            ctx,
            id,
            TaskPatch {
                completed: Some(completed),
                ..TaskPatch::default()
            },
        )
        .await
    }

    // --- helpers ---

    async fn load_owned(&self, ctx: &SessionContext, id: Uuid) -> Result<Task, DomainError> {
        let task = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::task_not_found(id))?;

        if task.user_id != ctx.user_id {
            return Err(DomainError::access_denied(id));
        }
        Ok(task)
    }

    fn validate_title(&self, title: &str) -> Result<(), DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::empty_title());
        }
        if title.len() > self.config.max_title_length {
            return Err(DomainError::title_too_long(
                title.len(),
                self.config.max_title_length,
            ));
        }
        Ok(())
    }

    fn validate_patch(&self, patch: &TaskPatch) -> Result<(), DomainError> {
        if let Some(ref title) = patch.title {
            self.validate_title(title)?;
        }
        Ok(())
    }
}
