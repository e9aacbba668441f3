//! Shared test doubles for the tasks module.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use serverkit::auth::SessionContext;
use tasks::contract::model::{Stamp, Task, TaskRecord};
use tasks::domain::events::TaskDomainEvent;
use tasks::domain::ports::EventPublisher;
use tasks::domain::repo::TasksRepository;

/// In-memory repository with a controllable store clock, so tests can tell
/// `Stamp::Server` apart from caller-supplied instants.
pub struct InMemoryTasksRepository {
    tasks: Mutex<Vec<Task>>,
    now: Mutex<DateTime<Utc>>,
}

impl InMemoryTasksRepository {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            now: Mutex::new(now),
        }
    }

    pub fn set_now(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[async_trait::async_trait]
impl TasksRepository for InMemoryTasksRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Task>> {
        Ok(self.tasks.lock().iter().find(|t| t.id == id).cloned())
    }

    async fn insert(&self, record: TaskRecord) -> anyhow::Result<Task> {
        let now = self.now();
        let task = Task {
            id: record.id,
            title: record.title,
            description: record.description,
            due_date: record.due_date,
            priority: record.priority,
            completed: record.completed,
            user_id: record.user_id,
            created_at: record.created_at.resolve(now),
            updated_at: record.updated_at.resolve(now),
        };
        self.tasks.lock().push(task.clone());
        Ok(task)
    }

    async fn update(&self, task: Task, updated_at: Stamp) -> anyhow::Result<Task> {
        let resolved = updated_at.resolve_monotonic(self.now(), task.updated_at);
        let task = Task {
            updated_at: resolved,
            ..task
        };
        let mut tasks = self.tasks.lock();
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| anyhow::anyhow!("no such task"))?;
        *slot = task.clone();
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() < before)
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .lock()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order between equal due dates.
        tasks.sort_by_key(|t| t.due_date);
        Ok(tasks)
    }
}

/// Event publisher that records everything it sees.
#[derive(Default)]
pub struct CapturingPublisher {
    events: Mutex<Vec<TaskDomainEvent>>,
}

impl CapturingPublisher {
    pub fn events(&self) -> Vec<TaskDomainEvent> {
        self.events.lock().clone()
    }
}

impl EventPublisher<TaskDomainEvent> for CapturingPublisher {
    fn publish(&self, event: &TaskDomainEvent) {
        self.events.lock().push(event.clone());
    }
}

pub fn session(user_id: Uuid) -> SessionContext {
    SessionContext {
        user_id,
        email: format!("{}@example.com", user_id.simple()),
        display_name: None,
        photo_url: None,
    }
}

pub fn arc_repo(now: DateTime<Utc>) -> Arc<InMemoryTasksRepository> {
    Arc::new(InMemoryTasksRepository::new(now))
}
