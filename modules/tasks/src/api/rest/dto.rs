use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{NewTask, Priority, Task, TaskPatch, TaskSnapshot};

/// REST DTO for task representation with serde/utoipa
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
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

/// REST DTO for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskReq {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
}

/// REST DTO for updating a task (partial)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

/// REST DTO for the completion toggle
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToggleCompleteReq {
    pub completed: bool,
}

/// REST DTO for task list response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskListDto {
    pub tasks: Vec<TaskDto>,
    pub total: usize,
}

/// Transport-level SSE payload: one full snapshot of the caller's tasks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    title = "TaskSnapshotEvent",
    description = "Server-sent full-state task snapshot"
)]
pub struct TaskSnapshotEvent {
    pub tasks: Vec<TaskDto>,
}

// Conversion implementations between REST DTOs and contract models

impl From<Task> for TaskDto {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            priority: task.priority,
            completed: task.completed,
            user_id: task.user_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl From<CreateTaskReq> for NewTask {
    fn from(req: CreateTaskReq) -> Self {
        Self {
            title: req.title,
            description: req.description.unwrap_or_default(),
            due_date: req.due_date,
            priority: req.priority,
        }
    }
}

impl From<UpdateTaskReq> for TaskPatch {
    fn from(req: UpdateTaskReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
            completed: req.completed,
        }
    }
}

impl From<TaskSnapshot> for TaskSnapshotEvent {
    fn from(snapshot: TaskSnapshot) -> Self {
        Self {
            tasks: snapshot.tasks.into_iter().map(TaskDto::from).collect(),
        }
    }
}
