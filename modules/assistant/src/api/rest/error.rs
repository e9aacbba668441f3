use axum::http::StatusCode;
use serverkit::problem::{from_parts, ProblemResponse};

use tasks::contract::error::TasksError;

/// Map a tasks contract error (from pulling the caller's task list) to an
/// RFC9457 ProblemResponse. Completion failures never reach this layer; the
/// engine converts them to fallback suggestions.
pub fn map_tasks_error(e: &TasksError, instance: &str) -> ProblemResponse {
    match e {
        TasksError::NotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "TASKS_NOT_FOUND",
            "Task not found",
            format!("Task with id {} was not found", id),
            instance,
        ),
        TasksError::AccessDenied { id } => from_parts(
            StatusCode::FORBIDDEN,
            "TASKS_ACCESS_DENIED",
            "Access denied",
            format!("Task {} belongs to another user", id),
            instance,
        ),
        TasksError::Validation { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "TASKS_VALIDATION",
            "Validation error",
            message.clone(),
            instance,
        ),
        TasksError::Internal => {
            tracing::error!("task listing failed with an internal error");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal error",
                "Could not load tasks",
                instance,
            )
        }
    }
}
