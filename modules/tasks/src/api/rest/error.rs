use axum::http::StatusCode;
use serverkit::problem::{from_parts, ProblemResponse};

use crate::domain::error::DomainError;

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::TaskNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "TASKS_NOT_FOUND",
            "Task not found",
            format!("Task with id {} was not found", id),
            instance,
        ),
        DomainError::AccessDenied { id } => from_parts(
            StatusCode::FORBIDDEN,
            "TASKS_ACCESS_DENIED",
            "Access denied",
            format!("Task {} belongs to another user", id),
            instance,
        ),
        DomainError::EmptyTitle => from_parts(
            StatusCode::BAD_REQUEST,
            "TASKS_VALIDATION",
            "Validation error",
            "Title cannot be empty",
            instance,
        ),
        DomainError::TitleTooLong { .. } | DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "TASKS_VALIDATION",
            "Validation error",
            format!("{}", e),
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}
