use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone)]
pub enum TasksError {
    #[error("Task not found: {id}")]
    NotFound { id: Uuid },

    #[error("Task {id} belongs to another user")]
    AccessDenied { id: Uuid },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl TasksError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn access_denied(id: Uuid) -> Self {
        Self::AccessDenied { id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for TasksError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            TaskNotFound { id } => Self::not_found(id),
            AccessDenied { id } => Self::access_denied(id),
            EmptyTitle => Self::validation("Title cannot be empty".to_string()),
            TitleTooLong { len, max } => Self::validation(format!(
                "Title too long: {} characters (max: {})",
                len, max
            )),
            Validation { field, message } => Self::validation(format!("{}: {}", field, message)),
            Database { .. } => Self::internal(),
        }
    }
}
