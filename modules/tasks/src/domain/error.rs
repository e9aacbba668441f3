use thiserror::Error;
use uuid::Uuid;

/// Internal domain error for the tasks module.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Task not found: {id}")]
    TaskNotFound { id: Uuid },

    #[error("Task {id} belongs to another user")]
    AccessDenied { id: Uuid },

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title too long: {len} characters (max: {max})")]
    TitleTooLong { len: usize, max: usize },

    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn task_not_found(id: Uuid) -> Self {
        Self::TaskNotFound { id }
    }

    pub fn access_denied(id: Uuid) -> Self {
        Self::AccessDenied { id }
    }

    pub fn empty_title() -> Self {
        Self::EmptyTitle
    }

    pub fn title_too_long(len: usize, max: usize) -> Self {
        Self::TitleTooLong { len, max }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
