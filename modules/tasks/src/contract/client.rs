use async_trait::async_trait;
use serverkit::auth::SessionContext;

use crate::contract::{error::TasksError, model::Task};

/// Public API trait for the tasks module that other modules can use
#[async_trait]
pub trait TasksApi: Send + Sync {
    /// The caller's tasks, ordered ascending by due date.
    async fn list_tasks(&self, ctx: &SessionContext) -> Result<Vec<Task>, TasksError>;
}
