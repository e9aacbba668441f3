use async_trait::async_trait;
use serverkit::auth::SessionContext;
use std::sync::Arc;

use crate::contract::{client::TasksApi, error::TasksError, model::Task};
use crate::domain::service::Service;

/// Local implementation of the TasksApi trait that delegates to the domain service
pub struct TasksLocalClient {
    service: Arc<Service>,
}

impl TasksLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TasksApi for TasksLocalClient {
    async fn list_tasks(&self, ctx: &SessionContext) -> Result<Vec<Task>, TasksError> {
        self.service.list_tasks(ctx).await.map_err(Into::into)
    }
}
