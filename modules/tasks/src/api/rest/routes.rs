use axum::{
    routing::{get, put},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::service::Service;
use crate::domain::watch::TaskFeed;

/// Build the tasks router. The identity provider extension is installed by
/// the application, one layer above.
pub fn router(service: Arc<Service>, feed: Arc<TaskFeed>) -> Router {
    Router::new()
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/tasks/{id}/complete", put(handlers::set_completed))
        .route("/tasks/stream", get(handlers::stream_tasks))
        .layer(Extension(service))
        .layer(Extension(feed))
}
