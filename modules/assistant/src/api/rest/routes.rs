use axum::{routing::post, Extension, Router};
use std::sync::Arc;

use tasks::contract::client::TasksApi;

use crate::api::rest::handlers;
use crate::domain::engine::SuggestionEngine;

/// Build the assistant router. The identity provider extension is installed
/// by the application, one layer above.
pub fn router(engine: Arc<SuggestionEngine>, tasks_api: Arc<dyn TasksApi>) -> Router {
    Router::new()
        .route("/assistant/suggestion", post(handlers::get_suggestion))
        .layer(Extension(engine))
        .layer(Extension(tasks_api))
}
