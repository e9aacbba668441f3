use axum::{http::Uri, response::Json, Extension};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

use serverkit::auth::CurrentUser;
use serverkit::problem::ProblemResponse;
use tasks::contract::client::TasksApi;

use crate::api::rest::dto::SuggestionDto;
use crate::api::rest::error::map_tasks_error;
use crate::domain::engine::SuggestionEngine;

/// Compute a fresh daily-focus suggestion for the authenticated user.
/// Only auth and task-listing failures can error; a completion failure
/// degrades to the heuristic result.
pub async fn get_suggestion(
    Extension(engine): Extension<Arc<SuggestionEngine>>,
    Extension(tasks_api): Extension<Arc<dyn TasksApi>>,
    CurrentUser(ctx): CurrentUser,
    uri: Uri,
) -> Result<Json<SuggestionDto>, ProblemResponse> {
    info!("Computing suggestion");

    let tasks = tasks_api.list_tasks(&ctx).await.map_err(|e| {
        error!("Failed to load tasks for suggestion: {}", e);
        map_tasks_error(&e, uri.path())
    })?;

    let suggestion = engine.suggest(&tasks, Utc::now()).await;
    Ok(Json(SuggestionDto::from(suggestion)))
}
