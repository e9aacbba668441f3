use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::IntoResponse,
    response::Json,
    Extension,
};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use serverkit::auth::CurrentUser;
use serverkit::problem::ProblemResponse;
use serverkit::sse;

use crate::api::rest::dto::{
    CreateTaskReq, TaskDto, TaskListDto, TaskSnapshotEvent, ToggleCompleteReq, UpdateTaskReq,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;
use crate::domain::watch::TaskFeed;

pub async fn list_tasks(
    Extension(svc): Extension<Arc<Service>>,
    CurrentUser(ctx): CurrentUser,
    uri: Uri,
) -> Result<Json<TaskListDto>, ProblemResponse> {
    match svc.list_tasks(&ctx).await {
        Ok(tasks) => {
            let tasks: Vec<TaskDto> = tasks.into_iter().map(TaskDto::from).collect();
            let response = TaskListDto {
                total: tasks.len(),
                tasks,
            };
            Ok(Json(response))
        }
        Err(e) => {
            error!("Failed to list tasks: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific task by ID
pub async fn get_task(
    Extension(svc): Extension<Arc<Service>>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    uri: Uri,
) -> Result<Json<TaskDto>, ProblemResponse> {
    match svc.get_task(&ctx, id).await {
        Ok(task) => Ok(Json(TaskDto::from(task))),
        Err(e) => {
            error!("Failed to get task {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a new task
pub async fn create_task(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CurrentUser(ctx): CurrentUser,
    Json(req_body): Json<CreateTaskReq>,
) -> Result<(StatusCode, Json<TaskDto>), ProblemResponse> {
    info!("Creating task: {:?}", req_body);

    match svc.create_task(&ctx, req_body.into()).await {
        Ok(task) => Ok((StatusCode::CREATED, Json(TaskDto::from(task)))),
        Err(e) => {
            error!("Failed to create task: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update an existing task (partial merge)
pub async fn update_task(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req_body): Json<UpdateTaskReq>,
) -> Result<Json<TaskDto>, ProblemResponse> {
    info!("Updating task {} with: {:?}", id, req_body);

    match svc.update_task(&ctx, id, req_body.into()).await {
        Ok(task) => Ok(Json(TaskDto::from(task))),
        Err(e) => {
            error!("Failed to update task {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a task by ID
pub async fn delete_task(
    Extension(svc): Extension<Arc<Service>>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting task: {}", id);

    match svc.delete_task(&ctx, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete task {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Flip only the completion flag
pub async fn set_completed(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req_body): Json<ToggleCompleteReq>,
) -> Result<Json<TaskDto>, ProblemResponse> {
    match svc.set_completed(&ctx, id, req_body.completed).await {
        Ok(task) => Ok(Json(TaskDto::from(task))),
        Err(e) => {
            error!("Failed to toggle task {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// SSE endpoint returning a live stream of full task snapshots for the
/// authenticated user. The current snapshot is delivered first, then one
/// event per change.
pub async fn stream_tasks(
    Extension(feed): Extension<Arc<TaskFeed>>,
    CurrentUser(ctx): CurrentUser,
) -> impl IntoResponse {
    info!("New SSE connection for task snapshots");
    let snapshots = feed.subscribe(ctx.user_id).map(TaskSnapshotEvent::from);
    sse::sse_response_named(snapshots, "tasks_snapshot")
}
