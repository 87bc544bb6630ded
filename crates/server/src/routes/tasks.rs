//! REST task routes used by API callers alongside the message channels.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::task::{CreateTask, Task, UpdateTask};

use crate::{AppState, error::ApiError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}

pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<Task>>, ApiError> {
    let tasks = Task::list(&state.db.pool).await?;
    Ok(ResponseJson(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<Task>, ApiError> {
    match Task::find_by_id(&state.db.pool, id).await? {
        Some(task) => Ok(ResponseJson(task)),
        None => Err(ApiError::NotFound("Tarea no encontrada".to_string())),
    }
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, ResponseJson<Task>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "El título no puede estar vacío".to_string(),
        ));
    }
    let task = Task::create(&state.db.pool, &payload).await?;
    tracing::debug!(id = task.id, "task created via REST");
    Ok((StatusCode::CREATED, ResponseJson(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<Task>, ApiError> {
    if let Some(title) = &payload.title {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "El título no puede estar vacío".to_string(),
            ));
        }
    }
    match Task::update(&state.db.pool, id, &payload).await? {
        Some(task) => Ok(ResponseJson(task)),
        None => Err(ApiError::NotFound("Tarea no encontrada".to_string())),
    }
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if Task::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Tarea no encontrada".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
