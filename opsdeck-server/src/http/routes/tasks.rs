//! Task endpoints

use std::str::FromStr;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::db::{Task, TaskRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidQuery;
use crate::http::server::AppState;
use crate::models::{RowLimit, TaskStatus};
use crate::stats::TaskStats;

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// GET /tasks?limit=&status= - newest first
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<TasksQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let limit = RowLimit::clamped(query.limit, RowLimit::TASKS_DEFAULT, RowLimit::TASKS_MAX);
    let status = query.status.as_deref().map(TaskStatus::from_str).transpose()?;

    let repo = TaskRepo::new(state.db.pool()?);
    let tasks = match status {
        Some(status) => repo.list_by_status(status, limit).await?,
        None => repo.list(limit).await?,
    };
    Ok(Json(tasks))
}

/// GET /tasks/stats - over the newest tasks only
async fn task_stats(State(state): State<Arc<AppState>>) -> Result<Json<TaskStats>, ApiError> {
    let tasks = TaskRepo::new(state.db.pool()?).list(RowLimit::TASK_STATS).await?;
    Ok(Json(TaskStats::from_tasks(&tasks)))
}

/// Task routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/stats", get(task_stats))
}
