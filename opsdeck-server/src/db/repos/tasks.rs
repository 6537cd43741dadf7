//! Task repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;
use crate::models::{RowLimit, TaskPriority, TaskStatus};

macro_rules! task_columns {
    () => {
        "id, title, description, agent_id, status, priority, input, output, error, \
         tokens_used, estimated_cost, actual_cost, execution_time_ms, started_at, \
         completed_at, created_at, updated_at"
    };
}

/// Task record from database
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub agent_id: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,
    pub input: Option<serde_json::Value>,
    pub output: Option<serde_json::Value>,
    pub error: Option<String>,
    pub tokens_used: i64,
    pub estimated_cost: f64,
    pub actual_cost: f64,
    pub execution_time_ms: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task repository
pub struct TaskRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Most recent tasks first.
    pub async fn list(&self, limit: RowLimit) -> Result<Vec<Task>, DbError> {
        let tasks = sqlx::query_as::<_, Task>(concat!(
            "SELECT ",
            task_columns!(),
            " FROM tasks ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit.get())
        .fetch_all(self.pool)
        .await?;

        Ok(tasks)
    }

    /// Most recent tasks with the given status.
    pub async fn list_by_status(
        &self,
        status: TaskStatus,
        limit: RowLimit,
    ) -> Result<Vec<Task>, DbError> {
        let tasks = sqlx::query_as::<_, Task>(concat!(
            "SELECT ",
            task_columns!(),
            " FROM tasks WHERE status = $1 ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(status.as_str())
        .bind(limit.get())
        .fetch_all(self.pool)
        .await?;

        Ok(tasks)
    }
}
