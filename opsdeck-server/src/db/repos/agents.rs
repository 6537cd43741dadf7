//! Agent repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;
use crate::models::AgentStatus;

macro_rules! agent_columns {
    () => {
        "id, name, description, role, status, current_task_id, capabilities, \
         max_context_length, tasks_completed, total_tokens_used, average_response_time, \
         success_rate, last_activity_at, created_at, updated_at"
    };
}

/// Agent record from database
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub role: String,
    #[sqlx(try_from = "String")]
    pub status: AgentStatus,
    pub current_task_id: Option<i32>,
    pub capabilities: Option<serde_json::Value>,
    pub max_context_length: Option<i32>,
    pub tasks_completed: i32,
    pub total_tokens_used: i64,
    pub average_response_time: f64,
    pub success_rate: f64,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Agent repository
pub struct AgentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AgentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All agents, by name.
    pub async fn list(&self) -> Result<Vec<Agent>, DbError> {
        let agents = sqlx::query_as::<_, Agent>(concat!(
            "SELECT ",
            agent_columns!(),
            " FROM agents ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(agents)
    }

    /// Single agent; `None` when the id does not exist.
    pub async fn get(&self, id: i32) -> Result<Option<Agent>, DbError> {
        let agent = sqlx::query_as::<_, Agent>(concat!(
            "SELECT ",
            agent_columns!(),
            " FROM agents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(agent)
    }
}
