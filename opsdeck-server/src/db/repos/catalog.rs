//! Model catalog repository (the `models` table)

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;

/// Model record from database
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub id: i32,
    pub name: String,
    pub provider: String,
    pub context_length: Option<i32>,
    pub cost_per_1k_input_tokens: Option<f64>,
    pub cost_per_1k_output_tokens: Option<f64>,
    pub supports_vision: bool,
    pub supports_streaming: bool,
    pub capabilities: Option<serde_json::Value>,
    pub is_available: bool,
    pub total_usage_count: i64,
    pub total_tokens_used: i64,
    pub total_cost: f64,
    pub average_latency_ms: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Model catalog repository
pub struct ModelRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ModelRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Models flagged available, by name.
    pub async fn list_available(&self) -> Result<Vec<ModelRecord>, DbError> {
        let models = sqlx::query_as::<_, ModelRecord>(
            r#"
            SELECT id, name, provider, context_length, cost_per_1k_input_tokens,
                   cost_per_1k_output_tokens, supports_vision, supports_streaming,
                   capabilities, is_available, total_usage_count, total_tokens_used,
                   total_cost, average_latency_ms, created_at, updated_at
            FROM models
            WHERE is_available = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(models)
    }
}
