//! Generated skills repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;

/// Generated skill record from database
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSkill {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub skill_code: Option<String>,
    pub generated_from: Option<String>,
    pub success_rate: f64,
    pub usage_count: i32,
    pub is_active: bool,
    pub performance_metrics: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Skills repository
pub struct SkillRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SkillRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Skills by name; inactive ones only when `active_only` is false.
    pub async fn list(&self, active_only: bool) -> Result<Vec<GeneratedSkill>, DbError> {
        let skills = sqlx::query_as::<_, GeneratedSkill>(
            r#"
            SELECT id, name, description, skill_code, generated_from, success_rate,
                   usage_count, is_active, performance_metrics, created_at, updated_at
            FROM generated_skills
            WHERE is_active OR NOT $1
            ORDER BY name, id
            "#,
        )
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;

        Ok(skills)
    }
}
