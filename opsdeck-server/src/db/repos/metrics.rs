//! System metrics repository (append-only time series)

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;
use crate::models::RowLimit;

macro_rules! metrics_columns {
    () => {
        "id, \"timestamp\", total_tasks_completed, total_tasks_failed, success_rate, \
         average_response_time_ms, total_tokens_used, total_cost_usd, active_agents, \
         idle_agents, error_agents, system_health, created_at"
    };
}

/// One metrics snapshot
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    pub total_tasks_completed: i32,
    pub total_tasks_failed: i32,
    pub success_rate: f64,
    pub average_response_time_ms: f64,
    pub total_tokens_used: i64,
    #[serde(rename = "totalCostUSD")]
    pub total_cost_usd: f64,
    pub active_agents: i32,
    pub idle_agents: i32,
    pub error_agents: i32,
    pub system_health: f64,
    pub created_at: DateTime<Utc>,
}

/// Metrics repository
pub struct MetricsRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MetricsRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Newest snapshot, if any has been recorded.
    pub async fn latest(&self) -> Result<Option<SystemMetrics>, DbError> {
        let row = sqlx::query_as::<_, SystemMetrics>(concat!(
            "SELECT ",
            metrics_columns!(),
            " FROM system_metrics ORDER BY \"timestamp\" DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Newest `limit` snapshots, newest first. Snapshots are hourly, so the
    /// limit doubles as an hour count.
    pub async fn history(&self, limit: RowLimit) -> Result<Vec<SystemMetrics>, DbError> {
        let rows = sqlx::query_as::<_, SystemMetrics>(concat!(
            "SELECT ",
            metrics_columns!(),
            " FROM system_metrics ORDER BY \"timestamp\" DESC, id DESC LIMIT $1"
        ))
        .bind(limit.get())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn latest_is_none_until_first_snapshot(pool: PgPool) -> Result<(), DbError> {
        migrations::run(&pool).await?;
        let repo = MetricsRepo::new(&pool);
        assert!(repo.latest().await?.is_none());

        sqlx::query(
            r#"
            INSERT INTO system_metrics ("timestamp", total_tasks_completed) VALUES
                (NOW() - INTERVAL '1 hour', 4),
                (NOW(), 9)
            "#,
        )
        .execute(&pool)
        .await?;

        let latest = repo.latest().await?.expect("snapshot");
        assert_eq!(latest.total_tasks_completed, 9);
        assert_eq!(latest.system_health, 100.0);

        let history = repo.history(RowLimit::HISTORY_DEFAULT).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].total_tasks_completed, 4);
        Ok(())
    }
}
