//! Knowledge base repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;
use crate::models::RowLimit;

/// Knowledge base entry
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub embedding: Option<serde_json::Value>,
    pub source: Option<String>,
    pub relevance_score: Option<f64>,
    pub access_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Knowledge base repository
pub struct KnowledgeRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> KnowledgeRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Entries whose title, content or category contain `query`
    /// (case-insensitive), most accessed first. A blank query matches all.
    pub async fn search(&self, query: &str, limit: RowLimit) -> Result<Vec<KnowledgeEntry>, DbError> {
        let pattern = like_pattern(query.trim());
        let entries = sqlx::query_as::<_, KnowledgeEntry>(
            r#"
            SELECT id, title, content, category, embedding, source, relevance_score,
                   access_count, created_at, updated_at
            FROM knowledge_base
            WHERE $1 = '%%'
               OR title ILIKE $1
               OR content ILIKE $1
               OR category ILIKE $1
            ORDER BY access_count DESC, id
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit.get())
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}

/// `%query%` with LIKE metacharacters escaped
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
