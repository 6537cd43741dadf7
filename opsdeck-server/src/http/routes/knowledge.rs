//! Knowledge base search

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::db::{KnowledgeEntry, KnowledgeRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidQuery;
use crate::http::server::AppState;
use crate::models::RowLimit;

#[derive(Debug, Deserialize)]
pub struct KnowledgeQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

/// GET /knowledge?q=&limit=
async fn search(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<KnowledgeQuery>,
) -> Result<Json<Vec<KnowledgeEntry>>, ApiError> {
    let limit = RowLimit::clamped(
        query.limit,
        RowLimit::KNOWLEDGE_DEFAULT,
        RowLimit::KNOWLEDGE_MAX,
    );
    let entries = KnowledgeRepo::new(state.db.pool()?)
        .search(&query.q, limit)
        .await?;
    Ok(Json(entries))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/knowledge", get(search))
}
