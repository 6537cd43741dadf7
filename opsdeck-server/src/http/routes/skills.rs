//! Generated skills listing

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::db::{GeneratedSkill, SkillRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidQuery;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsQuery {
    pub active_only: Option<bool>,
}

/// GET /skills?activeOnly= (active only unless `activeOnly=false`)
async fn list_skills(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<SkillsQuery>,
) -> Result<Json<Vec<GeneratedSkill>>, ApiError> {
    let skills = SkillRepo::new(state.db.pool()?)
        .list(query.active_only.unwrap_or(true))
        .await?;
    Ok(Json(skills))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/skills", get(list_skills))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::http::routes::testing::{get, send};

    #[tokio::test]
    async fn non_boolean_flag_is_400() {
        let (status, _) = send(get("/api/skills?activeOnly=maybe")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
