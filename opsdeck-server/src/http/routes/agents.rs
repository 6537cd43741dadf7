//! Agent endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::db::{Agent, AgentRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidId;
use crate::http::server::AppState;
use crate::stats::AgentStats;

/// GET /agents - all agents by name
async fn list_agents(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Agent>>, ApiError> {
    let agents = AgentRepo::new(state.db.pool()?).list().await?;
    Ok(Json(agents))
}

/// GET /agents/stats
async fn agent_stats(State(state): State<Arc<AppState>>) -> Result<Json<AgentStats>, ApiError> {
    let agents = AgentRepo::new(state.db.pool()?).list().await?;
    Ok(Json(AgentStats::from_agents(&agents)))
}

/// GET /agents/{id}
async fn get_agent(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Agent>, ApiError> {
    let agent = AgentRepo::new(state.db.pool()?)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "agent",
            id: id.to_string(),
        })?;
    Ok(Json(agent))
}

/// Agent routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/agents", get(list_agents))
        .route("/agents/stats", get(agent_stats))
        .route("/agents/{id}", get(get_agent))
}
