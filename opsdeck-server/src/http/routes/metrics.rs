//! Metrics endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::db::{MetricsRepo, ModelRepo, SystemMetrics};
use crate::http::error::ApiError;
use crate::http::extractors::ValidQuery;
use crate::http::server::AppState;
use crate::models::RowLimit;
use crate::stats::{CostShare, MetricsSnapshot, ModelMetrics};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub hours: Option<i64>,
}

/// GET /metrics/latest - newest snapshot or the all-healthy default
async fn latest(State(state): State<Arc<AppState>>) -> Result<Json<MetricsSnapshot>, ApiError> {
    let latest = MetricsRepo::new(state.db.pool()?).latest().await?;
    Ok(Json(MetricsSnapshot::latest_or_default(latest)))
}

/// GET /metrics/history?hours=N
async fn history(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<HistoryQuery>,
) -> Result<Json<Vec<SystemMetrics>>, ApiError> {
    let limit = RowLimit::clamped(query.hours, RowLimit::HISTORY_DEFAULT, RowLimit::HISTORY_MAX);
    let rows = MetricsRepo::new(state.db.pool()?).history(limit).await?;
    Ok(Json(rows))
}

/// GET /metrics/models
async fn model_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ModelMetrics>>, ApiError> {
    let models = ModelRepo::new(state.db.pool()?).list_available().await?;
    Ok(Json(models.iter().map(ModelMetrics::from).collect()))
}

/// GET /metrics/costs
async fn costs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<CostShare>>, ApiError> {
    let models = ModelRepo::new(state.db.pool()?).list_available().await?;
    Ok(Json(models.iter().map(CostShare::from).collect()))
}

/// Metrics routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/metrics/latest", get(latest))
        .route("/metrics/history", get(history))
        .route("/metrics/models", get(model_metrics))
        .route("/metrics/costs", get(costs))
}
