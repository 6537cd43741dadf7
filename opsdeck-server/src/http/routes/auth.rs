//! Login sync endpoint
//!
//! Called by the external login flow after it has authenticated someone.
//! The flow proves itself with the shared secret header, since the body may
//! set `role`. The body is a [`UserPatch`]; the stored user comes back.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use crate::db::{User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{SyncCaller, ValidJson};
use crate::http::server::AppState;
use crate::models::UserPatch;

/// POST /auth/sync
async fn sync_user(
    State(state): State<Arc<AppState>>,
    _caller: SyncCaller,
    ValidJson(patch): ValidJson<UserPatch>,
) -> Result<Json<User>, ApiError> {
    patch.validate()?;

    let user = UserRepo::new(state.db.pool()?)
        .upsert(patch, state.owner_open_id.as_deref())
        .await?;
    tracing::info!(user_id = user.id, role = %user.role, "User synced");
    Ok(Json(user))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/auth/sync", post(sync_user))
}
