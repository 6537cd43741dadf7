//! Custom Axum extractors
//!
//! These replace axum's own rejections with [`ApiError`] so bad input always
//! comes back as a JSON `validation_error`.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::server::AppState;
use crate::models::ValidationError;

/// Header set by the authenticating proxy in front of the API
pub const CALLER_HEADER: &str = "x-user-id";

/// Authenticated caller's user id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub i32);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|id| *id > 0)
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Header carrying the login flow's shared secret
pub const SYNC_SECRET_HEADER: &str = "x-sync-secret";

/// Proof that the request came from the login flow.
///
/// Rejects with 401 when the header is missing, does not match, or no secret
/// is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncCaller;

impl FromRequestParts<Arc<AppState>> for SyncCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.sync_secret.as_deref() else {
            return Err(ApiError::Unauthorized);
        };

        let presented = parts
            .headers
            .get(SYNC_SECRET_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();

        if secrets_match(presented, expected.as_bytes()) {
            Ok(Self)
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// Comparison whose running time does not depend on where the inputs differ
fn secrets_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Positive integer id from the path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidId(pub i32);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        id.parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .map(Self)
            .ok_or(ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "must be a positive integer",
            }))
    }
}

/// JSON body; decode failures are validation errors
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::Validation(ValidationError::Malformed {
                message: rejection.body_text(),
            })
        })?;
        Ok(Self(value))
    }
}

/// Query string; decode failures are validation errors
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(ValidationError::Malformed {
                    message: rejection.body_text(),
                })
            })?;
        Ok(Self(value))
    }
}
