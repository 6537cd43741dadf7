//! API error type with IntoResponse
//!
//! Every failure becomes a JSON body `{"error": <code>, "message": <text>}`.
//! Server-side causes are logged and replaced with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::chat::ChatTurnError;
use crate::db::DbError;
use crate::models::ValidationError;

const GENERIC_MESSAGE: &str = "an internal error occurred";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Bad input (400)
    Validation(ValidationError),

    /// No caller identity (401)
    Unauthorized,

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database not configured or unreachable (500, logged)
    Unavailable,

    /// Anything else (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unavailable | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Validation(e) => json!({
                "error": "validation_error",
                "message": e.to_string()
            }),
            Self::Unauthorized => json!({
                "error": "unauthorized",
                "message": "missing or invalid caller identity"
            }),
            Self::NotFound { resource, id } => json!({
                "error": "not_found",
                "message": format!("{} '{}' not found", resource, id)
            }),
            Self::Unavailable => {
                tracing::error!("Database not available");
                json!({ "error": "internal_error", "message": GENERIC_MESSAGE })
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                json!({ "error": "internal_error", "message": GENERIC_MESSAGE })
            }
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Unavailable => Self::Unavailable,
            DbError::Validation(v) => Self::Validation(v),
            DbError::Sqlx(e) => Self::internal(format!("database error: {e}")),
        }
    }
}

impl From<ChatTurnError> for ApiError {
    fn from(e: ChatTurnError) -> Self {
        match e {
            ChatTurnError::Store(db) => db.into(),
            ChatTurnError::Model(llm) => Self::internal(format!("chat completion failed: {llm}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let (status, body) =
            body_json(ApiError::Validation(ValidationError::Empty { field: "openId" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn unauthorized_is_401() {
        let (status, body) = body_json(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = body_json(ApiError::NotFound {
            resource: "agent",
            id: "42".into(),
        })
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "agent '42' not found");
    }

    #[tokio::test]
    async fn unavailable_database_is_generic_500() {
        let (status, body) = body_json(DbError::Unavailable.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], GENERIC_MESSAGE);
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let (status, body) = body_json(ApiError::internal("password=hunter2")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("hunter2"));
    }

    #[test]
    fn model_failure_maps_to_internal() {
        let err: ApiError =
            ChatTurnError::Model(crate::llm::LlmError::Config("no key".into())).into();
        assert!(matches!(err, ApiError::Internal { .. }));
    }
}
