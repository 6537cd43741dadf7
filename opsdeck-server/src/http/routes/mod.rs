//! Route handlers organized by resource

pub mod agents;
pub mod auth;
pub mod chat;
pub mod health;
pub mod knowledge;
pub mod metrics;
pub mod skills;
pub mod tasks;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::chat::fakes::EchoModel;
    use crate::db::Database;
    use crate::http::extractors::CALLER_HEADER;
    use crate::http::server::{build_router, AppState};

    /// Sync secret configured on [`app_without_db`]
    pub const SYNC_SECRET: &str = "test-sync-secret";

    /// Router over a state with no database configured
    pub fn app_without_db() -> axum::Router {
        let state = AppState::new(Database::new(None), Arc::new(EchoModel::replying("ok")))
            .with_sync_secret(Some(SYNC_SECRET.to_string()));
        build_router(Arc::new(state))
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn get_as(uri: &str, caller: i32) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(CALLER_HEADER, caller.to_string())
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_json(uri: &str, caller: Option<i32>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(caller) = caller {
            builder = builder.header(CALLER_HEADER, caller.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    pub async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app_without_db().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}
