//! HTTP application assembly.
//!
//! Two surfaces: an open router with the health probe, and the guarded
//! `/v1` subtree where every route sits behind the IP guard middleware.
//! Business routes belong to the calling system; the service ships a
//! minimal `whoami` route so the allow path is externally observable.

use anyhow::Result;
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::response::Json;
use axum::routing::get;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::guard::{GuardState, OrgContext, ip_guard};

/// Build the full application router around a configured guard.
pub fn create_router(guard: GuardState) -> Router {
    let protected = Router::new()
        .route("/whoami", get(whoami))
        // The guard wraps the whole subtree; nothing under /v1 is
        // reachable without passing it.
        .layer(from_fn_with_state(guard, ip_guard));

    Router::new()
        .route("/health", get(health_check))
        .nest("/v1", protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Liveness probe, deliberately outside the guard.
async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Echo the tenant identity this request was authorized as.
async fn whoami(context: OrgContext) -> Json<Value> {
    Json(serde_json::json!({
        "orgId": context.org_id(),
        "clientIp": context.client_ip(),
    }))
}

/// Bind the listener and run the server until shutdown.
pub async fn serve(app: Router, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("API server listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_AUTH_TIMEOUT_MS;
    use crate::guard::Gateway;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn empty_app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(Gateway::new(store.clone(), store));
        create_router(GuardState::new(
            gateway,
            Duration::from_millis(DEFAULT_AUTH_TIMEOUT_MS),
        ))
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let app = empty_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_v1_is_guarded_by_default() {
        let app = empty_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
