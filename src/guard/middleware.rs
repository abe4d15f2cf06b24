//! HTTP binding of the gateway: header extraction, the per-request
//! authorization timeout, and the deny-to-response mapping.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use http::{HeaderMap, StatusCode};
use serde_json::json;
use tokio::time::timeout;

use crate::guard::decision::{Decision, DenyReason, GuardError};
use crate::guard::gateway::Gateway;

/// Header carrying the caller credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Trust-boundary header carrying the claimed network origin.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Shared state for the guard middleware.
#[derive(Clone)]
pub struct GuardState {
    gateway: Arc<Gateway>,
    auth_timeout: Duration,
}

impl GuardState {
    pub fn new(gateway: Arc<Gateway>, auth_timeout: Duration) -> Self {
        Self {
            gateway,
            auth_timeout,
        }
    }
}

/// Authorization middleware for every protected route.
///
/// Runs the full pipeline under a single time budget covering extraction,
/// both store lookups and the origin check. On Allow the resolved context
/// is inserted into request extensions and the request proceeds; anything
/// else terminates here. An elapsed budget or a store fault is answered
/// with 503, never with a credential error.
pub async fn ip_guard(
    State(state): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Response {
    let api_key = header_str(request.headers(), API_KEY_HEADER);
    let forwarded_for = header_str(request.headers(), FORWARDED_FOR_HEADER);

    let outcome = timeout(
        state.auth_timeout,
        state.gateway.authorize(api_key, forwarded_for),
    )
    .await;

    match outcome {
        Ok(Ok(Decision::Allowed(context))) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Ok(Ok(Decision::Denied(reason))) => deny_response(reason),
        Ok(Err(_store_fault)) => service_unavailable(),
        Err(_elapsed) => {
            let client_ip = state.gateway.trust_policy().claimed_origin(forwarded_for);
            state
                .gateway
                .audit()
                .fault(&GuardError::Timeout, &client_ip);
            service_unavailable()
        }
    }
}

/// Read a header as UTF-8, treating undecodable values as absent.
fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn deny_response(reason: DenyReason) -> Response {
    let status =
        StatusCode::from_u16(reason.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": reason.message() }))).into_response()
}

fn service_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": "Service unavailable" })),
    )
        .into_response()
}
