//! Request-scoped tenant context.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::types::{ClientIp, OrgId};

/// Tenant identity bound to a request after a successful authorization.
///
/// Constructed once by the gateway on Allow and immutable afterwards; it is
/// owned by its request and never shared across requests. Handlers behind
/// the guard recover it through the [`FromRequestParts`] extractor and can
/// assume the organization identifier has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgContext {
    org_id: OrgId,
    client_ip: ClientIp,
}

impl OrgContext {
    /// Bind a validated organization and the origin it was admitted from.
    pub fn new(org_id: OrgId, client_ip: ClientIp) -> Self {
        Self { org_id, client_ip }
    }

    /// The organization every operation in this request is scoped to.
    pub fn org_id(&self) -> &OrgId {
        &self.org_id
    }

    /// The claimed origin the request was admitted under.
    pub fn client_ip(&self) -> &ClientIp {
        &self.client_ip
    }
}

impl<S> FromRequestParts<S> for OrgContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The guard middleware inserts the context before any protected
        // handler runs. A missing context means a route was mounted outside
        // the guarded router, which is a wiring bug, not a caller error.
        parts
            .extensions
            .get::<OrgContext>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
