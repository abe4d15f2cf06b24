// Core modules
mod config;
mod types;

// Gateway and its collaborators
pub mod guard;
pub mod server;
pub mod store;

// Re-export key types and functions
pub use config::{AppConfig, AppEnv, DEFAULT_API_PORT, SERVICE_NAME};
pub use guard::{
    Decision, DenyReason, Gateway, GuardState, OrgContext, TrustPolicy, generate_api_key,
    hash_api_key,
};
pub use store::{
    DatabaseConfig, Db, MemoryStore, SurrealStore, create_connection, ensure_schema,
};
pub use types::{ApiKeyHash, ApiKeyPrefix, ClientIp, OrgId, OrgSlug};

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use guard::PlainKeyScheme;

/// Convenience function to assemble the fully configured application.
///
/// Builds the gateway over a SurrealDB-backed store pair, applies the
/// configured trust policy, key scheme and authorization timeout, and
/// mounts the guarded router around it.
pub fn create_app(config: &AppConfig, db: Db) -> Router {
    let store = Arc::new(SurrealStore::new(db));
    let mut gateway = Gateway::new(store.clone(), store)
        .with_trust_policy(TrustPolicy::new(config.trusted_hops));
    if config.plain_keys {
        gateway = gateway.with_key_scheme(PlainKeyScheme);
    }

    let state = GuardState::new(
        Arc::new(gateway),
        Duration::from_millis(config.auth_timeout_ms),
    );
    server::create_router(state)
}
