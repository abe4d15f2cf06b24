//! Tenant-scoped request authorization gateway (the "IP guard").
//!
//! Every protected route runs through one pipeline before its handler:
//!
//! 1. **Extract** the opaque API key from the `x-api-key` header
//! 2. **Resolve** the key to a credential record (tenant binding)
//! 3. **Resolve** the organization's policy record (origin allowlist)
//! 4. **Evaluate** the claimed origin against the allowlist
//! 5. **Bind** the resolved tenant into the request context
//!
//! Any stage may short-circuit to a deny with a specific reason; all
//! denies are terminal for the request. The policy is fail-closed
//! throughout: an empty allowlist permits nothing, an absent origin
//! header is an explicit unknown-origin sentinel, and a store that cannot
//! be consulted is a server fault rather than an invalid credential.
//!
//! ## Security Model
//!
//! - The gateway's only dependencies are two injected read-only stores;
//!   it performs no writes and holds no per-request state
//! - Handlers mounted behind the guard can assume a validated
//!   organization identifier in their [`OrgContext`]
//! - Secrets are looked up by a pluggable [`KeyScheme`]; the hardened
//!   scheme hands the store a SHA-256 digest so raw secrets never reach
//!   query text or comparisons
//! - Every deny is reported to an [`AuditSink`] with the decision kind,
//!   the tenant if resolved, and the claimed origin

mod audit;
mod context;
mod decision;
mod gateway;
mod keys;
mod middleware;
mod origin;


pub use audit::{AuditSink, SharedAuditSink, TracingAuditSink};
pub use context::OrgContext;
pub use decision::{Decision, DenyReason, GuardError};
pub use gateway::Gateway;
pub use keys::{HashedKeyScheme, KeyScheme, PlainKeyScheme, generate_api_key, hash_api_key};
pub use middleware::{API_KEY_HEADER, FORWARDED_FOR_HEADER, GuardState, ip_guard};
pub use origin::{TrustPolicy, UNKNOWN_ORIGIN, origin_allowed};
