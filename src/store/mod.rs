//! Read-only store collaborators consumed by the authorization gateway.
//!
//! The gateway never talks to a database directly. It is constructed with
//! two trait objects, a [`CredentialStore`] and an [`OrganizationStore`],
//! and these are its only dependencies. "Looked up, not present" is
//! `Ok(None)`; "could not look up" is `Err(StoreError)`. The distinction
//! matters because the latter must surface as a server fault, never as an
//! invalid credential.
//!
//! Two implementations ship with the service: [`SurrealStore`] backed by
//! SurrealDB, and [`MemoryStore`] for tests and local single-process mode.

mod connection;
mod memory;
mod queries;
mod schema;
mod surreal;

pub use connection::{Db, DatabaseConfig, create_connection, ensure_schema};
pub use memory::MemoryStore;
pub use queries::QueryBuilder;
pub use schema::{ApiKeyCreate, ApiKeyRecord, OrganizationCreate, OrganizationRecord};
pub use surreal::SurrealStore;

use crate::types::{ClientIp, OrgId};
use async_trait::async_trait;
use std::fmt;

/// A credential record as seen by the gateway: the tenant binding only.
///
/// The raw secret never travels past the lookup; a credential resolves to
/// the organization it was issued for and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Organization this credential was issued for.
    pub org_id: OrgId,
}

/// An organization's policy record as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    /// Stable organization identifier.
    pub org_id: OrgId,
    /// Origins permitted to act on behalf of this organization.
    /// An empty list permits no origin at all.
    pub allowed_ips: Vec<ClientIp>,
}

/// Failure to consult a backing store.
///
/// Carries no decision semantics: a `StoreError` means the lookup could not
/// be performed, and the gateway maps it to a server-fault response rather
/// than any deny reason.
#[derive(Debug, Clone)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store error: {}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// Lookup of credentials by their store form.
///
/// `lookup` is whatever the configured key scheme derives from the
/// presented secret: the verbatim secret under the plain scheme, or its
/// SHA-256 hex digest under the hashed scheme. The store guarantees at
/// most one match.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_credential(&self, lookup: &str) -> Result<Option<Credential>, StoreError>;
}

/// Lookup of an organization's policy record by its identifier.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn find_organization(&self, org_id: &OrgId) -> Result<Option<Organization>, StoreError>;
}
