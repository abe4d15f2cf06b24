use serde::{Deserialize, Serialize};
use surrealdb::{RecordId, sql::Datetime};

use crate::types::{ApiKeyHash, ApiKeyPrefix};

/// Persisted representation of an organization in SurrealDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationRecord {
    /// Stable database identifier for this record (table: `organization`).
    pub id: RecordId,
    /// Stable organization identifier used across services. This is the
    /// value credentials bind to and request contexts carry.
    pub org_id: String,
    /// Display name of the organization.
    pub name: String,
    /// Unique, human-friendly slug.
    pub slug: String,
    /// Origins permitted to act on behalf of this organization.
    pub allowed_ips: Vec<String>,
    /// When this record was first created.
    pub created_at: Option<Datetime>,
    /// When this record was last updated.
    pub updated_at: Option<Datetime>,
}

/// Payload used when inserting a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationCreate {
    /// Stable organization identifier.
    pub org_id: String,
    /// Display name of the organization.
    pub name: String,
    /// Unique, human-friendly slug.
    pub slug: String,
    /// Initial origin allowlist. May be empty, which denies all origins.
    pub allowed_ips: Vec<String>,
}

/// Persisted representation of an API key in SurrealDB.
///
/// The raw secret is never stored; only its lookup form (SHA-256 hex by
/// default) and the displayable prefix are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    /// Stable database identifier for this record (table: `api_key`).
    pub id: RecordId,
    /// Organization this key was issued for.
    pub organization_id: String,
    /// Lookup form of the secret.
    pub key_hash: String,
    /// Displayable prefix for identification (e.g., "vx_abc12345").
    pub key_prefix: String,
    /// Optional human-readable label for this key.
    pub name: Option<String>,
    /// When this record was first created.
    pub created_at: Option<Datetime>,
}

/// Payload used when inserting a new API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyCreate {
    /// Organization this key is issued for.
    pub organization_id: String,
    /// Lookup form of the secret.
    pub key_hash: ApiKeyHash,
    /// Displayable prefix for identification.
    pub key_prefix: ApiKeyPrefix,
    /// Optional human-readable label.
    pub name: Option<String>,
}
