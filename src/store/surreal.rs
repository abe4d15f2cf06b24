//! SurrealDB-backed implementation of the gateway's store collaborators.

use async_trait::async_trait;

use crate::store::schema::{ApiKeyRecord, OrganizationRecord};
use crate::store::{Credential, CredentialStore, Db, Organization, OrganizationStore, StoreError};
use crate::types::{ClientIp, OrgId};

/// Both store traits served from one SurrealDB connection.
///
/// The connection handles its own pooling and is safe to share; the
/// implementation only ever issues SELECTs, so the gateway's read-only
/// contract holds by construction.
#[derive(Debug, Clone)]
pub struct SurrealStore {
    db: Db,
}

impl SurrealStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }
}

#[async_trait]
impl CredentialStore for SurrealStore {
    async fn find_credential(&self, lookup: &str) -> Result<Option<Credential>, StoreError> {
        let mut res = self
            .db
            .query(
                r#"
                SELECT * FROM api_key
                WHERE key_hash = $lookup
                LIMIT 1
                "#,
            )
            .bind(("lookup", lookup.to_string()))
            .await
            .map_err(|e| StoreError::new(e.to_string()))?;

        let record: Option<ApiKeyRecord> =
            res.take(0).map_err(|e| StoreError::new(e.to_string()))?;

        Ok(record.map(|r| Credential {
            org_id: OrgId::new(r.organization_id),
        }))
    }
}

#[async_trait]
impl OrganizationStore for SurrealStore {
    async fn find_organization(
        &self,
        org_id: &OrgId,
    ) -> Result<Option<Organization>, StoreError> {
        let mut res = self
            .db
            .query(
                r#"
                SELECT * FROM organization
                WHERE org_id = $org_id
                LIMIT 1
                "#,
            )
            .bind(("org_id", org_id.as_str().to_string()))
            .await
            .map_err(|e| StoreError::new(e.to_string()))?;

        let record: Option<OrganizationRecord> =
            res.take(0).map_err(|e| StoreError::new(e.to_string()))?;

        Ok(record.map(|r| Organization {
            org_id: OrgId::new(r.org_id),
            allowed_ips: r.allowed_ips.into_iter().map(ClientIp::new).collect(),
        }))
    }
}
