//! In-memory store implementation for tests and local single-process mode.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::store::{Credential, CredentialStore, Organization, OrganizationStore, StoreError};
use crate::types::{ClientIp, OrgId};

/// Both store traits over plain maps.
///
/// Populated up front and read-only afterwards, so it can be shared across
/// requests without locking. Keys are stored by their lookup form, exactly
/// as a database-backed store would hold them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    credentials: HashMap<String, Credential>,
    organizations: HashMap<OrgId, Organization>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential under its lookup form.
    pub fn with_credential(mut self, lookup: impl Into<String>, org_id: OrgId) -> Self {
        self.credentials
            .insert(lookup.into(), Credential { org_id });
        self
    }

    /// Register an organization and its origin allowlist.
    pub fn with_organization(mut self, org_id: OrgId, allowed_ips: Vec<ClientIp>) -> Self {
        self.organizations.insert(
            org_id.clone(),
            Organization {
                org_id,
                allowed_ips,
            },
        );
        self
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_credential(&self, lookup: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self.credentials.get(lookup).cloned())
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn find_organization(&self, org_id: &OrgId) -> Result<Option<Organization>, StoreError> {
        Ok(self.organizations.get(org_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_lookup() {
        let store = MemoryStore::new()
            .with_credential("k1", OrgId::new("org-A"))
            .with_organization(OrgId::new("org-A"), vec![ClientIp::new("9.9.9.9")]);

        let credential = store.find_credential("k1").await.unwrap().unwrap();
        assert_eq!(credential.org_id, OrgId::new("org-A"));
        assert!(store.find_credential("k2").await.unwrap().is_none());

        let org = store
            .find_organization(&OrgId::new("org-A"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(org.allowed_ips, vec![ClientIp::new("9.9.9.9")]);
        assert!(
            store
                .find_organization(&OrgId::new("org-B"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
