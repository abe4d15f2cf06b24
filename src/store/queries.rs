// Provisioning query helpers for SurrealDB.
//
// These back the out-of-band CLI surface (creating organizations and keys,
// listing keys, growing an allowlist). The request path never calls them;
// it goes through the read-only store traits instead.

use crate::store::schema::*;
use crate::types::{ClientIp, OrgSlug};
use anyhow::{Result, anyhow};

use super::Db;

pub struct QueryBuilder;

impl QueryBuilder {
    /// Insert a new organization record.
    pub async fn create_organization(
        db: &Db,
        data: &OrganizationCreate,
    ) -> Result<OrganizationRecord> {
        let mut res = db
            .query(
                r#"
                CREATE organization SET
                    org_id = $org_id,
                    name = $name,
                    slug = $slug,
                    allowed_ips = $allowed_ips,
                    created_at = time::now(),
                    updated_at = time::now()
                "#,
            )
            .bind(("org_id", data.org_id.clone()))
            .bind(("name", data.name.clone()))
            .bind(("slug", data.slug.clone()))
            .bind(("allowed_ips", data.allowed_ips.clone()))
            .await?;

        let created: Option<OrganizationRecord> = res.take(0)?;
        created.ok_or_else(|| anyhow!("failed to create organization record"))
    }

    /// Insert a new API key record bound to an organization.
    pub async fn create_api_key(db: &Db, data: &ApiKeyCreate) -> Result<ApiKeyRecord> {
        let mut res = db
            .query(
                r#"
                CREATE api_key SET
                    organization_id = $organization_id,
                    key_hash = $key_hash,
                    key_prefix = $key_prefix,
                    name = $name,
                    created_at = time::now()
                "#,
            )
            .bind(("organization_id", data.organization_id.clone()))
            .bind(("key_hash", data.key_hash.clone()))
            .bind(("key_prefix", data.key_prefix.clone()))
            .bind(("name", data.name.clone()))
            .await?;

        let created: Option<ApiKeyRecord> = res.take(0)?;
        created.ok_or_else(|| anyhow!("failed to create api key record"))
    }

    /// Find an organization by its unique slug.
    pub async fn find_organization_by_slug(
        db: &Db,
        slug: &OrgSlug,
    ) -> Result<Option<OrganizationRecord>> {
        let mut res = db
            .query(
                r#"
                SELECT * FROM organization
                WHERE slug = $slug
                LIMIT 1
                "#,
            )
            .bind(("slug", slug.clone()))
            .await?;

        let org: Option<OrganizationRecord> = res.take(0)?;
        Ok(org)
    }

    /// Append an origin to an organization's allowlist if not present.
    ///
    /// Returns false when no organization matches the slug.
    pub async fn add_allowed_ip(db: &Db, slug: &OrgSlug, ip: &ClientIp) -> Result<bool> {
        let mut res = db
            .query(
                r#"
                UPDATE organization SET
                    allowed_ips += $ip,
                    updated_at = time::now()
                WHERE slug = $slug AND $ip NOT IN allowed_ips
                "#,
            )
            .bind(("slug", slug.clone()))
            .bind(("ip", ip.clone()))
            .await?;

        let updated: Vec<OrganizationRecord> = res.take(0)?;
        if !updated.is_empty() {
            return Ok(true);
        }

        // The UPDATE matches nothing both for unknown slugs and for
        // already-present origins; distinguish the two for the caller.
        Ok(Self::find_organization_by_slug(db, slug).await?.is_some())
    }

    /// List all API keys, newest first.
    pub async fn list_api_keys(db: &Db) -> Result<Vec<ApiKeyRecord>> {
        let mut res = db
            .query("SELECT * FROM api_key ORDER BY created_at DESC")
            .await?;

        let keys: Vec<ApiKeyRecord> = res.take(0)?;
        Ok(keys)
    }
}
