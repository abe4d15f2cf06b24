//! The tenant-scoped authorization gateway.
//!
//! One evaluation per request: resolve the presented credential to an
//! organization, check the claimed origin against that organization's
//! allowlist, and either bind the tenant into a request context or deny
//! with a specific reason. Stages run strictly in order and any stage may
//! short-circuit; there are no retries and the gateway performs no writes.

use std::sync::Arc;

use crate::guard::audit::{AuditSink, SharedAuditSink, TracingAuditSink};
use crate::guard::context::OrgContext;
use crate::guard::decision::{Decision, DenyReason, GuardError};
use crate::guard::keys::{HashedKeyScheme, KeyScheme};
use crate::guard::origin::{TrustPolicy, origin_allowed};
use crate::store::{CredentialStore, OrganizationStore};
use crate::types::ClientIp;

/// The authorization pipeline and its collaborators.
///
/// Constructed once at startup and shared across requests; it holds no
/// per-request state, so concurrent evaluations are independent by
/// construction. Its only dependencies are the two injected read-only
/// stores; there is no ambient database handle to reach for.
pub struct Gateway {
    credentials: Arc<dyn CredentialStore>,
    organizations: Arc<dyn OrganizationStore>,
    key_scheme: Arc<dyn KeyScheme>,
    trust_policy: TrustPolicy,
    audit: SharedAuditSink,
}

impl Gateway {
    /// Create a gateway over the two store collaborators.
    ///
    /// Defaults: SHA-256 key scheme, one trusted proxy hop, tracing audit
    /// sink. Each can be swapped with the `with_*` builders.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        organizations: Arc<dyn OrganizationStore>,
    ) -> Self {
        Self {
            credentials,
            organizations,
            key_scheme: Arc::new(HashedKeyScheme),
            trust_policy: TrustPolicy::default(),
            audit: Arc::new(TracingAuditSink),
        }
    }

    /// Swap the key scheme (e.g. verbatim lookup for legacy stores).
    pub fn with_key_scheme(mut self, scheme: impl KeyScheme + 'static) -> Self {
        self.key_scheme = Arc::new(scheme);
        self
    }

    /// Swap the trust-boundary policy for origin extraction.
    pub fn with_trust_policy(mut self, policy: TrustPolicy) -> Self {
        self.trust_policy = policy;
        self
    }

    /// Swap the audit sink. Takes a shared handle so the caller can keep
    /// one for its own inspection.
    pub fn with_audit_sink(mut self, sink: SharedAuditSink) -> Self {
        self.audit = sink;
        self
    }

    /// The trust-boundary policy this gateway evaluates origins under.
    pub fn trust_policy(&self) -> TrustPolicy {
        self.trust_policy
    }

    /// The audit sink decisions are reported to.
    pub fn audit(&self) -> &SharedAuditSink {
        &self.audit
    }

    /// Run the full pipeline for one request.
    ///
    /// `api_key` and `forwarded_for` are the raw header values as read at
    /// the trust boundary. Returns the terminal decision, or an error when
    /// no decision could be produced at all: a degraded store is a server
    /// fault, never an invalid credential.
    pub async fn authorize(
        &self,
        api_key: Option<&str>,
        forwarded_for: Option<&str>,
    ) -> Result<Decision, GuardError> {
        // The claimed origin is pure input; resolve it up front so every
        // audit event carries it, whichever stage denies.
        let client_ip = self.trust_policy.claimed_origin(forwarded_for);

        let key = match api_key {
            Some(k) if !k.trim().is_empty() => k,
            _ => return Ok(self.deny(DenyReason::MissingCredential, None, client_ip)),
        };

        let lookup = self.key_scheme.lookup_value(key);
        let credential = match self.lookup(self.credentials.find_credential(&lookup), &client_ip).await? {
            Some(c) => c,
            None => return Ok(self.deny(DenyReason::InvalidCredential, None, client_ip)),
        };

        let org = match self
            .lookup(self.organizations.find_organization(&credential.org_id), &client_ip)
            .await?
        {
            Some(o) => o,
            None => {
                return Ok(self.deny(
                    DenyReason::TenantNotFound,
                    Some(credential.org_id),
                    client_ip,
                ));
            }
        };

        if !origin_allowed(&org.allowed_ips, &client_ip) {
            return Ok(self.deny(DenyReason::OriginNotAllowed, Some(org.org_id), client_ip));
        }

        let context = OrgContext::new(org.org_id, client_ip);
        self.audit.allowed(context.org_id(), context.client_ip());
        Ok(Decision::Allowed(context))
    }

    /// Await a store lookup, auditing and propagating a store fault.
    async fn lookup<T>(
        &self,
        fut: impl Future<Output = Result<T, crate::store::StoreError>>,
        client_ip: &ClientIp,
    ) -> Result<T, GuardError> {
        match fut.await {
            Ok(v) => Ok(v),
            Err(e) => {
                let err = GuardError::Store(e);
                self.audit.fault(&err, client_ip);
                Err(err)
            }
        }
    }

    fn deny(
        &self,
        reason: DenyReason,
        org_id: Option<crate::types::OrgId>,
        client_ip: ClientIp,
    ) -> Decision {
        self.audit.denied(reason, org_id.as_ref(), &client_ip);
        Decision::Denied(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::audit::testing::RecordingSink;
    use crate::guard::keys::{PlainKeyScheme, hash_api_key};
    use crate::guard::origin::UNKNOWN_ORIGIN;
    use crate::store::{Credential, MemoryStore, Organization, StoreError};
    use crate::types::OrgId;
    use async_trait::async_trait;

    /// Store that fails every lookup, standing in for an unreachable
    /// database.
    struct DownStore;

    #[async_trait]
    impl CredentialStore for DownStore {
        async fn find_credential(&self, _lookup: &str) -> Result<Option<Credential>, StoreError> {
            Err(StoreError::new("connection refused"))
        }
    }

    #[async_trait]
    impl OrganizationStore for DownStore {
        async fn find_organization(
            &self,
            _org_id: &OrgId,
        ) -> Result<Option<Organization>, StoreError> {
            Err(StoreError::new("connection refused"))
        }
    }

    fn seeded_store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new()
                .with_credential("k1", OrgId::new("org-A"))
                .with_credential("k-dangling", OrgId::new("org-gone"))
                .with_credential("k-locked", OrgId::new("org-B"))
                .with_organization(OrgId::new("org-A"), vec![ClientIp::new("9.9.9.9")])
                .with_organization(OrgId::new("org-B"), vec![]),
        )
    }

    fn plain_gateway() -> Gateway {
        let store = seeded_store();
        Gateway::new(store.clone(), store).with_key_scheme(PlainKeyScheme)
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let gateway = plain_gateway();
        for key in [None, Some(""), Some("   ")] {
            let decision = gateway.authorize(key, Some("9.9.9.9")).await.unwrap();
            assert_eq!(decision, Decision::Denied(DenyReason::MissingCredential));
        }
    }

    #[tokio::test]
    async fn test_invalid_credential() {
        let gateway = plain_gateway();
        let decision = gateway.authorize(Some("nope"), Some("9.9.9.9")).await.unwrap();
        assert_eq!(decision, Decision::Denied(DenyReason::InvalidCredential));
    }

    #[tokio::test]
    async fn test_dangling_credential_is_tenant_not_found() {
        let gateway = plain_gateway();
        let decision = gateway
            .authorize(Some("k-dangling"), Some("9.9.9.9"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::Denied(DenyReason::TenantNotFound));
    }

    #[tokio::test]
    async fn test_empty_allowlist_denies_every_origin() {
        let gateway = plain_gateway();
        for origin in [Some("9.9.9.9"), Some("1.2.3.4"), None] {
            let decision = gateway.authorize(Some("k-locked"), origin).await.unwrap();
            assert_eq!(decision, Decision::Denied(DenyReason::OriginNotAllowed));
        }
    }

    #[tokio::test]
    async fn test_allow_binds_tenant_and_origin() {
        let gateway = plain_gateway();
        let decision = gateway.authorize(Some("k1"), Some("9.9.9.9")).await.unwrap();
        match decision {
            Decision::Allowed(ctx) => {
                assert_eq!(ctx.org_id().as_str(), "org-A");
                assert_eq!(ctx.client_ip().as_str(), "9.9.9.9");
            }
            other => panic!("expected allow, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_origin_denied() {
        let gateway = plain_gateway();
        let decision = gateway.authorize(Some("k1"), Some("5.6.7.8")).await.unwrap();
        assert_eq!(decision, Decision::Denied(DenyReason::OriginNotAllowed));
    }

    #[tokio::test]
    async fn test_absent_origin_is_sentinel_not_wildcard() {
        let gateway = plain_gateway();
        let decision = gateway.authorize(Some("k1"), None).await.unwrap();
        assert_eq!(decision, Decision::Denied(DenyReason::OriginNotAllowed));
    }

    #[tokio::test]
    async fn test_forwarded_chain_uses_trusted_hop() {
        let gateway = plain_gateway().with_trust_policy(TrustPolicy::new(1));
        // The rightmost entry is what our proxy appended; the spoofed
        // leftmost entry must not be evaluated.
        let decision = gateway
            .authorize(Some("k1"), Some("9.9.9.9, 5.6.7.8"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::Denied(DenyReason::OriginNotAllowed));

        let decision = gateway
            .authorize(Some("k1"), Some("1.2.3.4, 9.9.9.9"))
            .await
            .unwrap();
        assert!(matches!(decision, Decision::Allowed(_)));
    }

    #[tokio::test]
    async fn test_hashed_scheme_end_to_end() {
        let store = Arc::new(
            MemoryStore::new()
                .with_credential(hash_api_key("k1").into_inner(), OrgId::new("org-A"))
                .with_organization(OrgId::new("org-A"), vec![ClientIp::new("9.9.9.9")]),
        );
        let gateway = Gateway::new(store.clone(), store);
        let decision = gateway.authorize(Some("k1"), Some("9.9.9.9")).await.unwrap();
        assert!(matches!(decision, Decision::Allowed(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_a_fault_not_a_deny() {
        let down = Arc::new(DownStore);
        let gateway = Gateway::new(down.clone(), down).with_key_scheme(PlainKeyScheme);
        let err = gateway
            .authorize(Some("k1"), Some("9.9.9.9"))
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Store(_)));
    }

    #[tokio::test]
    async fn test_idempotent_over_unchanged_stores() {
        let gateway = plain_gateway();
        let first = gateway.authorize(Some("k1"), Some("9.9.9.9")).await.unwrap();
        for _ in 0..5 {
            let again = gateway.authorize(Some("k1"), Some("9.9.9.9")).await.unwrap();
            assert_eq!(again, first);
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_do_not_leak_contexts() {
        let store = Arc::new(
            MemoryStore::new()
                .with_credential("key-a", OrgId::new("org-A"))
                .with_credential("key-b", OrgId::new("org-B"))
                .with_organization(OrgId::new("org-A"), vec![ClientIp::new("1.1.1.1")])
                .with_organization(OrgId::new("org-B"), vec![ClientIp::new("2.2.2.2")]),
        );
        let gateway = Arc::new(
            Gateway::new(store.clone(), store).with_key_scheme(PlainKeyScheme),
        );

        let mut handles = Vec::new();
        for _ in 0..16 {
            let g = gateway.clone();
            handles.push(tokio::spawn(async move {
                g.authorize(Some("key-a"), Some("1.1.1.1")).await.unwrap()
            }));
            let g = gateway.clone();
            handles.push(tokio::spawn(async move {
                g.authorize(Some("key-b"), Some("2.2.2.2")).await.unwrap()
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            let decision = handle.await.unwrap();
            let expected = if i % 2 == 0 { "org-A" } else { "org-B" };
            match decision {
                Decision::Allowed(ctx) => assert_eq!(ctx.org_id().as_str(), expected),
                other => panic!("expected allow, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_audit_events_per_stage() {
        let sink = Arc::new(RecordingSink::default());
        let store = seeded_store();
        let gateway = Gateway::new(store.clone(), store)
            .with_key_scheme(PlainKeyScheme)
            .with_audit_sink(sink.clone());

        gateway.authorize(None, None).await.unwrap();
        gateway.authorize(Some("nope"), Some("1.2.3.4")).await.unwrap();
        gateway
            .authorize(Some("k-dangling"), Some("1.2.3.4"))
            .await
            .unwrap();
        gateway.authorize(Some("k1"), Some("5.6.7.8")).await.unwrap();
        gateway.authorize(Some("k1"), Some("9.9.9.9")).await.unwrap();

        let events = sink.take();
        assert_eq!(
            events,
            vec![
                format!("denied:missing_credential:-:{}", UNKNOWN_ORIGIN),
                "denied:invalid_credential:-:1.2.3.4".to_string(),
                "denied:organization_not_found:org-gone:1.2.3.4".to_string(),
                "denied:origin_not_allowed:org-A:5.6.7.8".to_string(),
                "allowed:org-A:9.9.9.9".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_store_fault_is_audited() {
        let sink = Arc::new(RecordingSink::default());
        let down = Arc::new(DownStore);
        let gateway = Gateway::new(down.clone(), down)
            .with_key_scheme(PlainKeyScheme)
            .with_audit_sink(sink.clone());

        gateway
            .authorize(Some("k1"), Some("9.9.9.9"))
            .await
            .unwrap_err();
        assert_eq!(sink.take(), vec!["fault:9.9.9.9".to_string()]);
    }
}
