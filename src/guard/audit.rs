//! Audit side channel for authorization outcomes.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::guard::decision::{DenyReason, GuardError};
use crate::types::{ClientIp, OrgId};

/// Receiver for authorization audit events.
///
/// A pure side channel: implementations observe outcomes and must never
/// influence them. Every deny is reported; allows are reported too but
/// implementations are free to drop them. Calls are synchronous and must
/// not block the request path.
pub trait AuditSink: Send + Sync {
    /// A request was denied. `org_id` is present once the credential
    /// resolved, so origin denials carry the tenant while credential
    /// denials do not.
    fn denied(&self, reason: DenyReason, org_id: Option<&OrgId>, client_ip: &ClientIp);

    /// A request was allowed and bound to an organization.
    fn allowed(&self, org_id: &OrgId, client_ip: &ClientIp);

    /// No decision could be produced; the request was failed closed.
    fn fault(&self, error: &GuardError, client_ip: &ClientIp);
}

/// Default sink emitting structured `tracing` events.
///
/// Caller errors log at warn. The tenant-missing anomaly gets its own
/// event name and error level so provisioning bugs stand out from ordinary
/// bad credentials even though callers see the same 401.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn denied(&self, reason: DenyReason, org_id: Option<&OrgId>, client_ip: &ClientIp) {
        match reason {
            DenyReason::TenantNotFound => {
                error!(
                    event = "ip_guard.org_missing",
                    decision = reason.as_str(),
                    org_id = org_id.map(|o| o.as_str()),
                    client_ip = %client_ip,
                    "credential resolved to a nonexistent organization"
                );
            }
            _ => {
                warn!(
                    event = "ip_guard.blocked",
                    decision = reason.as_str(),
                    org_id = org_id.map(|o| o.as_str()),
                    client_ip = %client_ip,
                    "request denied"
                );
            }
        }
    }

    fn allowed(&self, org_id: &OrgId, client_ip: &ClientIp) {
        debug!(
            event = "ip_guard.allowed",
            org_id = %org_id,
            client_ip = %client_ip,
            "request authorized"
        );
    }

    fn fault(&self, error: &GuardError, client_ip: &ClientIp) {
        error!(
            event = "ip_guard.fault",
            client_ip = %client_ip,
            error = %error,
            "authorization could not complete, failing closed"
        );
    }
}

/// Shared sink handle as the gateway holds it.
pub type SharedAuditSink = Arc<dyn AuditSink>;


#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;

    #[test]
    fn test_recording_sink_captures_events() {
        let sink = RecordingSink::default();
        sink.denied(
            DenyReason::OriginNotAllowed,
            Some(&OrgId::new("org-A")),
            &ClientIp::new("5.6.7.8"),
        );
        sink.allowed(&OrgId::new("org-A"), &ClientIp::new("9.9.9.9"));

        let events = sink.take();
        assert_eq!(
            events,
            vec![
                "denied:origin_not_allowed:org-A:5.6.7.8".to_string(),
                "allowed:org-A:9.9.9.9".to_string(),
            ]
        );
    }

    #[test]
    fn test_tracing_sink_is_infallible() {
        // Emitting without a subscriber installed must not panic.
        let sink = TracingAuditSink;
        sink.denied(DenyReason::MissingCredential, None, &ClientIp::new("0.0.0.0"));
        sink.allowed(&OrgId::new("org-A"), &ClientIp::new("9.9.9.9"));
        sink.fault(&GuardError::Timeout, &ClientIp::new("9.9.9.9"));
    }
}
