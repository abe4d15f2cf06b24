//! Authorization outcomes.

use std::fmt;

use crate::guard::context::OrgContext;
use crate::store::StoreError;

/// Why a request was denied.
///
/// Each variant maps to a fixed caller-visible status and error string;
/// the mapping is part of the external contract and must not drift.
/// `TenantNotFound` deliberately shares its caller-visible shape with
/// `InvalidCredential`; the distinction lives in audit events only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The credential header was absent or empty.
    MissingCredential,
    /// The credential matched no record in the credential store.
    InvalidCredential,
    /// The credential resolved to an organization that does not exist.
    /// A provisioning anomaly rather than a caller error.
    TenantNotFound,
    /// The claimed origin is not on the organization's allowlist.
    OriginNotAllowed,
}

impl DenyReason {
    /// HTTP status code for this denial.
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingCredential | Self::InvalidCredential | Self::TenantNotFound => 401,
            Self::OriginNotAllowed => 403,
        }
    }

    /// Caller-visible error string for this denial.
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingCredential => "Missing API Key",
            Self::InvalidCredential => "Invalid API Key",
            Self::TenantNotFound => "Organization not found",
            Self::OriginNotAllowed => "IP not allowed",
        }
    }

    /// Snake-case label used in audit events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::TenantNotFound => "organization_not_found",
            Self::OriginNotAllowed => "origin_not_allowed",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// The terminal outcome of one authorization evaluation.
///
/// Exactly one decision is produced per request. `Allowed` carries the
/// request context the protected handler will run under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed(OrgContext),
    Denied(DenyReason),
}

/// Failure to produce a decision at all.
///
/// Never mapped to a deny reason: a degraded store must not look like an
/// invalid credential to the caller.
#[derive(Debug, Clone)]
pub enum GuardError {
    /// A backing store could not be consulted.
    Store(StoreError),
    /// The evaluation exceeded its time budget.
    Timeout,
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "authorization store failure: {}", e),
            Self::Timeout => write!(f, "authorization timed out"),
        }
    }
}

impl std::error::Error for GuardError {}

impl From<StoreError> for GuardError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
