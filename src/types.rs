//! NewType wrappers for strong typing throughout the API service.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing an organization slug where an organization ID is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Stable identifier of an organization, the tenant boundary.
    ///
    /// Every credential binds to exactly one organization, and every
    /// authorized request carries the resolved `OrgId` in its context.
    /// Handlers behind the guard scope all reads and writes by it.
    OrgId
);

newtype_string!(
    /// Human-friendly unique slug of an organization (e.g., "acme").
    ///
    /// Used by provisioning tooling to reference organizations without
    /// copying opaque IDs around. Never used for authorization decisions.
    OrgSlug
);

newtype_string!(
    /// Network origin a request claims to come from (e.g., "203.0.113.9").
    ///
    /// Read from the trust-boundary header set by the proxy tier, not
    /// cryptographically verified. An unknown origin is represented by the
    /// explicit `0.0.0.0` sentinel, never by "no restriction".
    ClientIp
);

newtype_string!(
    /// SHA-256 hash of an API key for secure storage and lookup.
    ///
    /// API keys are never stored in plain text. Instead, they are hashed
    /// using SHA-256 and stored/compared using this hash. The hash is
    /// computed once when the key is created or received.
    ApiKeyHash
);

newtype_string!(
    /// Display prefix of an API key (e.g., "vx_abc12345").
    ///
    /// The prefix is the first part of an API key that can be safely
    /// displayed to users for identification purposes. It does not
    /// reveal the full key and cannot be used for authentication.
    ApiKeyPrefix
);
