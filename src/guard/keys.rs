//! Key schemes: how a presented secret becomes a store lookup value.
//!
//! The pipeline never compares secrets itself; it derives a lookup value
//! and asks the credential store for an exact match. Which derivation runs
//! is a [`KeyScheme`] chosen at construction, so hardening the comparison
//! does not change the pipeline shape.

use sha2::{Digest, Sha256};

use crate::types::{ApiKeyHash, ApiKeyPrefix};

/// Derivation of the store lookup value for a presented secret.
pub trait KeyScheme: Send + Sync {
    fn lookup_value(&self, presented: &str) -> String;
}

/// Verbatim lookup of the raw secret.
///
/// Exists for stores still holding plaintext keys from the MVP era.
/// Plaintext storage and verbatim string comparison leak timing and leave
/// secrets readable at rest; new deployments must use [`HashedKeyScheme`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainKeyScheme;

impl KeyScheme for PlainKeyScheme {
    fn lookup_value(&self, presented: &str) -> String {
        presented.to_string()
    }
}

/// Lookup by SHA-256 hex digest of the secret.
///
/// The store never sees the raw secret, and any equality check downstream
/// runs on fixed-length digests rather than attacker-controlled strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedKeyScheme;

impl KeyScheme for HashedKeyScheme {
    fn lookup_value(&self, presented: &str) -> String {
        hash_api_key(presented).into_inner()
    }
}

/// Hash an API key for storage and lookup (don't store raw keys).
pub fn hash_api_key(key: &str) -> ApiKeyHash {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let result = hasher.finalize();
    ApiKeyHash::new(format!("{:x}", result))
}

/// Generate a new API key with the format: prefix_randompart
/// Returns (full_key, prefix, hash)
pub fn generate_api_key() -> (String, ApiKeyPrefix, ApiKeyHash) {
    use uuid::Uuid;

    let prefix = ApiKeyPrefix::new(format!("vx_{}", &Uuid::new_v4().to_string()[..8]));
    let secret = Uuid::new_v4().to_string().replace("-", "");
    let full_key = format!("{}_{}", prefix, secret);
    let key_hash = hash_api_key(&full_key);

    (full_key, prefix, key_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_api_key() {
        let hash1 = hash_api_key("secret123");
        let hash2 = hash_api_key("secret123");
        let hash3 = hash_api_key("different");

        // Should be a hex string
        assert!(hash1.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash1, hash2); // Same input = same output
        assert_ne!(hash1, hash3); // Different input = different output
    }

    #[test]
    fn test_generate_api_key() {
        let (full_key, prefix, hash) = generate_api_key();

        assert!(full_key.starts_with("vx_"));
        assert!(prefix.as_str().starts_with("vx_"));
        assert!(full_key.contains(prefix.as_str()));
        assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));

        // Verify hash matches
        assert_eq!(hash, hash_api_key(&full_key));
    }

    #[test]
    fn test_plain_scheme_is_verbatim() {
        assert_eq!(PlainKeyScheme.lookup_value("k1"), "k1");
    }

    #[test]
    fn test_hashed_scheme_matches_hash_fn() {
        assert_eq!(
            HashedKeyScheme.lookup_value("k1"),
            hash_api_key("k1").into_inner()
        );
    }
}
