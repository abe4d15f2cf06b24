//! Service configuration.
//!
//! Defaults come from the environment so containerized deployments can
//! configure the service without flags; the CLI layers its own arguments
//! on top of these.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Service name used in logs and tracing directives.
pub const SERVICE_NAME: &str = "velox-api";

/// Default port the public API listens on.
pub const DEFAULT_API_PORT: u16 = 3001;

/// Default number of trusted proxies in front of the service.
pub const DEFAULT_TRUSTED_HOPS: usize = 1;

/// Default budget for a single authorization evaluation, in milliseconds.
pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 5000;

/// Deployment environment the service runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Local,
    Dev,
    Staging,
    Prod,
}

impl AppEnv {
    /// Read the environment from `APP_ENV`, defaulting to `Local`.
    pub fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("dev") => Self::Dev,
            Ok("staging") => Self::Staging,
            Ok("prod") => Self::Prod,
            _ => Self::Local,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Top-level configuration for the API service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port the public API listens on.
    pub port: u16,
    /// Deployment environment (local, dev, staging, prod).
    pub env: AppEnv,
    /// Number of trusted proxies in front of the service. Governs which
    /// hop of the forwarded-for chain is taken as the claimed origin.
    pub trusted_hops: usize,
    /// Upper bound for a single authorization evaluation (extraction,
    /// both store lookups, and the origin check), in milliseconds.
    pub auth_timeout_ms: u64,
    /// Look credentials up verbatim instead of by SHA-256 digest.
    /// Only for stores still holding plaintext keys from the MVP era.
    pub plain_keys: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: env_parsed("API_PORT", DEFAULT_API_PORT),
            env: AppEnv::from_env(),
            trusted_hops: env_parsed("TRUSTED_PROXY_HOPS", DEFAULT_TRUSTED_HOPS),
            auth_timeout_ms: env_parsed("AUTH_TIMEOUT_MS", DEFAULT_AUTH_TIMEOUT_MS),
            plain_keys: false,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}
