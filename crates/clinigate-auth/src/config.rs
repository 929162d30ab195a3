//! Authorization engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::principal::DEFAULT_CALL_TIMEOUT;

/// Root configuration of the authorization engine.
///
/// # Example (TOML)
///
/// ```toml
/// [auth.verifier]
/// call_timeout = "2s"
///
/// [auth.relay]
/// base_url = "https://orders.internal.clinigate.io"
/// draft_endpoint = "/draftServiceRequests"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Claim verification settings.
    pub verifier: VerifierConfig,

    /// Draft-order relay settings.
    pub relay: RelayConfig,
}

/// Settings for external claim verification.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Bound on a single claim check against the external service.
    /// A check exceeding the bound counts as not matched.
    #[serde(with = "humantime_serde")]
    pub call_timeout: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Settings for the draft-order relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Base URL of the downstream order service.
    pub base_url: String,

    /// Path of the draft-order endpoint, appended to the base URL.
    pub draft_endpoint: String,
}

impl RelayConfig {
    /// The forward URL for a given partition.
    #[must_use]
    pub fn draft_url(&self, partition: &str) -> String {
        format!("{}{}/{partition}", self.base_url, self.draft_endpoint)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            draft_endpoint: "/draftServiceRequests".to_string(),
        }
    }
}
