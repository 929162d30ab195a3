//! Structured logging of authorization decisions.
//!
//! Genuine denials are routine and logged at `debug`; decisions that
//! degraded because the external verification service errored or timed out
//! are logged at `warn` so operators can tell the two apart.

use clinigate_core::ResourceType;

use crate::principal::VerificationFailure;
use crate::verification::Verification;

/// Record a genuine visibility denial.
pub fn denied(resource_type: &ResourceType, partition: &str, reason: &str) {
    tracing::debug!(
        resource_type = %resource_type,
        partition = %partition,
        reason = %reason,
        "resource visibility denied"
    );
}

/// Record a partition-level rejection.
pub fn partition_rejected(name: &str, reason: &str) {
    tracing::debug!(partition = %name, reason = %reason, "partition access rejected");
}

/// Record a decision that degraded to "not matched" because claim checks
/// hard-failed.
pub fn verifier_degraded(verification: &Verification, failures: &[VerificationFailure]) {
    for failure in failures {
        tracing::warn!(
            verification = %verification,
            error = %failure,
            "claim verification degraded to no-match"
        );
    }
}
