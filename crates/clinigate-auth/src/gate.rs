//! The partition gate: may this principal address this partition at all?
//!
//! Evaluated before the coarse rule list is built. The gate is a pure
//! decision; its only side effect is logging. Unknown partitions and
//! partitions the principal may not enter are rejected with error variants
//! that map to one caller-visible rejection kind, so callers cannot probe
//! which partition names exist.

use clinigate_core::{Partition, PartitionClass};

use crate::audit;
use crate::error::{AuthError, AuthResult};
use crate::principal::Principal;
use crate::verification::{Verification, fhir_all};

/// Decide whether the principal may address the named partition.
///
/// Rules, in order:
///
/// 1. `root` is always allowed; per-resource checks happen later.
/// 2. `DEFAULT` requires the blanket permission.
/// 3. `D<key>` requires the consulting- or prescribing-doctor claim for
///    `key`; a hard verification failure rejects like a no-match.
/// 4. Anything else is unknown and rejected.
///
/// # Errors
///
/// Returns `UnknownPartition` or `PartitionNotPermitted`; both surface to
/// the caller as the same generic rejection.
pub async fn check_partition(principal: &Principal, name: &str) -> AuthResult<Partition> {
    let Some(partition) = Partition::from_name(name) else {
        audit::partition_rejected(name, "unrecognized partition name");
        return Err(AuthError::unknown_partition(name));
    };

    match partition.class() {
        PartitionClass::Root => {}
        PartitionClass::Default => {
            if !principal.matches(&fhir_all()).await {
                audit::partition_rejected(name, "administrative partition requires FHIR_ALL");
                return Err(AuthError::partition_not_permitted(name));
            }
        }
        PartitionClass::Doctor(key) => {
            let verification = Verification::consulting_doctor(key.clone())
                .or(Verification::prescribing_doctor(key.clone()));
            if let Err(err) = principal.verify(&verification).await {
                audit::partition_rejected(name, &err.to_string());
                return Err(AuthError::partition_not_permitted(name));
            }
        }
    }

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectionKind;
    use crate::rules::FhirOperation;
    use crate::test_support::{
        MockClaims, anonymous_principal, blanket_principal, doctor_principal, principal_with,
    };

    #[tokio::test]
    async fn test_root_is_always_allowed() {
        let partition = check_partition(&anonymous_principal(), "root").await.unwrap();
        assert!(partition.class().is_root());
    }

    #[tokio::test]
    async fn test_default_requires_blanket_permission() {
        let partition = check_partition(&blanket_principal(), "DEFAULT").await.unwrap();
        assert!(partition.class().is_default());

        let err = check_partition(&anonymous_principal(), "DEFAULT")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PartitionNotPermitted { .. }));
    }

    #[tokio::test]
    async fn test_doctor_partition_requires_matching_claim() {
        let partition = check_partition(&doctor_principal("57761"), "D57761")
            .await
            .unwrap();
        assert_eq!(partition.class().doctor_key(), Some("57761"));

        // A consulting-only or prescribing-only claim is enough.
        let consultant = principal_with(MockClaims::consultant("57761"));
        assert!(check_partition(&consultant, "D57761").await.is_ok());
        let prescriber = principal_with(MockClaims::prescriber("57761"));
        assert!(check_partition(&prescriber, "D57761").await.is_ok());
    }

    #[tokio::test]
    async fn test_doctor_partition_rejects_other_doctors() {
        let err = check_partition(&doctor_principal("57761"), "D666")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PartitionNotPermitted { .. }));
    }

    #[tokio::test]
    async fn test_verification_failure_rejects() {
        let claims = MockClaims::doctor("57761")
            .failing_consulting()
            .failing_prescribing();
        let err = check_partition(&principal_with(claims), "D57761")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PartitionNotPermitted { .. }));
    }

    #[tokio::test]
    async fn test_unknown_and_refused_reject_identically() {
        let unknown = check_partition(&anonymous_principal(), "no-such-partition")
            .await
            .unwrap_err();
        let refused = check_partition(&anonymous_principal(), "D57761")
            .await
            .unwrap_err();

        assert_eq!(
            unknown.rejection_kind(FhirOperation::Search),
            RejectionKind::Unauthorized
        );
        assert_eq!(
            unknown.rejection_kind(FhirOperation::Search),
            refused.rejection_kind(FhirOperation::Search)
        );
    }

    #[tokio::test]
    async fn test_empty_doctor_key_is_unknown() {
        let err = check_partition(&blanket_principal(), "D").await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownPartition { .. }));
    }
}
