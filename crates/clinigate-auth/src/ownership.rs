//! Ownership-key extraction, one pure function per resource type.
//!
//! Each function maps a materialized resource to the key(s) identifying its
//! owner. Missing or malformed ownership evidence fails the extraction;
//! extraction never defaults to a key that would match.
//!
//! The reference and address conventions are tied to the upstream id-naming
//! scheme (`<type>/<partition>-<key>` references, `…/D<key>` endpoint
//! addresses) and are preserved character for character. A change to the
//! upstream format breaks extraction without any validation catching it,
//! which is why every convention lives behind exactly one function here.

use clinigate_core::ResourceRecord;

use crate::error::{AuthError, AuthResult};

/// Identifier system carrying an organization's master id.
pub const MASTER_ID_SYSTEM: &str = "http://clinigate.io/fhir/system/master-id";

/// Identifier system carrying a practitioner's archive number.
pub const ARCHIVE_NUMBER_SYSTEM: &str = "http://clinigate.io/fhir/system/archive-number";

/// The master id owning an Organization resource.
///
/// # Errors
///
/// `OwnershipDataMissing` when no identifier carries the master-id system.
pub fn organization_master_id(record: &ResourceRecord) -> AuthResult<&str> {
    record.identifier_value(MASTER_ID_SYSTEM).ok_or_else(|| {
        AuthError::ownership_data_missing(format!(
            "Organization {} has no master-id identifier",
            record.id().unwrap_or("<no id>")
        ))
    })
}

/// The archive number owning a Practitioner resource.
///
/// # Errors
///
/// `OwnershipDataMissing` when no identifier carries the archive-number
/// system.
pub fn practitioner_archive_number(record: &ResourceRecord) -> AuthResult<&str> {
    record.identifier_value(ARCHIVE_NUMBER_SYSTEM).ok_or_else(|| {
        AuthError::ownership_data_missing(format!(
            "Practitioner {} has no archive-number identifier",
            record.id().unwrap_or("<no id>")
        ))
    })
}

/// The (practitioner key, organization key) pair owning a PractitionerRole.
///
/// Each key is the substring after the first hyphen of the respective
/// reference string; a reference without a hyphen yields the whole string.
///
/// # Errors
///
/// `OwnershipDataMissing` when either reference is absent.
pub fn practitioner_role_keys(record: &ResourceRecord) -> AuthResult<(&str, &str)> {
    let practitioner = record.reference("practitioner").ok_or_else(|| {
        AuthError::ownership_data_missing("PractitionerRole has no practitioner reference")
    })?;
    let organization = record.reference("organization").ok_or_else(|| {
        AuthError::ownership_data_missing("PractitionerRole has no organization reference")
    })?;

    Ok((reference_key(practitioner), reference_key(organization)))
}

/// The doctor key owning an Endpoint resource.
///
/// The address ends in a partition name: the key is the substring after the
/// last path separator with the partition-class marker character dropped.
///
/// # Errors
///
/// `OwnershipDataMissing` when the address is absent or too short to carry
/// a key.
pub fn endpoint_doctor_key(record: &ResourceRecord) -> AuthResult<&str> {
    let address = record
        .address()
        .ok_or_else(|| AuthError::ownership_data_missing("Endpoint has no address"))?;

    let start = address.rfind('/').map_or(1, |separator| separator + 2);
    address.get(start..).ok_or_else(|| {
        AuthError::ownership_data_missing(format!(
            "Endpoint address {address:?} carries no doctor key"
        ))
    })
}

/// Substring after the first hyphen; the whole string when none is present.
fn reference_key(reference: &str) -> &str {
    match reference.find('-') {
        Some(hyphen) => &reference[hyphen + 1..],
        None => reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(body: serde_json::Value) -> ResourceRecord {
        ResourceRecord::from_json(body).unwrap()
    }

    #[test]
    fn test_organization_master_id() {
        let organization = record(json!({
            "resourceType": "Organization",
            "identifier": [{"system": MASTER_ID_SYSTEM, "value": "account1"}],
        }));
        assert_eq!(organization_master_id(&organization).unwrap(), "account1");
    }

    #[test]
    fn test_organization_without_master_id_fails() {
        let organization = record(json!({
            "resourceType": "Organization",
            "id": "root-ME1",
            "identifier": [{"system": "urn:other", "value": "x"}],
        }));
        let err = organization_master_id(&organization).unwrap_err();
        assert!(matches!(err, AuthError::OwnershipDataMissing { .. }));
    }

    #[test]
    fn test_practitioner_archive_number() {
        let practitioner = record(json!({
            "resourceType": "Practitioner",
            "identifier": [{"system": ARCHIVE_NUMBER_SYSTEM, "value": "57761"}],
        }));
        assert_eq!(practitioner_archive_number(&practitioner).unwrap(), "57761");

        let empty = record(json!({"resourceType": "Practitioner"}));
        assert!(practitioner_archive_number(&empty).is_err());
    }

    #[test]
    fn test_practitioner_role_keys() {
        let role = record(json!({
            "resourceType": "PractitionerRole",
            "practitioner": {"reference": "Practitioner/root-57761"},
            "organization": {"reference": "Organization/root-account1"},
        }));
        assert_eq!(
            practitioner_role_keys(&role).unwrap(),
            ("57761", "account1")
        );
    }

    #[test]
    fn test_practitioner_role_key_without_hyphen_is_whole_reference() {
        let role = record(json!({
            "resourceType": "PractitionerRole",
            "practitioner": {"reference": "57761"},
            "organization": {"reference": "Organization/root-account1"},
        }));
        assert_eq!(
            practitioner_role_keys(&role).unwrap(),
            ("57761", "account1")
        );
    }

    #[test]
    fn test_practitioner_role_missing_reference_fails() {
        let role = record(json!({
            "resourceType": "PractitionerRole",
            "practitioner": {"reference": "Practitioner/root-57761"},
        }));
        assert!(matches!(
            practitioner_role_keys(&role).unwrap_err(),
            AuthError::OwnershipDataMissing { .. }
        ));
    }

    #[test]
    fn test_endpoint_doctor_key() {
        let endpoint = record(json!({
            "resourceType": "Endpoint",
            "address": "https://records.example.com/fhir/r4/D57761",
        }));
        assert_eq!(endpoint_doctor_key(&endpoint).unwrap(), "57761");
    }

    #[test]
    fn test_endpoint_trailing_separator_yields_empty_key() {
        // "…/D" keeps the convention: marker dropped, nothing left.
        let endpoint = record(json!({
            "resourceType": "Endpoint",
            "address": "https://records.example.com/fhir/r4/D",
        }));
        assert_eq!(endpoint_doctor_key(&endpoint).unwrap(), "");
    }

    #[test]
    fn test_endpoint_address_too_short_fails() {
        let endpoint = record(json!({
            "resourceType": "Endpoint",
            "address": "x/",
        }));
        assert!(matches!(
            endpoint_doctor_key(&endpoint).unwrap_err(),
            AuthError::OwnershipDataMissing { .. }
        ));
    }

    #[test]
    fn test_endpoint_without_address_fails() {
        let endpoint = record(json!({"resourceType": "Endpoint"}));
        assert!(matches!(
            endpoint_doctor_key(&endpoint).unwrap_err(),
            AuthError::OwnershipDataMissing { .. }
        ));
    }

    #[test]
    fn test_endpoint_multibyte_boundary_fails_closed() {
        // A marker that is part of a multi-byte character cannot be split;
        // the extraction fails instead of panicking or guessing.
        let endpoint = record(json!({
            "resourceType": "Endpoint",
            "address": "https://records.example.com/fhir/r4/ä",
        }));
        assert!(endpoint_doctor_key(&endpoint).is_err());
    }
}
