//! The fine-grained, per-resource visibility filter.
//!
//! Applied after the storage engine has materialized resources and before
//! anything leaves the system boundary. Each resource is classified as
//! [`Visibility::Proceed`], [`Visibility::Authorized`], or
//! [`Visibility::Reject`] by matching the principal's claims against the
//! ownership keys extracted from the resource; collections are filtered
//! recursively, entry by entry, in document order.

use clinigate_core::{Partition, PartitionClass, ResourceRecord, ResourceType};
use serde_json::Value;

use crate::audit;
use crate::error::{AuthError, AuthResult};
use crate::ownership;
use crate::principal::Principal;
use crate::verification::{Verification, fhir_all};

/// Tag system marking a collection that lost entries to filtering.
///
/// The tag is informational; it carries no access-control meaning.
pub const REDACTED_TAG_SYSTEM: &str = "http://clinigate.io/fhir/tag/redacted";

/// Visibility classification of a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Return the resource; the decision consumed no further context.
    Proceed,
    /// Return the resource unconditionally (metadata/capability types).
    Authorized,
    /// Omit or deny the resource.
    Reject,
}

impl Visibility {
    /// Returns `true` when the resource may be returned.
    #[must_use]
    pub fn allows(self) -> bool {
        matches!(self, Self::Proceed | Self::Authorized)
    }
}

/// Classify a single, non-collection resource.
///
/// Dispatches on the declared resource type, extracts the ownership keys
/// the type requires, and matches the principal against the type's claim
/// chain. A claim whose external check hard-fails counts as not matched.
///
/// # Errors
///
/// - `OwnershipDataMissing` when the resource lacks its ownership evidence.
/// - `UnsupportedResourceType` for types without a visibility rule; this
///   signals a gap in the ownership model, not a legitimate denial.
/// - `Internal` when called with a collection; collections are filtered
///   with [`filter_for_visibility`], not classified atomically.
pub async fn can_see(
    principal: &Principal,
    partition: &Partition,
    record: &ResourceRecord,
) -> AuthResult<Visibility> {
    match record.resource_type() {
        ResourceType::Basic => {
            Ok(decide(principal, partition, record, &fhir_all()).await)
        }
        ResourceType::Organization => {
            let master_id = ownership::organization_master_id(record)?;
            let verification = Verification::master_id(master_id).or(fhir_all());
            Ok(decide(principal, partition, record, &verification).await)
        }
        ResourceType::Practitioner => {
            let archive_number = ownership::practitioner_archive_number(record)?;
            let verification = Verification::consulting_doctor(archive_number)
                .or(Verification::prescribing_doctor(archive_number))
                .or(fhir_all());
            Ok(decide(principal, partition, record, &verification).await)
        }
        ResourceType::PractitionerRole => {
            let (practitioner_key, organization_key) = ownership::practitioner_role_keys(record)?;
            let verification = Verification::consulting_doctor(practitioner_key)
                .or(Verification::prescribing_doctor(practitioner_key))
                .or(Verification::master_id(organization_key))
                .or(fhir_all());
            Ok(decide(principal, partition, record, &verification).await)
        }
        ResourceType::Endpoint => {
            let doctor_key = ownership::endpoint_doctor_key(record)?;
            let verification = Verification::consulting_doctor(doctor_key)
                .or(Verification::prescribing_doctor(doctor_key))
                .or(fhir_all());
            Ok(decide(principal, partition, record, &verification).await)
        }
        ResourceType::ServiceRequest => match partition.class() {
            PartitionClass::Doctor(doctor_key) => {
                let verification =
                    Verification::prescribing_doctor(doctor_key.clone()).or(fhir_all());
                Ok(decide(principal, partition, record, &verification).await)
            }
            // Orders exist only inside doctor-private partitions; anywhere
            // else they are withheld from every principal.
            _ => {
                audit::denied(
                    record.resource_type(),
                    partition.name(),
                    "order records are confined to doctor partitions",
                );
                Ok(Visibility::Reject)
            }
        },
        ResourceType::CapabilityStatement
        | ResourceType::Parameters
        | ResourceType::OperationOutcome => Ok(Visibility::Authorized),
        ResourceType::Bundle => Err(AuthError::internal(
            "collections are filtered, not classified",
        )),
        ResourceType::Custom(name) => Err(AuthError::unsupported_resource_type(name.clone())),
    }
}

/// Filter a resource or collection before it leaves the system boundary.
///
/// Single resources pass through unchanged or are rejected. Collections
/// are rebuilt from the entries that pass, in their original order; a
/// collection that lost entries is annotated with a redaction tag.
///
/// # Errors
///
/// Returns `Forbidden` for a rejected single resource, or the extraction
/// error when ownership evidence is missing or the type is unsupported.
pub async fn filter_for_visibility(
    principal: &Principal,
    partition: &Partition,
    record: ResourceRecord,
) -> AuthResult<ResourceRecord> {
    if record.resource_type() == &ResourceType::Bundle {
        return filter_collection(principal, partition, record).await;
    }

    match can_see(principal, partition, &record).await? {
        Visibility::Proceed | Visibility::Authorized => Ok(record),
        Visibility::Reject => Err(AuthError::forbidden(format!(
            "{} is not visible to this principal",
            record.resource_type()
        ))),
    }
}

/// Evaluate one claim chain and log a genuine denial.
async fn decide(
    principal: &Principal,
    partition: &Partition,
    record: &ResourceRecord,
    verification: &Verification,
) -> Visibility {
    if principal.matches(verification).await {
        Visibility::Proceed
    } else {
        audit::denied(record.resource_type(), partition.name(), "no claim matched");
        Visibility::Reject
    }
}

/// Filter every entry of a collection, preserving order.
///
/// Entries are decided independently; a rejected or undecidable entry is
/// omitted rather than failing the whole collection. Nested collections
/// are filtered recursively in place.
async fn filter_collection(
    principal: &Principal,
    partition: &Partition,
    mut record: ResourceRecord,
) -> AuthResult<ResourceRecord> {
    let Some(entries) = record.entries() else {
        return Ok(record);
    };
    let entries = entries.clone();

    let mut retained: Vec<Value> = Vec::with_capacity(entries.len());
    let mut removed = 0usize;

    for mut entry in entries {
        let Some(resource_json) = entry.get("resource") else {
            // Entries without a resource carry nothing to hide.
            retained.push(entry);
            continue;
        };

        let resource = match ResourceRecord::from_json(resource_json.clone()) {
            Ok(resource) => resource,
            Err(err) => {
                tracing::warn!(error = %err, "dropping undecidable collection entry");
                removed += 1;
                continue;
            }
        };

        if resource.resource_type() == &ResourceType::Bundle {
            let filtered = Box::pin(filter_collection(principal, partition, resource)).await?;
            entry["resource"] = filtered.into_body();
            retained.push(entry);
            continue;
        }

        match can_see(principal, partition, &resource).await {
            Ok(Visibility::Proceed | Visibility::Authorized) => retained.push(entry),
            Ok(Visibility::Reject) => removed += 1,
            Err(err) => {
                // Fail closed: an entry whose ownership evidence cannot be
                // read is withheld, and the failure is not a denial.
                tracing::warn!(error = %err, "dropping undecidable collection entry");
                removed += 1;
            }
        }
    }

    record.set_entries(retained);
    if removed > 0 {
        record.add_meta_tag(
            REDACTED_TAG_SYSTEM,
            "redacted",
            &format!("{removed} entries removed"),
        );
    }
    Ok(record)
}
