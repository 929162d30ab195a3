//! The draft-order relay seam.
//!
//! Order creation is not persisted locally: a request creating a
//! ServiceRequest inside a partition is intercepted before the storage
//! engine runs and its raw body is forwarded to the downstream order
//! service, together with two optional caller attributes. Only the
//! interception decision and the relay interface live here; the HTTP
//! transport is an external collaborator.

use async_trait::async_trait;
use clinigate_core::ResourceType;

use crate::error::AuthResult;
use crate::principal::Principal;
use crate::rules::FhirOperation;

/// Query parameter carrying the caller's short user id.
pub const PARAM_USER_SHORT_ID: &str = "userShortId";

/// Query parameter carrying the caller's hospital id.
pub const PARAM_HOSPITAL_ID: &str = "hospitalId";

/// Should this request be relayed instead of handled locally?
///
/// True exactly for a create of a ServiceRequest addressed to a partition.
#[must_use]
pub fn is_draft_order_create(
    resource_type: Option<&ResourceType>,
    operation: FhirOperation,
    tenant: Option<&str>,
) -> bool {
    resource_type == Some(&ResourceType::ServiceRequest)
        && operation == FhirOperation::Create
        && tenant.is_some()
}

/// A draft order to forward downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRequest {
    /// The partition the order was addressed to.
    pub partition: String,
    /// The raw request body, forwarded unparsed.
    pub body: String,
    /// The caller's short user id, when known and non-blank.
    pub user_short_id: Option<String>,
    /// The caller's hospital id, when known.
    pub hospital_id: Option<i64>,
}

impl RelayRequest {
    /// Creates a relay request without caller attributes.
    #[must_use]
    pub fn new(partition: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            body: body.into(),
            user_short_id: None,
            hospital_id: None,
        }
    }

    /// Creates a relay request carrying the principal's caller attributes.
    ///
    /// Blank attributes are omitted, matching what the downstream service
    /// expects.
    #[must_use]
    pub fn for_principal(
        principal: &Principal,
        partition: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let user_short_id = principal
            .user_short_id()
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string);

        Self {
            partition: partition.into(),
            body: body.into(),
            user_short_id,
            hospital_id: principal.hospital_id(),
        }
    }

    /// The query parameters to append to the forward call.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(user_short_id) = &self.user_short_id {
            params.push((PARAM_USER_SHORT_ID, user_short_id.clone()));
        }
        if let Some(hospital_id) = self.hospital_id {
            params.push((PARAM_HOSPITAL_ID, hospital_id.to_string()));
        }
        params
    }
}

/// The downstream service's answer, written back to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    /// HTTP status of the downstream call.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Synchronous forward of a draft order to the downstream order service.
#[async_trait]
pub trait DraftOrderRelay: Send + Sync {
    /// Forward the order and return the downstream response.
    ///
    /// # Errors
    ///
    /// Returns an error when the downstream service cannot be reached.
    async fn forward(&self, request: RelayRequest) -> AuthResult<RelayResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockClaims, principal_with};
    use std::sync::Arc;

    #[test]
    fn test_detects_partitioned_service_request_creates() {
        assert!(is_draft_order_create(
            Some(&ResourceType::ServiceRequest),
            FhirOperation::Create,
            Some("D57761"),
        ));

        // No partition, wrong operation, or wrong type: handled locally.
        assert!(!is_draft_order_create(
            Some(&ResourceType::ServiceRequest),
            FhirOperation::Create,
            None,
        ));
        assert!(!is_draft_order_create(
            Some(&ResourceType::ServiceRequest),
            FhirOperation::Update,
            Some("D57761"),
        ));
        assert!(!is_draft_order_create(
            Some(&ResourceType::Basic),
            FhirOperation::Create,
            Some("D57761"),
        ));
        assert!(!is_draft_order_create(None, FhirOperation::Create, Some("D57761")));
    }

    #[test]
    fn test_caller_attributes_are_forwarded() {
        let principal = crate::principal::Principal::new(
            Vec::<String>::new(),
            Arc::new(MockClaims::doctor("57761")),
        )
        .with_user_short_id("abc")
        .with_hospital_id(42);

        let request = RelayRequest::for_principal(&principal, "D57761", "{}");
        assert_eq!(
            request.query_params(),
            vec![
                (PARAM_USER_SHORT_ID, "abc".to_string()),
                (PARAM_HOSPITAL_ID, "42".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_attributes_are_omitted() {
        let principal = principal_with(MockClaims::doctor("57761")).with_user_short_id("  ");

        let request = RelayRequest::for_principal(&principal, "D57761", "{}");
        assert_eq!(request.user_short_id, None);
        assert!(request.query_params().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_relay_roundtrip() {
        struct RecordingRelay;

        #[async_trait]
        impl DraftOrderRelay for RecordingRelay {
            async fn forward(&self, request: RelayRequest) -> AuthResult<RelayResponse> {
                Ok(RelayResponse {
                    status: 201,
                    body: format!("created in {}", request.partition),
                })
            }
        }

        let relay = RecordingRelay;
        let response = relay
            .forward(RelayRequest::new("D57761", "{\"resourceType\":\"ServiceRequest\"}"))
            .await
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, "created in D57761");
    }
}
