//! # clinigate-auth
//!
//! Two-stage authorization engine for the Clinigate multi-tenant
//! clinical-record store.
//!
//! Every request is decided twice:
//!
//! 1. **Coarse, pre-execution** - the partition gate decides whether the
//!    caller may address the tenant at all, and [`rules::authorize`]
//!    builds the ordered allow/deny rule list the storage engine applies
//!    as a pre-filter.
//! 2. **Fine-grained, post-execution** - after resources are materialized,
//!    [`visibility::filter_for_visibility`] matches the principal's
//!    claims against the ownership markers embedded in each resource, and
//!    recursively filters every collection entry, before anything leaves
//!    the system boundary.
//!
//! ## Modules
//!
//! - [`config`] - engine configuration
//! - [`verification`] - claims and OR-combinator expressions
//! - [`principal`] - the resolved caller identity and its claim verifier
//! - [`gate`] - the partition gate
//! - [`rules`] - the coarse rule list and its builder
//! - [`ownership`] - per-type ownership-key extraction
//! - [`visibility`] - the per-resource visibility filter
//! - [`relay`] - the draft-order relay seam
//! - [`audit`] - structured decision logging
//! - [`error`] - the authorization error taxonomy

pub mod audit;
pub mod config;
pub mod error;
pub mod gate;
pub mod ownership;
pub mod principal;
pub mod relay;
pub mod rules;
pub mod verification;
pub mod visibility;

#[cfg(test)]
mod test_support;

pub use config::{AuthConfig, RelayConfig, VerifierConfig};
pub use error::{AuthError, AuthResult, ErrorCategory, RejectionKind};
pub use gate::check_partition;
pub use principal::{
    ClaimVerifier, ContextProvider, DEFAULT_CALL_TIMEOUT, Principal, RequestCredentials,
    VerificationFailure,
};
pub use relay::{DraftOrderRelay, RelayRequest, RelayResponse, is_draft_order_create};
pub use rules::{
    AuthRule, FhirOperation, RuleBuilder, RuleEffect, RuleList, RuleOperation, TenantScope,
    authorize, authorize_operation,
};
pub use verification::{Claim, FHIR_ALL, Verification, fhir_all};
pub use visibility::{Visibility, can_see, filter_for_visibility};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use clinigate_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{AuthConfig, RelayConfig, VerifierConfig};
    pub use crate::error::{AuthError, AuthResult, ErrorCategory, RejectionKind};
    pub use crate::gate::check_partition;
    pub use crate::principal::{
        ClaimVerifier, ContextProvider, Principal, RequestCredentials, VerificationFailure,
    };
    pub use crate::relay::{DraftOrderRelay, RelayRequest, RelayResponse, is_draft_order_create};
    pub use crate::rules::{
        AuthRule, FhirOperation, RuleBuilder, RuleEffect, RuleList, RuleOperation, TenantScope,
        authorize, authorize_operation,
    };
    pub use crate::verification::{Claim, FHIR_ALL, Verification, fhir_all};
    pub use crate::visibility::{Visibility, can_see, filter_for_visibility};
}
