//! The coarse, pre-execution rule list.
//!
//! [`authorize`] combines the partition gate with the rule-list builder and
//! yields the ordered allow/deny rules the storage engine applies as a
//! pre-filter. Rules are evaluated first-match with an implicit default
//! deny; ordering therefore matters and is fixed: the shared-pool types are
//! explicitly pool-scoped before the catch-all deny, and the order type is
//! explicitly excluded from the shared pool while allowed in private
//! partitions.

use clinigate_core::{ROOT_PARTITION, ResourceType};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::gate;
use crate::principal::Principal;
use crate::verification::{Verification, fhir_all};

// =============================================================================
// Operations
// =============================================================================

/// The operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FhirOperation {
    /// Read a resource by id (GET /[type]/[id])
    Read,
    /// Read a specific version (GET /[type]/[id]/_history/[vid])
    Vread,
    /// Search a resource type (GET /[type]?params)
    Search,
    /// History of a resource instance (GET /[type]/[id]/_history)
    HistoryInstance,
    /// Create a resource (POST /[type])
    Create,
    /// Update a resource (PUT /[type]/[id])
    Update,
    /// Patch a resource (PATCH /[type]/[id])
    Patch,
    /// Delete a resource (DELETE /[type]/[id])
    Delete,
    /// Capabilities/conformance statement (GET /metadata)
    Capabilities,
}

impl FhirOperation {
    /// The operation name used in rule serialization and messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Vread => "vread",
            Self::Search => "search",
            Self::HistoryInstance => "history-instance",
            Self::Create => "create",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Capabilities => "capabilities",
        }
    }
}

impl std::fmt::Display for FhirOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The class of operations a rule grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleOperation {
    /// Covers read, vread, search, and instance history.
    Read,
    /// Covers create only.
    Create,
}

impl RuleOperation {
    /// Does this grant cover the requested operation?
    #[must_use]
    pub fn covers(self, operation: FhirOperation) -> bool {
        match self {
            Self::Read => matches!(
                operation,
                FhirOperation::Read
                    | FhirOperation::Vread
                    | FhirOperation::Search
                    | FhirOperation::HistoryInstance
            ),
            Self::Create => matches!(operation, FhirOperation::Create),
        }
    }
}

// =============================================================================
// Rule model
// =============================================================================

/// The effect of a matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleEffect {
    Allow,
    Deny,
}

/// Which tenants a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TenantScope {
    /// Applies in every tenant.
    Any,
    /// Applies only in the listed tenants.
    Only(Vec<String>),
    /// Applies in every tenant except the listed ones.
    Except(Vec<String>),
}

impl TenantScope {
    /// Does the scope include the given tenant?
    #[must_use]
    pub fn permits(&self, tenant: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(tenants) => tenants.iter().any(|name| name == tenant),
            Self::Except(tenants) => !tenants.iter().any(|name| name == tenant),
        }
    }
}

/// One coarse authorization rule.
///
/// A field set to `None` is not evaluated and matches any value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRule {
    /// Allow or deny on match.
    pub effect: RuleEffect,

    /// Operation grants; `None` covers every operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<RuleOperation>>,

    /// Resource type; `None` covers every type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,

    /// Tenant scope.
    pub tenants: TenantScope,
}

impl AuthRule {
    fn applies_to(&self, operation: FhirOperation, resource_type: &ResourceType, tenant: &str) -> bool {
        let operation_applies = match &self.operations {
            None => true,
            Some(grants) => grants.iter().any(|grant| grant.covers(operation)),
        };
        let type_applies = match &self.resource_type {
            None => true,
            Some(expected) => expected == resource_type,
        };
        operation_applies && type_applies && self.tenants.permits(tenant)
    }
}

/// An ordered rule list with first-match evaluation and default deny.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleList {
    rules: Vec<AuthRule>,
}

impl RuleList {
    /// The rules in precedence order.
    #[must_use]
    pub fn rules(&self) -> &[AuthRule] {
        &self.rules
    }

    /// Evaluate a request against the list.
    ///
    /// The first rule whose scopes all apply decides; no rule matching
    /// means deny. The conformance statement is always served.
    #[must_use]
    pub fn evaluate(
        &self,
        operation: FhirOperation,
        resource_type: &ResourceType,
        tenant: &str,
    ) -> RuleEffect {
        if operation == FhirOperation::Capabilities {
            return RuleEffect::Allow;
        }
        self.rules
            .iter()
            .find(|rule| rule.applies_to(operation, resource_type, tenant))
            .map_or(RuleEffect::Deny, |rule| rule.effect)
    }

    /// Convenience wrapper around [`RuleList::evaluate`].
    #[must_use]
    pub fn allows(
        &self,
        operation: FhirOperation,
        resource_type: &ResourceType,
        tenant: &str,
    ) -> bool {
        self.evaluate(operation, resource_type, tenant) == RuleEffect::Allow
    }
}

// =============================================================================
// Rule builder
// =============================================================================

/// Fluent builder assembling an ordered [`RuleList`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    rules: Vec<AuthRule>,
}

impl RuleBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an allow rule.
    #[must_use]
    pub fn allow(self) -> RuleScope {
        RuleScope::new(self, RuleEffect::Allow)
    }

    /// Start a deny rule.
    #[must_use]
    pub fn deny(self) -> RuleScope {
        RuleScope::new(self, RuleEffect::Deny)
    }

    /// Append an allow-everything rule.
    #[must_use]
    pub fn allow_all(mut self) -> Self {
        self.rules.push(AuthRule {
            effect: RuleEffect::Allow,
            operations: None,
            resource_type: None,
            tenants: TenantScope::Any,
        });
        self
    }

    /// Append a deny-everything rule.
    #[must_use]
    pub fn deny_all(mut self) -> Self {
        self.rules.push(AuthRule {
            effect: RuleEffect::Deny,
            operations: None,
            resource_type: None,
            tenants: TenantScope::Any,
        });
        self
    }

    /// Finish the list.
    #[must_use]
    pub fn build(self) -> RuleList {
        RuleList { rules: self.rules }
    }
}

/// Scope builder for a single rule; finished with [`RuleScope::and_then`].
#[derive(Debug)]
pub struct RuleScope {
    builder: RuleBuilder,
    effect: RuleEffect,
    operations: Vec<RuleOperation>,
    resource_type: Option<ResourceType>,
    tenants: TenantScope,
}

impl RuleScope {
    fn new(builder: RuleBuilder, effect: RuleEffect) -> Self {
        Self {
            builder,
            effect,
            operations: Vec::new(),
            resource_type: None,
            tenants: TenantScope::Any,
        }
    }

    /// Grant the read operation class.
    #[must_use]
    pub fn read(mut self) -> Self {
        self.operations.push(RuleOperation::Read);
        self
    }

    /// Grant the create operation.
    #[must_use]
    pub fn create(mut self) -> Self {
        self.operations.push(RuleOperation::Create);
        self
    }

    /// Restrict the rule to one resource type.
    #[must_use]
    pub fn resources_of_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    /// Restrict the rule to the listed tenants.
    #[must_use]
    pub fn for_tenants<I, S>(mut self, tenants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tenants = TenantScope::Only(tenants.into_iter().map(Into::into).collect());
        self
    }

    /// Apply the rule in every tenant.
    #[must_use]
    pub fn for_any_tenant(mut self) -> Self {
        self.tenants = TenantScope::Any;
        self
    }

    /// Apply the rule in every tenant except the listed ones.
    #[must_use]
    pub fn except_tenants<I, S>(mut self, tenants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tenants = TenantScope::Except(tenants.into_iter().map(Into::into).collect());
        self
    }

    /// Finish this rule and return to the list builder.
    #[must_use]
    pub fn and_then(self) -> RuleBuilder {
        let mut builder = self.builder;
        builder.rules.push(AuthRule {
            effect: self.effect,
            operations: if self.operations.is_empty() {
                None
            } else {
                Some(self.operations)
            },
            resource_type: self.resource_type,
            tenants: self.tenants,
        });
        builder
    }
}

// =============================================================================
// Authorization entry point
// =============================================================================

/// Build the coarse rule list for a request addressing `partition_name`.
///
/// Holders of the blanket permission get a single allow-everything rule.
/// Doctors get the fixed shared-pool/private-partition rule set, or
/// deny-all when the partition gate refuses the addressed partition.
/// Everyone else gets deny-all.
///
/// # Errors
///
/// Building itself never fails; a hard failure of the any-doctor
/// verification propagates as a request-level failure.
pub async fn authorize(principal: &Principal, partition_name: &str) -> AuthResult<RuleList> {
    if principal.matches(&fhir_all()).await {
        return Ok(RuleBuilder::new().allow_all().build());
    }

    if principal.try_matches(&Verification::any_doctor()).await? {
        if gate::check_partition(principal, partition_name).await.is_err() {
            return Ok(RuleBuilder::new().deny_all().build());
        }
        return Ok(doctor_rules());
    }

    Ok(RuleBuilder::new().deny_all().build())
}

/// Authorize one concrete (operation, resource type) request.
///
/// Builds the rule list for the partition and requires it to allow the
/// requested combination; callers that also need the list for the storage
/// pre-filter get it back.
///
/// # Errors
///
/// Propagates [`authorize`] failures, and returns `OperationNotPermitted`
/// when the rule list denies the combination.
pub async fn authorize_operation(
    principal: &Principal,
    partition_name: &str,
    operation: FhirOperation,
    resource_type: &ResourceType,
) -> AuthResult<RuleList> {
    let rules = authorize(principal, partition_name).await?;
    if rules.allows(operation, resource_type, partition_name) {
        Ok(rules)
    } else {
        Err(AuthError::operation_not_permitted(format!(
            "{operation} on {resource_type} in {partition_name}"
        )))
    }
}

/// The fixed rule set for doctor principals, in precedence order.
fn doctor_rules() -> RuleList {
    RuleBuilder::new()
        .allow()
        .read()
        .resources_of_type(ResourceType::Organization)
        .for_tenants([ROOT_PARTITION])
        .and_then()
        .allow()
        .read()
        .resources_of_type(ResourceType::Practitioner)
        .for_tenants([ROOT_PARTITION])
        .and_then()
        .allow()
        .read()
        .resources_of_type(ResourceType::PractitionerRole)
        .for_tenants([ROOT_PARTITION])
        .and_then()
        .allow()
        .read()
        .resources_of_type(ResourceType::Endpoint)
        .for_tenants([ROOT_PARTITION])
        .and_then()
        .allow()
        .read()
        .resources_of_type(ResourceType::Practitioner)
        .for_any_tenant()
        .and_then()
        .allow()
        .read()
        .create()
        .resources_of_type(ResourceType::ServiceRequest)
        .except_tenants([ROOT_PARTITION])
        .and_then()
        .deny_all()
        .build()
}
