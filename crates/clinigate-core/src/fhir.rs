use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// FHIR resource types the authorization engine rules over.
///
/// Any resource type outside this set deserializes to [`ResourceType::Custom`]
/// and is rejected by the visibility filter rather than silently allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Basic,
    Organization,
    Practitioner,
    PractitionerRole,
    Endpoint,
    ServiceRequest,
    Bundle,
    CapabilityStatement,
    Parameters,
    OperationOutcome,
    #[serde(untagged)]
    Custom(String),
}

impl ResourceType {
    /// Parse a declared resource type name.
    ///
    /// Unknown names are preserved in [`ResourceType::Custom`] so the caller
    /// can report them; they are never mapped onto a known type.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Basic" => Self::Basic,
            "Organization" => Self::Organization,
            "Practitioner" => Self::Practitioner,
            "PractitionerRole" => Self::PractitionerRole,
            "Endpoint" => Self::Endpoint,
            "ServiceRequest" => Self::ServiceRequest,
            "Bundle" => Self::Bundle,
            "CapabilityStatement" => Self::CapabilityStatement,
            "Parameters" => Self::Parameters,
            "OperationOutcome" => Self::OperationOutcome,
            other => Self::Custom(other.to_string()),
        }
    }

    /// The resource type name as it appears in the `resourceType` field.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic => "Basic",
            Self::Organization => "Organization",
            Self::Practitioner => "Practitioner",
            Self::PractitionerRole => "PractitionerRole",
            Self::Endpoint => "Endpoint",
            Self::ServiceRequest => "ServiceRequest",
            Self::Bundle => "Bundle",
            Self::CapabilityStatement => "CapabilityStatement",
            Self::Parameters => "Parameters",
            Self::OperationOutcome => "OperationOutcome",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}
