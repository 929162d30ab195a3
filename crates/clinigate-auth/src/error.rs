//! Authorization error types.
//!
//! This module defines the error taxonomy of the authorization engine and
//! the mapping from internal errors to caller-visible rejection kinds.

use std::fmt;

use crate::rules::FhirOperation;

/// Errors that can occur while authorizing a request or filtering a response.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The addressed partition name matches no known partition class.
    #[error("Unknown partition: {name}")]
    UnknownPartition {
        /// The unrecognized partition name.
        name: String,
    },

    /// The principal may not address the partition at all.
    #[error("Partition not permitted: {name}")]
    PartitionNotPermitted {
        /// The partition that was refused.
        name: String,
    },

    /// The operation/resource-type combination is not permitted here.
    #[error("Operation not permitted: {message}")]
    OperationNotPermitted {
        /// Description of the refused combination.
        message: String,
    },

    /// A resource is missing the ownership evidence its type requires.
    #[error("Ownership data missing: {message}")]
    OwnershipDataMissing {
        /// Which evidence could not be extracted.
        message: String,
    },

    /// No visibility rule is defined for the resource type.
    #[error("Unsupported resource type: {resource_type}")]
    UnsupportedResourceType {
        /// The declared type with no visibility rule.
        resource_type: String,
    },

    /// The external claim verification service errored or timed out.
    #[error("Verification service failure: {message}")]
    VerificationServiceFailure {
        /// Description of the failure.
        message: String,
    },

    /// The principal's claims do not grant access to the resource.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// The request lacks a resolvable principal.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `UnknownPartition` error.
    #[must_use]
    pub fn unknown_partition(name: impl Into<String>) -> Self {
        Self::UnknownPartition { name: name.into() }
    }

    /// Creates a new `PartitionNotPermitted` error.
    #[must_use]
    pub fn partition_not_permitted(name: impl Into<String>) -> Self {
        Self::PartitionNotPermitted { name: name.into() }
    }

    /// Creates a new `OperationNotPermitted` error.
    #[must_use]
    pub fn operation_not_permitted(message: impl Into<String>) -> Self {
        Self::OperationNotPermitted {
            message: message.into(),
        }
    }

    /// Creates a new `OwnershipDataMissing` error.
    #[must_use]
    pub fn ownership_data_missing(message: impl Into<String>) -> Self {
        Self::OwnershipDataMissing {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedResourceType` error.
    #[must_use]
    pub fn unsupported_resource_type(resource_type: impl Into<String>) -> Self {
        Self::UnsupportedResourceType {
            resource_type: resource_type.into(),
        }
    }

    /// Creates a new `VerificationServiceFailure` error.
    #[must_use]
    pub fn verification_failure(message: impl Into<String>) -> Self {
        Self::VerificationServiceFailure {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownPartition { .. } => ErrorCategory::Authentication,
            Self::PartitionNotPermitted { .. } => ErrorCategory::Authentication,
            Self::OperationNotPermitted { .. } => ErrorCategory::Authorization,
            Self::OwnershipDataMissing { .. } => ErrorCategory::DataIntegrity,
            Self::UnsupportedResourceType { .. } => ErrorCategory::DataIntegrity,
            Self::VerificationServiceFailure { .. } => ErrorCategory::Infrastructure,
            Self::Forbidden { .. } => ErrorCategory::Authorization,
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns `true` if this is an authorization error (a denial).
    #[must_use]
    pub fn is_authorization_error(&self) -> bool {
        matches!(
            self,
            Self::OperationNotPermitted { .. } | Self::Forbidden { .. }
        )
    }

    /// Returns `true` if the external verification service was at fault.
    #[must_use]
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, Self::VerificationServiceFailure { .. })
    }

    /// Maps this error to the rejection the caller may observe.
    ///
    /// `UnknownPartition` and `PartitionNotPermitted` collapse into one
    /// `Unauthorized` kind so callers cannot enumerate partitions they do
    /// not hold. A denial on a read-by-id surfaces as `NotFound` so an
    /// unauthorized caller learns nothing about the resource's existence;
    /// everything else surfaces as `Forbidden`.
    #[must_use]
    pub fn rejection_kind(&self, operation: FhirOperation) -> RejectionKind {
        match self {
            Self::UnknownPartition { .. }
            | Self::PartitionNotPermitted { .. }
            | Self::Unauthorized { .. } => RejectionKind::Unauthorized,
            _ => match operation {
                FhirOperation::Read | FhirOperation::Vread => RejectionKind::NotFound,
                _ => RejectionKind::Forbidden,
            },
        }
    }
}

/// Categories of authorization errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Identity and partition-access errors.
    Authentication,
    /// Permission-check denials.
    Authorization,
    /// Malformed resources and ownership-model gaps.
    DataIntegrity,
    /// External verification-service errors.
    Infrastructure,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::DataIntegrity => write!(f, "data-integrity"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// The caller-visible shape of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Generic authentication/forbidden response for partition-level
    /// rejections; identical for unknown and not-permitted partitions.
    Unauthorized,
    /// Access denied.
    Forbidden,
    /// Reported instead of a denial on reads by id.
    NotFound,
}

/// Type alias for authorization results.
pub type AuthResult<T> = Result<T, AuthError>;
