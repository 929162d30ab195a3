//! Verification claims and OR-combinator expressions.
//!
//! A [`Claim`] is an atomic, named assertion about the principal ("holds
//! permission P", "is consulting doctor for key K"). A [`Verification`] is
//! an ordered OR-list of claims, built with [`Verification::or`] and
//! evaluated left to right with short-circuit on the first match.
//!
//! The expression is a plain list of tagged variants, not a trait
//! hierarchy; evaluation lives with [`crate::principal::Principal`], which
//! owns the external claim verifier.

use std::fmt;

/// Name of the blanket permission that grants unrestricted access.
pub const FHIR_ALL: &str = "FHIR_ALL";

/// An atomic claim about the principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Claim {
    /// The principal holds the named permission.
    AnyPermission(String),
    /// The principal is some doctor (coarse role check).
    AnyDoctor,
    /// The principal is the consulting doctor identified by the key.
    ConsultingDoctor(String),
    /// The principal is the prescribing doctor identified by the key.
    PrescribingDoctor(String),
    /// The principal is the organization with the given master id.
    MasterId(String),
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyPermission(name) => write!(f, "anyPermission({name})"),
            Self::AnyDoctor => write!(f, "anyDoctor"),
            Self::ConsultingDoctor(key) => write!(f, "consultingDoctor({key})"),
            Self::PrescribingDoctor(key) => write!(f, "prescribingDoctor({key})"),
            Self::MasterId(key) => write!(f, "masterId({key})"),
        }
    }
}

/// An ordered OR-expression over claims.
///
/// Matching any claim matches the expression; claims are evaluated in the
/// order they were combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    claims: Vec<Claim>,
}

impl Verification {
    /// A single-claim expression requiring the named permission.
    #[must_use]
    pub fn any_permission(name: impl Into<String>) -> Self {
        Self::from_claim(Claim::AnyPermission(name.into()))
    }

    /// A single-claim expression requiring any doctor role.
    #[must_use]
    pub fn any_doctor() -> Self {
        Self::from_claim(Claim::AnyDoctor)
    }

    /// A single-claim expression requiring the consulting-doctor claim.
    #[must_use]
    pub fn consulting_doctor(key: impl Into<String>) -> Self {
        Self::from_claim(Claim::ConsultingDoctor(key.into()))
    }

    /// A single-claim expression requiring the prescribing-doctor claim.
    #[must_use]
    pub fn prescribing_doctor(key: impl Into<String>) -> Self {
        Self::from_claim(Claim::PrescribingDoctor(key.into()))
    }

    /// A single-claim expression requiring the organization master id.
    #[must_use]
    pub fn master_id(key: impl Into<String>) -> Self {
        Self::from_claim(Claim::MasterId(key.into()))
    }

    /// Append the claims of `other`, keeping evaluation order.
    #[must_use]
    pub fn or(mut self, other: Verification) -> Self {
        self.claims.extend(other.claims);
        self
    }

    /// The claims in evaluation order.
    #[must_use]
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    fn from_claim(claim: Claim) -> Self {
        Self {
            claims: vec![claim],
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for claim in &self.claims {
            if !first {
                write!(f, " or ")?;
            }
            write!(f, "{claim}")?;
            first = false;
        }
        Ok(())
    }
}

/// The blanket-permission expression.
#[must_use]
pub fn fhir_all() -> Verification {
    Verification::any_permission(FHIR_ALL)
}
