//! The resolved caller identity and its claim-checking capability.
//!
//! A [`Principal`] is resolved once per request by a [`ContextProvider`]
//! and is immutable for the request's duration. Permission claims are held
//! locally; doctor and organization claims are answered by an external
//! [`ClaimVerifier`] bound to the caller at resolution time.
//!
//! Claim verification is the engine's only suspension point. Every external
//! check runs under a bounded timeout; a check that times out or errors
//! counts as *not matched*, never as matched.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::audit;
use crate::error::{AuthError, AuthResult};
use crate::verification::{Claim, Verification};

/// Default bound on a single external claim check.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(2);

/// A hard failure of a single external claim check.
///
/// Distinct from a clean "claim does not hold" answer; retained by the
/// evaluator so degraded decisions can be logged apart from genuine
/// denials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("claim check failed: {message}")]
pub struct VerificationFailure {
    /// Description of the failure.
    pub message: String,
}

impl VerificationFailure {
    /// Creates a new failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a timeout failure for the given claim.
    #[must_use]
    pub fn timed_out(claim: &Claim) -> Self {
        Self {
            message: format!("verification of {claim} timed out"),
        }
    }
}

/// External verifier answering doctor and organization claims for one
/// resolved caller.
///
/// Implementations typically call an identity/claims service; they are
/// bound to the caller when the principal is resolved, so the methods take
/// only the claim arguments.
#[async_trait]
pub trait ClaimVerifier: Send + Sync {
    /// Is the caller any doctor at all?
    async fn is_any_doctor(&self) -> Result<bool, VerificationFailure>;

    /// Is the caller the consulting doctor identified by `key`?
    async fn is_consulting_doctor(&self, key: &str) -> Result<bool, VerificationFailure>;

    /// Is the caller the prescribing doctor identified by `key`?
    async fn is_prescribing_doctor(&self, key: &str) -> Result<bool, VerificationFailure>;

    /// Is the caller the organization with master id `key`?
    async fn is_master_id(&self, key: &str) -> Result<bool, VerificationFailure>;
}

/// Opaque credential material extracted from the incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    /// The raw authorization header, when present.
    pub authorization: Option<String>,
    /// The tenant the request addresses, when already known.
    pub tenant: Option<String>,
}

/// External collaborator resolving a [`Principal`] from request credentials.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Resolve the principal for the current request.
    ///
    /// # Errors
    ///
    /// Returns an authentication error when no principal can be resolved.
    async fn resolve(&self, credentials: &RequestCredentials) -> AuthResult<Principal>;
}

/// The caller identity for the current request.
#[derive(Clone)]
pub struct Principal {
    permissions: HashSet<String>,
    user_short_id: Option<String>,
    hospital_id: Option<i64>,
    call_timeout: Duration,
    claims: Arc<dyn ClaimVerifier>,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("permissions", &self.permissions)
            .field("user_short_id", &self.user_short_id)
            .field("hospital_id", &self.hospital_id)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl Principal {
    /// Creates a principal with the given permission set and claim verifier.
    pub fn new<I, S>(permissions: I, claims: Arc<dyn ClaimVerifier>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
            user_short_id: None,
            hospital_id: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            claims,
        }
    }

    /// Sets the caller's short user id, forwarded with draft orders.
    #[must_use]
    pub fn with_user_short_id(mut self, user_short_id: impl Into<String>) -> Self {
        self.user_short_id = Some(user_short_id.into());
        self
    }

    /// Sets the caller's hospital id, forwarded with draft orders.
    #[must_use]
    pub fn with_hospital_id(mut self, hospital_id: i64) -> Self {
        self.hospital_id = Some(hospital_id);
        self
    }

    /// Overrides the bound on a single external claim check.
    #[must_use]
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Returns `true` if the principal holds the named permission.
    #[must_use]
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    /// The caller's short user id, when known.
    #[must_use]
    pub fn user_short_id(&self) -> Option<&str> {
        self.user_short_id.as_deref()
    }

    /// The caller's hospital id, when known.
    #[must_use]
    pub fn hospital_id(&self) -> Option<i64> {
        self.hospital_id
    }

    /// Does any claim of the expression hold?
    ///
    /// A claim whose external check hard-fails counts as not matched; the
    /// failure is logged but never promotes to a match.
    pub async fn matches(&self, verification: &Verification) -> bool {
        let evaluation = self.evaluate(verification).await;
        if !evaluation.matched && !evaluation.failures.is_empty() {
            audit::verifier_degraded(verification, &evaluation.failures);
        }
        evaluation.matched
    }

    /// Like [`Principal::matches`], but a chain in which every evaluated
    /// claim hard-failed surfaces the failure instead of a plain `false`.
    pub async fn try_matches(&self, verification: &Verification) -> AuthResult<bool> {
        let evaluation = self.evaluate(verification).await;
        if evaluation.matched {
            return Ok(true);
        }
        if evaluation.all_failed() {
            return Err(evaluation.into_failure());
        }
        if !evaluation.failures.is_empty() {
            audit::verifier_degraded(verification, &evaluation.failures);
        }
        Ok(false)
    }

    /// Requires the expression to match.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when no claim holds, or
    /// `VerificationServiceFailure` when every evaluated claim hard-failed.
    pub async fn verify(&self, verification: &Verification) -> AuthResult<()> {
        let evaluation = self.evaluate(verification).await;
        if evaluation.matched {
            return Ok(());
        }
        if evaluation.all_failed() {
            return Err(evaluation.into_failure());
        }
        if !evaluation.failures.is_empty() {
            audit::verifier_degraded(verification, &evaluation.failures);
        }
        Err(AuthError::forbidden(format!(
            "no claim matched: {verification}"
        )))
    }

    /// Evaluate the OR-chain left to right, stopping at the first match.
    async fn evaluate(&self, verification: &Verification) -> Evaluation {
        let mut evaluation = Evaluation::default();
        for claim in verification.claims() {
            evaluation.evaluated += 1;
            match self.check_claim(claim).await {
                Ok(true) => {
                    evaluation.matched = true;
                    break;
                }
                Ok(false) => {}
                Err(failure) => evaluation.failures.push(failure),
            }
        }
        evaluation
    }

    async fn check_claim(&self, claim: &Claim) -> Result<bool, VerificationFailure> {
        let check = match claim {
            Claim::AnyPermission(name) => return Ok(self.has_permission(name)),
            Claim::AnyDoctor => self.claims.is_any_doctor(),
            Claim::ConsultingDoctor(key) => self.claims.is_consulting_doctor(key),
            Claim::PrescribingDoctor(key) => self.claims.is_prescribing_doctor(key),
            Claim::MasterId(key) => self.claims.is_master_id(key),
        };

        match tokio::time::timeout(self.call_timeout, check).await {
            Ok(result) => result,
            Err(_) => Err(VerificationFailure::timed_out(claim)),
        }
    }
}

/// Outcome of evaluating one OR-chain.
#[derive(Debug, Default)]
struct Evaluation {
    matched: bool,
    evaluated: usize,
    failures: Vec<VerificationFailure>,
}

impl Evaluation {
    /// Every evaluated claim hard-failed; nothing answered cleanly.
    fn all_failed(&self) -> bool {
        !self.matched && self.evaluated > 0 && self.failures.len() == self.evaluated
    }

    fn into_failure(self) -> AuthError {
        let messages: Vec<String> = self
            .failures
            .into_iter()
            .map(|failure| failure.message)
            .collect();
        AuthError::verification_failure(messages.join("; "))
    }
}
