//! In-memory claim verifier and principal fixtures shared by the module
//! tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::principal::{ClaimVerifier, Principal, VerificationFailure};
use crate::verification::FHIR_ALL;

/// Configurable in-memory [`ClaimVerifier`].
///
/// Claim keys listed in the matching vectors answer `true`; the `fail_*`
/// flags turn the corresponding check into a hard failure. Every call is
/// recorded for short-circuit assertions.
#[derive(Clone, Default)]
pub(crate) struct MockClaims {
    consulting: Vec<String>,
    prescribing: Vec<String>,
    master_ids: Vec<String>,
    any_doctor: bool,
    fail_consulting: bool,
    fail_prescribing: bool,
    fail_master_id: bool,
    fail_any_doctor: bool,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockClaims {
    /// A caller with no doctor or organization claims.
    pub fn none() -> Self {
        Self::default()
    }

    /// A doctor holding both the consulting and prescribing claim for `key`.
    pub fn doctor(key: &str) -> Self {
        Self {
            consulting: vec![key.to_string()],
            prescribing: vec![key.to_string()],
            any_doctor: true,
            ..Self::default()
        }
    }

    /// A prescribing-only doctor for `key`.
    pub fn prescriber(key: &str) -> Self {
        Self {
            prescribing: vec![key.to_string()],
            any_doctor: true,
            ..Self::default()
        }
    }

    /// A consulting-only doctor for `key`.
    pub fn consultant(key: &str) -> Self {
        Self {
            consulting: vec![key.to_string()],
            any_doctor: true,
            ..Self::default()
        }
    }

    /// An organization caller with the given master id.
    pub fn organization(master_id: &str) -> Self {
        Self {
            master_ids: vec![master_id.to_string()],
            ..Self::default()
        }
    }

    /// Add a consulting-doctor claim.
    pub fn with_consulting(mut self, key: &str) -> Self {
        self.consulting.push(key.to_string());
        self.any_doctor = true;
        self
    }

    /// Add a prescribing-doctor claim.
    pub fn with_prescribing(mut self, key: &str) -> Self {
        self.prescribing.push(key.to_string());
        self.any_doctor = true;
        self
    }

    /// Add an organization master-id claim.
    pub fn with_master_id(mut self, key: &str) -> Self {
        self.master_ids.push(key.to_string());
        self
    }

    pub fn failing_consulting(mut self) -> Self {
        self.fail_consulting = true;
        self
    }

    pub fn failing_prescribing(mut self) -> Self {
        self.fail_prescribing = true;
        self
    }

    pub fn failing_master_id(mut self) -> Self {
        self.fail_master_id = true;
        self
    }

    pub fn failing_any_doctor(mut self) -> Self {
        self.fail_any_doctor = true;
        self
    }

    /// Delay every check, for timeout tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The checks performed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(
        &self,
        call: String,
        fail: bool,
        held: bool,
    ) -> Result<bool, VerificationFailure> {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(VerificationFailure::new(format!("{call} unavailable")));
        }
        Ok(held)
    }
}

#[async_trait]
impl ClaimVerifier for MockClaims {
    async fn is_any_doctor(&self) -> Result<bool, VerificationFailure> {
        self.answer("anyDoctor".to_string(), self.fail_any_doctor, self.any_doctor)
            .await
    }

    async fn is_consulting_doctor(&self, key: &str) -> Result<bool, VerificationFailure> {
        self.answer(
            format!("consulting({key})"),
            self.fail_consulting,
            self.consulting.iter().any(|held| held == key),
        )
        .await
    }

    async fn is_prescribing_doctor(&self, key: &str) -> Result<bool, VerificationFailure> {
        self.answer(
            format!("prescribing({key})"),
            self.fail_prescribing,
            self.prescribing.iter().any(|held| held == key),
        )
        .await
    }

    async fn is_master_id(&self, key: &str) -> Result<bool, VerificationFailure> {
        self.answer(
            format!("masterId({key})"),
            self.fail_master_id,
            self.master_ids.iter().any(|held| held == key),
        )
        .await
    }
}

/// A principal holding the blanket permission and no doctor claims.
pub(crate) fn blanket_principal() -> Principal {
    Principal::new([FHIR_ALL], Arc::new(MockClaims::none()))
}

/// A doctor principal with consulting and prescribing claims for `key`.
pub(crate) fn doctor_principal(key: &str) -> Principal {
    Principal::new(Vec::<String>::new(), Arc::new(MockClaims::doctor(key)))
}

/// A principal with no permissions and no claims.
pub(crate) fn anonymous_principal() -> Principal {
    Principal::new(Vec::<String>::new(), Arc::new(MockClaims::none()))
}

/// A principal backed by the given mock claims.
pub(crate) fn principal_with(claims: MockClaims) -> Principal {
    Principal::new(Vec::<String>::new(), Arc::new(claims))
}
