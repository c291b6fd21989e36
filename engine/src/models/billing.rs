//! Billing and insurance claim models
//!
//! A discharged visit produces exactly one charge and exactly one claim.
//! The claim then moves through a forward-only adjudication machine:
//!
//! ```text
//! Submitted → Pending → Approved
//!                     ↘ Denied
//! ```
//!
//! `paid_amount_cents` is set exactly when the claim is terminal, and a
//! `ClaimDenial` row exists exactly when the claim is Denied.
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Billing transaction kind (only charges are generated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeType {
    Charge,
}

/// Billing transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingStatus {
    Billed,
}

/// A charge raised against a discharged visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingTransaction {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub patient_id: Uuid,
    pub transaction_type: ChargeType,
    pub amount_cents: i64,
    pub status: BillingStatus,
    pub description: String,
}

impl BillingTransaction {
    /// Create a billed charge
    ///
    /// # Panics
    /// Panics if amount_cents <= 0
    pub fn charge(
        id: Uuid,
        visit_id: Uuid,
        patient_id: Uuid,
        amount_cents: i64,
        description: String,
    ) -> Self {
        assert!(amount_cents > 0, "amount must be positive");
        Self {
            id,
            visit_id,
            patient_id,
            transaction_type: ChargeType::Charge,
            amount_cents,
            status: BillingStatus::Billed,
            description,
        }
    }
}

/// Adjudication status of an insurance claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClaimStatus {
    Submitted,
    Pending,
    Approved,
    Denied,
}

impl ClaimStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Denied)
    }
}

/// Reason a claim was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    MissingDocumentation,
    NotCovered,
    OutOfNetwork,
    PriorAuthorizationRequired,
    DuplicateClaim,
    CodingError,
}

/// Denial detail row, created only on the Denied transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimDenial {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub reason: DenialReason,
    pub details: String,
}

/// Errors that can occur during claim transitions
#[derive(Debug, Error, PartialEq)]
pub enum ClaimError {
    #[error("Invalid claim transition for {claim_id}: {from:?} → {to:?}")]
    InvalidTransition {
        claim_id: Uuid,
        from: ClaimStatus,
        to: ClaimStatus,
    },

    #[error("Paid amount {paid} exceeds claim total {total}")]
    PaidExceedsTotal { paid: i64, total: i64 },
}

/// An insurance claim for one discharged visit
///
/// At most one claim exists per visit; the store enforces that on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceClaim {
    id: Uuid,
    visit_id: Uuid,
    patient_id: Uuid,
    insurer_name: String,
    total_amount_cents: i64,
    paid_amount_cents: Option<i64>,
    status: ClaimStatus,
    submission_date: DateTime<Utc>,
    resolution_date: Option<DateTime<Utc>>,
    processing_time_days: Option<i64>,
}

impl InsuranceClaim {
    /// Create a freshly submitted claim
    ///
    /// # Panics
    /// Panics if total_amount_cents <= 0
    pub fn new(
        id: Uuid,
        visit_id: Uuid,
        patient_id: Uuid,
        insurer_name: String,
        total_amount_cents: i64,
        submission_date: DateTime<Utc>,
    ) -> Self {
        assert!(total_amount_cents > 0, "claim total must be positive");
        Self {
            id,
            visit_id,
            patient_id,
            insurer_name,
            total_amount_cents,
            paid_amount_cents: None,
            status: ClaimStatus::Submitted,
            submission_date,
            resolution_date: None,
            processing_time_days: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn visit_id(&self) -> Uuid {
        self.visit_id
    }

    pub fn patient_id(&self) -> Uuid {
        self.patient_id
    }

    pub fn insurer_name(&self) -> &str {
        &self.insurer_name
    }

    pub fn total_amount_cents(&self) -> i64 {
        self.total_amount_cents
    }

    pub fn paid_amount_cents(&self) -> Option<i64> {
        self.paid_amount_cents
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn submission_date(&self) -> DateTime<Utc> {
        self.submission_date
    }

    pub fn resolution_date(&self) -> Option<DateTime<Utc>> {
        self.resolution_date
    }

    pub fn processing_time_days(&self) -> Option<i64> {
        self.processing_time_days
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Transition Submitted → Pending (no side effects)
    pub fn mark_pending(&mut self) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Submitted {
            return Err(self.invalid(ClaimStatus::Pending));
        }
        self.status = ClaimStatus::Pending;
        Ok(())
    }

    /// Transition Pending → Approved with the payout amount
    pub fn approve(&mut self, paid_amount_cents: i64, at: DateTime<Utc>) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Pending {
            return Err(self.invalid(ClaimStatus::Approved));
        }
        if paid_amount_cents > self.total_amount_cents {
            return Err(ClaimError::PaidExceedsTotal {
                paid: paid_amount_cents,
                total: self.total_amount_cents,
            });
        }
        self.status = ClaimStatus::Approved;
        self.paid_amount_cents = Some(paid_amount_cents);
        self.resolve(at);
        Ok(())
    }

    /// Transition Pending → Denied (payout forced to zero)
    pub fn deny(&mut self, at: DateTime<Utc>) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Pending {
            return Err(self.invalid(ClaimStatus::Denied));
        }
        self.status = ClaimStatus::Denied;
        self.paid_amount_cents = Some(0);
        self.resolve(at);
        Ok(())
    }

    /// Stamp resolution date and derive processing time
    ///
    /// Day granularity, ceiling-rounded: a claim resolved within the
    /// submission day counts as 1 day once any time has elapsed.
    fn resolve(&mut self, at: DateTime<Utc>) {
        self.resolution_date = Some(at);
        let seconds = (at - self.submission_date).num_seconds().max(0);
        self.processing_time_days = Some((seconds + 86_399) / 86_400);
    }

    fn invalid(&self, to: ClaimStatus) -> ClaimError {
        ClaimError::InvalidTransition {
            claim_id: self.id,
            from: self.status,
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_claim() -> InsuranceClaim {
        InsuranceClaim::new(
            Uuid::from_u128(1),
            Uuid::from_u128(2),
            Uuid::from_u128(3),
            "Aetna".to_string(),
            250_000,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_approval_path() {
        let mut claim = test_claim();
        let resolved = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();

        claim.mark_pending().unwrap();
        claim.approve(200_000, resolved).unwrap();

        assert_eq!(claim.status(), ClaimStatus::Approved);
        assert_eq!(claim.paid_amount_cents(), Some(200_000));
        assert_eq!(claim.resolution_date(), Some(resolved));
        assert_eq!(claim.processing_time_days(), Some(3));
    }

    #[test]
    fn test_denial_forces_zero_payout() {
        let mut claim = test_claim();
        let resolved = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

        claim.mark_pending().unwrap();
        claim.deny(resolved).unwrap();

        assert_eq!(claim.status(), ClaimStatus::Denied);
        assert_eq!(claim.paid_amount_cents(), Some(0));
        // 21 hours elapsed, ceiling → 1 day
        assert_eq!(claim.processing_time_days(), Some(1));
    }

    #[test]
    fn test_forward_only_transitions() {
        let mut claim = test_claim();
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();

        // Cannot resolve a Submitted claim directly
        assert!(claim.approve(100, at).is_err());
        assert!(claim.deny(at).is_err());

        claim.mark_pending().unwrap();
        assert!(claim.mark_pending().is_err());

        claim.approve(250_000, at).unwrap();
        // Terminal: every further transition rejected
        assert!(claim.mark_pending().is_err());
        assert!(claim.approve(100, at).is_err());
        assert!(claim.deny(at).is_err());
    }

    #[test]
    fn test_overpayment_rejected() {
        let mut claim = test_claim();
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();

        claim.mark_pending().unwrap();
        let err = claim.approve(250_001, at).unwrap_err();
        assert!(matches!(err, ClaimError::PaidExceedsTotal { .. }));
        // Still pending after the failed approval
        assert_eq!(claim.status(), ClaimStatus::Pending);
    }
}
