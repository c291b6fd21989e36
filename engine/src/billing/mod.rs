//! Billing and claims pipeline
//!
//! Two sequential passes per tick:
//!
//! 1. **Creation**: every discharged visit without a claim gets one
//!    billing charge and exactly one insurance claim (batch-capped). The
//!    claim goes through the store's uniqueness gate *first*; the charge is
//!    only written once the claim is accepted, so a visit can never end up
//!    with a charge/claim mismatch.
//! 2. **Adjudication**: open claims advance one step with the configured
//!    probability: `Submitted → Pending`, then
//!    `Pending → Approved (85%) | Denied (15%)`. Approval pays a sampled
//!    fraction of the total; denial pays zero and records one denial row.
//!
//! Per-record failures are logged and the batch continues.
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::config::ClaimsConfig;
use crate::models::{BillingTransaction, ClaimDenial, ClaimStatus, DenialReason, InsuranceClaim};
use crate::rng::RngManager;
use crate::store::Store;

/// Outcome of one billing pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingReport {
    pub charges_created: usize,
    pub claims_created: usize,
    pub claims_advanced: usize,
    pub claims_approved: usize,
    pub claims_denied: usize,
}

const INSURERS: &[&str] = &[
    "Aetna",
    "Blue Cross Blue Shield",
    "Cigna",
    "UnitedHealthcare",
    "Humana",
    "Kaiser Permanente",
];

const DENIAL_REASONS: &[(DenialReason, &str)] = &[
    (
        DenialReason::MissingDocumentation,
        "Clinical records insufficient to support the billed services",
    ),
    (
        DenialReason::NotCovered,
        "Service not covered under the member's plan",
    ),
    (
        DenialReason::OutOfNetwork,
        "Facility is outside the member's network",
    ),
    (
        DenialReason::PriorAuthorizationRequired,
        "No prior authorization on file for this admission",
    ),
    (
        DenialReason::DuplicateClaim,
        "A claim for this service period was already processed",
    ),
    (
        DenialReason::CodingError,
        "Diagnosis and procedure codes are inconsistent",
    ),
];

/// Run the creation pass, then the adjudication pass
pub fn run(
    store: &mut Store,
    config: &ClaimsConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> BillingReport {
    let mut report = BillingReport::default();

    creation_pass(store, config, rng, now, &mut report);
    adjudication_pass(store, config, rng, now, &mut report);

    report
}

/// Create one charge and one claim per unclaimed discharged visit
fn creation_pass(
    store: &mut Store,
    config: &ClaimsConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
    report: &mut BillingReport,
) {
    let batch: Vec<Uuid> = store
        .unclaimed_discharged_visits()
        .into_iter()
        .take(config.creation_batch_size)
        .collect();

    for visit_id in batch {
        let Some((patient_id, visit_number)) = store
            .visits()
            .get(visit_id)
            .map(|v| (v.patient_id(), v.visit_number().to_string()))
        else {
            continue;
        };

        let (lo, hi) = config.charge_range_cents;
        let amount_cents = rng.range(lo, hi);
        let insurer = rng
            .pick(INSURERS)
            .expect("insurer list is non-empty")
            .to_string();

        // Claim first: the store's per-visit uniqueness gate decides whether
        // this visit gets billed at all.
        let claim = InsuranceClaim::new(rng.uuid(), visit_id, patient_id, insurer, amount_cents, now);
        if let Err(err) = store.insert_claim(claim) {
            warn!(%visit_id, %err, "claim creation failed");
            continue;
        }
        report.claims_created += 1;

        let charge = BillingTransaction::charge(
            rng.uuid(),
            visit_id,
            patient_id,
            amount_cents,
            format!("Inpatient stay charge for visit {}", visit_number),
        );
        match store.billing_transactions_mut().insert(charge) {
            Ok(()) => report.charges_created += 1,
            Err(err) => warn!(%visit_id, %err, "charge creation failed"),
        }
    }
}

/// Advance open claims one adjudication step each
fn adjudication_pass(
    store: &mut Store,
    config: &ClaimsConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
    report: &mut BillingReport,
) {
    let batch: Vec<Uuid> = store
        .open_claims()
        .into_iter()
        .take(config.adjudication_batch_size)
        .collect();

    for claim_id in batch {
        if !rng.chance(config.advance_probability) {
            continue;
        }
        let Some(status) = store.insurance_claims().get(claim_id).map(|c| c.status()) else {
            continue;
        };

        let outcome = match status {
            ClaimStatus::Submitted => store
                .insurance_claims_mut()
                .require_mut(claim_id)
                .and_then(|c| c.mark_pending().map_err(Into::into)),
            ClaimStatus::Pending => {
                if rng.chance(config.approval_probability) {
                    approve_claim(store, config, rng, claim_id, now, report)
                } else {
                    deny_claim(store, rng, claim_id, now, report)
                }
            }
            ClaimStatus::Approved | ClaimStatus::Denied => continue,
        };

        match outcome {
            Ok(()) => report.claims_advanced += 1,
            Err(err) => warn!(%claim_id, %err, "adjudication failed"),
        }
    }
}

fn approve_claim(
    store: &mut Store,
    config: &ClaimsConfig,
    rng: &mut RngManager,
    claim_id: Uuid,
    now: DateTime<Utc>,
    report: &mut BillingReport,
) -> Result<(), crate::store::StoreError> {
    let claim = store.insurance_claims_mut().require_mut(claim_id)?;
    let (lo, hi) = config.payout_fraction;
    let paid = (claim.total_amount_cents() as f64 * rng.range_f64(lo, hi)).round() as i64;
    claim.approve(paid, now)?;
    report.claims_approved += 1;
    Ok(())
}

fn deny_claim(
    store: &mut Store,
    rng: &mut RngManager,
    claim_id: Uuid,
    now: DateTime<Utc>,
    report: &mut BillingReport,
) -> Result<(), crate::store::StoreError> {
    store
        .insurance_claims_mut()
        .require_mut(claim_id)?
        .deny(now)?;

    let (reason, details) = rng
        .pick(DENIAL_REASONS)
        .expect("denial reason list is non-empty");
    let denial = ClaimDenial {
        id: rng.uuid(),
        claim_id,
        reason: *reason,
        details: details.to_string(),
    };
    store.claim_denials_mut().insert(denial)?;
    report.claims_denied += 1;
    Ok(())
}
