//! Lab workflow engine
//!
//! Advances every unfinished lab test through the forward-only workflow
//! `Ordered → InProgress → Completed`, one step per tick at the configured
//! probability, and independently orders new tests for active visits.
//!
//! # Result synthesis
//!
//! Numeric results are drawn from `[low, low + span_factor · (high − low)]`.
//! The span deliberately exceeds the reference band so a share of results
//! lands abnormal. Classification happens against the *stored* (rounded)
//! value:
//! - `is_abnormal`: strictly outside `[low, high]`
//! - `is_critical`: breaches the test type's `CriticalLabValue`, if any
//!
//! Test types without a numeric range produce a qualitative
//! POSITIVE/NEGATIVE result; positives are marked abnormal.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::LabConfig;
use crate::models::{LabResult, LabTest, LabTestStatus, LabTestType, QualitativeResult, StaffRole};
use crate::rng::RngManager;
use crate::store::Store;

/// Outcome of one lab workflow pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabReport {
    /// New tests ordered this tick
    pub ordered: usize,

    /// Workflow steps applied (collection + completion)
    pub advanced: usize,

    /// Tests that reached Completed this tick
    pub completed: usize,
}

/// Run the advancement pass, then the order pass
pub fn run(
    store: &mut Store,
    config: &LabConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> LabReport {
    let mut report = LabReport::default();

    advance_pass(store, config, rng, now, &mut report);
    report.ordered = order_pass(store, config, rng, now);

    report
}

/// Advance each unfinished test one step with the configured probability
fn advance_pass(
    store: &mut Store,
    config: &LabConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
    report: &mut LabReport,
) {
    let unfinished: Vec<Uuid> = store
        .lab_tests()
        .iter()
        .filter(|t| !t.is_completed())
        .map(|t| t.id())
        .collect();

    for test_id in unfinished {
        if !rng.chance(config.advance_probability) {
            continue;
        }

        let Some(status) = store.lab_tests().get(test_id).map(|t| t.status()) else {
            continue;
        };
        let outcome = match status {
            LabTestStatus::Ordered => store
                .lab_tests_mut()
                .require_mut(test_id)
                .and_then(|t| t.collect_specimen(now).map_err(Into::into)),
            LabTestStatus::InProgress => {
                let completed = complete_test(store, config, rng, test_id, now);
                if completed.is_ok() {
                    report.completed += 1;
                }
                completed
            }
            LabTestStatus::Completed => continue,
        };

        match outcome {
            Ok(()) => report.advanced += 1,
            Err(err) => warn!(%test_id, %err, "lab transition failed"),
        }
    }
}

/// Synthesize and classify a result, completing the test
fn complete_test(
    store: &mut Store,
    config: &LabConfig,
    rng: &mut RngManager,
    test_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), crate::store::StoreError> {
    let test_type_id = store.lab_tests().require(test_id)?.test_type_id();
    let test_type = store.lab_test_types().get(test_type_id).cloned();

    let (result, is_abnormal, is_critical) = match test_type {
        Some(ref ty) => synthesize_result(store, config, rng, ty),
        None => {
            // Catalog row vanished; fall back to a qualitative negative
            debug!(%test_type_id, "test type missing at completion");
            (
                LabResult::Qualitative(QualitativeResult::Negative),
                false,
                false,
            )
        }
    };

    store
        .lab_tests_mut()
        .require_mut(test_id)?
        .complete(now, result, is_abnormal, is_critical)?;
    Ok(())
}

fn synthesize_result(
    store: &Store,
    config: &LabConfig,
    rng: &mut RngManager,
    test_type: &LabTestType,
) -> (LabResult, bool, bool) {
    match test_type.reference_range {
        Some(range) => {
            let span = range.high - range.low;
            let draw = rng.range_f64(range.low, range.low + config.result_span_factor * span);
            // Classify against the stored (rounded) value
            let value = (draw * 100.0).round() / 100.0;
            let is_abnormal = range.is_abnormal(value);
            let is_critical = store
                .critical_lab_values()
                .iter()
                .find(|c| c.test_type_id == test_type.id)
                .map(|c| c.is_breached(value))
                .unwrap_or(false);
            (
                LabResult::Numeric {
                    value,
                    unit: test_type.unit.clone(),
                },
                is_abnormal,
                is_critical,
            )
        }
        None => {
            let qualitative = if rng.chance(config.positive_probability) {
                QualitativeResult::Positive
            } else {
                QualitativeResult::Negative
            };
            (
                LabResult::Qualitative(qualitative),
                qualitative == QualitativeResult::Positive,
                false,
            )
        }
    }
}

/// With the configured probability, order one new test for an active visit
fn order_pass(
    store: &mut Store,
    config: &LabConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> usize {
    if !rng.chance(config.order_probability) {
        return 0;
    }

    let visits: Vec<(Uuid, Uuid)> = store
        .active_visits()
        .map(|v| (v.id(), v.patient_id()))
        .collect();
    let type_ids = store.lab_test_types().ids();
    let orderers = ordering_staff(store);

    let (Some(&(visit_id, patient_id)), Some(&test_type_id), Some(&staff_id)) = (
        rng.pick(&visits),
        rng.pick(&type_ids),
        rng.pick(&orderers),
    ) else {
        debug!("lab order skipped: no active visit, test type, or staff");
        return 0;
    };

    let test = LabTest::new(rng.uuid(), patient_id, visit_id, test_type_id, staff_id, now);
    match store.lab_tests_mut().insert(test) {
        Ok(()) => 1,
        Err(err) => {
            warn!(%visit_id, %err, "lab order failed");
            0
        }
    }
}

/// Physicians order tests; fall back to any staff for small rosters
fn ordering_staff(store: &Store) -> Vec<Uuid> {
    let physicians: Vec<Uuid> = store
        .staff()
        .iter()
        .filter(|s| s.role == StaffRole::Physician)
        .map(|s| s.id)
        .collect();
    if physicians.is_empty() {
        store.staff().iter().map(|s| s.id).collect()
    } else {
        physicians
    }
}
