//! Quality and safety generator
//!
//! Appends low-probability quality records each tick:
//! - patient surveys and education-log entries for a small sample of visits
//! - quality measurements sampled around each indicator's target, bounded
//!   by the indicator's unit (percent, score out of five, raw count)

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::config::QualityConfig;
use crate::models::{IndicatorUnit, PatientEducationLog, PatientSurvey, QualityMeasurement};
use crate::rng::RngManager;
use crate::store::Store;

/// Outcome of one quality pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityReport {
    pub surveys: usize,
    pub education_logs: usize,
    pub measurements: usize,
}

/// Run the per-visit and per-indicator append passes
pub fn run(
    store: &mut Store,
    config: &QualityConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> QualityReport {
    let mut report = QualityReport::default();

    visit_pass(store, config, rng, now, &mut report);
    measurement_pass(store, config, rng, now, &mut report);

    report
}

/// Survey and education appends for a sample of visits
fn visit_pass(
    store: &mut Store,
    config: &QualityConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
    report: &mut QualityReport,
) {
    let mut pool: Vec<(Uuid, Uuid)> = store
        .visits()
        .iter()
        .map(|v| (v.id(), v.patient_id()))
        .collect();

    let material_ids = store.education_materials().ids();

    for _ in 0..config.visit_sample_size {
        if pool.is_empty() {
            break;
        }
        let idx = (rng.next() % pool.len() as u64) as usize;
        let (visit_id, patient_id) = pool.swap_remove(idx);

        if rng.chance(config.survey_probability) {
            let survey = PatientSurvey {
                id: rng.uuid(),
                visit_id,
                patient_id,
                overall_rating: rng.range(1, 6) as u8,
                care_rating: rng.range(1, 6) as u8,
                communication_rating: rng.range(1, 6) as u8,
                completed_at: now,
            };
            match store.patient_surveys_mut().insert(survey) {
                Ok(()) => report.surveys += 1,
                Err(err) => warn!(%visit_id, %err, "survey insert failed"),
            }
        }

        if rng.chance(config.education_probability) {
            let Some(&material_id) = rng.pick(&material_ids) else {
                continue;
            };
            let log = PatientEducationLog {
                id: rng.uuid(),
                visit_id,
                patient_id,
                material_id,
                provided_at: now,
            };
            match store.patient_education_logs_mut().insert(log) {
                Ok(()) => report.education_logs += 1,
                Err(err) => warn!(%visit_id, %err, "education log insert failed"),
            }
        }
    }
}

/// Measurements sampled around each indicator's target
fn measurement_pass(
    store: &mut Store,
    config: &QualityConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
    report: &mut QualityReport,
) {
    let indicators: Vec<(Uuid, f64, IndicatorUnit)> = store
        .quality_indicators()
        .iter()
        .map(|i| (i.id, i.target_value, i.unit))
        .collect();

    for (indicator_id, target, unit) in indicators {
        if !rng.chance(config.measurement_probability) {
            continue;
        }
        let (lo, hi) = config.measurement_spread;
        let raw = target * rng.range_f64(lo, hi);
        let value = bound_for_unit(raw, unit);

        let measurement = QualityMeasurement {
            id: rng.uuid(),
            indicator_id,
            value,
            measured_at: now,
        };
        match store.quality_measurements_mut().insert(measurement) {
            Ok(()) => report.measurements += 1,
            Err(err) => warn!(%indicator_id, %err, "measurement insert failed"),
        }
    }
}

/// Apply unit-specific bounds to a sampled value
fn bound_for_unit(raw: f64, unit: IndicatorUnit) -> f64 {
    let bounded = match unit {
        IndicatorUnit::Percent => raw.clamp(0.0, 100.0),
        IndicatorUnit::ScoreOutOfFive => raw.clamp(0.0, 5.0),
        IndicatorUnit::CountPerThousand => raw.max(0.0),
    };
    (bounded * 100.0).round() / 100.0
}
