//! Visit lifecycle generator
//!
//! Reconciles the active visit population toward a configured target each
//! tick instead of rewriting the table:
//!
//! 1. **Discharge pass**: each active visit is discharged with the
//!    configured probability, with a discharge date sampled between
//!    admission and now. The bed is freed in the same store operation.
//! 2. **Admission pass**: new visits are admitted only for the deficit
//!    below `target_active_visits`, drawing patients that have no active
//!    visit, a random department, and (when one is free) a bed in that
//!    department.
//!
//! Discharged rows are retained as history; admission dates are sampled a
//! configurable number of days back so the analytics tables have a trend to
//! show from the first tick.
//!
//! All clinical content below is synthesized and fictional.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::VisitConfig;
use crate::models::{DepartmentType, Diagnosis, Visit, VitalSigns};
use crate::rng::RngManager;
use crate::store::Store;

/// Outcome of one visit reconciliation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitReport {
    pub admitted: usize,
    pub discharged: usize,
}

// ============================================================================
// Clinical vocabulary
// ============================================================================

const COMPLAINTS_EMERGENCY: &[&str] = &[
    "Chest pain",
    "Shortness of breath",
    "Abdominal pain",
    "Head injury after fall",
    "High fever",
];
const COMPLAINTS_CARDIOLOGY: &[&str] = &[
    "Palpitations",
    "Exertional chest pressure",
    "Syncope",
    "Leg swelling",
];
const COMPLAINTS_PEDIATRICS: &[&str] = &[
    "Persistent cough",
    "Dehydration",
    "Febrile seizure",
    "Wheezing",
];
const COMPLAINTS_ONCOLOGY: &[&str] = &[
    "Chemotherapy cycle admission",
    "Neutropenic fever",
    "Intractable pain",
];
const COMPLAINTS_ORTHOPEDICS: &[&str] = &[
    "Hip fracture",
    "Post-operative knee swelling",
    "Lower back pain",
];
const COMPLAINTS_GENERAL: &[&str] = &[
    "Community-acquired pneumonia",
    "Urinary tract infection",
    "Uncontrolled diabetes",
    "Cellulitis",
];
const COMPLAINTS_ICU: &[&str] = &["Septic shock", "Respiratory failure", "Post-arrest care"];
const COMPLAINTS_SURGERY: &[&str] = &[
    "Acute appendicitis",
    "Cholecystitis",
    "Bowel obstruction",
];

const PRIMARY_DIAGNOSES: &[&str] = &[
    "Acute coronary syndrome",
    "Community-acquired pneumonia",
    "Sepsis, unspecified organism",
    "Femoral neck fracture",
    "Acute appendicitis",
    "Urinary tract infection",
    "Congestive heart failure exacerbation",
    "Type 2 diabetes with hyperglycemia",
];

const SECONDARY_DIAGNOSES: &[&str] = &[
    "Essential hypertension",
    "Chronic kidney disease, stage 3",
    "Atrial fibrillation",
    "COPD",
    "Obesity",
];

const MEDICATIONS: &[&str] = &[
    "Amoxicillin 500mg",
    "Lisinopril 10mg",
    "Metformin 850mg",
    "Aspirin 81mg",
    "Atorvastatin 40mg",
    "Ondansetron 4mg",
    "Enoxaparin 40mg",
    "Paracetamol 1g",
];

fn complaints_for(department_type: DepartmentType) -> &'static [&'static str] {
    match department_type {
        DepartmentType::Emergency => COMPLAINTS_EMERGENCY,
        DepartmentType::Cardiology => COMPLAINTS_CARDIOLOGY,
        DepartmentType::Pediatrics => COMPLAINTS_PEDIATRICS,
        DepartmentType::Oncology => COMPLAINTS_ONCOLOGY,
        DepartmentType::Orthopedics => COMPLAINTS_ORTHOPEDICS,
        DepartmentType::GeneralMedicine => COMPLAINTS_GENERAL,
        DepartmentType::IntensiveCare => COMPLAINTS_ICU,
        DepartmentType::Surgery => COMPLAINTS_SURGERY,
    }
}

// ============================================================================
// Reconciliation pass
// ============================================================================

/// Run the discharge and admission passes
pub fn run(
    store: &mut Store,
    config: &VisitConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> VisitReport {
    let mut report = VisitReport::default();

    report.discharged = discharge_pass(store, config, rng, now);
    report.admitted = admission_pass(store, config, rng, now);

    report
}

/// Discharge each active visit with the configured probability
fn discharge_pass(
    store: &mut Store,
    config: &VisitConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> usize {
    let active: Vec<Uuid> = store.active_visits().map(|v| v.id()).collect();

    let mut discharged = 0;
    for visit_id in active {
        if !rng.chance(config.discharge_probability) {
            continue;
        }
        let Some(admission) = store.visits().get(visit_id).map(|v| v.admission_date()) else {
            continue;
        };
        let at = sample_between(rng, admission, now);
        match store.discharge_visit(visit_id, at) {
            Ok(()) => discharged += 1,
            Err(err) => warn!(%visit_id, %err, "discharge failed"),
        }
    }
    discharged
}

/// Admit new visits until the active population reaches the target
fn admission_pass(
    store: &mut Store,
    config: &VisitConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> usize {
    let department_ids = store.departments().ids();
    if department_ids.is_empty() {
        debug!("admission skipped: no departments");
        return 0;
    }

    let mut candidates = store.patients_without_active_visit();
    let mut admitted = 0;

    while store.active_visit_count() < config.target_active_visits {
        if candidates.is_empty() {
            debug!("admission stopped: no unadmitted patients remain");
            break;
        }
        let idx = (rng.next() % candidates.len() as u64) as usize;
        let patient_id = candidates.swap_remove(idx);

        let department_id = *rng
            .pick(&department_ids)
            .expect("department list checked non-empty");
        let department_type = store
            .departments()
            .get(department_id)
            .map(|d| d.department_type)
            .unwrap_or(DepartmentType::GeneralMedicine);

        // Take a free bed in the department when one exists
        let free_beds = store.available_beds_in_department(department_id);
        let bed_id = rng.pick(&free_beds).copied();

        let (days_lo, days_hi) = config.admission_days_back;
        let admission_date = now
            - Duration::days(rng.range(days_lo, days_hi + 1))
            - Duration::seconds(rng.range(0, 86_400));

        let visit = Visit::new(
            rng.uuid(),
            patient_id,
            department_id,
            bed_id,
            store.next_visit_number(),
            admission_date,
            rng.pick(complaints_for(department_type))
                .expect("complaint pools are non-empty")
                .to_string(),
            synthesize_diagnosis(rng),
            synthesize_vitals(rng),
            synthesize_medications(rng),
        );

        match store.admit_visit(visit) {
            Ok(()) => admitted += 1,
            Err(err) => warn!(%patient_id, %err, "admission failed"),
        }
    }
    admitted
}

fn synthesize_diagnosis(rng: &mut RngManager) -> Diagnosis {
    let primary = rng
        .pick(PRIMARY_DIAGNOSES)
        .expect("diagnosis pool is non-empty")
        .to_string();
    let secondary = if rng.chance(0.4) {
        rng.pick(SECONDARY_DIAGNOSES).map(|s| s.to_string())
    } else {
        None
    };
    Diagnosis { primary, secondary }
}

/// Vitals within physiologically plausible bounds
fn synthesize_vitals(rng: &mut RngManager) -> VitalSigns {
    VitalSigns {
        temperature_c: (rng.range_f64(36.0, 39.6) * 10.0).round() / 10.0,
        heart_rate: rng.range(55, 131) as u32,
        respiratory_rate: rng.range(12, 29) as u32,
        systolic_bp: rng.range(95, 166) as u32,
        diastolic_bp: rng.range(55, 101) as u32,
        oxygen_saturation: rng.range(88, 101) as u32,
    }
}

fn synthesize_medications(rng: &mut RngManager) -> Vec<String> {
    let count = rng.range(1, 4) as usize;
    (0..count)
        .filter_map(|_| rng.pick(MEDICATIONS).map(|m| m.to_string()))
        .collect()
}

/// Sample a timestamp uniformly between `start` and `end`
fn sample_between(
    rng: &mut RngManager,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let span = (end - start).num_seconds();
    if span <= 0 {
        return end;
    }
    start + Duration::seconds(rng.range(0, span + 1))
}
