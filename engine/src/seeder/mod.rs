//! Reference data seeder
//!
//! Ensures catalog tables exist before any generator runs. The contract per
//! table: if `current_count < desired_count`, insert the missing rows from
//! the fixed catalog below; otherwise no-op. Safe to call on every tick:
//! idempotent under the count check, not under content equality.
//!
//! A failure while seeding one table is logged and does not abort the
//! sibling tables.
//!
//! All catalog data is fixed and fictional.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::models::{
    Accreditation, AccreditationStatus, ComplianceArea, ComplianceStatus, CriticalLabValue,
    Department, DepartmentType, EducationMaterial, IndicatorUnit, InitiativeStatus,
    QualityImprovementInitiative, QualityIndicator, ReferenceRange, RiskAssessment, RiskSeverity,
    LabTestType,
};
use crate::rng::RngManager;
use crate::store::{Store, StoreError};

/// Outcome of one seeding pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    /// Rows inserted across all catalog tables
    pub rows_inserted: usize,

    /// Tables whose seeding failed (logged, siblings unaffected)
    pub tables_failed: usize,
}

// ============================================================================
// Fixed catalogs
// ============================================================================

const DEPARTMENTS: &[(&str, &str, DepartmentType)] = &[
    ("Emergency Department", "ED", DepartmentType::Emergency),
    ("Cardiology", "CARD", DepartmentType::Cardiology),
    ("Pediatrics", "PEDS", DepartmentType::Pediatrics),
    ("Oncology", "ONC", DepartmentType::Oncology),
    ("Orthopedics", "ORTHO", DepartmentType::Orthopedics),
    ("General Medicine", "GMED", DepartmentType::GeneralMedicine),
    ("Intensive Care Unit", "ICU", DepartmentType::IntensiveCare),
    ("Surgery", "SURG", DepartmentType::Surgery),
];

struct LabTestSpec {
    name: &'static str,
    code: &'static str,
    category: &'static str,
    /// (low, high) reference band; None for qualitative tests
    range: Option<(f64, f64)>,
    unit: Option<&'static str>,
    /// (critical_low, critical_high, description) for high-acuity tests
    critical: Option<(Option<f64>, Option<f64>, &'static str)>,
}

const LAB_TESTS: &[LabTestSpec] = &[
    LabTestSpec {
        name: "Potassium",
        code: "K",
        category: "Chemistry",
        range: Some((3.5, 5.1)),
        unit: Some("mmol/L"),
        critical: Some((Some(2.5), Some(6.5), "Arrhythmia risk outside this band")),
    },
    LabTestSpec {
        name: "Hemoglobin",
        code: "HGB",
        category: "Hematology",
        range: Some((12.0, 17.5)),
        unit: Some("g/dL"),
        critical: Some((Some(7.0), None, "Transfusion threshold")),
    },
    LabTestSpec {
        name: "Glucose",
        code: "GLU",
        category: "Chemistry",
        range: Some((70.0, 110.0)),
        unit: Some("mg/dL"),
        critical: Some((Some(40.0), Some(450.0), "Severe hypo/hyperglycemia")),
    },
    LabTestSpec {
        name: "White Blood Cell Count",
        code: "WBC",
        category: "Hematology",
        range: Some((4.0, 11.0)),
        unit: Some("10^9/L"),
        critical: None,
    },
    LabTestSpec {
        name: "Troponin I",
        code: "TROP",
        category: "Cardiac",
        range: Some((0.0, 0.04)),
        unit: Some("ng/mL"),
        critical: Some((None, Some(0.5), "Myocardial injury threshold")),
    },
    LabTestSpec {
        name: "Creatinine",
        code: "CREA",
        category: "Chemistry",
        range: Some((0.6, 1.3)),
        unit: Some("mg/dL"),
        critical: None,
    },
    LabTestSpec {
        name: "Blood Culture",
        code: "BCX",
        category: "Microbiology",
        range: None,
        unit: None,
        critical: None,
    },
    LabTestSpec {
        name: "Urinalysis Nitrite",
        code: "UNIT",
        category: "Urinalysis",
        range: None,
        unit: None,
        critical: None,
    },
];

const QUALITY_INDICATORS: &[(&str, f64, IndicatorUnit)] = &[
    ("Hand Hygiene Compliance", 95.0, IndicatorUnit::Percent),
    ("30-Day Readmission Rate", 9.5, IndicatorUnit::Percent),
    ("Patient Satisfaction", 4.3, IndicatorUnit::ScoreOutOfFive),
    ("Medication Error Rate", 2.0, IndicatorUnit::CountPerThousand),
    ("Pressure Injury Incidence", 1.2, IndicatorUnit::CountPerThousand),
    ("Door-to-Provider Compliance", 88.0, IndicatorUnit::Percent),
];

/// (body, program, last survey days back, next survey days ahead)
const ACCREDITATIONS: &[(&str, &str, i64, i64)] = &[
    ("Joint Commission", "Hospital Accreditation", 410, 680),
    ("CAP", "Laboratory Accreditation", 220, 510),
    ("ACR", "Radiology Accreditation", 150, 945),
];

const COMPLIANCE_AREAS: &[(&str, ComplianceStatus, i64)] = &[
    ("HIPAA Privacy", ComplianceStatus::Compliant, 35),
    ("Infection Control", ComplianceStatus::Compliant, 60),
    ("Medication Management", ComplianceStatus::ActionRequired, 12),
    ("Fire & Life Safety", ComplianceStatus::Compliant, 90),
];

const RISK_ASSESSMENTS: &[(&str, RiskSeverity, RiskSeverity, &str, i64)] = &[
    (
        "Patient falls in orthopedic ward",
        RiskSeverity::High,
        RiskSeverity::Medium,
        "Hourly rounding and bed alarms",
        45,
    ),
    (
        "Sample mislabeling in phlebotomy",
        RiskSeverity::Medium,
        RiskSeverity::Low,
        "Two-identifier verification at draw",
        120,
    ),
    (
        "ED boarding during surge",
        RiskSeverity::Medium,
        RiskSeverity::High,
        "Surge capacity protocol and discharge lounge",
        30,
    ),
];

const INITIATIVES: &[(&str, InitiativeStatus, i64)] = &[
    ("Sepsis bundle adherence", InitiativeStatus::InProgress, 200),
    ("Discharge-before-noon", InitiativeStatus::Planned, 20),
    ("Bedside shift report", InitiativeStatus::Completed, 365),
];

const EDUCATION_MATERIALS: &[(&str, &str, &str)] = &[
    ("Managing Heart Failure at Home", "Cardiology", "Brochure"),
    ("Wound Care After Surgery", "Surgery", "Handout"),
    ("Understanding Your New Medication", "Pharmacy", "Video"),
    ("Diabetes Self-Management", "Endocrinology", "Booklet"),
    ("Fall Prevention at Home", "Safety", "Handout"),
];

// ============================================================================
// Seeding pass
// ============================================================================

/// Ensure all catalog tables are populated
///
/// Runs every catalog ensure even when one fails; the failure is logged and
/// counted in the report.
pub fn ensure_reference_data(
    store: &mut Store,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> SeedReport {
    let mut report = SeedReport::default();

    let steps: [(&str, Result<usize, StoreError>); 9] = [
        ("departments", ensure_departments(store, rng)),
        ("lab_test_types", ensure_lab_test_types(store, rng)),
        ("critical_lab_values", ensure_critical_values(store, rng)),
        ("quality_indicators", ensure_quality_indicators(store, rng)),
        ("accreditations", ensure_accreditations(store, rng, now)),
        ("compliance_areas", ensure_compliance_areas(store, rng, now)),
        ("risk_assessments", ensure_risk_assessments(store, rng, now)),
        (
            "improvement_initiatives",
            ensure_initiatives(store, rng, now),
        ),
        ("education_materials", ensure_education_materials(store, rng)),
    ];

    for (table, result) in steps {
        match result {
            Ok(inserted) => report.rows_inserted += inserted,
            Err(err) => {
                warn!(table, %err, "reference seeding failed for table");
                report.tables_failed += 1;
            }
        }
    }

    report
}

fn ensure_departments(store: &mut Store, rng: &mut RngManager) -> Result<usize, StoreError> {
    let current = store.departments().len();
    let mut inserted = 0;
    for (name, code, dept_type) in DEPARTMENTS.iter().skip(current) {
        let id = rng.uuid();
        store
            .departments_mut()
            .insert(Department::new(id, name, code, *dept_type))?;
        inserted += 1;
    }
    Ok(inserted)
}

fn ensure_lab_test_types(store: &mut Store, rng: &mut RngManager) -> Result<usize, StoreError> {
    let current = store.lab_test_types().len();
    let mut inserted = 0;
    for spec in LAB_TESTS.iter().skip(current) {
        let row = LabTestType {
            id: rng.uuid(),
            name: spec.name.to_string(),
            code: spec.code.to_string(),
            category: spec.category.to_string(),
            reference_range: spec.range.map(|(low, high)| ReferenceRange { low, high }),
            unit: spec.unit.map(str::to_string),
        };
        store.lab_test_types_mut().insert(row)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn ensure_critical_values(store: &mut Store, rng: &mut RngManager) -> Result<usize, StoreError> {
    let desired: Vec<&LabTestSpec> = LAB_TESTS.iter().filter(|s| s.critical.is_some()).collect();
    if store.critical_lab_values().len() >= desired.len() {
        return Ok(0);
    }

    let mut inserted = 0;
    for spec in desired.iter().skip(store.critical_lab_values().len()) {
        let (critical_low, critical_high, description) =
            spec.critical.expect("filtered to critical specs");
        let Some(test_type_id) = find_test_type(store, spec.code) else {
            // Test type not seeded yet; picked up on the next pass
            warn!(code = spec.code, "critical value skipped: test type missing");
            continue;
        };
        let row = CriticalLabValue {
            id: rng.uuid(),
            test_type_id,
            critical_low,
            critical_high,
            description: description.to_string(),
        };
        store.critical_lab_values_mut().insert(row)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn find_test_type(store: &Store, code: &str) -> Option<Uuid> {
    store
        .lab_test_types()
        .iter()
        .find(|t| t.code == code)
        .map(|t| t.id)
}

fn ensure_quality_indicators(store: &mut Store, rng: &mut RngManager) -> Result<usize, StoreError> {
    let current = store.quality_indicators().len();
    let mut inserted = 0;
    for (name, target, unit) in QUALITY_INDICATORS.iter().skip(current) {
        let row = QualityIndicator {
            id: rng.uuid(),
            name: name.to_string(),
            target_value: *target,
            unit: *unit,
        };
        store.quality_indicators_mut().insert(row)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn ensure_accreditations(
    store: &mut Store,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let current = store.accreditations().len();
    let mut inserted = 0;
    for (body, program, last_back, next_ahead) in ACCREDITATIONS.iter().skip(current) {
        let row = Accreditation {
            id: rng.uuid(),
            body: body.to_string(),
            program: program.to_string(),
            status: AccreditationStatus::Accredited,
            last_survey: (now - Duration::days(*last_back)).date_naive(),
            next_survey: (now + Duration::days(*next_ahead)).date_naive(),
        };
        store.accreditations_mut().insert(row)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn ensure_compliance_areas(
    store: &mut Store,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let current = store.compliance_areas().len();
    let mut inserted = 0;
    for (name, status, reviewed_back) in COMPLIANCE_AREAS.iter().skip(current) {
        let row = ComplianceArea {
            id: rng.uuid(),
            name: name.to_string(),
            status: *status,
            last_reviewed: (now - Duration::days(*reviewed_back)).date_naive(),
        };
        store.compliance_areas_mut().insert(row)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn ensure_risk_assessments(
    store: &mut Store,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let current = store.risk_assessments().len();
    let mut inserted = 0;
    for (area, severity, likelihood, mitigation, back) in RISK_ASSESSMENTS.iter().skip(current) {
        let row = RiskAssessment {
            id: rng.uuid(),
            area: area.to_string(),
            severity: *severity,
            likelihood: *likelihood,
            mitigation: mitigation.to_string(),
            assessed_at: (now - Duration::days(*back)).date_naive(),
        };
        store.risk_assessments_mut().insert(row)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn ensure_initiatives(
    store: &mut Store,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let current = store.improvement_initiatives().len();
    let mut inserted = 0;
    for (title, status, started_back) in INITIATIVES.iter().skip(current) {
        let row = QualityImprovementInitiative {
            id: rng.uuid(),
            title: title.to_string(),
            status: *status,
            started_on: (now - Duration::days(*started_back)).date_naive(),
        };
        store.improvement_initiatives_mut().insert(row)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn ensure_education_materials(
    store: &mut Store,
    rng: &mut RngManager,
) -> Result<usize, StoreError> {
    let current = store.education_materials().len();
    let mut inserted = 0;
    for (title, topic, format) in EDUCATION_MATERIALS.iter().skip(current) {
        let row = EducationMaterial {
            id: rng.uuid(),
            title: title.to_string(),
            topic: topic.to_string(),
            format: format.to_string(),
        };
        store.education_materials_mut().insert(row)?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Number of departments in the fixed catalog (used by pool sizing tests)
pub fn department_catalog_len() -> usize {
    DEPARTMENTS.len()
}

/// Number of lab test types in the fixed catalog
pub fn lab_test_catalog_len() -> usize {
    LAB_TESTS.len()
}

/// Number of quality indicators in the fixed catalog
pub fn quality_indicator_catalog_len() -> usize {
    QUALITY_INDICATORS.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_seeding_fills_all_catalogs() {
        let mut store = Store::new();
        let mut rng = RngManager::new(42);

        let report = ensure_reference_data(&mut store, &mut rng, fixed_now());

        assert_eq!(report.tables_failed, 0);
        assert_eq!(store.departments().len(), DEPARTMENTS.len());
        assert_eq!(store.lab_test_types().len(), LAB_TESTS.len());
        assert_eq!(store.quality_indicators().len(), QUALITY_INDICATORS.len());
        assert_eq!(store.accreditations().len(), ACCREDITATIONS.len());
        assert_eq!(store.compliance_areas().len(), COMPLIANCE_AREAS.len());
        assert_eq!(store.risk_assessments().len(), RISK_ASSESSMENTS.len());
        assert_eq!(store.improvement_initiatives().len(), INITIATIVES.len());
        assert_eq!(
            store.education_materials().len(),
            EDUCATION_MATERIALS.len()
        );

        // Every catalog entry with critical thresholds produced a row
        let critical_count = LAB_TESTS.iter().filter(|s| s.critical.is_some()).count();
        assert_eq!(store.critical_lab_values().len(), critical_count);
    }

    #[test]
    fn test_seeding_is_idempotent_under_count_check() {
        let mut store = Store::new();
        let mut rng = RngManager::new(42);

        ensure_reference_data(&mut store, &mut rng, fixed_now());
        let counts = (
            store.departments().len(),
            store.lab_test_types().len(),
            store.critical_lab_values().len(),
            store.quality_indicators().len(),
        );

        let second = ensure_reference_data(&mut store, &mut rng, fixed_now());
        assert_eq!(second.rows_inserted, 0);
        assert_eq!(
            counts,
            (
                store.departments().len(),
                store.lab_test_types().len(),
                store.critical_lab_values().len(),
                store.quality_indicators().len(),
            )
        );
    }

    #[test]
    fn test_partial_catalog_topped_up() {
        let mut store = Store::new();
        let mut rng = RngManager::new(7);

        // Seed, then delete some departments to create a deficit
        ensure_reference_data(&mut store, &mut rng, fixed_now());
        let ids = store.departments().ids();
        for id in ids.iter().take(3) {
            store.departments_mut().remove(*id);
        }
        assert_eq!(store.departments().len(), DEPARTMENTS.len() - 3);

        let report = ensure_reference_data(&mut store, &mut rng, fixed_now());
        assert_eq!(report.rows_inserted, 3);
        assert_eq!(store.departments().len(), DEPARTMENTS.len());
    }

    #[test]
    fn test_critical_values_reference_seeded_types() {
        let mut store = Store::new();
        let mut rng = RngManager::new(42);
        ensure_reference_data(&mut store, &mut rng, fixed_now());

        for critical in store.critical_lab_values().iter() {
            assert!(
                store.lab_test_types().get(critical.test_type_id).is_some(),
                "critical value references missing test type"
            );
        }
    }
}
