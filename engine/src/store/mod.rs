//! Shared relational store
//!
//! All authoritative state lives here; the engine never holds entity state
//! between ticks. Tables are map-backed and typed, with a generic
//! insert/get/update/delete surface plus compound operations for every
//! multi-row state change the cross-entity invariants depend on.
//!
//! # Critical Invariants
//!
//! 1. **Bed/visit consistency**: a bed is Occupied iff exactly one Active
//!    visit references it. All paths that could affect this run through
//!    `admit_visit`, `discharge_visit`, and `release_bed`: never through
//!    separate bed and visit writes.
//! 2. **Claim uniqueness**: at most one insurance claim per visit, enforced
//!    by `insert_claim` against a dedicated index, not by caller discipline.
//! 3. **Id uniqueness**: inserts never silently overwrite an existing row.
//!
//! Iteration order is deterministic (BTreeMap keyed by id), so batch caps
//! and sampling are reproducible under a fixed RNG seed.

pub mod snapshot;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Accreditation, Bed, BedError, BedStatus, BillingTransaction, ClaimDenial, ClaimError,
    ComplianceArea, CriticalLabValue, Department, EducationMaterial, InsuranceClaim, LabError,
    LabTest, LabTestType, Patient, PatientEducationLog, PatientSurvey,
    QualityImprovementInitiative, QualityIndicator, QualityMeasurement, RiskAssessment, Staff,
    StaffSchedule, Visit, VisitError, VisitStatus,
};

/// Errors surfaced by store operations
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Row {id} already exists")]
    DuplicateId { id: Uuid },

    #[error("Row {id} not found")]
    NotFound { id: Uuid },

    #[error("Visit {visit_id} already has an insurance claim")]
    ClaimAlreadyExists { visit_id: Uuid },

    #[error(transparent)]
    Bed(#[from] BedError),

    #[error(transparent)]
    Visit(#[from] VisitError),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Lab(#[from] LabError),
}

/// A row that can live in a [`Table`]
pub trait Record {
    fn record_id(&self) -> Uuid;
}

macro_rules! impl_record {
    ($($ty:ty => $field:ident),+ $(,)?) => {
        $(impl Record for $ty {
            fn record_id(&self) -> Uuid {
                self.$field
            }
        })+
    };
}

// Plain-field entities
impl_record!(
    Department => id,
    Staff => id,
    StaffSchedule => id,
    Patient => id,
    LabTestType => id,
    CriticalLabValue => id,
    BillingTransaction => id,
    ClaimDenial => id,
    QualityIndicator => id,
    QualityMeasurement => id,
    Accreditation => id,
    ComplianceArea => id,
    RiskAssessment => id,
    QualityImprovementInitiative => id,
    EducationMaterial => id,
    PatientSurvey => id,
    PatientEducationLog => id,
);

// Accessor-based entities
impl Record for Bed {
    fn record_id(&self) -> Uuid {
        self.id()
    }
}

impl Record for Visit {
    fn record_id(&self) -> Uuid {
        self.id()
    }
}

impl Record for LabTest {
    fn record_id(&self) -> Uuid {
        self.id()
    }
}

impl Record for InsuranceClaim {
    fn record_id(&self) -> Uuid {
        self.id()
    }
}

/// A typed table with deterministic iteration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table<T: Record> {
    rows: BTreeMap<Uuid, T>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Table<T> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Insert a row, rejecting duplicate ids
    pub fn insert(&mut self, row: T) -> Result<(), StoreError> {
        let id = row.record_id();
        if self.rows.contains_key(&id) {
            return Err(StoreError::DuplicateId { id });
        }
        self.rows.insert(id, row);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    /// Fetch a row or fail with NotFound
    pub fn require(&self, id: Uuid) -> Result<&T, StoreError> {
        self.get(id).ok_or(StoreError::NotFound { id })
    }

    pub fn require_mut(&mut self, id: Uuid) -> Result<&mut T, StoreError> {
        self.rows
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })
    }

    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows in id order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    /// Collect ids in deterministic order
    pub fn ids(&self) -> Vec<Uuid> {
        self.rows.keys().copied().collect()
    }
}

/// The shared relational store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    departments: Table<Department>,
    beds: Table<Bed>,
    staff: Table<Staff>,
    staff_schedules: Table<StaffSchedule>,
    patients: Table<Patient>,
    visits: Table<Visit>,
    lab_test_types: Table<LabTestType>,
    critical_lab_values: Table<CriticalLabValue>,
    lab_tests: Table<LabTest>,
    billing_transactions: Table<BillingTransaction>,
    insurance_claims: Table<InsuranceClaim>,
    claim_denials: Table<ClaimDenial>,
    quality_indicators: Table<QualityIndicator>,
    quality_measurements: Table<QualityMeasurement>,
    accreditations: Table<Accreditation>,
    compliance_areas: Table<ComplianceArea>,
    risk_assessments: Table<RiskAssessment>,
    improvement_initiatives: Table<QualityImprovementInitiative>,
    education_materials: Table<EducationMaterial>,
    patient_surveys: Table<PatientSurvey>,
    patient_education_logs: Table<PatientEducationLog>,

    /// Index backing the claim-per-visit uniqueness constraint
    claimed_visits: BTreeSet<Uuid>,

    /// Monotonic sequence for human-readable visit numbers
    next_visit_seq: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            departments: Table::new(),
            beds: Table::new(),
            staff: Table::new(),
            staff_schedules: Table::new(),
            patients: Table::new(),
            visits: Table::new(),
            lab_test_types: Table::new(),
            critical_lab_values: Table::new(),
            lab_tests: Table::new(),
            billing_transactions: Table::new(),
            insurance_claims: Table::new(),
            claim_denials: Table::new(),
            quality_indicators: Table::new(),
            quality_measurements: Table::new(),
            accreditations: Table::new(),
            compliance_areas: Table::new(),
            risk_assessments: Table::new(),
            improvement_initiatives: Table::new(),
            education_materials: Table::new(),
            patient_surveys: Table::new(),
            patient_education_logs: Table::new(),
            claimed_visits: BTreeSet::new(),
            next_visit_seq: 1,
        }
    }

    // ========================================================================
    // Table accessors
    // ========================================================================

    pub fn departments(&self) -> &Table<Department> {
        &self.departments
    }

    pub fn departments_mut(&mut self) -> &mut Table<Department> {
        &mut self.departments
    }

    pub fn beds(&self) -> &Table<Bed> {
        &self.beds
    }

    pub fn beds_mut(&mut self) -> &mut Table<Bed> {
        &mut self.beds
    }

    pub fn staff(&self) -> &Table<Staff> {
        &self.staff
    }

    pub fn staff_mut(&mut self) -> &mut Table<Staff> {
        &mut self.staff
    }

    pub fn staff_schedules(&self) -> &Table<StaffSchedule> {
        &self.staff_schedules
    }

    pub fn staff_schedules_mut(&mut self) -> &mut Table<StaffSchedule> {
        &mut self.staff_schedules
    }

    pub fn patients(&self) -> &Table<Patient> {
        &self.patients
    }

    pub fn patients_mut(&mut self) -> &mut Table<Patient> {
        &mut self.patients
    }

    pub fn visits(&self) -> &Table<Visit> {
        &self.visits
    }

    pub fn lab_test_types(&self) -> &Table<LabTestType> {
        &self.lab_test_types
    }

    pub fn lab_test_types_mut(&mut self) -> &mut Table<LabTestType> {
        &mut self.lab_test_types
    }

    pub fn critical_lab_values(&self) -> &Table<CriticalLabValue> {
        &self.critical_lab_values
    }

    pub fn critical_lab_values_mut(&mut self) -> &mut Table<CriticalLabValue> {
        &mut self.critical_lab_values
    }

    pub fn lab_tests(&self) -> &Table<LabTest> {
        &self.lab_tests
    }

    pub fn lab_tests_mut(&mut self) -> &mut Table<LabTest> {
        &mut self.lab_tests
    }

    pub fn billing_transactions(&self) -> &Table<BillingTransaction> {
        &self.billing_transactions
    }

    pub fn billing_transactions_mut(&mut self) -> &mut Table<BillingTransaction> {
        &mut self.billing_transactions
    }

    pub fn insurance_claims(&self) -> &Table<InsuranceClaim> {
        &self.insurance_claims
    }

    pub fn insurance_claims_mut(&mut self) -> &mut Table<InsuranceClaim> {
        &mut self.insurance_claims
    }

    pub fn claim_denials(&self) -> &Table<ClaimDenial> {
        &self.claim_denials
    }

    pub fn claim_denials_mut(&mut self) -> &mut Table<ClaimDenial> {
        &mut self.claim_denials
    }

    pub fn quality_indicators(&self) -> &Table<QualityIndicator> {
        &self.quality_indicators
    }

    pub fn quality_indicators_mut(&mut self) -> &mut Table<QualityIndicator> {
        &mut self.quality_indicators
    }

    pub fn quality_measurements(&self) -> &Table<QualityMeasurement> {
        &self.quality_measurements
    }

    pub fn quality_measurements_mut(&mut self) -> &mut Table<QualityMeasurement> {
        &mut self.quality_measurements
    }

    pub fn accreditations(&self) -> &Table<Accreditation> {
        &self.accreditations
    }

    pub fn accreditations_mut(&mut self) -> &mut Table<Accreditation> {
        &mut self.accreditations
    }

    pub fn compliance_areas(&self) -> &Table<ComplianceArea> {
        &self.compliance_areas
    }

    pub fn compliance_areas_mut(&mut self) -> &mut Table<ComplianceArea> {
        &mut self.compliance_areas
    }

    pub fn risk_assessments(&self) -> &Table<RiskAssessment> {
        &self.risk_assessments
    }

    pub fn risk_assessments_mut(&mut self) -> &mut Table<RiskAssessment> {
        &mut self.risk_assessments
    }

    pub fn improvement_initiatives(&self) -> &Table<QualityImprovementInitiative> {
        &self.improvement_initiatives
    }

    pub fn improvement_initiatives_mut(&mut self) -> &mut Table<QualityImprovementInitiative> {
        &mut self.improvement_initiatives
    }

    pub fn education_materials(&self) -> &Table<EducationMaterial> {
        &self.education_materials
    }

    pub fn education_materials_mut(&mut self) -> &mut Table<EducationMaterial> {
        &mut self.education_materials
    }

    pub fn patient_surveys(&self) -> &Table<PatientSurvey> {
        &self.patient_surveys
    }

    pub fn patient_surveys_mut(&mut self) -> &mut Table<PatientSurvey> {
        &mut self.patient_surveys
    }

    pub fn patient_education_logs(&self) -> &Table<PatientEducationLog> {
        &self.patient_education_logs
    }

    pub fn patient_education_logs_mut(&mut self) -> &mut Table<PatientEducationLog> {
        &mut self.patient_education_logs
    }

    // ========================================================================
    // Sequences
    // ========================================================================

    /// Allocate the next unique visit number (e.g. "V000042")
    pub fn next_visit_number(&mut self) -> String {
        let seq = self.next_visit_seq;
        self.next_visit_seq += 1;
        format!("V{:06}", seq)
    }

    // ========================================================================
    // Compound operations (transactional boundaries)
    // ========================================================================
    //
    // Each of these is one logical transaction: callers cannot observe a
    // state where only half of the change has happened.

    /// Admit a visit, occupying its bed in the same operation
    ///
    /// If the visit references a bed, the bed must exist and be available;
    /// otherwise nothing is written.
    pub fn admit_visit(&mut self, visit: Visit) -> Result<(), StoreError> {
        if self.visits.get(visit.id()).is_some() {
            return Err(StoreError::DuplicateId { id: visit.id() });
        }

        if let Some(bed_id) = visit.bed_id() {
            let bed = self.beds.require_mut(bed_id)?;
            bed.occupy(visit.patient_id())?;
        }

        // Infallible from here: duplicate id was checked above
        self.visits
            .insert(visit)
            .expect("visit id checked before bed occupation");
        Ok(())
    }

    /// Discharge a visit, freeing its bed in the same operation
    pub fn discharge_visit(
        &mut self,
        visit_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let visit = self.visits.require_mut(visit_id)?;
        let bed_id = visit.bed_id();
        visit.discharge(at)?;

        if let Some(bed_id) = bed_id {
            if let Some(bed) = self.beds.get_mut(bed_id) {
                if bed.status() == BedStatus::Occupied {
                    bed.release()?;
                }
            }
        }
        Ok(())
    }

    /// Force a bed to Available, discharging its active visit first
    ///
    /// Returns the id of the visit that was discharged, if any. A bed that
    /// is already available is a no-op. An occupied bed with no matching
    /// active visit (a transient inconsistency from a crashed tick) is
    /// released anyway, converging the state.
    pub fn release_bed(
        &mut self,
        bed_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError> {
        let bed = self.beds.require(bed_id)?;
        if bed.status() == BedStatus::Available {
            return Ok(None);
        }

        let occupant_visit = self
            .visits
            .iter()
            .find(|v| v.is_active() && v.bed_id() == Some(bed_id))
            .map(|v| v.id());

        if let Some(visit_id) = occupant_visit {
            // discharge_visit releases the bed as part of the same operation
            self.discharge_visit(visit_id, at)?;
            Ok(Some(visit_id))
        } else {
            self.beds.require_mut(bed_id)?.release()?;
            Ok(None)
        }
    }

    /// Insert a claim, enforcing at most one claim per visit
    pub fn insert_claim(&mut self, claim: InsuranceClaim) -> Result<(), StoreError> {
        let visit_id = claim.visit_id();
        if self.claimed_visits.contains(&visit_id) {
            return Err(StoreError::ClaimAlreadyExists { visit_id });
        }
        self.insurance_claims.insert(claim)?;
        self.claimed_visits.insert(visit_id);
        Ok(())
    }

    pub fn has_claim_for_visit(&self, visit_id: Uuid) -> bool {
        self.claimed_visits.contains(&visit_id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn active_visits(&self) -> impl Iterator<Item = &Visit> {
        self.visits.iter().filter(|v| v.is_active())
    }

    pub fn active_visit_count(&self) -> usize {
        self.active_visits().count()
    }

    /// The active visit occupying a bed, if any
    pub fn active_visit_for_bed(&self, bed_id: Uuid) -> Option<&Visit> {
        self.visits
            .iter()
            .find(|v| v.is_active() && v.bed_id() == Some(bed_id))
    }

    /// Ids of available beds in one department, in id order
    pub fn available_beds_in_department(&self, department_id: Uuid) -> Vec<Uuid> {
        self.beds
            .iter()
            .filter(|b| b.department_id() == department_id && b.is_available())
            .map(|b| b.id())
            .collect()
    }

    /// Ids of patients with no active visit, in id order
    pub fn patients_without_active_visit(&self) -> Vec<Uuid> {
        let admitted: BTreeSet<Uuid> = self.active_visits().map(|v| v.patient_id()).collect();
        self.patients
            .iter()
            .map(|p| p.id)
            .filter(|id| !admitted.contains(id))
            .collect()
    }

    /// Discharged visits with no insurance claim yet, in id order
    pub fn unclaimed_discharged_visits(&self) -> Vec<Uuid> {
        self.visits
            .iter()
            .filter(|v| v.status() == VisitStatus::Discharged && !self.has_claim_for_visit(v.id()))
            .map(|v| v.id())
            .collect()
    }

    /// Non-terminal claims (Submitted or Pending), in id order
    pub fn open_claims(&self) -> Vec<Uuid> {
        self.insurance_claims
            .iter()
            .filter(|c| c.is_open())
            .map(|c| c.id())
            .collect()
    }

    /// The schedule row for a staff member, if one exists
    pub fn schedule_for_staff(&self, staff_id: Uuid) -> Option<&StaffSchedule> {
        self.staff_schedules.iter().find(|s| s.staff_id == staff_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnosis, DepartmentType, VitalSigns};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn seeded_store() -> (Store, Uuid, Uuid, Uuid) {
        let mut store = Store::new();
        let dept_id = Uuid::from_u128(10);
        let bed_id = Uuid::from_u128(20);
        let patient_id = Uuid::from_u128(30);

        store
            .departments_mut()
            .insert(Department::new(
                dept_id,
                "Cardiology",
                "CARD",
                DepartmentType::Cardiology,
            ))
            .unwrap();
        store
            .beds_mut()
            .insert(Bed::new(
                bed_id,
                "B-001".to_string(),
                "R-101".to_string(),
                dept_id,
            ))
            .unwrap();
        store
            .patients_mut()
            .insert(Patient::new(
                patient_id,
                "Test Patient".to_string(),
                "MRN-0001".to_string(),
            ))
            .unwrap();

        (store, dept_id, bed_id, patient_id)
    }

    fn make_visit(store: &mut Store, dept: Uuid, bed: Option<Uuid>, patient: Uuid) -> Visit {
        Visit::new(
            Uuid::from_u128(1000 + store.visits().len() as u128),
            patient,
            dept,
            bed,
            store.next_visit_number(),
            fixed_now() - chrono::Duration::days(2),
            "Chest pain".to_string(),
            Diagnosis {
                primary: "Angina".to_string(),
                secondary: None,
            },
            VitalSigns {
                temperature_c: 36.8,
                heart_rate: 80,
                respiratory_rate: 16,
                systolic_bp: 120,
                diastolic_bp: 80,
                oxygen_saturation: 98,
            },
            vec![],
        )
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let (mut store, dept_id, _, _) = seeded_store();
        let dup = Department::new(dept_id, "Cardiology", "CARD", DepartmentType::Cardiology);
        assert!(matches!(
            store.departments_mut().insert(dup),
            Err(StoreError::DuplicateId { .. })
        ));
        assert_eq!(store.departments().len(), 1);
    }

    #[test]
    fn test_admit_visit_occupies_bed() {
        let (mut store, dept, bed, patient) = seeded_store();
        let visit = make_visit(&mut store, dept, Some(bed), patient);
        let visit_id = visit.id();

        store.admit_visit(visit).unwrap();

        let bed_row = store.beds().get(bed).unwrap();
        assert_eq!(bed_row.status(), BedStatus::Occupied);
        assert_eq!(bed_row.patient_id(), Some(patient));
        assert_eq!(store.active_visit_for_bed(bed).unwrap().id(), visit_id);
    }

    #[test]
    fn test_admit_to_occupied_bed_writes_nothing() {
        let (mut store, dept, bed, patient) = seeded_store();
        let first = make_visit(&mut store, dept, Some(bed), patient);
        store.admit_visit(first).unwrap();

        let other_patient = Uuid::from_u128(31);
        store
            .patients_mut()
            .insert(Patient::new(
                other_patient,
                "Second Patient".to_string(),
                "MRN-0002".to_string(),
            ))
            .unwrap();
        let second = make_visit(&mut store, dept, Some(bed), other_patient);

        assert!(store.admit_visit(second).is_err());
        // Only the first visit exists; occupant unchanged
        assert_eq!(store.visits().len(), 1);
        assert_eq!(store.beds().get(bed).unwrap().patient_id(), Some(patient));
    }

    #[test]
    fn test_discharge_visit_frees_bed() {
        let (mut store, dept, bed, patient) = seeded_store();
        let visit = make_visit(&mut store, dept, Some(bed), patient);
        let visit_id = visit.id();
        store.admit_visit(visit).unwrap();

        store.discharge_visit(visit_id, fixed_now()).unwrap();

        assert_eq!(
            store.visits().get(visit_id).unwrap().status(),
            VisitStatus::Discharged
        );
        assert!(store.beds().get(bed).unwrap().is_available());
    }

    #[test]
    fn test_release_bed_discharges_occupant() {
        let (mut store, dept, bed, patient) = seeded_store();
        let visit = make_visit(&mut store, dept, Some(bed), patient);
        let visit_id = visit.id();
        store.admit_visit(visit).unwrap();

        let discharged = store.release_bed(bed, fixed_now()).unwrap();
        assert_eq!(discharged, Some(visit_id));

        let visit = store.visits().get(visit_id).unwrap();
        assert_eq!(visit.status(), VisitStatus::Discharged);
        assert!(visit.discharge_date().is_some());
        assert!(store.beds().get(bed).unwrap().is_available());
    }

    #[test]
    fn test_release_available_bed_is_noop() {
        let (mut store, _, bed, _) = seeded_store();
        assert_eq!(store.release_bed(bed, fixed_now()).unwrap(), None);
    }

    #[test]
    fn test_claim_uniqueness_enforced() {
        let (mut store, dept, _, patient) = seeded_store();
        let visit = make_visit(&mut store, dept, None, patient);
        let visit_id = visit.id();
        store.admit_visit(visit).unwrap();
        store.discharge_visit(visit_id, fixed_now()).unwrap();

        let claim = InsuranceClaim::new(
            Uuid::from_u128(500),
            visit_id,
            patient,
            "Aetna".to_string(),
            100_000,
            fixed_now(),
        );
        store.insert_claim(claim).unwrap();

        let second = InsuranceClaim::new(
            Uuid::from_u128(501),
            visit_id,
            patient,
            "Cigna".to_string(),
            200_000,
            fixed_now(),
        );
        assert_eq!(
            store.insert_claim(second),
            Err(StoreError::ClaimAlreadyExists { visit_id })
        );
        assert_eq!(store.insurance_claims().len(), 1);
        assert!(store.unclaimed_discharged_visits().is_empty());
    }

    #[test]
    fn test_visit_number_sequence_is_unique() {
        let mut store = Store::new();
        let a = store.next_visit_number();
        let b = store.next_visit_number();
        assert_ne!(a, b);
        assert_eq!(a, "V000001");
        assert_eq!(b, "V000002");
    }

    #[test]
    fn test_patients_without_active_visit() {
        let (mut store, dept, _, patient) = seeded_store();
        assert_eq!(store.patients_without_active_visit(), vec![patient]);

        let visit = make_visit(&mut store, dept, None, patient);
        let visit_id = visit.id();
        store.admit_visit(visit).unwrap();
        assert!(store.patients_without_active_visit().is_empty());

        store.discharge_visit(visit_id, fixed_now()).unwrap();
        assert_eq!(store.patients_without_active_visit(), vec![patient]);
    }
}
