//! Patient visit model
//!
//! A visit is the central workflow row: admission binds a patient to a
//! department (and usually a bed), discharge ends the stay. The lifecycle is
//! forward-only:
//!
//! ```text
//! Active → Discharged
//! ```
//!
//! Discharged rows are retained as history; the generator reconciles the
//! active population instead of rewriting the table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Visit lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitStatus {
    Active,
    Discharged,
}

/// Errors that can occur during visit state transitions
#[derive(Debug, Error, PartialEq)]
pub enum VisitError {
    #[error("Visit {visit_id} is already discharged")]
    AlreadyDischarged { visit_id: Uuid },

    #[error("Discharge date {discharge} precedes admission date {admission}")]
    DischargeBeforeAdmission {
        admission: DateTime<Utc>,
        discharge: DateTime<Utc>,
    },
}

/// Primary and optional secondary diagnosis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub primary: String,
    pub secondary: Option<String>,
}

/// A single set of vital signs captured at admission
///
/// Values are synthesized within physiologically plausible bounds; the
/// generator is the only writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub temperature_c: f64,
    pub heart_rate: u32,
    pub respiratory_rate: u32,
    pub systolic_bp: u32,
    pub diastolic_bp: u32,
    pub oxygen_saturation: u32,
}

/// A patient visit (admission through discharge)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    id: Uuid,
    patient_id: Uuid,
    department_id: Uuid,
    bed_id: Option<Uuid>,
    /// Unique human-readable visit number (store-owned sequence)
    visit_number: String,
    admission_date: DateTime<Utc>,
    discharge_date: Option<DateTime<Utc>>,
    status: VisitStatus,
    chief_complaint: String,
    diagnosis: Diagnosis,
    vital_signs: VitalSigns,
    medications: Vec<String>,
}

impl Visit {
    /// Create a new active visit
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        patient_id: Uuid,
        department_id: Uuid,
        bed_id: Option<Uuid>,
        visit_number: String,
        admission_date: DateTime<Utc>,
        chief_complaint: String,
        diagnosis: Diagnosis,
        vital_signs: VitalSigns,
        medications: Vec<String>,
    ) -> Self {
        Self {
            id,
            patient_id,
            department_id,
            bed_id,
            visit_number,
            admission_date,
            discharge_date: None,
            status: VisitStatus::Active,
            chief_complaint,
            diagnosis,
            vital_signs,
            medications,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn patient_id(&self) -> Uuid {
        self.patient_id
    }

    pub fn department_id(&self) -> Uuid {
        self.department_id
    }

    pub fn bed_id(&self) -> Option<Uuid> {
        self.bed_id
    }

    pub fn visit_number(&self) -> &str {
        &self.visit_number
    }

    pub fn admission_date(&self) -> DateTime<Utc> {
        self.admission_date
    }

    pub fn discharge_date(&self) -> Option<DateTime<Utc>> {
        self.discharge_date
    }

    pub fn status(&self) -> VisitStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == VisitStatus::Active
    }

    pub fn chief_complaint(&self) -> &str {
        &self.chief_complaint
    }

    pub fn diagnosis(&self) -> &Diagnosis {
        &self.diagnosis
    }

    pub fn vital_signs(&self) -> &VitalSigns {
        &self.vital_signs
    }

    pub fn medications(&self) -> &[String] {
        &self.medications
    }

    /// Transition Active → Discharged
    ///
    /// Fails if already discharged or if the discharge date precedes
    /// admission. Once discharged, a visit is never mutated again.
    pub fn discharge(&mut self, discharge_date: DateTime<Utc>) -> Result<(), VisitError> {
        if self.status == VisitStatus::Discharged {
            return Err(VisitError::AlreadyDischarged { visit_id: self.id });
        }
        if discharge_date < self.admission_date {
            return Err(VisitError::DischargeBeforeAdmission {
                admission: self.admission_date,
                discharge: discharge_date,
            });
        }
        self.status = VisitStatus::Discharged;
        self.discharge_date = Some(discharge_date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_visit() -> Visit {
        Visit::new(
            Uuid::from_u128(1),
            Uuid::from_u128(2),
            Uuid::from_u128(3),
            None,
            "V000001".to_string(),
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
            "Chest pain".to_string(),
            Diagnosis {
                primary: "Unstable angina".to_string(),
                secondary: None,
            },
            VitalSigns {
                temperature_c: 37.1,
                heart_rate: 88,
                respiratory_rate: 17,
                systolic_bp: 131,
                diastolic_bp: 84,
                oxygen_saturation: 97,
            },
            vec!["Aspirin".to_string()],
        )
    }

    #[test]
    fn test_new_visit_is_active() {
        let visit = test_visit();
        assert_eq!(visit.status(), VisitStatus::Active);
        assert!(visit.discharge_date().is_none());
    }

    #[test]
    fn test_discharge_sets_date() {
        let mut visit = test_visit();
        let when = Utc.with_ymd_and_hms(2026, 3, 3, 15, 30, 0).unwrap();

        visit.discharge(when).unwrap();
        assert_eq!(visit.status(), VisitStatus::Discharged);
        assert_eq!(visit.discharge_date(), Some(when));
    }

    #[test]
    fn test_double_discharge_rejected() {
        let mut visit = test_visit();
        let when = Utc.with_ymd_and_hms(2026, 3, 3, 15, 30, 0).unwrap();

        visit.discharge(when).unwrap();
        assert!(matches!(
            visit.discharge(when),
            Err(VisitError::AlreadyDischarged { .. })
        ));
    }

    #[test]
    fn test_discharge_before_admission_rejected() {
        let mut visit = test_visit();
        let before = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        assert!(matches!(
            visit.discharge(before),
            Err(VisitError::DischargeBeforeAdmission { .. })
        ));
    }
}
