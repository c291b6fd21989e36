//! Domain models for the hospital operational-state simulation
//!
//! Entities mirror the tables of the shared relational store:
//! - Reference/catalog rows (departments, lab test catalog, quality catalog)
//! - Resource pools (beds, staff)
//! - Workflow rows with forward-only state machines (visits, lab tests,
//!   insurance claims)
//! - Append-only quality/safety time series
//!
//! CRITICAL: All money values are i64 (cents)

pub mod bed;
pub mod billing;
pub mod department;
pub mod lab;
pub mod patient;
pub mod quality;
pub mod staff;
pub mod visit;

pub use bed::{Bed, BedError, BedStatus};
pub use billing::{
    BillingStatus, BillingTransaction, ChargeType, ClaimDenial, ClaimError, ClaimStatus,
    DenialReason, InsuranceClaim,
};
pub use department::{Department, DepartmentType};
pub use lab::{
    CriticalLabValue, LabError, LabResult, LabTest, LabTestStatus, LabTestType,
    QualitativeResult, ReferenceRange,
};
pub use patient::Patient;
pub use quality::{
    Accreditation, AccreditationStatus, ComplianceArea, ComplianceStatus, EducationMaterial,
    IndicatorUnit, InitiativeStatus, PatientEducationLog, PatientSurvey, QualityImprovementInitiative,
    QualityIndicator, QualityMeasurement, RiskAssessment, RiskSeverity,
};
pub use staff::{Staff, StaffRole, StaffSchedule};
pub use visit::{Diagnosis, Visit, VisitError, VisitStatus, VitalSigns};
