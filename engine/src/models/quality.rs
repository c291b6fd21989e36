//! Quality, safety, and compliance models
//!
//! Catalog rows (indicators, accreditations, compliance areas, risk
//! assessments, initiatives, education materials) are seeded once.
//! Measurements, surveys, and education logs are append-only time series.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unit a quality indicator is measured in
///
/// Determines the bounds applied when sampling measurements around the
/// indicator target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorUnit {
    /// 0..=100
    Percent,
    /// 0.0..=5.0
    ScoreOutOfFive,
    /// Non-negative raw count
    CountPerThousand,
}

/// A tracked quality indicator with a target value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIndicator {
    pub id: Uuid,
    pub name: String,
    pub target_value: f64,
    pub unit: IndicatorUnit,
}

/// One observation of a quality indicator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMeasurement {
    pub id: Uuid,
    pub indicator_id: Uuid,
    pub value: f64,
    pub measured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccreditationStatus {
    Accredited,
    ReaccreditationDue,
}

/// An accreditation held by the hospital
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accreditation {
    pub id: Uuid,
    pub body: String,
    pub program: String,
    pub status: AccreditationStatus,
    pub last_survey: NaiveDate,
    pub next_survey: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    Compliant,
    ActionRequired,
}

/// A monitored regulatory compliance area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceArea {
    pub id: Uuid,
    pub name: String,
    pub status: ComplianceStatus,
    pub last_reviewed: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

/// A standing risk assessment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub id: Uuid,
    pub area: String,
    pub severity: RiskSeverity,
    pub likelihood: RiskSeverity,
    pub mitigation: String,
    pub assessed_at: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitiativeStatus {
    Planned,
    InProgress,
    Completed,
}

/// A quality improvement initiative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityImprovementInitiative {
    pub id: Uuid,
    pub title: String,
    pub status: InitiativeStatus,
    pub started_on: NaiveDate,
}

/// Patient education material in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationMaterial {
    pub id: Uuid,
    pub title: String,
    pub topic: String,
    pub format: String,
}

/// A patient satisfaction survey tied to a visit
///
/// Ratings are bounded to 1..=5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSurvey {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub patient_id: Uuid,
    pub overall_rating: u8,
    pub care_rating: u8,
    pub communication_rating: u8,
    pub completed_at: DateTime<Utc>,
}

/// A record of education material provided during a visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientEducationLog {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub patient_id: Uuid,
    pub material_id: Uuid,
    pub provided_at: DateTime<Utc>,
}
