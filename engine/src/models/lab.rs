//! Lab test catalog and workflow models
//!
//! The workflow per test is strictly forward-only, no retries, no
//! cancellation:
//!
//! ```text
//! Ordered → InProgress → Completed
//! ```
//!
//! Result classification happens at completion: a numeric result is abnormal
//! when it falls strictly outside the test type's reference range, and
//! critical when it breaches a `CriticalLabValue` threshold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Numeric band considered normal for a test type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    /// True when `value` lies strictly outside [low, high]
    pub fn is_abnormal(&self, value: f64) -> bool {
        value < self.low || value > self.high
    }
}

/// A catalog entry describing one orderable test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabTestType {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub category: String,
    /// None for qualitative (POSITIVE/NEGATIVE) tests
    pub reference_range: Option<ReferenceRange>,
    pub unit: Option<String>,
}

/// Critical thresholds for a high-acuity test type
///
/// Tighter than the reference range; a breach flags the result as critical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalLabValue {
    pub id: Uuid,
    pub test_type_id: Uuid,
    pub critical_low: Option<f64>,
    pub critical_high: Option<f64>,
    pub description: String,
}

impl CriticalLabValue {
    /// True when `value` breaches either critical threshold
    pub fn is_breached(&self, value: f64) -> bool {
        let below = self.critical_low.map(|low| value < low).unwrap_or(false);
        let above = self.critical_high.map(|high| value > high).unwrap_or(false);
        below || above
    }
}

/// Workflow status of a lab test
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LabTestStatus {
    Ordered,
    InProgress,
    Completed,
}

/// Qualitative outcome for tests without a numeric range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualitativeResult {
    Positive,
    Negative,
}

/// A finalized test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabResult {
    Numeric { value: f64, unit: Option<String> },
    Qualitative(QualitativeResult),
}

/// Errors that can occur during lab test transitions
#[derive(Debug, Error, PartialEq)]
pub enum LabError {
    #[error("Invalid lab transition for test {test_id}: {from:?} → {to:?}")]
    InvalidTransition {
        test_id: Uuid,
        from: LabTestStatus,
        to: LabTestStatus,
    },
}

/// A single ordered lab test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabTest {
    id: Uuid,
    patient_id: Uuid,
    visit_id: Uuid,
    test_type_id: Uuid,
    ordered_by_staff_id: Uuid,
    status: LabTestStatus,
    ordered_at: DateTime<Utc>,
    specimen_collected_at: Option<DateTime<Utc>>,
    result_received_at: Option<DateTime<Utc>>,
    result: Option<LabResult>,
    is_abnormal: bool,
    is_critical: bool,
    turnaround_time_minutes: Option<i64>,
}

impl LabTest {
    /// Create a newly ordered test
    pub fn new(
        id: Uuid,
        patient_id: Uuid,
        visit_id: Uuid,
        test_type_id: Uuid,
        ordered_by_staff_id: Uuid,
        ordered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            patient_id,
            visit_id,
            test_type_id,
            ordered_by_staff_id,
            status: LabTestStatus::Ordered,
            ordered_at,
            specimen_collected_at: None,
            result_received_at: None,
            result: None,
            is_abnormal: false,
            is_critical: false,
            turnaround_time_minutes: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn patient_id(&self) -> Uuid {
        self.patient_id
    }

    pub fn visit_id(&self) -> Uuid {
        self.visit_id
    }

    pub fn test_type_id(&self) -> Uuid {
        self.test_type_id
    }

    pub fn ordered_by_staff_id(&self) -> Uuid {
        self.ordered_by_staff_id
    }

    pub fn status(&self) -> LabTestStatus {
        self.status
    }

    pub fn ordered_at(&self) -> DateTime<Utc> {
        self.ordered_at
    }

    pub fn specimen_collected_at(&self) -> Option<DateTime<Utc>> {
        self.specimen_collected_at
    }

    pub fn result_received_at(&self) -> Option<DateTime<Utc>> {
        self.result_received_at
    }

    pub fn result(&self) -> Option<&LabResult> {
        self.result.as_ref()
    }

    pub fn is_abnormal(&self) -> bool {
        self.is_abnormal
    }

    pub fn is_critical(&self) -> bool {
        self.is_critical
    }

    pub fn turnaround_time_minutes(&self) -> Option<i64> {
        self.turnaround_time_minutes
    }

    pub fn is_completed(&self) -> bool {
        self.status == LabTestStatus::Completed
    }

    /// Transition Ordered → InProgress, stamping specimen collection
    pub fn collect_specimen(&mut self, at: DateTime<Utc>) -> Result<(), LabError> {
        if self.status != LabTestStatus::Ordered {
            return Err(LabError::InvalidTransition {
                test_id: self.id,
                from: self.status,
                to: LabTestStatus::InProgress,
            });
        }
        self.status = LabTestStatus::InProgress;
        self.specimen_collected_at = Some(at);
        Ok(())
    }

    /// Transition InProgress → Completed with a classified result
    ///
    /// Stamps `result_received_at` and derives turnaround minutes from
    /// `ordered_at`. Once completed, no further mutation occurs.
    pub fn complete(
        &mut self,
        at: DateTime<Utc>,
        result: LabResult,
        is_abnormal: bool,
        is_critical: bool,
    ) -> Result<(), LabError> {
        if self.status != LabTestStatus::InProgress {
            return Err(LabError::InvalidTransition {
                test_id: self.id,
                from: self.status,
                to: LabTestStatus::Completed,
            });
        }
        self.status = LabTestStatus::Completed;
        self.result_received_at = Some(at);
        self.result = Some(result);
        self.is_abnormal = is_abnormal;
        self.is_critical = is_critical;
        self.turnaround_time_minutes = Some((at - self.ordered_at).num_minutes().max(0));
        Ok(())
    }
}
