//! Staff and schedule models
//!
//! The staff pool is fixed-size after creation; only schedules change from
//! tick to tick. Each staff member has at most one schedule row, which the
//! scheduler upserts or removes in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff role classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    Nurse,
    Physician,
    Receptionist,
}

/// A staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub name: String,
    pub role: StaffRole,
}

impl Staff {
    pub fn new(id: Uuid, name: String, role: StaffRole) -> Self {
        Self { id, name, role }
    }
}

/// A shift assignment for one staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffSchedule {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub department_id: Uuid,
    pub shift_start: DateTime<Utc>,
    pub shift_end: DateTime<Utc>,
    /// Role carried onto the schedule row for dashboard queries
    pub role: StaffRole,
}
