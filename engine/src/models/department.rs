//! Department model
//!
//! Departments are catalog rows: created once by the reference seeder and
//! immutable thereafter. Every bed, visit, and schedule row references one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clinical department classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepartmentType {
    Emergency,
    Cardiology,
    Pediatrics,
    Oncology,
    Orthopedics,
    GeneralMedicine,
    IntensiveCare,
    Surgery,
}

/// A hospital department
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    /// Short code used on wards and in billing (e.g. "ED", "CARD")
    pub code: String,
    pub department_type: DepartmentType,
}

impl Department {
    pub fn new(id: Uuid, name: &str, code: &str, department_type: DepartmentType) -> Self {
        Self {
            id,
            name: name.to_string(),
            code: code.to_string(),
            department_type,
        }
    }
}
