//! Patient model
//!
//! Patients are a pre-existing population: the engine references them but
//! never creates or mutates them. Hosts (server, tests) load their own
//! roster into the store before the first tick.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient known to the hospital
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub medical_record_number: String,
}

impl Patient {
    pub fn new(id: Uuid, name: String, medical_record_number: String) -> Self {
        Self {
            id,
            name,
            medical_record_number,
        }
    }
}
