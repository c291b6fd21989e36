//! Bed model
//!
//! A bed belongs to exactly one department and is either AVAILABLE or
//! OCCUPIED. The store-level invariant is:
//!
//! `status = Occupied ⇔ exactly one ACTIVE visit references this bed`
//!
//! Bed state never changes in isolation: the store pairs `occupy` with visit
//! admission and `release` with occupant discharge in a single operation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Occupancy status of a bed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BedStatus {
    Available,
    Occupied,
}

/// Errors that can occur during bed state transitions
#[derive(Debug, Error, PartialEq)]
pub enum BedError {
    #[error("Bed {bed_id} is already occupied by patient {patient_id}")]
    AlreadyOccupied { bed_id: Uuid, patient_id: Uuid },

    #[error("Bed {bed_id} is already available")]
    AlreadyAvailable { bed_id: Uuid },
}

/// A physical bed in a department
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bed {
    id: Uuid,
    bed_number: String,
    room_number: String,
    department_id: Uuid,
    status: BedStatus,
    patient_id: Option<Uuid>,
}

impl Bed {
    /// Create a new available bed
    pub fn new(id: Uuid, bed_number: String, room_number: String, department_id: Uuid) -> Self {
        Self {
            id,
            bed_number,
            room_number,
            department_id,
            status: BedStatus::Available,
            patient_id: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bed_number(&self) -> &str {
        &self.bed_number
    }

    pub fn room_number(&self) -> &str {
        &self.room_number
    }

    pub fn department_id(&self) -> Uuid {
        self.department_id
    }

    pub fn status(&self) -> BedStatus {
        self.status
    }

    pub fn patient_id(&self) -> Option<Uuid> {
        self.patient_id
    }

    pub fn is_available(&self) -> bool {
        self.status == BedStatus::Available
    }

    /// Transition Available → Occupied, recording the patient
    ///
    /// Fails if the bed is already occupied; the current occupant is never
    /// silently replaced.
    pub fn occupy(&mut self, patient_id: Uuid) -> Result<(), BedError> {
        if let Some(current) = self.patient_id {
            return Err(BedError::AlreadyOccupied {
                bed_id: self.id,
                patient_id: current,
            });
        }
        self.status = BedStatus::Occupied;
        self.patient_id = Some(patient_id);
        Ok(())
    }

    /// Transition Occupied → Available, returning the former occupant
    pub fn release(&mut self) -> Result<Uuid, BedError> {
        match self.patient_id.take() {
            Some(patient_id) => {
                self.status = BedStatus::Available;
                Ok(patient_id)
            }
            None => Err(BedError::AlreadyAvailable { bed_id: self.id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bed() -> Bed {
        Bed::new(
            Uuid::from_u128(1),
            "B-001".to_string(),
            "R-101".to_string(),
            Uuid::from_u128(99),
        )
    }

    #[test]
    fn test_new_bed_is_available() {
        let bed = test_bed();
        assert_eq!(bed.status(), BedStatus::Available);
        assert!(bed.patient_id().is_none());
    }

    #[test]
    fn test_occupy_then_release_round_trip() {
        let mut bed = test_bed();
        let patient = Uuid::from_u128(7);

        bed.occupy(patient).unwrap();
        assert_eq!(bed.status(), BedStatus::Occupied);
        assert_eq!(bed.patient_id(), Some(patient));

        let released = bed.release().unwrap();
        assert_eq!(released, patient);
        assert_eq!(bed.status(), BedStatus::Available);
        assert!(bed.patient_id().is_none());
    }

    #[test]
    fn test_double_occupy_rejected() {
        let mut bed = test_bed();
        bed.occupy(Uuid::from_u128(7)).unwrap();

        let err = bed.occupy(Uuid::from_u128(8)).unwrap_err();
        assert!(matches!(err, BedError::AlreadyOccupied { .. }));
        // Original occupant unchanged
        assert_eq!(bed.patient_id(), Some(Uuid::from_u128(7)));
    }

    #[test]
    fn test_release_available_bed_rejected() {
        let mut bed = test_bed();
        assert!(matches!(
            bed.release(),
            Err(BedError::AlreadyAvailable { .. })
        ));
    }
}
