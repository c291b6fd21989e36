//! Resource pool manager (beds and staff)
//!
//! Ensures fixed-size pools exist, then runs the per-tick bed release pass.
//!
//! # Bed pool
//!
//! On first run, exactly `bed_count` beds are created, distributed
//! round-robin across departments. A pool whose size no longer matches the
//! configured count is deleted and recreated (destructive resize); occupied
//! beds are released first so no active visit is left pointing at a deleted
//! bed.
//!
//! # Release pass
//!
//! Each tick, every occupied bed is released with probability
//! `release_probability`. Releasing force-discharges the occupying visit in
//! the same store operation, so the bed/visit invariant holds on every
//! observable state. Beds become occupied only through visit admission.
//!
//! # Staff pool
//!
//! Fixed-size deficit insert; staff rows themselves never change per tick,
//! only their schedules do (see the scheduler).

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::BedPoolConfig;
use crate::models::{Bed, BedStatus, Staff, StaffRole};
use crate::rng::RngManager;
use crate::store::{Store, StoreError};

/// Errors that can abort the pool step
#[derive(Debug, Error, PartialEq)]
pub enum ResourceError {
    #[error("No departments exist; bed pool cannot be created")]
    NoDepartments,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of one resource pool pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolReport {
    pub beds_created: usize,
    pub staff_created: usize,
    pub beds_released: usize,
    pub visits_force_discharged: usize,
}

const FIRST_NAMES: &[&str] = &[
    "Ava", "Noah", "Mia", "Liam", "Zoe", "Ethan", "Ruth", "Omar", "Lena", "Marcus", "Priya",
    "Diego", "Hannah", "Felix", "Nora", "Samuel",
];

const LAST_NAMES: &[&str] = &[
    "Okafor", "Lindqvist", "Marsh", "Tanaka", "Alvarez", "Whitfield", "Novak", "Osei", "Reyes",
    "Kaplan", "Bergström", "Dubois",
];

/// Role mix applied cyclically when creating staff (6:3:1)
const ROLE_PATTERN: &[StaffRole] = &[
    StaffRole::Nurse,
    StaffRole::Nurse,
    StaffRole::Physician,
    StaffRole::Nurse,
    StaffRole::Receptionist,
    StaffRole::Nurse,
    StaffRole::Physician,
    StaffRole::Nurse,
    StaffRole::Nurse,
    StaffRole::Physician,
];

/// Ensure pools exist and run the bed release pass
pub fn run(
    store: &mut Store,
    config: &BedPoolConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> Result<PoolReport, ResourceError> {
    let mut report = PoolReport::default();

    report.beds_created = ensure_beds(store, config, rng, now)?;
    report.staff_created = ensure_staff(store, config, rng)?;

    let (released, discharged) = release_pass(store, config, rng, now);
    report.beds_released = released;
    report.visits_force_discharged = discharged;

    Ok(report)
}

/// Ensure exactly `bed_count` beds exist, round-robin across departments
fn ensure_beds(
    store: &mut Store,
    config: &BedPoolConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> Result<usize, ResourceError> {
    if store.beds().len() == config.bed_count {
        return Ok(0);
    }
    if store.departments().is_empty() {
        return Err(ResourceError::NoDepartments);
    }

    // Destructive resize: release occupants, drop the pool, recreate
    if !store.beds().is_empty() {
        debug!(
            existing = store.beds().len(),
            desired = config.bed_count,
            "resizing bed pool"
        );
        let occupied: Vec<Uuid> = store
            .beds()
            .iter()
            .filter(|b| b.status() == BedStatus::Occupied)
            .map(|b| b.id())
            .collect();
        for bed_id in occupied {
            store.release_bed(bed_id, now)?;
        }
        store.beds_mut().clear();
    }

    let department_ids = store.departments().ids();
    let mut created = 0;
    for i in 0..config.bed_count {
        let department_id = department_ids[i % department_ids.len()];
        let bed = Bed::new(
            rng.uuid(),
            format!("B-{:03}", i + 1),
            format!("R-{:03}", 101 + i / 2),
            department_id,
        );
        store.beds_mut().insert(bed)?;
        created += 1;
    }
    Ok(created)
}

/// Ensure the staff pool holds `staff_count` members
fn ensure_staff(
    store: &mut Store,
    config: &BedPoolConfig,
    rng: &mut RngManager,
) -> Result<usize, ResourceError> {
    let current = store.staff().len();
    if current >= config.staff_count {
        return Ok(0);
    }

    let mut created = 0;
    for i in current..config.staff_count {
        let first = rng.pick(FIRST_NAMES).expect("first name list is non-empty");
        let last = rng.pick(LAST_NAMES).expect("last name list is non-empty");
        let role = ROLE_PATTERN[i % ROLE_PATTERN.len()];
        let staff = Staff::new(rng.uuid(), format!("{} {}", first, last), role);
        store.staff_mut().insert(staff)?;
        created += 1;
    }
    Ok(created)
}

/// Release each occupied bed with the configured probability
///
/// Per-bed failures are logged and the pass continues.
fn release_pass(
    store: &mut Store,
    config: &BedPoolConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> (usize, usize) {
    let occupied: Vec<Uuid> = store
        .beds()
        .iter()
        .filter(|b| b.status() == BedStatus::Occupied)
        .map(|b| b.id())
        .collect();

    let mut released = 0;
    let mut discharged = 0;
    for bed_id in occupied {
        if !rng.chance(config.release_probability) {
            continue;
        }
        match store.release_bed(bed_id, now) {
            Ok(visit) => {
                released += 1;
                if visit.is_some() {
                    discharged += 1;
                }
            }
            Err(err) => warn!(%bed_id, %err, "bed release failed"),
        }
    }
    (released, discharged)
}
