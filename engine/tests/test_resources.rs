//! Integration tests for the resource pool manager
//!
//! The key scenario: a bed released by the pool manager while an active
//! visit occupies it must leave that visit discharged, with a discharge
//! date, within the same tick.

use chrono::{DateTime, TimeZone, Utc};
use hospital_simulator_core::models::Patient;
use hospital_simulator_core::{
    resources, seeder, BedPoolConfig, BedStatus, RngManager, Store, VisitStatus,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

fn store_with_occupied_beds(rng: &mut RngManager) -> Store {
    let mut store = Store::new();
    seeder::ensure_reference_data(&mut store, rng, fixed_now());
    resources::run(&mut store, &BedPoolConfig::default(), rng, fixed_now()).unwrap();
    for i in 0..50 {
        store
            .patients_mut()
            .insert(Patient::new(
                rng.uuid(),
                format!("Patient {}", i),
                format!("MRN-{:04}", i),
            ))
            .unwrap();
    }
    hospital_simulator_core::visits::run(
        &mut store,
        &hospital_simulator_core::VisitConfig::default(),
        rng,
        fixed_now(),
    );
    store
}

#[test]
fn test_release_discharges_occupant_same_tick() {
    let mut rng = RngManager::new(101);
    let mut store = store_with_occupied_beds(&mut rng);

    let occupied: Vec<_> = store
        .beds()
        .iter()
        .filter(|b| b.status() == BedStatus::Occupied)
        .map(|b| b.id())
        .collect();
    assert!(!occupied.is_empty(), "setup produced no occupied beds");

    let occupants: Vec<_> = occupied
        .iter()
        .map(|bed_id| store.active_visit_for_bed(*bed_id).unwrap().id())
        .collect();

    // Force every occupied bed to release this tick
    let config = BedPoolConfig {
        release_probability: 1.0,
        ..BedPoolConfig::default()
    };
    let report = resources::run(&mut store, &config, &mut rng, fixed_now()).unwrap();

    assert_eq!(report.beds_released, occupied.len());
    assert_eq!(report.visits_force_discharged, occupied.len());

    for (bed_id, visit_id) in occupied.iter().zip(&occupants) {
        assert!(store.beds().get(*bed_id).unwrap().is_available());
        let visit = store.visits().get(*visit_id).unwrap();
        assert_eq!(visit.status(), VisitStatus::Discharged);
        assert!(visit.discharge_date().is_some());
    }
}

#[test]
fn test_zero_probability_releases_nothing() {
    let mut rng = RngManager::new(101);
    let mut store = store_with_occupied_beds(&mut rng);

    let occupied_before = store
        .beds()
        .iter()
        .filter(|b| b.status() == BedStatus::Occupied)
        .count();

    let config = BedPoolConfig {
        release_probability: 0.0,
        ..BedPoolConfig::default()
    };
    let report = resources::run(&mut store, &config, &mut rng, fixed_now()).unwrap();

    assert_eq!(report.beds_released, 0);
    assert_eq!(report.visits_force_discharged, 0);
    let occupied_after = store
        .beds()
        .iter()
        .filter(|b| b.status() == BedStatus::Occupied)
        .count();
    assert_eq!(occupied_before, occupied_after);
}

#[test]
fn test_resize_preserves_visit_consistency() {
    let mut rng = RngManager::new(103);
    let mut store = store_with_occupied_beds(&mut rng);

    // Shrink the pool: every occupant must be discharged, not orphaned
    let smaller = BedPoolConfig {
        bed_count: 20,
        release_probability: 0.0,
        ..BedPoolConfig::default()
    };
    resources::run(&mut store, &smaller, &mut rng, fixed_now()).unwrap();

    assert_eq!(store.beds().len(), 20);
    for visit in store.visits().iter().filter(|v| v.is_active()) {
        if let Some(bed_id) = visit.bed_id() {
            assert!(
                store.beds().get(bed_id).is_some(),
                "active visit references a deleted bed"
            );
        }
    }
    for bed in store.beds().iter() {
        assert!(bed.is_available(), "recreated bed should start available");
    }
}
