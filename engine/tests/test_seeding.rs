//! Integration tests for reference seeding through the orchestrator
//!
//! Covers the empty-store bootstrap: one tick must bring every catalog
//! table to its target minimum count, and a second tick must not duplicate
//! anything.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hospital_simulator_core::{seeder, Orchestrator, SimulationConfig, Store};

fn fixed_base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

fn catalog_counts(store: &Store) -> Vec<usize> {
    vec![
        store.departments().len(),
        store.beds().len(),
        store.staff().len(),
        store.lab_test_types().len(),
        store.critical_lab_values().len(),
        store.quality_indicators().len(),
        store.accreditations().len(),
        store.compliance_areas().len(),
        store.risk_assessments().len(),
        store.improvement_initiatives().len(),
        store.education_materials().len(),
    ]
}

#[test]
fn test_first_tick_reaches_target_counts() {
    let config = SimulationConfig::default();
    let mut orchestrator = Orchestrator::new(config.clone()).unwrap();
    let mut store = Store::new();

    orchestrator.run_tick_at(&mut store, fixed_base()).unwrap();

    assert_eq!(store.departments().len(), seeder::department_catalog_len());
    assert_eq!(store.lab_test_types().len(), seeder::lab_test_catalog_len());
    assert_eq!(
        store.quality_indicators().len(),
        seeder::quality_indicator_catalog_len()
    );
    assert_eq!(store.beds().len(), config.bed_pool.bed_count);
    assert_eq!(store.staff().len(), config.bed_pool.staff_count);
    assert!(store.critical_lab_values().len() >= 1);
    assert!(store.accreditations().len() >= 1);
}

#[test]
fn test_second_tick_does_not_duplicate_catalogs() {
    let mut orchestrator = Orchestrator::new(SimulationConfig::default()).unwrap();
    let mut store = Store::new();

    orchestrator.run_tick_at(&mut store, fixed_base()).unwrap();
    let first = catalog_counts(&store);

    let report = orchestrator
        .run_tick_at(&mut store, fixed_base() + Duration::hours(1))
        .unwrap();
    assert_eq!(report.seeding.rows_inserted, 0);
    assert_eq!(catalog_counts(&store), first);
}

#[test]
fn test_deleted_catalog_rows_are_replaced() {
    let mut orchestrator = Orchestrator::new(SimulationConfig::default()).unwrap();
    let mut store = Store::new();
    orchestrator.run_tick_at(&mut store, fixed_base()).unwrap();

    let victim = store.quality_indicators().ids()[0];
    store.quality_indicators_mut().remove(victim);

    let report = orchestrator
        .run_tick_at(&mut store, fixed_base() + Duration::hours(1))
        .unwrap();
    assert!(report.seeding.rows_inserted >= 1);
    assert_eq!(
        store.quality_indicators().len(),
        seeder::quality_indicator_catalog_len()
    );
}
