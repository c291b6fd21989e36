//! Hospital Operational-State Simulation Engine
//!
//! Advances the coupled per-entity state machines behind a hospital
//! analytics dashboard by one probabilistic step per invocation: bed
//! occupancy, patient visits, lab workflow, claim adjudication, staff
//! scheduling, and quality/safety time series, all persisted in a shared
//! relational store.
//!
//! # Architecture
//!
//! - **models**: domain entities (departments, beds, visits, labs, claims, …)
//! - **store**: the shared relational store + snapshot persistence
//! - **config**: scenario-distribution configuration per component
//! - **seeder**: idempotent reference/catalog seeding
//! - **resources**: bed and staff pool management
//! - **visits**: visit lifecycle reconciliation
//! - **labs**: lab test workflow engine
//! - **billing**: billing and claims pipeline
//! - **schedule**: staff scheduler
//! - **quality**: quality and safety generator
//! - **orchestrator**: tick sequencing
//! - **rng**: deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. All randomness is deterministic (seeded RNG, including entity ids)
//! 3. A bed is Occupied iff exactly one active visit references it
//! 4. At most one insurance claim exists per visit
//! 5. Lab tests and claims only ever move forward through their state
//!    machines

// Module declarations
pub mod billing;
pub mod config;
pub mod labs;
pub mod models;
pub mod orchestrator;
pub mod quality;
pub mod resources;
pub mod rng;
pub mod schedule;
pub mod seeder;
pub mod store;
pub mod visits;

// Re-exports for convenience
pub use billing::BillingReport;
pub use config::{
    BedPoolConfig, ClaimsConfig, LabConfig, QualityConfig, ScheduleConfig, SimulationConfig,
    VisitConfig,
};
pub use labs::LabReport;
pub use models::{
    Bed, BedStatus, BillingTransaction, ClaimDenial, ClaimStatus, Department, DepartmentType,
    InsuranceClaim, LabResult, LabTest, LabTestStatus, LabTestType, Patient, Staff, StaffRole,
    StaffSchedule, Visit, VisitStatus,
};
pub use orchestrator::{EngineError, Orchestrator, TickReport};
pub use quality::QualityReport;
pub use resources::PoolReport;
pub use rng::RngManager;
pub use schedule::ScheduleReport;
pub use seeder::SeedReport;
pub use store::{snapshot, Store, StoreError};
pub use visits::VisitReport;
