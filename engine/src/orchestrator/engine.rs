//! Orchestrator engine
//!
//! One externally triggered invocation = one tick:
//!
//! ```text
//! 1. Reference seeder        (catalog tables up to target counts)
//! 2. Resource pool manager   (bed/staff pools + bed release pass)
//! 3. Visit lifecycle         (discharge pass + admission pass)
//! 4. Lab workflow            ┐
//! 5. Billing & claims        │ mutually independent; order among
//! 6. Staff scheduler         │ these four is not significant
//! 7. Quality & safety        ┘
//! ```
//!
//! The engine is stateless between ticks apart from its RNG stream; all
//! entity state lives in the store passed to each call.
//!
//! # Error handling
//!
//! Sub-step failures are logged and the affected step is skipped; steps
//! that depend on it are skipped too (the visit generator depends on the
//! pool manager). Completed steps' writes are never rolled back. Only a
//! failure escaping every inner handler surfaces as an `EngineError`.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use crate::billing::{self, BillingReport};
use crate::config::SimulationConfig;
use crate::labs::{self, LabReport};
use crate::quality::{self, QualityReport};
use crate::resources::{self, PoolReport};
use crate::rng::RngManager;
use crate::schedule::{self, ScheduleReport};
use crate::seeder::{self, SeedReport};
use crate::store::{Store, StoreError};
use crate::visits::{self, VisitReport};

/// Top-level engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Aggregate outcome of one tick
///
/// `None` for a step report means the step was skipped; the step name is
/// then listed in `skipped_steps`.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub executed_at: DateTime<Utc>,
    pub seeding: SeedReport,
    pub pool: Option<PoolReport>,
    pub visits: Option<VisitReport>,
    pub labs: LabReport,
    pub billing: BillingReport,
    pub schedule: ScheduleReport,
    pub quality: QualityReport,
    pub skipped_steps: Vec<&'static str>,
}

/// Drives one simulation tick against a shared store
///
/// # Determinism
///
/// All randomness (including entity ids) flows through the seeded RNG.
/// Same seed + same config + same injected clock = identical store
/// contents, row for row.
pub struct Orchestrator {
    config: SimulationConfig,
    rng: RngManager,
}

impl Orchestrator {
    /// Create an orchestrator, validating the configuration
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        let rng = RngManager::new(config.rng_seed);
        Ok(Self { config, rng })
    }

    /// Restore an orchestrator mid-stream from a persisted RNG state
    pub fn with_rng_state(config: SimulationConfig, rng_state: u64) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        let rng = RngManager::new(rng_state);
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current RNG state (persisted alongside store snapshots)
    pub fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }

    /// Execute one tick stamped with the current wall clock
    pub fn run_tick(&mut self, store: &mut Store) -> Result<TickReport, EngineError> {
        self.run_tick_at(store, Utc::now())
    }

    /// Execute one tick at an injected clock (tests drive this directly)
    pub fn run_tick_at(
        &mut self,
        store: &mut Store,
        now: DateTime<Utc>,
    ) -> Result<TickReport, EngineError> {
        let mut skipped_steps = Vec::new();

        // STEP 1: REFERENCE SEEDING
        // Per-table failures are handled inside the seeder
        let seeding = seeder::ensure_reference_data(store, &mut self.rng, now);

        // STEP 2: RESOURCE POOLS
        let pool = match resources::run(store, &self.config.bed_pool, &mut self.rng, now) {
            Ok(report) => Some(report),
            Err(err) => {
                error!(%err, "resource pool step failed");
                skipped_steps.push("resource_pool");
                None
            }
        };

        // STEP 3: VISIT LIFECYCLE (depends on the pools)
        let visit_report = if pool.is_some() {
            Some(visits::run(store, &self.config.visits, &mut self.rng, now))
        } else {
            skipped_steps.push("visit_lifecycle");
            None
        };

        // STEPS 4-7: independent generators; each degrades per-record
        let labs = labs::run(store, &self.config.labs, &mut self.rng, now);
        let billing = billing::run(store, &self.config.claims, &mut self.rng, now);
        let schedule = schedule::run(store, &self.config.schedule, &mut self.rng, now);
        let quality = quality::run(store, &self.config.quality, &mut self.rng, now);

        let report = TickReport {
            executed_at: now,
            seeding,
            pool,
            visits: visit_report,
            labs,
            billing,
            schedule,
            quality,
            skipped_steps,
        };

        info!(
            seeded = report.seeding.rows_inserted,
            admitted = report.visits.as_ref().map(|v| v.admitted).unwrap_or(0),
            discharged = report.visits.as_ref().map(|v| v.discharged).unwrap_or(0),
            labs_ordered = report.labs.ordered,
            claims_created = report.billing.claims_created,
            scheduled = report.schedule.assigned,
            skipped = report.skipped_steps.len(),
            "tick completed"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("rng_seed", &self.config.rng_seed)
            .field("rng_state", &self.rng.get_state())
            .finish()
    }
}
