//! Simulation configuration
//!
//! Every probability, pool size, batch cap, and value range the generators
//! draw from lives here, one sub-struct per component. Defaults match the
//! rates the simulation was tuned with; tests override individual knobs to
//! force or suppress branches deterministically.
//!
//! Same `rng_seed` + same config + same injected clock ⇒ identical tick
//! outcomes, row for row.

use serde::{Deserialize, Serialize};

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// RNG seed for deterministic simulation (also seeds entity ids)
    pub rng_seed: u64,

    pub bed_pool: BedPoolConfig,
    pub visits: VisitConfig,
    pub labs: LabConfig,
    pub claims: ClaimsConfig,
    pub schedule: ScheduleConfig,
    pub quality: QualityConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rng_seed: 20_260_101,
            bed_pool: BedPoolConfig::default(),
            visits: VisitConfig::default(),
            labs: LabConfig::default(),
            claims: ClaimsConfig::default(),
            schedule: ScheduleConfig::default(),
            quality: QualityConfig::default(),
        }
    }
}

/// Bed and staff pool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedPoolConfig {
    /// Fixed bed pool size, distributed round-robin across departments
    pub bed_count: usize,

    /// Fixed staff pool size
    pub staff_count: usize,

    /// Per-tick probability that an occupied bed is released
    /// (force-discharging its occupant)
    pub release_probability: f64,
}

impl Default for BedPoolConfig {
    fn default() -> Self {
        Self {
            bed_count: 50,
            staff_count: 30,
            release_probability: 0.2,
        }
    }
}

/// Visit lifecycle parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitConfig {
    /// Active population the admission pass reconciles toward
    pub target_active_visits: usize,

    /// Per-tick probability that an active visit is discharged
    pub discharge_probability: f64,

    /// Admission date is sampled this many days back (inclusive range)
    pub admission_days_back: (i64, i64),
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            target_active_visits: 40,
            discharge_probability: 0.2,
            admission_days_back: (1, 14),
        }
    }
}

/// Lab workflow parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabConfig {
    /// Per-test per-tick probability of advancing one workflow step
    pub advance_probability: f64,

    /// Per-tick probability that one new test is ordered
    pub order_probability: f64,

    /// Results are drawn from [low, low + span_factor · (high − low)];
    /// values above 1.0 deliberately produce abnormal results
    pub result_span_factor: f64,

    /// Probability that a qualitative (no numeric range) result is POSITIVE
    pub positive_probability: f64,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            advance_probability: 0.3,
            order_probability: 0.4,
            result_span_factor: 1.5,
            positive_probability: 0.5,
        }
    }
}

/// Billing and adjudication parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsConfig {
    /// Max charge/claim creations per tick
    pub creation_batch_size: usize,

    /// Max claims advanced per adjudication pass
    pub adjudication_batch_size: usize,

    /// Per-claim per-tick probability of advancing one adjudication step
    pub advance_probability: f64,

    /// Probability a Pending claim resolves Approved (otherwise Denied)
    pub approval_probability: f64,

    /// Payout fraction of the claim total, sampled uniformly
    pub payout_fraction: (f64, f64),

    /// Charge amount bounds in cents
    pub charge_range_cents: (i64, i64),
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            creation_batch_size: 10,
            adjudication_batch_size: 20,
            advance_probability: 0.3,
            approval_probability: 0.85,
            payout_fraction: (0.8, 1.0),
            charge_range_cents: (50_000, 2_500_000),
        }
    }
}

/// Staff scheduling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Probability a staff member is scheduled this tick
    pub assignment_probability: f64,

    /// Shift length in hours, centered on the tick time
    pub shift_hours: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            assignment_probability: 0.8,
            shift_hours: 8,
        }
    }
}

/// Quality and safety generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Visits sampled per tick for survey/education appends
    pub visit_sample_size: usize,

    /// Per-sampled-visit probability of a patient survey
    pub survey_probability: f64,

    /// Per-sampled-visit probability of an education log entry
    pub education_probability: f64,

    /// Per-indicator probability of a new measurement
    pub measurement_probability: f64,

    /// Measurements are sampled at target × uniform[lo, hi], then bounded
    /// per indicator unit
    pub measurement_spread: (f64, f64),
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            visit_sample_size: 5,
            survey_probability: 0.3,
            education_probability: 0.3,
            measurement_probability: 0.2,
            measurement_spread: (0.9, 1.1),
        }
    }
}

impl SimulationConfig {
    /// Validate configuration before the first tick
    pub fn validate(&self) -> Result<(), String> {
        if self.bed_pool.bed_count == 0 {
            return Err("bed_count must be > 0".to_string());
        }
        if self.bed_pool.staff_count == 0 {
            return Err("staff_count must be > 0".to_string());
        }
        if self.visits.target_active_visits == 0 {
            return Err("target_active_visits must be > 0".to_string());
        }
        if self.claims.creation_batch_size == 0 || self.claims.adjudication_batch_size == 0 {
            return Err("claim batch sizes must be > 0".to_string());
        }

        let (days_lo, days_hi) = self.visits.admission_days_back;
        if days_lo < 0 || days_lo > days_hi {
            return Err("admission_days_back must satisfy 0 <= lo <= hi".to_string());
        }

        let (charge_lo, charge_hi) = self.claims.charge_range_cents;
        if charge_lo <= 0 || charge_lo >= charge_hi {
            return Err("charge_range_cents must satisfy 0 < lo < hi".to_string());
        }

        let (pay_lo, pay_hi) = self.claims.payout_fraction;
        if !(0.0..=1.0).contains(&pay_lo) || !(0.0..=1.0).contains(&pay_hi) || pay_lo >= pay_hi {
            return Err("payout_fraction must satisfy 0 <= lo < hi <= 1".to_string());
        }

        if self.labs.result_span_factor <= 0.0 {
            return Err("result_span_factor must be > 0".to_string());
        }
        if self.schedule.shift_hours <= 0 {
            return Err("shift_hours must be > 0".to_string());
        }

        let probabilities = [
            ("release_probability", self.bed_pool.release_probability),
            ("discharge_probability", self.visits.discharge_probability),
            ("lab advance_probability", self.labs.advance_probability),
            ("order_probability", self.labs.order_probability),
            ("positive_probability", self.labs.positive_probability),
            ("claim advance_probability", self.claims.advance_probability),
            ("approval_probability", self.claims.approval_probability),
            ("assignment_probability", self.schedule.assignment_probability),
            ("survey_probability", self.quality.survey_probability),
            ("education_probability", self.quality.education_probability),
            ("measurement_probability", self.quality.measurement_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{} must be within [0, 1], got {}", name, p));
            }
        }

        Ok(())
    }
}
