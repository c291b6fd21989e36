//! Tick orchestration
//!
//! Sequences the seeder, pool manager, visit generator, and the four
//! independent per-tick generators, and aggregates their reports.

mod engine;

pub use engine::{EngineError, Orchestrator, TickReport};
