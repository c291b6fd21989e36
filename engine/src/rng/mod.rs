//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, deterministic random number generation.
//! CRITICAL: All randomness in the engine MUST go through this module,
//! including entity id generation.

mod xorshift;

pub use xorshift::RngManager;
