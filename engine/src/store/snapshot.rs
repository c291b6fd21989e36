//! Snapshot - Save/Load Store State
//!
//! Serializes the whole store (plus the orchestrator's RNG state) to JSON
//! so a host can persist it between invocations and resume the same
//! deterministic stream.
//!
//! # Critical Invariants
//!
//! - **Config matching**: a snapshot can only be loaded with the config
//!   that produced it (SHA256 hash over canonical JSON)
//! - **Integrity on load**: bed/visit consistency and claim uniqueness are
//!   re-validated before the snapshot is accepted

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::config::SimulationConfig;
use crate::models::BedStatus;
use crate::store::Store;

/// Errors that can occur during snapshot save/load
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot config hash {found} does not match current config hash {expected}")]
    ConfigMismatch { expected: String, found: String },

    #[error("Snapshot failed integrity validation: {0}")]
    Invalid(String),
}

/// Complete persisted engine state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// SHA256 hash of the producing config (for validation)
    pub config_hash: String,

    /// RNG state at snapshot time (CRITICAL for determinism)
    pub rng_state: u64,

    pub saved_at: DateTime<Utc>,

    pub store: Store,
}

/// Compute deterministic SHA256 hash of the config
///
/// Uses canonical JSON with sorted keys so the hash does not depend on
/// serializer map ordering.
pub fn compute_config_hash(config: &SimulationConfig) -> Result<String, SnapshotError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical = canonicalize(serde_json::to_value(config)?);
    let json = serde_json::to_string(&canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Serialize the store to a snapshot JSON string
pub fn save(
    store: &Store,
    rng_state: u64,
    config: &SimulationConfig,
    saved_at: DateTime<Utc>,
) -> Result<String, SnapshotError> {
    let snapshot = StoreSnapshot {
        config_hash: compute_config_hash(config)?,
        rng_state,
        saved_at,
        store: store.clone(),
    };
    Ok(serde_json::to_string(&snapshot)?)
}

/// Restore a store (and RNG state) from snapshot JSON
///
/// Rejects snapshots produced under a different config, and snapshots
/// whose contents violate the store invariants.
pub fn load(json: &str, config: &SimulationConfig) -> Result<(Store, u64), SnapshotError> {
    let snapshot: StoreSnapshot = serde_json::from_str(json)?;

    let expected = compute_config_hash(config)?;
    if snapshot.config_hash != expected {
        return Err(SnapshotError::ConfigMismatch {
            expected,
            found: snapshot.config_hash,
        });
    }

    validate_store(&snapshot.store)?;
    Ok((snapshot.store, snapshot.rng_state))
}

/// Validate cross-entity invariants before accepting a snapshot
fn validate_store(store: &Store) -> Result<(), SnapshotError> {
    // 1. Bed/visit consistency
    for bed in store.beds().iter() {
        let active_refs = store
            .visits()
            .iter()
            .filter(|v| v.is_active() && v.bed_id() == Some(bed.id()))
            .count();
        let expected = match bed.status() {
            BedStatus::Occupied => 1,
            BedStatus::Available => 0,
        };
        if active_refs != expected {
            return Err(SnapshotError::Invalid(format!(
                "bed {} is {:?} but has {} active visit(s)",
                bed.id(),
                bed.status(),
                active_refs
            )));
        }
    }

    // 2. Claim uniqueness per visit
    let mut seen = BTreeSet::new();
    for claim in store.insurance_claims().iter() {
        if !seen.insert(claim.visit_id()) {
            return Err(SnapshotError::Invalid(format!(
                "visit {} has more than one claim",
                claim.visit_id()
            )));
        }
    }

    Ok(())
}
