//! HTTP trigger surface for the simulation engine
//!
//! A single method-agnostic endpoint runs one tick per invocation; an
//! external scheduler (cron, uptime monitor, the dashboard itself) drives
//! the cadence. The dashboard only ever reads the store; this binary is
//! the sole writer.
//!
//! - `OPTIONS` preflight → empty 200 with permissive CORS headers
//! - any other method on `/` or `/tick` → full tick
//! - 200 `{"message": ...}` on success, 500 `{"error": ...}` on failure
//!
//! Environment:
//! - `HOSPITAL_SIM_ADDR`: bind address (default `0.0.0.0:8787`)
//! - `HOSPITAL_SIM_SNAPSHOT`: optional path; the store is persisted there
//!   after each tick and reloaded at startup
//! - `RUST_LOG`: tracing filter

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use hospital_simulator_core::models::Patient;
use hospital_simulator_core::{snapshot, Orchestrator, SimulationConfig, Store};

struct AppState {
    store: Store,
    orchestrator: Orchestrator,
    config: SimulationConfig,
    snapshot_path: Option<PathBuf>,
}

type SharedState = Arc<Mutex<AppState>>;

const PATIENT_FIRST_NAMES: &[&str] = &[
    "Imani", "Theo", "Sofia", "Jonas", "Aisha", "Peter", "Ingrid", "Mateo", "Clara", "Ravi",
    "Elena", "Kofi",
];

const PATIENT_LAST_NAMES: &[&str] = &[
    "Mensah", "Virtanen", "Castillo", "Brennan", "Schmidt", "Ito", "Abebe", "Kowalski", "Moreau",
    "Haddad",
];

/// Demo patient roster loaded into an empty store
///
/// Patients are outside the engine's scope; a real deployment would point
/// the store at an existing registration system instead.
fn demo_patients(count: usize) -> Vec<Patient> {
    (0..count)
        .map(|i| {
            let first = PATIENT_FIRST_NAMES[i % PATIENT_FIRST_NAMES.len()];
            let last = PATIENT_LAST_NAMES[(i / PATIENT_FIRST_NAMES.len()) % PATIENT_LAST_NAMES.len()];
            Patient::new(
                Uuid::new_v4(),
                format!("{} {}", first, last),
                format!("MRN-{:05}", i + 1),
            )
        })
        .collect()
}

/// Load the persisted store, or bootstrap a fresh one with demo patients
fn bootstrap(config: &SimulationConfig, snapshot_path: Option<&Path>) -> anyhow::Result<(Store, Orchestrator)> {
    if let Some(path) = snapshot_path {
        match std::fs::read_to_string(path) {
            Ok(json) => match snapshot::load(&json, config) {
                Ok((store, rng_state)) => {
                    info!(path = %path.display(), "store restored from snapshot");
                    let orchestrator = Orchestrator::with_rng_state(config.clone(), rng_state)?;
                    return Ok((store, orchestrator));
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "snapshot rejected; starting fresh");
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no snapshot yet; starting fresh");
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "snapshot unreadable; starting fresh");
            }
        }
    }

    let mut store = Store::new();
    for patient in demo_patients(60) {
        store
            .patients_mut()
            .insert(patient)
            .map_err(|e| anyhow::anyhow!("demo roster insert failed: {e}"))?;
    }
    let orchestrator = Orchestrator::new(config.clone())?;
    Ok((store, orchestrator))
}

/// Run one tick and persist the snapshot if configured
fn execute_tick(state: &SharedState) -> Result<(), String> {
    let mut guard = state.lock().map_err(|_| "engine state poisoned".to_string())?;
    let AppState {
        store,
        orchestrator,
        config,
        snapshot_path,
    } = &mut *guard;

    let report = orchestrator.run_tick(store).map_err(|e| e.to_string())?;
    if !report.skipped_steps.is_empty() {
        warn!(skipped = ?report.skipped_steps, "tick completed with skipped steps");
    }

    // Best-effort persistence; a write failure does not fail the tick
    if let Some(path) = snapshot_path {
        match snapshot::save(store, orchestrator.rng_state(), config, report.executed_at) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&path, json) {
                    warn!(path = %path.display(), %err, "snapshot write failed");
                }
            }
            Err(err) => warn!(%err, "snapshot serialization failed"),
        }
    }

    Ok(())
}

async fn run_tick(State(state): State<SharedState>, method: Method) -> Response {
    // Preflight: empty 200; the CORS layer attaches the permissive headers
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let result = tokio::task::spawn_blocking(move || execute_tick(&state)).await;

    match result {
        Ok(Ok(())) => Json(json!({ "message": "Operational data updated successfully" }))
            .into_response(),
        Ok(Err(message)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("tick task failed: {err}") })),
        )
            .into_response(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SimulationConfig::default();
    let snapshot_path = std::env::var("HOSPITAL_SIM_SNAPSHOT").ok().map(PathBuf::from);
    let (store, orchestrator) = bootstrap(&config, snapshot_path.as_deref())?;

    let state: SharedState = Arc::new(Mutex::new(AppState {
        store,
        orchestrator,
        config,
        snapshot_path,
    }));

    let app = Router::new()
        .route("/", any(run_tick))
        .route("/tick", any(run_tick))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("HOSPITAL_SIM_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "simulation trigger listening");

    axum::serve(listener, app).await?;
    Ok(())
}
