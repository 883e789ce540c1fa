//! Health-Check-Endpunkt fuer Sprechfunk
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime und Anzahl offener Verbindungen

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub connections: usize,
}

/// Geteilter Zustand fuer den Health-Check-Handler
///
/// Die Atomics gehoeren dem Signaling-Worker und werden hier nur gelesen.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Arc<Instant>,
    pub verbindungen: Arc<AtomicUsize>,
    pub worker_aktiv: Arc<AtomicBool>,
}

impl HealthState {
    pub fn neu(verbindungen: Arc<AtomicUsize>, worker_aktiv: Arc<AtomicBool>) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            verbindungen,
            worker_aktiv,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Baut die aktuelle Health-Antwort
    pub fn bericht(&self) -> HealthResponse {
        let status = if self.worker_aktiv.load(Ordering::Relaxed) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            connections: self.verbindungen.load(Ordering::Relaxed),
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let response = state.bericht();

    let http_status = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (http_status, Json(response))
}
