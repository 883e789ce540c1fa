//! # sprechfunk-observability
//!
//! Observability-Crate fuer Sprechfunk:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Health-Check-Endpunkt (`/health`)
//! - Structured Logging via tracing-subscriber

pub mod health;
pub mod logging;
pub mod metrics;

pub use health::{health_router, HealthResponse, HealthState, HealthStatus};
pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, SprechfunkMetrics};

use axum::Router;
use tower_http::trace::TraceLayer;

/// Router mit allen Observability-Endpunkten
///
/// Endpunkte:
/// - `GET /metrics` – Prometheus scrape format
/// - `GET /health`  – Health-Check JSON
///
/// Jede Anfrage wird ueber den `TraceLayer` protokolliert.
pub fn observability_router(metriken: SprechfunkMetrics, health: HealthState) -> Router {
    Router::new()
        .merge(metrics_router(metriken))
        .merge(health_router(health))
        .layer(TraceLayer::new_for_http())
}
