//! Prometheus-kompatible Metriken fuer Sprechfunk
//!
//! Registrierte Metriken:
//! - `sprechfunk_connected_clients` – Gauge: Offene WebSocket-Verbindungen
//! - `sprechfunk_sessions` – Gauge: Verbindungen mit `join`
//! - `sprechfunk_active_call_rooms` – Gauge: Private Raeume mit Floor-Eintrag
//! - `sprechfunk_messages_total` – Counter: Eingehende Nachrichten (typ)
//! - `sprechfunk_messages_discarded_total` – Counter: Verworfene Nachrichten (grund)
//! - `sprechfunk_deliveries_total` – Counter: Zugestellte Frames
//! - `sprechfunk_delivery_failures_total` – Counter: Uebersprungene Empfaenger

use anyhow::Result;
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Alle Sprechfunk-Prometheus-Metriken
///
/// Clone teilt die Registry und alle Metriken.
#[derive(Clone)]
pub struct SprechfunkMetrics {
    pub registry: Arc<Registry>,

    // Verbindungen
    pub connected_clients: IntGauge,
    pub sessions: IntGauge,
    pub active_call_rooms: IntGauge,

    // Nachrichten
    pub messages_total: IntCounterVec,
    pub messages_discarded_total: IntCounterVec,
    pub deliveries_total: IntCounter,
    pub delivery_failures_total: IntCounter,
}

impl SprechfunkMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let connected_clients = IntGauge::with_opts(Opts::new(
            "sprechfunk_connected_clients",
            "Anzahl offener WebSocket-Verbindungen",
        ))?;
        registry.register(Box::new(connected_clients.clone()))?;

        let sessions = IntGauge::with_opts(Opts::new(
            "sprechfunk_sessions",
            "Anzahl angemeldeter Sessions (nach join)",
        ))?;
        registry.register(Box::new(sessions.clone()))?;

        let active_call_rooms = IntGauge::with_opts(Opts::new(
            "sprechfunk_active_call_rooms",
            "Anzahl privater Raeume mit Floor-Control-Eintrag",
        ))?;
        registry.register(Box::new(active_call_rooms.clone()))?;

        let messages_total = IntCounterVec::new(
            Opts::new(
                "sprechfunk_messages_total",
                "Gesamtanzahl eingehender Nachrichten",
            ),
            &["typ"],
        )?;
        registry.register(Box::new(messages_total.clone()))?;

        let messages_discarded_total = IntCounterVec::new(
            Opts::new(
                "sprechfunk_messages_discarded_total",
                "Verworfene Nachrichten nach Grund",
            ),
            &["grund"],
        )?;
        registry.register(Box::new(messages_discarded_total.clone()))?;

        let deliveries_total = IntCounter::with_opts(Opts::new(
            "sprechfunk_deliveries_total",
            "Gesamtanzahl zugestellter Frames",
        ))?;
        registry.register(Box::new(deliveries_total.clone()))?;

        let delivery_failures_total = IntCounter::with_opts(Opts::new(
            "sprechfunk_delivery_failures_total",
            "Empfaenger die beim Senden uebersprungen wurden",
        ))?;
        registry.register(Box::new(delivery_failures_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            connected_clients,
            sessions,
            active_call_rooms,
            messages_total,
            messages_discarded_total,
            deliveries_total,
            delivery_failures_total,
        })
    }

    /// Zaehlt eine eingehende Nachricht
    pub fn nachricht_zaehlen(&self, typ: &str) {
        self.messages_total.with_label_values(&[typ]).inc();
    }

    /// Zaehlt eine verworfene Nachricht
    pub fn verworfen_zaehlen(&self, grund: &str) {
        self.messages_discarded_total
            .with_label_values(&[grund])
            .inc();
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: SprechfunkMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<SprechfunkMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
