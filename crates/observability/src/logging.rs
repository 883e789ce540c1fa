//! Logging-Setup fuer den Signaling-Server
//!
//! Level und Format kommen aus der `[logging]`-Sektion der Config,
//! `SF_LOG_LEVEL` und `SF_LOG_FORMAT` haben Vorrang.
//!
//! Ein einfaches Level (`debug`, `info`, ...) gilt nur fuer die Sprechfunk-Crates
//! und den HTTP-TraceLayer; alle anderen Abhaengigkeiten (hyper, tungstenite)
//! loggen erst ab `warn`. Vollstaendige EnvFilter-Direktiven werden
//! unveraendert uebernommen.
//!
//! Die Handler loggen mit festen Feldern (`connection_id`, `username`, `raum`,
//! `fehler`). Im JSON-Format stehen diese Felder flach auf oberster Ebene.

use tracing_subscriber::{fmt, EnvFilter};

/// Targets die dem konfigurierten Level folgen
const EIGENE_TARGETS: [&str; 6] = [
    "sprechfunk_core",
    "sprechfunk_protocol",
    "sprechfunk_signaling",
    "sprechfunk_observability",
    "sprechfunk_server",
    "tower_http",
];

/// Initialisiert das Logging-System.
///
/// Ein nicht parsebarer Filter faellt auf `info` zurueck, ein unbekanntes
/// Format auf Text.
pub fn logging_initialisieren(level: &str, format: &str) {
    let level = std::env::var("SF_LOG_LEVEL").unwrap_or_else(|_| level.to_string());
    let format = std::env::var("SF_LOG_FORMAT").unwrap_or_else(|_| format.to_string());

    let filter = EnvFilter::try_new(filter_direktiven(&level))
        .unwrap_or_else(|_| EnvFilter::new(filter_direktiven("info")));

    match format.as_str() {
        "json" => {
            // Ein Objekt pro Zeile, Event-Felder ohne `fields`-Huelle
            fmt()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .compact()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Baut die EnvFilter-Direktiven fuer ein konfiguriertes Level
///
/// `info` wird zu `warn,sprechfunk_core=info,...`; alles andere gilt als
/// fertige Direktive.
pub fn filter_direktiven(level: &str) -> String {
    if !log_level_gueltig(level) {
        return level.to_string();
    }

    EIGENE_TARGETS
        .iter()
        .fold(String::from("warn"), |mut direktiven, target| {
            direktiven.push_str(&format!(",{target}={level}"));
            direktiven
        })
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
