//! Gemeinsame Identifikationstypen fuer Sprechfunk
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen mit anderen
//! Ganzzahlen zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Globaler Zaehler fuer Verbindungs-IDs
///
/// Beginnt bei 1 und inkrementiert monoton. Die Reihenfolge der IDs
/// entspricht damit der Reihenfolge, in der Verbindungen geoeffnet wurden.
static VERBINDUNGS_ZAEHLER: AtomicU64 = AtomicU64::new(1);

/// Opake Identitaet einer Transport-Verbindung
///
/// Schluessel fuer den Session-Eintrag eines Clients. Wird beim Oeffnen der
/// WebSocket-Verbindung vergeben, nicht erst beim `join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Vergibt die naechste freie ConnectionId
    pub fn naechste() -> Self {
        Self(VERBINDUNGS_ZAEHLER.fetch_add(1, Ordering::Relaxed))
    }

    /// Gibt den inneren Zahlenwert zurueck
    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}
