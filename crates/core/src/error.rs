//! Fehlertypen fuer Sprechfunk
//!
//! Zentraler Fehler-Enum fuer alle Crates. Untermodule koennen eigene
//! Fehler definieren und via `#[from]` konvertieren.

use thiserror::Error;

/// Globaler Result-Alias fuer Sprechfunk
pub type Result<T> = std::result::Result<T, SprechfunkError>;

/// Alle moeglichen Fehler im Sprechfunk-System
#[derive(Debug, Error)]
pub enum SprechfunkError {
    // --- Protokoll ---
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),

    #[error("Nachricht vom Typ '{typ}' ungueltig: {grund}")]
    UngueltigesFeld { typ: String, grund: String },

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl SprechfunkError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Erstellt einen Fehler fuer eine nicht parsebare Nachricht
    pub fn ungueltig(msg: impl Into<String>) -> Self {
        Self::UngueltigeNachricht(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler nur die einzelne Nachricht betrifft
    ///
    /// Solche Fehler werden verworfen, die Verbindung bleibt bestehen.
    pub fn ist_nachrichtenfehler(&self) -> bool {
        matches!(self, Self::UngueltigeNachricht(_) | Self::UngueltigesFeld { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = SprechfunkError::ungueltig("kein JSON");
        assert_eq!(e.to_string(), "Ungueltige Nachricht: kein JSON");
    }

    #[test]
    fn ungueltiges_feld_anzeige() {
        let e = SprechfunkError::UngueltigesFeld {
            typ: "join".into(),
            grund: "missing field `room`".into(),
        };
        assert_eq!(
            e.to_string(),
            "Nachricht vom Typ 'join' ungueltig: missing field `room`"
        );
    }

    #[test]
    fn nachrichtenfehler_erkennung() {
        assert!(SprechfunkError::ungueltig("x").ist_nachrichtenfehler());
        assert!(!SprechfunkError::intern("x").ist_nachrichtenfehler());
    }
}
