//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};
use sprechfunk_observability::logging::{log_format_gueltig, log_level_gueltig};
use sprechfunk_signaling::SignalingConfig;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Signaling-Einstellungen (Queues, Nachrichtengroesse)
    pub signaling: SignalingEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken, Health)
    pub observability: ObservabilityEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen
    pub max_clients: usize,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Sprechfunk Server".into(),
            max_clients: 512,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer HTTP/WebSocket
    pub bind_adresse: String,
    /// Port fuer HTTP/WebSocket
    pub port: u16,
    /// Pfad des WebSocket-Endpoints
    pub ws_pfad: String,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 3000,
            ws_pfad: "/".into(),
        }
    }
}

/// Signaling-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalingEinstellungen {
    /// Ausgehende Queue pro Verbindung (volle Queue = Frame verworfen)
    pub send_queue_groesse: usize,
    /// Eingangs-Queue des Signaling-Workers
    pub ereignis_queue_groesse: usize,
    /// Maximale Groesse einer eingehenden Nachricht in Bytes
    pub max_nachricht_bytes: usize,
}

impl Default for SignalingEinstellungen {
    fn default() -> Self {
        Self {
            send_queue_groesse: 64,
            ereignis_queue_groesse: 1024,
            max_nachricht_bytes: 64 * 1024,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen (Metriken + Health-Check)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Haengt `/metrics` und `/health` an den HTTP-Listener
    pub aktiviert: bool,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self { aktiviert: true }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };
        config.validieren()?;
        Ok(config)
    }

    /// Prueft Werte die serde allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        let pfad = &self.netzwerk.ws_pfad;
        if !pfad.starts_with('/') {
            anyhow::bail!("netzwerk.ws_pfad muss mit '/' beginnen: '{pfad}'");
        }
        if self.observability.aktiviert && (pfad == "/metrics" || pfad == "/health") {
            anyhow::bail!("netzwerk.ws_pfad '{pfad}' kollidiert mit Observability-Endpoint");
        }
        if self.server.max_clients == 0 {
            anyhow::bail!("server.max_clients muss groesser 0 sein");
        }
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Unbekanntes Log-Level: '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Unbekanntes Log-Format: '{}'", self.logging.format);
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse fuer HTTP/WebSocket zurueck
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port)
    }

    /// Leitet die Konfiguration des Signaling-Service ab
    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            ws_pfad: self.netzwerk.ws_pfad.clone(),
            max_clients: self.server.max_clients,
            send_queue_groesse: self.signaling.send_queue_groesse,
            ereignis_queue_groesse: self.signaling.ereignis_queue_groesse,
            max_nachricht_bytes: self.signaling.max_nachricht_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.server.max_clients, 512);
        assert_eq!(cfg.netzwerk.port, 3000);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.validieren().is_ok());
    }

    #[test]
    fn bind_adresse() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_adresse(), "0.0.0.0:3000");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            name = "Mein Server"
            max_clients = 100

            [netzwerk]
            port = 8080

            [signaling]
            send_queue_groesse = 8
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server.name, "Mein Server");
        assert_eq!(cfg.server.max_clients, 100);
        assert_eq!(cfg.netzwerk.port, 8080);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.netzwerk.ws_pfad, "/");
        assert_eq!(cfg.signaling.ereignis_queue_groesse, 1024);

        let sig = cfg.signaling_config();
        assert_eq!(sig.max_clients, 100);
        assert_eq!(sig.send_queue_groesse, 8);
        assert_eq!(sig.max_nachricht_bytes, 64 * 1024);
    }

    #[test]
    fn ws_pfad_darf_nicht_mit_metrics_kollidieren() {
        let mut cfg = ServerConfig::default();
        cfg.netzwerk.ws_pfad = "/metrics".into();
        assert!(cfg.validieren().is_err());

        cfg.observability.aktiviert = false;
        assert!(cfg.validieren().is_ok());

        cfg.netzwerk.ws_pfad = "ws".into();
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn ungueltiges_log_level_wird_abgelehnt() {
        let mut cfg = ServerConfig::default();
        cfg.logging.level = "laut".into();
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn fehlende_datei_liefert_standardwerte() {
        let cfg = ServerConfig::laden("/nicht/vorhanden/sprechfunk.toml").unwrap();
        assert_eq!(cfg.netzwerk.port, 3000);
    }
}
