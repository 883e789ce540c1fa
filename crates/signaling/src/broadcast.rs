//! Room-Router – Stellt Nachrichten an einzelne Verbindungen oder ganze Raeume zu
//!
//! Der Router haelt die Send-Queues aller offenen Verbindungen. Jede
//! Verbindung liest ihre Queue in ihrem eigenen Task und schreibt auf den
//! WebSocket. Zustellung ist best-effort: volle oder geschlossene Queues
//! werden uebersprungen, es gibt weder Bestaetigung noch Wiederholung.
//!
//! ## Selektives Senden
//! - An eine Verbindung: `an_verbindung_senden`
//! - An einen Raum: `an_raum_senden`
//! - Unveraenderter Text an einen Raum (Relay): `frame_an_raum`

use sprechfunk_core::ConnectionId;
use sprechfunk_observability::SprechfunkMetrics;
use sprechfunk_protocol::ServerNachricht;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::registry::SessionRegistry;

/// Fertig serialisierter Frame; wird beim Raum-Broadcast geteilt
pub type Ausgehend = Arc<str>;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer offenen Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub connection_id: ConnectionId,
    pub tx: mpsc::Sender<Ausgehend>,
}

impl ClientSender {
    /// Erstellt Sender und Empfangs-Queue fuer eine Verbindung
    pub fn neu(connection_id: ConnectionId, queue_groesse: usize) -> (Self, mpsc::Receiver<Ausgehend>) {
        let (tx, rx) = mpsc::channel(queue_groesse);
        (Self { connection_id, tx }, rx)
    }

    /// Sendet einen Frame nicht-blockierend an die Verbindung
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, frame: Ausgehend) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(connection_id = %self.connection_id, "Send-Queue voll – Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(connection_id = %self.connection_id, "Send-Queue geschlossen (Verbindung im Abbau)");
                false
            }
        }
    }

    /// `true` solange die Verbindung ihre Queue noch liest
    pub fn ist_offen(&self) -> bool {
        !self.tx.is_closed()
    }
}

// ---------------------------------------------------------------------------
// RoomRouter
// ---------------------------------------------------------------------------

/// Zustellung an Verbindungen und Raeume
///
/// Gehoert exklusiv dem Signaling-Worker. Raum-Mitgliedschaft kommt aus der
/// `SessionRegistry`, der Router kennt nur die Send-Queues.
pub struct RoomRouter {
    clients: HashMap<ConnectionId, ClientSender>,
    metriken: SprechfunkMetrics,
}

impl RoomRouter {
    /// Erstellt einen leeren Router
    pub fn neu(metriken: SprechfunkMetrics) -> Self {
        Self {
            clients: HashMap::new(),
            metriken,
        }
    }

    /// Registriert die Send-Queue einer neu geoeffneten Verbindung
    pub fn client_registrieren(&mut self, sender: ClientSender) {
        tracing::debug!(connection_id = %sender.connection_id, "Verbindung im Router registriert");
        self.clients.insert(sender.connection_id, sender);
    }

    /// Entfernt eine Verbindung; danach wird sie bei jeder Zustellung uebersprungen
    pub fn client_entfernen(&mut self, connection_id: ConnectionId) -> bool {
        self.clients.remove(&connection_id).is_some()
    }

    /// Sendet eine Server-Nachricht an genau eine Verbindung
    pub fn an_verbindung_senden(&self, connection_id: ConnectionId, nachricht: &ServerNachricht) -> bool {
        match serialisieren(nachricht) {
            Some(frame) => self.frame_an_verbindung(connection_id, frame),
            None => false,
        }
    }

    /// Sendet einen fertigen Frame an genau eine Verbindung
    pub fn frame_an_verbindung(&self, connection_id: ConnectionId, frame: Ausgehend) -> bool {
        let zugestellt = match self.clients.get(&connection_id) {
            Some(sender) if sender.ist_offen() => sender.senden(frame),
            Some(_) => false,
            None => {
                tracing::debug!(connection_id = %connection_id, "Senden an unbekannte Verbindung");
                false
            }
        };
        self.zaehlen(zugestellt);
        zugestellt
    }

    /// Sendet eine Server-Nachricht an alle Verbindungen im Raum
    ///
    /// Gibt die Anzahl der erfolgreichen Zustellungen zurueck.
    pub fn an_raum_senden(
        &self,
        registry: &SessionRegistry,
        raum: &str,
        nachricht: &ServerNachricht,
    ) -> usize {
        match serialisieren(nachricht) {
            Some(frame) => self.frame_an_raum(registry, raum, frame),
            None => 0,
        }
    }

    /// Sendet einen fertigen Frame an alle Verbindungen im Raum
    ///
    /// Nicht beschreibbare Verbindungen werden uebersprungen, der Rest
    /// bekommt den Frame trotzdem.
    pub fn frame_an_raum(&self, registry: &SessionRegistry, raum: &str, frame: Ausgehend) -> usize {
        let mut gesendet = 0;
        for connection_id in registry.verbindungen_in_raum(raum) {
            if self.frame_an_verbindung(connection_id, Arc::clone(&frame)) {
                gesendet += 1;
            }
        }
        gesendet
    }

    /// Anzahl der offenen, registrierten Verbindungen
    pub fn client_anzahl(&self) -> usize {
        self.clients.len()
    }

    fn zaehlen(&self, zugestellt: bool) {
        if zugestellt {
            self.metriken.deliveries_total.inc();
        } else {
            self.metriken.delivery_failures_total.inc();
        }
    }
}

fn serialisieren(nachricht: &ServerNachricht) -> Option<Ausgehend> {
    match nachricht.zu_json() {
        Ok(json) => Some(Ausgehend::from(json)),
        Err(e) => {
            tracing::error!(fehler = %e, "Server-Nachricht nicht serialisierbar");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
