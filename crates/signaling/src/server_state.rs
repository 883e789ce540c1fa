//! Gemeinsamer Signaling-Zustand
//!
//! Haelt Session-Registry, Room-Router und Floor Control. Der Zustand
//! gehoert exklusiv dem Signaling-Worker: jedes Ereignis (Verbindung offen,
//! Nachricht, Verbindung zu) wird vollstaendig verarbeitet bevor das naechste
//! beginnt. Deshalb braucht keine der Strukturen einen Lock.

use sprechfunk_core::ConnectionId;
use sprechfunk_observability::SprechfunkMetrics;

use crate::broadcast::{ClientSender, RoomRouter};
use crate::dispatcher;
use crate::floor::FloorControl;
use crate::handlers::session_handler;
use crate::registry::SessionRegistry;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// HTTP-Pfad fuer das WebSocket-Upgrade
    pub ws_pfad: String,
    /// Maximale gleichzeitige Verbindungen
    pub max_clients: usize,
    /// Groesse der Send-Queue pro Verbindung
    pub send_queue_groesse: usize,
    /// Groesse der Ereignis-Queue des Workers
    pub ereignis_queue_groesse: usize,
    /// Maximale Groesse einer eingehenden Nachricht in Bytes
    pub max_nachricht_bytes: usize,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            ws_pfad: "/".to_string(),
            max_clients: 512,
            send_queue_groesse: 64,
            ereignis_queue_groesse: 1024,
            max_nachricht_bytes: 64 * 1024,
        }
    }
}

/// Zustand des Signaling-Relays
pub struct SignalingState {
    /// Wer ist angemeldet, in welchem Raum
    pub registry: SessionRegistry,
    /// Send-Queues aller offenen Verbindungen
    pub router: RoomRouter,
    /// Sprecher pro privatem Raum
    pub floor: FloorControl,
    /// Prometheus-Metriken
    pub metriken: SprechfunkMetrics,
}

impl SignalingState {
    /// Erstellt einen leeren Zustand
    pub fn neu(metriken: SprechfunkMetrics) -> Self {
        Self {
            registry: SessionRegistry::neu(),
            router: RoomRouter::neu(metriken.clone()),
            floor: FloorControl::neu(),
            metriken,
        }
    }

    /// Neue Verbindung geoeffnet (noch ohne Session)
    pub fn verbindung_geoeffnet(&mut self, sender: ClientSender) {
        self.router.client_registrieren(sender);
        self.metriken_aktualisieren();
    }

    /// Eingehende Nachricht einer Verbindung verarbeiten
    pub fn nachricht_empfangen(&mut self, connection_id: ConnectionId, text: &str) {
        dispatcher::dispatch(self, connection_id, text);
        self.metriken_aktualisieren();
    }

    /// Verbindung geschlossen
    pub fn verbindung_geschlossen(&mut self, connection_id: ConnectionId) {
        session_handler::handle_disconnect(connection_id, self);
        self.metriken_aktualisieren();
    }

    fn metriken_aktualisieren(&self) {
        self.metriken
            .connected_clients
            .set(self.router.client_anzahl() as i64);
        self.metriken.sessions.set(self.registry.anzahl() as i64);
        self.metriken
            .active_call_rooms
            .set(self.floor.raum_anzahl() as i64);
    }
}
