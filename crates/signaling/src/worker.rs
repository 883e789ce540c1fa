//! Signaling-Worker – Serialisierte Verarbeitung aller Ereignisse
//!
//! Alle Verbindungs-Tasks schicken ihre Ereignisse ueber eine gemeinsame
//! mpsc-Queue an genau einen Worker. Der Worker besitzt den
//! `SignalingState` exklusiv und arbeitet die Ereignisse in Ankunftsreihenfolge
//! ab. Ausgehende Frames landen nicht-blockierend in den Send-Queues der
//! Verbindungen, der Worker wartet also nie auf einen langsamen Client.
//!
//! ```text
//! ClientConnection --+
//! ClientConnection --+--> mpsc<Ereignis> --> SignalingWorker --> ClientSender-Queues
//! ClientConnection --+
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use sprechfunk_core::ConnectionId;
use sprechfunk_observability::SprechfunkMetrics;
use tokio::sync::mpsc;

use crate::broadcast::{Ausgehend, ClientSender};
use crate::error::{SignalingError, SignalingResult};
use crate::server_state::{SignalingConfig, SignalingState};

/// Ereignis einer Verbindung
#[derive(Debug)]
pub enum Ereignis {
    /// Verbindung geoeffnet, Send-Queue bereit
    Verbunden { sender: ClientSender },
    /// Text-Frame empfangen
    Nachricht {
        connection_id: ConnectionId,
        text: String,
    },
    /// Verbindung geschlossen (egal aus welchem Grund)
    Getrennt { connection_id: ConnectionId },
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Besitzt den Zustand und verarbeitet die Ereignis-Queue
pub struct SignalingWorker {
    state: SignalingState,
    ereignis_rx: mpsc::Receiver<Ereignis>,
    worker_aktiv: Arc<AtomicBool>,
}

impl SignalingWorker {
    /// Erstellt Worker und zugehoeriges Handle
    pub fn neu(config: SignalingConfig, metriken: SprechfunkMetrics) -> (Self, SignalingHandle) {
        let (ereignis_tx, ereignis_rx) = mpsc::channel(config.ereignis_queue_groesse.max(1));
        let worker_aktiv = Arc::new(AtomicBool::new(true));

        let worker = Self {
            state: SignalingState::neu(metriken),
            ereignis_rx,
            worker_aktiv: Arc::clone(&worker_aktiv),
        };
        let handle = SignalingHandle {
            ereignis_tx,
            config: Arc::new(config),
            verbindungen: Arc::new(AtomicUsize::new(0)),
            worker_aktiv,
        };
        (worker, handle)
    }

    /// Verarbeitet Ereignisse bis alle Handles verworfen wurden
    pub async fn ausfuehren(mut self) {
        tracing::info!("Signaling-Worker gestartet");

        while let Some(ereignis) = self.ereignis_rx.recv().await {
            self.verarbeiten(ereignis);
        }

        self.worker_aktiv.store(false, Ordering::SeqCst);
        tracing::info!("Signaling-Worker beendet");
    }

    fn verarbeiten(&mut self, ereignis: Ereignis) {
        match ereignis {
            Ereignis::Verbunden { sender } => {
                tracing::debug!(connection_id = %sender.connection_id, "Verbindung registriert");
                self.state.verbindung_geoeffnet(sender);
            }
            Ereignis::Nachricht {
                connection_id,
                text,
            } => {
                tracing::trace!(connection_id = %connection_id, bytes = text.len(), "Nachricht");
                self.state.nachricht_empfangen(connection_id, &text);
            }
            Ereignis::Getrennt { connection_id } => {
                self.state.verbindung_geschlossen(connection_id);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Klonbarer Zugang der Verbindungs-Tasks zum Worker
#[derive(Clone)]
pub struct SignalingHandle {
    ereignis_tx: mpsc::Sender<Ereignis>,
    config: Arc<SignalingConfig>,
    verbindungen: Arc<AtomicUsize>,
    worker_aktiv: Arc<AtomicBool>,
}

impl SignalingHandle {
    /// Meldet eine neue Verbindung an
    ///
    /// Gibt die vergebene ID und die Send-Queue der Verbindung zurueck.
    pub async fn verbinden(&self) -> SignalingResult<(ConnectionId, mpsc::Receiver<Ausgehend>)> {
        let connection_id = ConnectionId::naechste();
        let (sender, rx) = ClientSender::neu(connection_id, self.config.send_queue_groesse.max(1));

        self.ereignis_tx
            .send(Ereignis::Verbunden { sender })
            .await
            .map_err(|_| SignalingError::WorkerBeendet)?;

        self.verbindungen.fetch_add(1, Ordering::SeqCst);
        Ok((connection_id, rx))
    }

    /// Reicht einen empfangenen Text-Frame an den Worker weiter
    pub async fn nachricht(&self, connection_id: ConnectionId, text: String) -> SignalingResult<()> {
        self.ereignis_tx
            .send(Ereignis::Nachricht {
                connection_id,
                text,
            })
            .await
            .map_err(|_| SignalingError::WorkerBeendet)
    }

    /// Meldet eine Verbindung ab
    pub async fn trennen(&self, connection_id: ConnectionId) {
        self.verbindungen.fetch_sub(1, Ordering::SeqCst);
        if self
            .ereignis_tx
            .send(Ereignis::Getrennt { connection_id })
            .await
            .is_err()
        {
            tracing::debug!(connection_id = %connection_id, "Worker bereits beendet");
        }
    }

    /// Anzahl offener Verbindungen
    pub fn verbindungen(&self) -> usize {
        self.verbindungen.load(Ordering::SeqCst)
    }

    /// Geteilter Verbindungszaehler (fuer den Health-Endpoint)
    pub fn verbindungs_zaehler(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.verbindungen)
    }

    /// Geteiltes Lebenszeichen des Workers (fuer den Health-Endpoint)
    pub fn worker_aktiv(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.worker_aktiv)
    }

    /// Signaling-Konfiguration
    pub fn config(&self) -> &SignalingConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn worker_starten() -> SignalingHandle {
        let metriken = SprechfunkMetrics::neu().unwrap();
        let (worker, handle) = SignalingWorker::neu(SignalingConfig::default(), metriken);
        tokio::spawn(worker.ausfuehren());
        handle
    }

    #[tokio::test]
    async fn verbinden_vergibt_eindeutige_ids() {
        let handle = worker_starten();
        let (a, _rx_a) = handle.verbinden().await.unwrap();
        let (b, _rx_b) = handle.verbinden().await.unwrap();
        assert_ne!(a, b);
        assert_eq!(handle.verbindungen(), 2);

        handle.trennen(a).await;
        assert_eq!(handle.verbindungen(), 1);
    }

    #[tokio::test]
    async fn ereignisse_werden_in_reihenfolge_verarbeitet() {
        let handle = worker_starten();
        let (a, mut rx_a) = handle.verbinden().await.unwrap();
        let (b, mut rx_b) = handle.verbinden().await.unwrap();

        handle
            .nachricht(a, r#"{"type":"join","username":"A","room":"lobby"}"#.into())
            .await
            .unwrap();
        handle
            .nachricht(b, r#"{"type":"join","username":"B","room":"lobby"}"#.into())
            .await
            .unwrap();
        handle
            .nachricht(a, r#"{"type":"call","to":"B"}"#.into())
            .await
            .unwrap();

        let frame = rx_b.recv().await.unwrap();
        assert_eq!(&*frame, r#"{"type":"incoming-call","from":"A"}"#);
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn worker_endet_wenn_alle_handles_weg_sind() {
        let metriken = SprechfunkMetrics::neu().unwrap();
        let (worker, handle) = SignalingWorker::neu(SignalingConfig::default(), metriken);
        let aktiv = handle.worker_aktiv();
        let task = tokio::spawn(worker.ausfuehren());

        assert!(aktiv.load(Ordering::SeqCst));
        drop(handle);
        task.await.unwrap();
        assert!(!aktiv.load(Ordering::SeqCst));
    }
}
