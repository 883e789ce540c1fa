//! Client-Connection – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede Verbindung laeuft in einem eigenen tokio-Task. Der Task macht nur
//! I/O: empfangene Text-Frames gehen als Ereignis an den Signaling-Worker,
//! Frames aus der eigenen Send-Queue gehen an den Socket.
//!
//! ## Lebenszyklus
//! ```text
//! Upgrade -> verbinden() -> Lese/Schreib-Schleife -> trennen()
//! ```
//!
//! `trennen()` wird auf jedem Pfad genau einmal gemeldet: Client schliesst,
//! Lese- oder Schreibfehler, Shutdown des Servers.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;

use crate::worker::SignalingHandle;

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct ClientConnection {
    handle: SignalingHandle,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(handle: SignalingHandle, peer_addr: SocketAddr) -> Self {
        Self { handle, peer_addr }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht.
    pub async fn verarbeiten(self, socket: WebSocket, mut shutdown_rx: watch::Receiver<bool>) {
        let peer_addr = self.peer_addr;

        let (connection_id, mut sende_rx) = match self.handle.verbinden().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(peer = %peer_addr, fehler = %e, "Verbindung abgewiesen");
                return;
            }
        };

        tracing::info!(peer = %peer_addr, connection_id = %connection_id, "Neue Verbindung");

        let (mut ws_tx, mut ws_rx) = socket.split();

        loop {
            tokio::select! {
                // Eingehender Frame vom Client
                frame = ws_rx.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Binary(daten))) => match String::from_utf8(daten) {
                            Ok(text) => text,
                            Err(_) => {
                                tracing::debug!(
                                    connection_id = %connection_id,
                                    "Binaer-Frame ohne UTF-8 verworfen"
                                );
                                continue;
                            }
                        },
                        // Ping/Pong beantwortet axum selbst
                        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(
                                connection_id = %connection_id,
                                "Verbindung vom Client getrennt"
                            );
                            break;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(
                                connection_id = %connection_id,
                                fehler = %e,
                                "Frame-Lesefehler"
                            );
                            break;
                        }
                    };

                    if let Err(e) = self.handle.nachricht(connection_id, text).await {
                        tracing::warn!(connection_id = %connection_id, fehler = %e, "Weiterleitung fehlgeschlagen");
                        break;
                    }
                }

                // Ausgehender Frame aus dem Worker
                ausgehend = sende_rx.recv() => {
                    let Some(frame) = ausgehend else {
                        // Worker hat die Queue geschlossen
                        break;
                    };
                    if let Err(e) = ws_tx.send(Message::Text(frame.to_string())).await {
                        tracing::warn!(
                            connection_id = %connection_id,
                            fehler = %e,
                            "Senden fehlgeschlagen"
                        );
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(
                            connection_id = %connection_id,
                            "Shutdown-Signal – Verbindung wird getrennt"
                        );
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }

        // Queue zuerst schliessen, damit der Worker nichts mehr zustellt
        drop(sende_rx);
        self.handle.trennen(connection_id).await;

        tracing::info!(peer = %peer_addr, connection_id = %connection_id, "Verbindungs-Task beendet");
    }
}
