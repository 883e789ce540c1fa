//! sprechfunk-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use config::ServerConfig;
use sprechfunk_observability::{observability_router, HealthState, SprechfunkMetrics};
use sprechfunk_signaling::{signaling_router, SignalingWorker};
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Wartezeit auf das Ende des Workers nach dem Shutdown
const WORKER_ABSCHLUSS_TIMEOUT: Duration = Duration::from_secs(5);

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_adresse()).await?;
        self.ausfuehren(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
            }
        })
        .await
    }

    /// Laeuft auf `listener` bis `shutdown_signal` fertig ist
    ///
    /// Reihenfolge:
    /// 1. Metriken anlegen
    /// 2. Signaling-Worker starten
    /// 3. WebSocket-Endpoint (und ggf. `/metrics`, `/health`) bedienen
    /// 4. Beim Shutdown alle Verbindungen schliessen und auf den Worker warten
    pub async fn ausfuehren<F>(self, listener: TcpListener, shutdown_signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let adresse = listener.local_addr()?;
        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %adresse,
            ws_pfad = %self.config.netzwerk.ws_pfad,
            max_clients = self.config.server.max_clients,
            "Server startet"
        );

        let metriken = SprechfunkMetrics::neu()?;
        let (worker, handle) = SignalingWorker::neu(self.config.signaling_config(), metriken.clone());
        let worker_task = tokio::spawn(worker.ausfuehren());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut app: Router = signaling_router(handle.clone(), shutdown_rx);
        if self.config.observability.aktiviert {
            let health = HealthState::neu(handle.verbindungs_zaehler(), handle.worker_aktiv());
            app = app.merge(observability_router(metriken, health));
            tracing::info!("Observability-Endpunkte /metrics und /health aktiv");
        }
        drop(handle);

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal...");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown_signal.await;
            tracing::info!("Shutdown-Signal empfangen, Verbindungen werden geschlossen");
            let _ = shutdown_tx.send(true);
        })
        .await?;

        match tokio::time::timeout(WORKER_ABSCHLUSS_TIMEOUT, worker_task).await {
            Ok(Ok(())) => tracing::info!("Server beendet"),
            Ok(Err(e)) => tracing::error!(fehler = %e, "Signaling-Worker abgebrochen"),
            Err(_) => tracing::warn!("Signaling-Worker nicht rechtzeitig beendet"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use tokio::sync::oneshot;
    use tokio_tungstenite::tungstenite::Message;

    #[tokio::test]
    async fn server_bedient_websocket_und_faehrt_sauber_herunter() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stopp_tx, stopp_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(Server::neu(ServerConfig::default()).ausfuehren(
            listener,
            async move {
                let _ = stopp_rx.await;
            },
        ));

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/"))
            .await
            .unwrap();
        ws.send(Message::text(r#"{"type":"join","username":"A","room":"lobby"}"#))
            .await
            .unwrap();
        ws.send(Message::text(r#"{"type":"hallo"}"#)).await.unwrap();

        let echo = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(echo, Message::text(r#"{"type":"hallo"}"#));

        stopp_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(10), server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }
}
