//! WebSocket-Endpoint – Upgrade und Verbindungs-Tasks
//!
//! Der `signaling_router` nimmt Upgrades auf dem konfigurierten Pfad an und
//! startet pro Verbindung eine `ClientConnection`. Ist das Verbindungslimit
//! erreicht, wird das Upgrade mit 503 abgelehnt.
//!
//! Der Router muss mit `into_make_service_with_connect_info::<SocketAddr>()`
//! bedient werden.

use std::net::SocketAddr;

use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::sync::watch;

use crate::connection::ClientConnection;
use crate::error::SignalingError;
use crate::worker::SignalingHandle;

#[derive(Clone)]
struct WsState {
    handle: SignalingHandle,
    shutdown_rx: watch::Receiver<bool>,
}

/// Erstellt den Router fuer den WebSocket-Endpoint
pub fn signaling_router(handle: SignalingHandle, shutdown_rx: watch::Receiver<bool>) -> Router {
    let pfad = handle.config().ws_pfad.clone();
    Router::new()
        .route(&pfad, get(ws_handler))
        .with_state(WsState {
            handle,
            shutdown_rx,
        })
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    State(state): State<WsState>,
) -> Response {
    let config = state.handle.config();
    let offen = state.handle.verbindungen();

    if offen >= config.max_clients {
        tracing::warn!(
            peer = %peer_addr,
            max = config.max_clients,
            "Server voll – Verbindung abgelehnt"
        );
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            SignalingError::ServerVoll.to_string(),
        )
            .into_response();
    }

    tracing::debug!(peer = %peer_addr, "WebSocket-Upgrade akzeptiert");

    let max_bytes = config.max_nachricht_bytes;
    ws.max_message_size(max_bytes)
        .on_failed_upgrade(move |fehler| {
            tracing::warn!(peer = %peer_addr, fehler = %fehler, "WebSocket-Upgrade fehlgeschlagen");
        })
        .on_upgrade(move |socket| {
            ClientConnection::neu(state.handle, peer_addr).verarbeiten(socket, state.shutdown_rx)
        })
}
