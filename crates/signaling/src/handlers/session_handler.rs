//! Session-Handler – Join und Verbindungsabbau

use sprechfunk_core::ConnectionId;
use sprechfunk_protocol::JoinRequest;

use crate::handlers::floor_handler;
use crate::server_state::SignalingState;

/// Verarbeitet `join`
///
/// Legt die Session an (oder ueberschreibt sie) mit `room` als aktuellem
/// Raum und als Lobby.
pub fn handle_join(request: JoinRequest, connection_id: ConnectionId, state: &mut SignalingState) {
    let JoinRequest { username, room } = request;

    if let Some(alt) = state.registry.session(connection_id) {
        tracing::debug!(
            connection_id = %connection_id,
            alter_username = %alt.username,
            alter_raum = %alt.current_room,
            "Erneutes join – Session wird ueberschrieben"
        );
    }

    tracing::info!(
        connection_id = %connection_id,
        username = %username,
        raum = %room,
        "Session angemeldet"
    );
    state.registry.registrieren(connection_id, username, room);
}

/// Raeumt eine geschlossene Verbindung auf
///
/// Reihenfolge:
/// 1. Send-Queue aus dem Router entfernen (Verbindung nicht mehr beschreibbar)
/// 2. Haelt die Session das Mikrofon, wird es freigegeben und der Raum
///    bekommt `stopped-talking`
/// 3. Session entfernen
/// 4. War sie die letzte Session im privaten Raum, verschwindet dessen
///    Floor-Eintrag
///
/// Ein laufender Anruf wird nicht beendet: das Gegenueber bleibt im
/// privaten Raum bis es selbst `end-call` sendet.
pub fn handle_disconnect(connection_id: ConnectionId, state: &mut SignalingState) {
    state.router.client_entfernen(connection_id);

    let Some(session) = state.registry.session(connection_id).cloned() else {
        tracing::debug!(connection_id = %connection_id, "Verbindung ohne Session geschlossen");
        return;
    };

    if floor_handler::freigeben_und_melden(&session, state) {
        tracing::info!(
            connection_id = %connection_id,
            username = %session.username,
            raum = %session.current_room,
            "Mikrofon bei Verbindungsabbau freigegeben"
        );
    }

    state.registry.entfernen(connection_id);

    if session.im_anruf()
        && state
            .registry
            .verbindungen_in_raum(&session.current_room)
            .is_empty()
        && state.floor.raum_entfernen(&session.current_room)
    {
        tracing::debug!(
            raum = %session.current_room,
            "Verwaister Anrufraum aufgeraeumt"
        );
    }

    tracing::info!(
        connection_id = %connection_id,
        username = %session.username,
        "Session beendet"
    );
}
