//! Floor-Handler – talking, stopped-talking
//!
//! Setzt die Entscheidungen der `FloorControl` in Broadcasts um. Abgelehnte
//! Anfragen bekommen keine Antwort: wer zuerst spricht, gewinnt.

use sprechfunk_protocol::ServerNachricht;

use crate::floor::FloorErgebnis;
use crate::registry::Session;
use crate::server_state::SignalingState;

/// Verarbeitet `talking` (Mikrofon anfordern)
pub fn handle_talking(session: &Session, state: &mut SignalingState) {
    let raum = &session.current_room;

    match state.floor.anfordern(raum, &session.username) {
        FloorErgebnis::Erteilt => {
            let empfaenger = state.router.an_raum_senden(
                &state.registry,
                raum,
                &ServerNachricht::Talking {
                    user: session.username.clone(),
                },
            );
            tracing::debug!(
                username = %session.username,
                raum = %raum,
                empfaenger,
                "Mikrofon erteilt"
            );
        }
        FloorErgebnis::Abgelehnt { halter } => {
            tracing::debug!(
                username = %session.username,
                halter = %halter,
                raum = %raum,
                "Mikrofon belegt – Anfrage still abgelehnt"
            );
            state.metriken.verworfen_zaehlen("floor_busy");
        }
        FloorErgebnis::KeinAnruf => {
            tracing::debug!(
                username = %session.username,
                raum = %raum,
                "talking ausserhalb eines Anrufs ignoriert"
            );
            state.metriken.verworfen_zaehlen("no_active_call");
        }
    }
}

/// Verarbeitet `stopped-talking` (Mikrofon freigeben)
pub fn handle_stopped_talking(session: &Session, state: &mut SignalingState) {
    if !freigeben_und_melden(session, state) {
        tracing::debug!(
            username = %session.username,
            raum = %session.current_room,
            "stopped-talking ohne gehaltenes Mikrofon ignoriert"
        );
        state.metriken.verworfen_zaehlen("not_floor_holder");
    }
}

/// Gibt das Mikrofon frei wenn `session` es im aktuellen Raum haelt
///
/// Sendet dann `stopped-talking` an den Raum. Gibt `true` zurueck wenn
/// freigegeben wurde.
pub fn freigeben_und_melden(session: &Session, state: &mut SignalingState) -> bool {
    if !state
        .floor
        .freigeben(&session.current_room, &session.username)
    {
        return false;
    }

    state.router.an_raum_senden(
        &state.registry,
        &session.current_room,
        &ServerNachricht::StoppedTalking,
    );
    true
}
