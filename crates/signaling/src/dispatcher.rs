//! Message-Dispatcher – Routet eingehende Nachrichten an die Handler
//!
//! Jede Nachricht wird geparst und genau einem Handler zugeordnet.
//!
//! ## Zustandspruefung
//! - Nicht parsebare Nachrichten werden verworfen, die Verbindung bleibt offen
//! - `join` ist immer erlaubt
//! - Alles andere erst nach `join`; vorher wird still ignoriert
//! - Unbekannte Typen gehen an den Relay-Handler

use sprechfunk_core::ConnectionId;
use sprechfunk_protocol::{ClientNachricht, SitzungsNachricht};

use crate::handlers::{call_handler, floor_handler, relay_handler, session_handler};
use crate::registry::Session;
use crate::server_state::SignalingState;

/// Verarbeitet einen empfangenen Frame einer Verbindung
pub fn dispatch(state: &mut SignalingState, connection_id: ConnectionId, text: &str) {
    let nachricht = match ClientNachricht::parsen(text) {
        Ok(n) => n,
        Err(e) if e.ist_nachrichtenfehler() => {
            tracing::warn!(
                connection_id = %connection_id,
                fehler = %e,
                "Ungueltige Nachricht verworfen"
            );
            state.metriken.verworfen_zaehlen("malformed");
            return;
        }
        Err(e) => {
            tracing::error!(
                connection_id = %connection_id,
                fehler = %e,
                "Nachricht konnte nicht verarbeitet werden"
            );
            state.metriken.verworfen_zaehlen("internal");
            return;
        }
    };

    state.metriken.nachricht_zaehlen(nachricht.typ_name());

    match nachricht {
        ClientNachricht::Join(req) => session_handler::handle_join(req, connection_id, state),
        ClientNachricht::Sitzung(nachricht) => {
            let Some(session) = state.registry.session(connection_id).cloned() else {
                tracing::debug!(
                    connection_id = %connection_id,
                    typ = nachricht.typ_name(),
                    "Nachricht vor join ignoriert"
                );
                state.metriken.verworfen_zaehlen("not_joined");
                return;
            };
            dispatch_angemeldet(nachricht, &session, state);
        }
    }
}

/// Routet Nachrichten die eine Session voraussetzen
fn dispatch_angemeldet(nachricht: SitzungsNachricht, session: &Session, state: &mut SignalingState) {
    match nachricht {
        // -------------------------------------------------------------------
        // Anruf-Steuerung
        // -------------------------------------------------------------------
        SitzungsNachricht::Call(req) => call_handler::handle_call(req, session, state),
        SitzungsNachricht::AcceptCall(req) => call_handler::handle_accept_call(req, session, state),
        SitzungsNachricht::EndCall => call_handler::handle_end_call(session, state),

        // -------------------------------------------------------------------
        // Floor Control
        // -------------------------------------------------------------------
        SitzungsNachricht::Talking => floor_handler::handle_talking(session, state),
        SitzungsNachricht::StoppedTalking => floor_handler::handle_stopped_talking(session, state),

        // -------------------------------------------------------------------
        // WebRTC-Signaling und alles Unbekannte
        // -------------------------------------------------------------------
        SitzungsNachricht::Relay(relay) => relay_handler::handle_relay(relay, session, state),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
