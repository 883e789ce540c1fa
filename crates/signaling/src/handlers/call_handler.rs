//! Call-Handler – call, accept-call, end-call
//!
//! ## Ablauf
//! ```text
//! Lobby --call--> (Ringing, nur Benachrichtigung) --accept-call--> InCall
//!   ^                                                              |
//!   +------------------------- end-call ---------------------------+
//! ```
//!
//! Der private Raum eines Anrufs wird aus beiden Anzeigenamen abgeleitet.
//! Derselbe Annehmende und dasselbe Gegenueber ergeben immer denselben Namen.

use sprechfunk_protocol::{AcceptCallRequest, CallRequest, ServerNachricht};

use crate::registry::Session;
use crate::server_state::SignalingState;

/// Leitet den Namen des privaten Raums ab
///
/// `annehmender` ist der Absender von `accept-call`, `gegenueber` dessen
/// `with`-Feld.
pub fn privater_raum(annehmender: &str, gegenueber: &str) -> String {
    format!("call-{annehmender}-{gegenueber}")
}

/// Verarbeitet `call {to}`
///
/// Benachrichtigt nur das Ziel mit `incoming-call`. Kein Zustandswechsel,
/// unbekannte Ziele werden still verworfen.
pub fn handle_call(request: CallRequest, anrufer: &Session, state: &mut SignalingState) {
    let Some(ziel) = state.registry.nach_username_suchen(&request.to) else {
        tracing::debug!(
            von = %anrufer.username,
            an = %request.to,
            "Anruf an unbekannten Benutzer verworfen"
        );
        state.metriken.verworfen_zaehlen("unknown_target");
        return;
    };

    state.router.an_verbindung_senden(
        ziel,
        &ServerNachricht::IncomingCall {
            from: anrufer.username.clone(),
        },
    );

    tracing::info!(von = %anrufer.username, an = %request.to, "Anruf signalisiert");
}

/// Verarbeitet `accept-call {with}`
///
/// Verschiebt beide Sessions in den abgeleiteten privaten Raum, setzt dessen
/// Floor-Eintrag auf frei und sendet `call-started` an beide. Ein vorheriges
/// `call` wird nicht verlangt.
pub fn handle_accept_call(
    request: AcceptCallRequest,
    annehmender: &Session,
    state: &mut SignalingState,
) {
    let Some(gegenueber) = state.registry.nach_username_suchen(&request.with) else {
        tracing::debug!(
            username = %annehmender.username,
            with = %request.with,
            "accept-call fuer unbekannten Benutzer verworfen"
        );
        state.metriken.verworfen_zaehlen("unknown_target");
        return;
    };

    let raum = privater_raum(&annehmender.username, &request.with);

    state.registry.raum_setzen(annehmender.connection_id, &raum);
    state.registry.raum_setzen(gegenueber, &raum);
    state.floor.raum_initialisieren(&raum);

    state
        .router
        .an_verbindung_senden(annehmender.connection_id, &ServerNachricht::CallStarted);
    if gegenueber != annehmender.connection_id {
        state
            .router
            .an_verbindung_senden(gegenueber, &ServerNachricht::CallStarted);
    }

    tracing::info!(
        username = %annehmender.username,
        with = %request.with,
        raum = %raum,
        "Anruf gestartet"
    );
}

/// Verarbeitet `end-call`
///
/// Loescht den Floor-Eintrag des aktuellen Raums und schickt jede Session
/// in diesem Raum zurueck in ihre eigene Lobby, jeweils mit `call-ended`.
/// Ohne aktiven Anruf (Absender in seiner Lobby) passiert nichts.
pub fn handle_end_call(session: &Session, state: &mut SignalingState) {
    if !session.im_anruf() {
        tracing::debug!(
            username = %session.username,
            "end-call ohne aktiven Anruf ignoriert"
        );
        state.metriken.verworfen_zaehlen("no_active_call");
        return;
    }

    let raum = session.current_room.clone();
    state.floor.raum_entfernen(&raum);

    let mut beendet = 0;
    for connection_id in state.registry.verbindungen_in_raum(&raum) {
        let Some(lobby) = state
            .registry
            .session(connection_id)
            .map(|s| s.lobby_room.clone())
        else {
            continue;
        };

        state.registry.raum_setzen(connection_id, &lobby);
        state
            .router
            .an_verbindung_senden(connection_id, &ServerNachricht::CallEnded);
        beendet += 1;
    }

    tracing::info!(
        username = %session.username,
        raum = %raum,
        teilnehmer = beendet,
        "Anruf beendet"
    );
}
