//! Relay-Handler – Unbekannte Nachrichten unveraendert weiterleiten
//!
//! SDP-Offers/Answers, ICE-Kandidaten und alle zukuenftigen Typen gehen
//! ohne Pruefung an alle Sessions im aktuellen Raum des Absenders,
//! einschliesslich des Absenders selbst.

use sprechfunk_protocol::RelayNachricht;

use crate::broadcast::Ausgehend;
use crate::registry::Session;
use crate::server_state::SignalingState;

/// Leitet eine nicht interpretierte Nachricht in den Raum des Absenders weiter
pub fn handle_relay(nachricht: RelayNachricht, absender: &Session, state: &mut SignalingState) {
    let RelayNachricht { typ, roh } = nachricht;

    let empfaenger = state.router.frame_an_raum(
        &state.registry,
        &absender.current_room,
        Ausgehend::from(roh),
    );

    tracing::trace!(
        connection_id = %absender.connection_id,
        raum = %absender.current_room,
        typ = ?typ,
        empfaenger,
        "Signaling-Nachricht weitergeleitet"
    );
}
