//! Session-Registry – Ein Session-Eintrag pro angemeldeter Verbindung
//!
//! Eine Session entsteht erst mit `join`, nicht beim Oeffnen der Verbindung,
//! und verschwindet wenn die Verbindung geschlossen wird. Raeume sind keine
//! eigenen Objekte: ein Raum ist die Menge der Sessions deren `current_room`
//! gleich ist. Der Raum-Index spiegelt diese Menge, damit der Router nicht
//! ueber alle Sessions iterieren muss.

use sprechfunk_core::ConnectionId;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Zustand einer angemeldeten Verbindung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    /// Vom Client gewaehlter Anzeigename (nicht eindeutig)
    pub username: String,
    /// Raum dessen Broadcasts die Session aktuell empfaengt
    pub current_room: String,
    /// Raum in den die Session nach einem Anruf zurueckkehrt
    pub lobby_room: String,
}

impl Session {
    /// `true` solange die Session nicht in ihrer Lobby ist
    pub fn im_anruf(&self) -> bool {
        self.current_room != self.lobby_room
    }
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

/// Verwaltet alle Sessions und den Raum-Index
///
/// Wird ausschliesslich vom Signaling-Worker gehalten, daher ohne Locks.
/// Sessions sind nach ConnectionId sortiert, d.h. in Verbindungsreihenfolge.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<ConnectionId, Session>,
    /// Raum -> Verbindungen deren `current_room` dieser Raum ist
    raum_index: HashMap<String, BTreeSet<ConnectionId>>,
}

impl SessionRegistry {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Legt die Session einer Verbindung an
    ///
    /// `current_room` und `lobby_room` werden beide auf `room` gesetzt. Ein
    /// bestehender Eintrag wird still ueberschrieben (erneutes `join`).
    pub fn registrieren(&mut self, connection_id: ConnectionId, username: String, room: String) {
        if let Some(alt) = self.sessions.get(&connection_id) {
            let alter_raum = alt.current_room.clone();
            self.aus_index_entfernen(connection_id, &alter_raum);
        }

        self.raum_index
            .entry(room.clone())
            .or_default()
            .insert(connection_id);

        self.sessions.insert(
            connection_id,
            Session {
                connection_id,
                username,
                current_room: room.clone(),
                lobby_room: room,
            },
        );
    }

    /// Gibt die Session einer Verbindung zurueck
    pub fn session(&self, connection_id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&connection_id)
    }

    /// Sucht die erste Verbindung mit diesem Anzeigenamen
    ///
    /// Lineare Suche in Verbindungsreihenfolge. Bei doppelten Namen gewinnt
    /// die am laengsten offene Verbindung.
    pub fn nach_username_suchen(&self, username: &str) -> Option<ConnectionId> {
        self.sessions
            .values()
            .find(|s| s.username == username)
            .map(|s| s.connection_id)
    }

    /// Setzt den aktuellen Raum einer Session
    ///
    /// Gibt `false` zurueck wenn die Verbindung keine Session hat.
    pub fn raum_setzen(&mut self, connection_id: ConnectionId, raum: &str) -> bool {
        let alter_raum = match self.sessions.get_mut(&connection_id) {
            Some(session) => std::mem::replace(&mut session.current_room, raum.to_owned()),
            None => return false,
        };

        self.aus_index_entfernen(connection_id, &alter_raum);
        self.raum_index
            .entry(raum.to_owned())
            .or_default()
            .insert(connection_id);
        true
    }

    /// Entfernt die Session einer Verbindung (No-op wenn nicht vorhanden)
    pub fn entfernen(&mut self, connection_id: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&connection_id)?;
        self.aus_index_entfernen(connection_id, &session.current_room);
        Some(session)
    }

    /// Gibt alle Verbindungen zurueck deren aktueller Raum `raum` ist
    pub fn verbindungen_in_raum(&self, raum: &str) -> Vec<ConnectionId> {
        self.raum_index
            .get(raum)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Anzahl der angemeldeten Sessions
    pub fn anzahl(&self) -> usize {
        self.sessions.len()
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden
    // -----------------------------------------------------------------------

    fn aus_index_entfernen(&mut self, connection_id: ConnectionId, raum: &str) {
        if let Some(ids) = self.raum_index.get_mut(raum) {
            ids.remove(&connection_id);
            if ids.is_empty() {
                self.raum_index.remove(raum);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId(n)
    }

    #[test]
    fn registrieren_setzt_raum_und_lobby() {
        let mut reg = SessionRegistry::neu();
        reg.registrieren(conn(1), "A".into(), "lobby".into());

        let s = reg.session(conn(1)).expect("Session muss existieren");
        assert_eq!(s.username, "A");
        assert_eq!(s.current_room, "lobby");
        assert_eq!(s.lobby_room, "lobby");
        assert!(!s.im_anruf());
        assert_eq!(reg.verbindungen_in_raum("lobby"), vec![conn(1)]);
    }

    #[test]
    fn erneutes_join_ueberschreibt_still() {
        let mut reg = SessionRegistry::neu();
        reg.registrieren(conn(1), "A".into(), "lobby".into());
        reg.raum_setzen(conn(1), "call-A-B");
        reg.registrieren(conn(1), "A2".into(), "flur".into());

        let s = reg.session(conn(1)).unwrap();
        assert_eq!(s.username, "A2");
        assert_eq!(s.current_room, "flur");
        assert_eq!(s.lobby_room, "flur");
        assert!(reg.verbindungen_in_raum("call-A-B").is_empty());
        assert!(reg.verbindungen_in_raum("lobby").is_empty());
        assert_eq!(reg.anzahl(), 1);
    }

    #[test]
    fn suche_nach_username() {
        let mut reg = SessionRegistry::neu();
        reg.registrieren(conn(1), "A".into(), "lobby".into());
        reg.registrieren(conn(2), "B".into(), "lobby".into());

        assert_eq!(reg.nach_username_suchen("B"), Some(conn(2)));
        assert_eq!(reg.nach_username_suchen("C"), None);
    }

    #[test]
    fn doppelter_username_liefert_aelteste_verbindung() {
        let mut reg = SessionRegistry::neu();
        reg.registrieren(conn(5), "A".into(), "lobby".into());
        reg.registrieren(conn(3), "A".into(), "lobby".into());

        assert_eq!(reg.nach_username_suchen("A"), Some(conn(3)));
    }

    #[test]
    fn raum_setzen_aktualisiert_index_lobby_bleibt() {
        let mut reg = SessionRegistry::neu();
        reg.registrieren(conn(1), "A".into(), "lobby".into());
        reg.registrieren(conn(2), "B".into(), "lobby".into());

        assert!(reg.raum_setzen(conn(1), "call-A-B"));
        assert_eq!(reg.verbindungen_in_raum("lobby"), vec![conn(2)]);
        assert_eq!(reg.verbindungen_in_raum("call-A-B"), vec![conn(1)]);

        let s = reg.session(conn(1)).unwrap();
        assert_eq!(s.lobby_room, "lobby");
        assert!(s.im_anruf());
    }

    #[test]
    fn raum_setzen_ohne_session() {
        let mut reg = SessionRegistry::neu();
        assert!(!reg.raum_setzen(conn(9), "x"));
        assert!(reg.verbindungen_in_raum("x").is_empty());
    }

    #[test]
    fn entfernen_und_doppeltes_entfernen() {
        let mut reg = SessionRegistry::neu();
        reg.registrieren(conn(1), "A".into(), "lobby".into());

        assert!(reg.entfernen(conn(1)).is_some());
        assert!(reg.entfernen(conn(1)).is_none());
        assert!(reg.session(conn(1)).is_none());
        assert!(reg.verbindungen_in_raum("lobby").is_empty());
        assert_eq!(reg.anzahl(), 0);
    }
}
