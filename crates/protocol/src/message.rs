//! Signaling-Nachrichten (WebSocket, JSON)
//!
//! Jede Nachricht ist ein JSON-Objekt mit einem Diskriminator-Feld `type`.
//! Ein WebSocket-Frame traegt genau eine Nachricht.
//!
//! ## Design
//! - Eingehende Nachrichten: geschlossener Enum `ClientNachricht` ueber den
//!   bekannten Katalog plus `Relay`-Zweig fuer alles Unbekannte
//! - Ausgehende Nachrichten: `ServerNachricht`, serde-getaggt (`type`)
//! - Relay-Nachrichten behalten den exakt empfangenen Text

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sprechfunk_core::{Result, SprechfunkError};

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Anmeldung mit Anzeigename und Lobby-Raum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub username: String,
    pub room: String,
}

/// Anruf-Einladung an einen anderen Benutzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub to: String,
}

/// Annahme eines Anrufs mit dem genannten Gegenueber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptCallRequest {
    pub with: String,
}

/// Nicht interpretierte Nachricht (SDP, ICE-Kandidaten, zukuenftige Typen)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayNachricht {
    /// Wert des `type`-Felds, falls vorhanden und ein String
    pub typ: Option<String>,
    /// Exakt empfangener Nachrichtentext
    pub roh: String,
}

/// Alle Nachrichten die ein Client senden kann
///
/// `join` ist die einzige Nachricht ohne bestehende Session; alles andere
/// steckt in `Sitzung`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientNachricht {
    Join(JoinRequest),
    Sitzung(SitzungsNachricht),
}

/// Nachrichten die eine angemeldete Session voraussetzen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitzungsNachricht {
    Call(CallRequest),
    AcceptCall(AcceptCallRequest),
    EndCall,
    Talking,
    StoppedTalking,
    /// Alles Unbekannte wird unveraendert in den Raum weitergeleitet
    Relay(RelayNachricht),
}

/// Katalog-Typen mit serverseitiger Bedeutung
///
/// Dient nur dem Parsen; unbekannte Typen landen im Relay-Zweig.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum KatalogNachricht {
    Join(JoinRequest),
    Call(CallRequest),
    AcceptCall(AcceptCallRequest),
    EndCall,
    Talking,
    StoppedTalking,
}

/// Typnamen des Katalogs (Wert des `type`-Felds)
pub const KATALOG_TYPEN: [&str; 6] = [
    "join",
    "call",
    "accept-call",
    "end-call",
    "talking",
    "stopped-talking",
];

impl ClientNachricht {
    /// Parst einen empfangenen Frame
    ///
    /// Fehler betreffen nur diese eine Nachricht:
    /// - kein JSON oder kein JSON-Objekt
    /// - bekannter `type` mit fehlenden oder falsch typisierten Feldern
    pub fn parsen(text: &str) -> Result<Self> {
        let wert: Value = serde_json::from_str(text)
            .map_err(|e| SprechfunkError::ungueltig(format!("kein gueltiges JSON: {e}")))?;

        let typ = match &wert {
            Value::Object(objekt) => objekt.get("type").and_then(Value::as_str),
            _ => return Err(SprechfunkError::ungueltig("Nachricht ist kein JSON-Objekt")),
        };

        let typ = match typ {
            Some(t) if KATALOG_TYPEN.contains(&t) => t.to_owned(),
            andere => {
                return Ok(Self::Sitzung(SitzungsNachricht::Relay(RelayNachricht {
                    typ: andere.map(str::to_owned),
                    roh: text.to_owned(),
                })));
            }
        };

        let nachricht = serde_json::from_value::<KatalogNachricht>(wert).map_err(|e| {
            SprechfunkError::UngueltigesFeld {
                typ,
                grund: e.to_string(),
            }
        })?;

        let sitzung = match nachricht {
            KatalogNachricht::Join(req) => return Ok(Self::Join(req)),
            KatalogNachricht::Call(req) => SitzungsNachricht::Call(req),
            KatalogNachricht::AcceptCall(req) => SitzungsNachricht::AcceptCall(req),
            KatalogNachricht::EndCall => SitzungsNachricht::EndCall,
            KatalogNachricht::Talking => SitzungsNachricht::Talking,
            KatalogNachricht::StoppedTalking => SitzungsNachricht::StoppedTalking,
        };
        Ok(Self::Sitzung(sitzung))
    }

    /// Kurzname fuer Logs und Metrik-Labels
    pub fn typ_name(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Sitzung(n) => n.typ_name(),
        }
    }
}

impl SitzungsNachricht {
    /// Kurzname fuer Logs und Metrik-Labels
    pub fn typ_name(&self) -> &'static str {
        match self {
            Self::Call(_) => "call",
            Self::AcceptCall(_) => "accept-call",
            Self::EndCall => "end-call",
            Self::Talking => "talking",
            Self::StoppedTalking => "stopped-talking",
            Self::Relay(_) => "relay",
        }
    }
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Nachrichten die nur der Server erzeugt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerNachricht {
    /// Eingehender Anruf (nur an das Ziel)
    IncomingCall { from: String },
    /// Beide Teilnehmer sind im privaten Raum
    CallStarted,
    /// Anruf beendet, Teilnehmer zurueck in ihrer Lobby
    CallEnded,
    /// `user` haelt jetzt das Mikrofon
    Talking { user: String },
    /// Das Mikrofon ist frei
    StoppedTalking,
}

impl ServerNachricht {
    /// Serialisiert die Nachricht als JSON-Text
    pub fn zu_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SprechfunkError::intern(format!("Serialisierung fehlgeschlagen: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_parsen() {
        let n = ClientNachricht::parsen(r#"{"type":"join","username":"A","room":"lobby"}"#)
            .unwrap();
        assert_eq!(
            n,
            ClientNachricht::Join(JoinRequest {
                username: "A".into(),
                room: "lobby".into(),
            })
        );
    }

    #[test]
    fn call_und_accept_parsen() {
        let call = ClientNachricht::parsen(r#"{"type":"call","to":"B"}"#).unwrap();
        assert_eq!(
            call,
            ClientNachricht::Sitzung(SitzungsNachricht::Call(CallRequest { to: "B".into() }))
        );

        let accept = ClientNachricht::parsen(r#"{"type":"accept-call","with":"A"}"#).unwrap();
        assert_eq!(
            accept,
            ClientNachricht::Sitzung(SitzungsNachricht::AcceptCall(AcceptCallRequest {
                with: "A".into()
            }))
        );
    }

    #[test]
    fn einheits_typen_ignorieren_zusatzfelder() {
        assert_eq!(
            ClientNachricht::parsen(r#"{"type":"end-call"}"#).unwrap(),
            ClientNachricht::Sitzung(SitzungsNachricht::EndCall)
        );
        assert_eq!(
            ClientNachricht::parsen(r#"{"type":"talking","user":"egal"}"#).unwrap(),
            ClientNachricht::Sitzung(SitzungsNachricht::Talking)
        );
        assert_eq!(
            ClientNachricht::parsen(r#"{"type":"stopped-talking"}"#).unwrap(),
            ClientNachricht::Sitzung(SitzungsNachricht::StoppedTalking)
        );
    }

    #[test]
    fn unbekannter_typ_wird_relay_mit_originaltext() {
        let text = r#"{"type":"offer", "sdp":"v=0\r\n"}"#;
        match ClientNachricht::parsen(text).unwrap() {
            ClientNachricht::Sitzung(SitzungsNachricht::Relay(relay)) => {
                assert_eq!(relay.typ.as_deref(), Some("offer"));
                assert_eq!(relay.roh, text, "Relay muss den Text unveraendert behalten");
            }
            andere => panic!("Relay erwartet, erhalten: {andere:?}"),
        }
    }

    #[test]
    fn objekt_ohne_typ_wird_relay() {
        match ClientNachricht::parsen(r#"{"candidate":"abc"}"#).unwrap() {
            ClientNachricht::Sitzung(SitzungsNachricht::Relay(relay)) => {
                assert!(relay.typ.is_none())
            }
            andere => panic!("Relay erwartet, erhalten: {andere:?}"),
        }
    }

    #[test]
    fn kein_json_ist_fehler() {
        let e = ClientNachricht::parsen("hallo{").unwrap_err();
        assert!(e.ist_nachrichtenfehler());
    }

    #[test]
    fn kein_objekt_ist_fehler() {
        assert!(ClientNachricht::parsen("[1,2,3]").is_err());
        assert!(ClientNachricht::parsen("42").is_err());
    }

    #[test]
    fn bekannter_typ_mit_fehlendem_feld_ist_fehler() {
        let e = ClientNachricht::parsen(r#"{"type":"join","username":"A"}"#).unwrap_err();
        assert!(matches!(e, SprechfunkError::UngueltigesFeld { ref typ, .. } if typ == "join"));

        let e = ClientNachricht::parsen(r#"{"type":"call","to":5}"#).unwrap_err();
        assert!(e.ist_nachrichtenfehler());
    }

    #[test]
    fn typ_namen() {
        assert_eq!(
            ClientNachricht::Sitzung(SitzungsNachricht::EndCall).typ_name(),
            "end-call"
        );
        let relay = ClientNachricht::Sitzung(SitzungsNachricht::Relay(RelayNachricht {
            typ: None,
            roh: "{}".into(),
        }));
        assert_eq!(relay.typ_name(), "relay");
    }

    #[test]
    fn server_nachrichten_wire_format() {
        assert_eq!(
            ServerNachricht::IncomingCall { from: "A".into() }.zu_json().unwrap(),
            r#"{"type":"incoming-call","from":"A"}"#
        );
        assert_eq!(
            ServerNachricht::CallStarted.zu_json().unwrap(),
            r#"{"type":"call-started"}"#
        );
        assert_eq!(
            ServerNachricht::CallEnded.zu_json().unwrap(),
            r#"{"type":"call-ended"}"#
        );
        assert_eq!(
            ServerNachricht::Talking { user: "A".into() }.zu_json().unwrap(),
            r#"{"type":"talking","user":"A"}"#
        );
        assert_eq!(
            ServerNachricht::StoppedTalking.zu_json().unwrap(),
            r#"{"type":"stopped-talking"}"#
        );
    }
}
