//! Handler fuer alle Client-Nachrichten
//!
//! Jeder Handler ist fuer einen Nachrichtentyp zustaendig und arbeitet
//! direkt auf dem `SignalingState` des Workers. Handler antworten nie mit
//! Fehlern: unbekannte Ziele und unpassende Zustaende werden still verworfen
//! und nur geloggt bzw. gezaehlt.

pub mod call_handler;
pub mod floor_handler;
pub mod relay_handler;
pub mod session_handler;
