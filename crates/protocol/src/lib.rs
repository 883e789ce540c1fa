//! sprechfunk-protocol – Signaling-Protokoll-Definitionen
//!
//! Dieses Crate definiert alle Nachrichtentypen die zwischen Client und
//! Server ueber die WebSocket-Verbindung ausgetauscht werden.

pub mod message;

pub use message::{
    AcceptCallRequest, CallRequest, ClientNachricht, JoinRequest, RelayNachricht, ServerNachricht,
    SitzungsNachricht,
};
