//! sprechfunk-signaling – WebSocket Signaling-Relay
//!
//! Dieser Crate implementiert den Signaling-Service fuer Sprechfunk. Er
//! nimmt WebSocket-Verbindungen an, verwaltet Sessions und Raeume, steuert
//! Anrufe zwischen zwei Benutzern, vergibt das Rederecht (Push-to-Talk) und
//! leitet WebRTC-Signaling (SDP, ICE) unveraendert in den Raum weiter.
//!
//! ## Architektur
//!
//! ```text
//! axum WebSocket-Endpoint (signaling_router)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task, nur I/O)
//!     |  mpsc<Ereignis>
//!     v
//! SignalingWorker (genau einer, besitzt SignalingState)
//!     |
//!     v
//! Dispatcher
//!     |
//!     +-- SessionHandler (join, Disconnect)
//!     +-- CallHandler    (call, accept-call, end-call)
//!     +-- FloorHandler   (talking, stopped-talking)
//!     +-- RelayHandler   (alles Unbekannte)
//!
//! SessionRegistry – Wer ist angemeldet, in welchem Raum
//! RoomRouter      – Frames an Verbindungen und Raeume zustellen
//! FloorControl    – Hoechstens ein Sprecher pro privatem Raum
//! ```

pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod floor;
pub mod handlers;
pub mod registry;
pub mod server_state;
pub mod worker;
pub mod ws;

// Bequeme Re-Exporte
pub use broadcast::{Ausgehend, ClientSender, RoomRouter};
pub use connection::ClientConnection;
pub use error::{SignalingError, SignalingResult};
pub use floor::{FloorControl, FloorErgebnis};
pub use registry::{Session, SessionRegistry};
pub use server_state::{SignalingConfig, SignalingState};
pub use worker::{Ereignis, SignalingHandle, SignalingWorker};
pub use ws::signaling_router;
