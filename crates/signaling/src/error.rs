//! Fehlertypen fuer den Signaling-Service

use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Der Signaling-Worker nimmt keine Ereignisse mehr an
    #[error("Signaling-Worker beendet")]
    WorkerBeendet,

    /// Server ist voll
    #[error("Server ist voll")]
    ServerVoll,
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;
