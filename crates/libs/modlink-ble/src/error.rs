use modlink_proto::WireError;

/// Faults reported by the radio-adapter layer.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    /// Transient radio fault during a scan or write.
    #[error("radio fault: {0}")]
    Fault(String),

    /// The peripheral refused or dropped a connection attempt.
    #[error("not connected: {0}")]
    NotConnected(String),
}

/// Errors surfaced by link and session operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Scan budget exhausted without an exact name match.
    #[error("device '{name}' not found after {attempts} scan attempts")]
    DeviceNotFound { name: String, attempts: u32 },

    /// Connect budget exhausted against a refusing peripheral.
    #[error("failed to connect to {address} after {attempts} attempts")]
    ConnectFailed { address: String, attempts: u32 },

    /// A radio-layer fault propagated through an operation.
    #[error(transparent)]
    Radio(#[from] RadioError),

    /// Frame encode or record failure on the send path.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The session has not been opened, or a previous `open` failed.
    #[error("session is not open")]
    NotOpen,
}
