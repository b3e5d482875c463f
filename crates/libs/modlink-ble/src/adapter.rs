//! Radio-adapter boundary.
//!
//! Everything the transport needs from the host's BLE driver, kept narrow so
//! the connection state machine stays testable against scripted
//! implementations. Platform details (adapter power state, GATT discovery,
//! characteristic I/O) live entirely behind this trait;
//! [`Link`](crate::link::Link) and [`BleSession`](crate::session::BleSession)
//! add the retry and framing semantics on top.

use std::pin::Pin;
use std::time::Duration;

use futures::stream::Stream;
use uuid::Uuid;

use crate::error::RadioError;

/// Raw notification frames as delivered by the peripheral.
pub type NotificationStream = Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>;

/// One scan result entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// Advertised device name, when present.
    pub name: Option<String>,
    /// Peer address the entry can be connected through.
    pub address: String,
}

/// Host radio driver capabilities consumed by the transport.
#[allow(async_fn_in_trait)]
pub trait RadioAdapter {
    /// Bring the host radio interface up.
    async fn power_on(&mut self) -> Result<(), RadioError>;

    /// Power the host radio interface down.
    async fn power_off(&mut self) -> Result<(), RadioError>;

    /// Run one discovery pass and return every sighted peer.
    async fn scan(&mut self, privileged: bool) -> Result<Vec<ScanEntry>, RadioError>;

    /// Connect to a peer, bounded by `timeout`.
    async fn connect(&mut self, address: &str, timeout: Duration) -> Result<(), RadioError>;

    /// Subscribe to notifications on `characteristic` and return its frame
    /// stream. The stream outlives the borrow and is drained by the session's
    /// notification task.
    async fn subscribe(&mut self, characteristic: Uuid) -> Result<NotificationStream, RadioError>;

    /// Write one frame to `characteristic`, blocking until the underlying
    /// write completes.
    async fn write(&mut self, characteristic: Uuid, bytes: &[u8]) -> Result<(), RadioError>;

    /// Drop the peer link and release adapter resources.
    async fn disconnect(&mut self) -> Result<(), RadioError>;
}
