//! # modlink-ble
//!
//! BLE transport session for modlink hardware module networks.
//!
//! A module network exposes one GATT data characteristic carrying the fixed
//! 16-byte frames defined by [`modlink_proto`]. This crate discovers the
//! network's peripheral by advertised name, connects with bounded retries,
//! decodes notification frames into a non-blocking receive queue, and tears
//! the link down with a broadcast reboot so modules stop emitting channel
//! traffic.
//!
//! The host's BLE driver sits behind the [`RadioAdapter`] trait;
//! [`NativeRadio`] implements it over btleplug, and tests drive the same
//! state machines against scripted adapters.
//!
//! ## Example
//!
//! ```rust,no_run
//! use modlink_ble::{BleSession, LinkSettings, NativeRadio};
//! use modlink_proto::Message;
//!
//! # async fn example() -> Result<(), modlink_ble::LinkError> {
//! let settings = LinkSettings::new("MODI_4DD5FA00");
//! let mut session = BleSession::new(NativeRadio::new(), settings);
//!
//! session.open().await?;
//! session.send(&Message::new(4, 0, 0x10, [0x01])).await?;
//! while let Some(msg) = session.recv() {
//!     println!("{}", msg.to_json()?);
//! }
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod link;
pub mod queue;
pub mod session;

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
pub mod native;

pub use adapter::{NotificationStream, RadioAdapter, ScanEntry};
pub use error::{LinkError, RadioError};
pub use link::{Link, LinkSettings};
pub use queue::RecvQueue;
pub use session::BleSession;

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
pub use native::NativeRadio;

use uuid::Uuid;

/// GATT characteristic carrying module frames in both directions.
pub const DATA_CHARACTERISTIC: Uuid = Uuid::from_u128(0x00008421_0000_1000_8000_00805F9B34FB);
