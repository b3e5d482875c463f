//! # modlink-proto
//!
//! Fixed-size frame codec for modlink hardware module networks.
//!
//! Every command and telemetry message exchanged with a module network
//! travels as one 16-byte frame over the BLE data characteristic. This crate
//! is the pure codec half of the transport: it converts between the typed
//! [`Message`] and the wire frame, and between [`Message`] and the compact
//! JSON record used for logs and interop.
//!
//! ## Frame layout
//!
//! ```text
//! [instruction:2][source:2][destination:2][length:2][payload:0-8][zero fill]
//!   little-endian u16 header fields                   raw bytes    to 16
//! ```
//!
//! ## Example
//!
//! ```rust
//! use modlink_proto::{Message, BROADCAST_ID};
//!
//! let msg = Message::new(9, 0, BROADCAST_ID, [0x06, 0x08]);
//! let frame = msg.encode().unwrap();
//! assert_eq!(frame.len(), 16);
//! assert_eq!(Message::decode(&frame).unwrap(), msg);
//! ```
//!
//! ## Crate Family
//!
//! This crate is part of the modlink-rs workspace:
//!
//! - **`modlink-proto`** (this crate) — frame codec and record boundary
//! - `modlink-ble` — BLE transport session built on the codec

pub mod record;
pub mod wire;

pub use record::MessageRecord;
pub use wire::{Message, WireError};

/// Total size of one wire frame.
pub const FRAME_LEN: usize = 16;

/// Header bytes preceding the payload.
pub const HEADER_LEN: usize = 8;

/// Maximum payload bytes one frame can carry.
pub const PAYLOAD_CAPACITY: usize = 8;

/// Destination id addressing every module on the network.
pub const BROADCAST_ID: u16 = 0xFFF;
