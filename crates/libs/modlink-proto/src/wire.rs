//! Module frame encode/decode.
//!
//! One frame is exactly [`FRAME_LEN`] bytes: four little-endian `u16` header
//! fields (instruction, source, destination, payload length) followed by up
//! to [`PAYLOAD_CAPACITY`] payload bytes and zero fill.

use crate::{BROADCAST_ID, FRAME_LEN, HEADER_LEN, PAYLOAD_CAPACITY};

/// Errors from frame and record operations.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Payload over frame capacity, or a record whose declared length does
    /// not match its decoded payload bytes.
    #[error(
        "invalid payload length: declared {declared}, got {actual} bytes \
         (capacity {PAYLOAD_CAPACITY})"
    )]
    InvalidPayloadLength { declared: usize, actual: usize },

    /// Received frame shorter than its header plus declared payload length.
    #[error("truncated frame: need {expected} bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },

    /// Record payload text is not valid base64.
    #[error("invalid base64 payload: {0}")]
    PayloadEncoding(#[from] base64::DecodeError),

    /// Record text is not valid JSON.
    #[error("record parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One decoded module network message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Semantic command or event code.
    pub instruction: u16,
    /// Originating module id.
    pub source: u16,
    /// Target module id, or [`BROADCAST_ID`] for every module.
    pub destination: u16,
    /// Raw payload bytes, at most [`PAYLOAD_CAPACITY`].
    pub payload: Vec<u8>,
}

impl Message {
    /// Create a message from its parts.
    pub fn new(
        instruction: u16,
        source: u16,
        destination: u16,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            instruction,
            source,
            destination,
            payload: payload.into(),
        }
    }

    /// The fixed control message broadcast at shutdown so every attached
    /// module reboots and stops emitting channel traffic.
    pub fn reboot_broadcast() -> Self {
        Self::new(9, 0, BROADCAST_ID, [0x06, 0x08])
    }

    /// Encode to one wire frame.
    ///
    /// Fails with [`WireError::InvalidPayloadLength`] when the payload does
    /// not fit the frame. Bytes past the payload are zero.
    pub fn encode(&self) -> Result<[u8; FRAME_LEN], WireError> {
        let len = self.payload.len();
        if len > PAYLOAD_CAPACITY {
            return Err(WireError::InvalidPayloadLength {
                declared: len,
                actual: len,
            });
        }

        let mut frame = [0u8; FRAME_LEN];
        frame[0..2].copy_from_slice(&self.instruction.to_le_bytes());
        frame[2..4].copy_from_slice(&self.source.to_le_bytes());
        frame[4..6].copy_from_slice(&self.destination.to_le_bytes());
        frame[6..8].copy_from_slice(&(len as u16).to_le_bytes());
        frame[HEADER_LEN..HEADER_LEN + len].copy_from_slice(&self.payload);
        Ok(frame)
    }

    /// Decode one received frame.
    ///
    /// The payload length is trusted from the frame header, but the buffer is
    /// bounds-checked first: a frame shorter than `HEADER_LEN + length` is
    /// rejected as [`WireError::TruncatedFrame`] instead of fabricating
    /// payload bytes. Trailing bytes past the declared payload are ignored.
    pub fn decode(data: &[u8]) -> Result<Self, WireError> {
        if data.len() < HEADER_LEN {
            return Err(WireError::TruncatedFrame {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }

        let instruction = u16::from_le_bytes([data[0], data[1]]);
        let source = u16::from_le_bytes([data[2], data[3]]);
        let destination = u16::from_le_bytes([data[4], data[5]]);
        let length = u16::from_le_bytes([data[6], data[7]]) as usize;

        if data.len() < HEADER_LEN + length {
            return Err(WireError::TruncatedFrame {
                expected: HEADER_LEN + length,
                actual: data.len(),
            });
        }

        Ok(Self {
            instruction,
            source,
            destination,
            payload: data[HEADER_LEN..HEADER_LEN + length].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_valid_payload_lengths() {
        for len in 0..=PAYLOAD_CAPACITY {
            let msg = Message::new(0x0102, 0x0304, 0x0506, vec![0xAB; len]);
            let frame = msg.encode().expect("encode");
            assert_eq!(Message::decode(&frame).expect("decode"), msg);
        }
    }

    #[test]
    fn frame_is_always_16_bytes() {
        for len in [0, 3, PAYLOAD_CAPACITY] {
            let frame = Message::new(1, 2, 3, vec![0xFF; len]).encode().expect("encode");
            assert_eq!(frame.len(), FRAME_LEN);
        }
    }

    #[test]
    fn rejects_oversize_payload() {
        let msg = Message::new(1, 2, 3, vec![0; PAYLOAD_CAPACITY + 1]);
        assert!(matches!(
            msg.encode(),
            Err(WireError::InvalidPayloadLength { declared: 9, actual: 9 })
        ));
    }

    #[test]
    fn reboot_broadcast_wire_form() {
        let frame = Message::reboot_broadcast().encode().expect("encode");
        assert_eq!(hex::encode(frame), "09000000ff0f02000608000000000000");
    }

    #[test]
    fn padding_bytes_are_zero() {
        let frame = Message::new(1, 2, 3, [0xAA, 0xBB]).encode().expect("encode");
        assert!(frame[HEADER_LEN + 2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn rejects_buffer_shorter_than_header() {
        assert!(matches!(
            Message::decode(&[0; 5]),
            Err(WireError::TruncatedFrame { expected: 8, actual: 5 })
        ));
    }

    #[test]
    fn rejects_frame_claiming_more_payload_than_present() {
        let mut frame = [0u8; FRAME_LEN];
        frame[6] = 9; // declared length exceeds the 8 bytes actually present
        assert!(matches!(
            Message::decode(&frame),
            Err(WireError::TruncatedFrame { expected: 17, actual: 16 })
        ));
    }

    #[test]
    fn decode_takes_exactly_declared_payload() {
        let mut frame = Message::new(7, 1, 2, [0x11, 0x22]).encode().expect("encode");
        // Garbage past the declared payload must not leak into the message.
        frame[12] = 0xEE;
        let msg = Message::decode(&frame).expect("decode");
        assert_eq!(msg.payload, vec![0x11, 0x22]);
    }

    #[test]
    fn header_fields_are_little_endian() {
        let frame = Message::new(0x1234, 0x5678, 0x9ABC, []).encode().expect("encode");
        assert_eq!(frame[0..2], [0x34, 0x12]);
        assert_eq!(frame[2..4], [0x78, 0x56]);
        assert_eq!(frame[4..6], [0xBC, 0x9A]);
    }
}
