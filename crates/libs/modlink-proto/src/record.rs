//! Human-readable record boundary.
//!
//! For logs and interop every message also has a compact JSON form with the
//! exact key set and order `c`, `s`, `d`, `b`, `l`, where `b` carries the
//! payload as standard base64 text and `l` its byte count. Existing producers
//! and consumers of this representation depend on both the key names and the
//! field order, so [`MessageRecord`] declares its fields in emission order.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::wire::{Message, WireError};
use crate::PAYLOAD_CAPACITY;

/// Compact serialized form of one [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Instruction code.
    #[serde(rename = "c")]
    pub instruction: u16,
    /// Source module id.
    #[serde(rename = "s")]
    pub source: u16,
    /// Destination module id.
    #[serde(rename = "d")]
    pub destination: u16,
    /// Payload as base64 text.
    #[serde(rename = "b")]
    pub payload: String,
    /// Declared payload byte count.
    #[serde(rename = "l")]
    pub length: u16,
}

impl Message {
    /// Build the compact record form.
    pub fn to_record(&self) -> MessageRecord {
        MessageRecord {
            instruction: self.instruction,
            source: self.source,
            destination: self.destination,
            payload: BASE64.encode(&self.payload),
            length: self.payload.len() as u16,
        }
    }

    /// Serialize to the compact JSON text form.
    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    /// Parse the compact JSON text form.
    pub fn from_json(text: &str) -> Result<Self, WireError> {
        let record: MessageRecord = serde_json::from_str(text)?;
        Self::from_record(&record)
    }

    /// Convert a record back into a message.
    ///
    /// The declared `l` must match the decoded payload byte count and stay
    /// within frame capacity; the loosely-typed producers of this format are
    /// not trusted implicitly.
    pub fn from_record(record: &MessageRecord) -> Result<Self, WireError> {
        let payload = BASE64.decode(&record.payload)?;
        if payload.len() != record.length as usize || payload.len() > PAYLOAD_CAPACITY {
            return Err(WireError::InvalidPayloadLength {
                declared: record.length as usize,
                actual: payload.len(),
            });
        }
        Ok(Self {
            instruction: record.instruction,
            source: record.source,
            destination: record.destination,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_text_matches_producer_form() {
        let text = Message::reboot_broadcast().to_json().expect("to_json");
        assert_eq!(text, r#"{"c":9,"s":0,"d":4095,"b":"Bgg=","l":2}"#);
    }

    #[test]
    fn json_roundtrip() {
        let msg = Message::new(0x101, 7, 0x202, [1, 2, 3, 4, 5]);
        let text = msg.to_json().expect("to_json");
        assert_eq!(Message::from_json(&text).expect("from_json"), msg);
    }

    #[test]
    fn empty_payload_roundtrips() {
        let msg = Message::from_json(r#"{"c":1,"s":2,"d":3,"b":"","l":0}"#).expect("from_json");
        assert!(msg.payload.is_empty());
        assert_eq!(msg.to_json().expect("to_json"), r#"{"c":1,"s":2,"d":3,"b":"","l":0}"#);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = Message::from_json(r#"{"c":1,"s":2,"d":3,"b":"Bgg=","l":3}"#)
            .expect_err("mismatched length should fail");
        assert!(matches!(
            err,
            WireError::InvalidPayloadLength { declared: 3, actual: 2 }
        ));
    }

    #[test]
    fn rejects_payload_over_capacity() {
        let payload = BASE64.encode([0u8; 9]);
        let text = format!(r#"{{"c":1,"s":2,"d":3,"b":"{payload}","l":9}}"#);
        assert!(matches!(
            Message::from_json(&text),
            Err(WireError::InvalidPayloadLength { declared: 9, actual: 9 })
        ));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            Message::from_json(r#"{"c":1,"s":2,"d":3,"b":"@@","l":2}"#),
            Err(WireError::PayloadEncoding(_))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Message::from_json("not a record"),
            Err(WireError::Json(_))
        ));
    }
}
