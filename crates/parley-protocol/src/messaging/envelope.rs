use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Ciphertext discriminator carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum WireType {
    /// Ordinary ratcheted ciphertext within an established session.
    Whisper = 1,
    /// Session-establishing ciphertext carrying prekey material.
    PreKey = 3,
}

impl TryFrom<u32> for WireType {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Whisper),
            3 => Ok(Self::PreKey),
            other => Err(ProtocolError::UnsupportedMessageType(other)),
        }
    }
}

impl From<WireType> for u32 {
    fn from(value: WireType) -> Self {
        value as u32
    }
}

/// Opaque ciphertext produced by the session cipher.
///
/// `message_type` is kept as the raw number so that envelopes with unknown
/// discriminators still parse and can be reported rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiphertextMessage {
    #[serde(rename = "type")]
    pub message_type: u32,
    #[serde(with = "parley_crypto::codec::serde_bytes")]
    pub body: Vec<u8>,
    #[serde(
        rename = "registrationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_id: Option<u32>,
}

impl CiphertextMessage {
    pub fn new(wire_type: WireType, body: Vec<u8>) -> Self {
        Self {
            message_type: wire_type.into(),
            body,
            registration_id: None,
        }
    }

    pub fn wire_type(&self) -> Result<WireType, ProtocolError> {
        WireType::try_from(self.message_type)
    }
}

/// Outbound envelope: routing metadata plus ciphertext, as handed to the
/// transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub to: String,
    pub from: String,
    pub message: CiphertextMessage,
    pub delivered: bool,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    /// Set when the ciphertext also carries session-establishment data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_init: Option<bool>,
}

impl ChatMessage {
    pub fn mark_delivered(&mut self) {
        self.delivered = true;
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json)
            .map_err(|e| ProtocolError::Deserialization(format!("chat message: {e}")))
    }
}

/// Local plaintext record of a message, shown in the conversation view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedChatMessage {
    pub id: u64,
    pub to: String,
    pub from: String,
    pub message_text: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,
}

impl ProcessedChatMessage {
    /// Record paired with `msg`, sharing its id, routing and timestamp.
    pub fn for_envelope(msg: &ChatMessage, message_text: String) -> Self {
        Self {
            id: msg.id,
            to: msg.to.clone(),
            from: msg.from.clone(),
            message_text,
            timestamp: msg.timestamp,
            failed: None,
        }
    }

    pub fn mark_failed(&mut self) {
        self.failed = Some(true);
    }

    pub fn is_failed(&self) -> bool {
        self.failed.unwrap_or(false)
    }
}

/// Current time as Unix milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
