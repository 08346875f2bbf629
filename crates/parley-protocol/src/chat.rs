//! Contacts and the session handshake exchanged before the first message.

use parley_crypto::signal::{
    deserialize_bundle, verify_signed_pre_key, DeviceBundle, SerializableFullDirectoryEntry,
    SerializedStoreEntry,
};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::messaging::cipher::ProtocolAddress;
use crate::messaging::envelope::{now_millis, ProcessedChatMessage};

/// A contact (or the local user) as kept by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatUser {
    pub address: String,
    pub name: String,
    pub accepted: bool,
    pub active: bool,
    #[serde(default)]
    pub chats: Vec<ProcessedChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_for_session: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_pending_chats: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// The contact's published bundle, as last received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<SerializableFullDirectoryEntry>,
    /// Local user only: our own private store entry, persisted locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<SerializedStoreEntry>,
}

impl ChatUser {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            accepted: false,
            active: false,
            chats: Vec::new(),
            waiting_for_session: None,
            has_pending_chats: None,
            device_id: None,
            image: None,
            bundle: None,
            store: None,
        }
    }

    pub fn with_device_id(mut self, device_id: u32) -> Self {
        self.device_id = Some(device_id);
        self
    }

    /// The contact's device address; a session needs a known device id.
    pub fn protocol_address(&self) -> Result<ProtocolAddress, ProtocolError> {
        let device_id = self
            .device_id
            .ok_or_else(|| ProtocolError::MissingDeviceId(self.address.clone()))?;
        Ok(ProtocolAddress::new(self.address.clone(), device_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMessageKind {
    SessionRequest,
    SessionResponse,
}

/// Handshake offering the sender's public bundle to a new contact.
///
/// Only the public bundle travels; the sender's private store entry stays on
/// the sending device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMessage {
    pub recipient_address: String,
    pub sender_address: String,
    pub sender_device_id: u32,
    pub sender_bundle: SerializableFullDirectoryEntry,
    pub sender_name: String,
    #[serde(default)]
    pub sender_image: String,
    #[serde(rename = "type")]
    pub kind: SessionMessageKind,
    /// Unix milliseconds, as a string.
    pub timestamp: String,
}

impl SessionMessage {
    pub fn new(
        kind: SessionMessageKind,
        sender: &ChatUser,
        recipient_address: &str,
        sender_bundle: SerializableFullDirectoryEntry,
    ) -> Result<Self, ProtocolError> {
        let sender_device_id = sender
            .device_id
            .ok_or_else(|| ProtocolError::MissingDeviceId(sender.address.clone()))?;

        Ok(Self {
            recipient_address: recipient_address.to_string(),
            sender_address: sender.address.clone(),
            sender_device_id,
            sender_bundle,
            sender_name: sender.name.clone(),
            sender_image: sender.image.clone().unwrap_or_default(),
            kind,
            timestamp: now_millis().to_string(),
        })
    }

    pub fn sender_protocol_address(&self) -> ProtocolAddress {
        ProtocolAddress::new(self.sender_address.clone(), self.sender_device_id)
    }

    /// Check the bundle's signed prekey against its identity key.
    pub fn verify_sender_bundle(&self) -> Result<(), ProtocolError> {
        let bundle = parley_crypto::signal::deserialize_full_bundle(&self.sender_bundle)?;
        verify_signed_pre_key(&bundle.identity_pub_key, &bundle.signed_pre_key)?;
        Ok(())
    }

    /// Session-establishment bundle for the sender, taking the oldest
    /// one-time prekey it offered.
    pub fn device_bundle(&self) -> Result<DeviceBundle, ProtocolError> {
        Ok(deserialize_bundle(&self.sender_bundle)?)
    }

    /// A contact entry for the sender, holding on to their published bundle.
    pub fn sender_user(&self) -> ChatUser {
        let mut user = ChatUser::new(self.sender_address.clone(), self.sender_name.clone())
            .with_device_id(self.sender_device_id);
        user.image = (!self.sender_image.is_empty()).then(|| self.sender_image.clone());
        user.bundle = Some(self.sender_bundle.clone());
        user.waiting_for_session = Some(self.kind == SessionMessageKind::SessionRequest);
        user
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json)
            .map_err(|e| ProtocolError::Deserialization(format!("session message: {e}")))
    }
}
