use std::fmt;

use async_trait::async_trait;

use crate::error::ProtocolError;
use crate::messaging::envelope::CiphertextMessage;

/// A peer device: account address plus device id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProtocolAddress {
    pub name: String,
    pub device_id: u32,
}

impl ProtocolAddress {
    pub fn new(name: impl Into<String>, device_id: u32) -> Self {
        Self {
            name: name.into(),
            device_id,
        }
    }
}

impl fmt::Display for ProtocolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.device_id)
    }
}

/// Session cipher capability backed by the local device's key store.
///
/// The ratchet itself lives behind this trait. Implementations own their
/// session state; calls for the same remote are never issued concurrently.
#[async_trait]
pub trait SessionCipher: Send + Sync {
    /// Encrypt for `remote`. Returns a prekey ciphertext while the session is
    /// still being established, an ordinary one afterwards.
    async fn encrypt(
        &self,
        remote: &ProtocolAddress,
        plaintext: &[u8],
    ) -> Result<CiphertextMessage, ProtocolError>;

    /// Decrypt a session-establishing ciphertext from `remote`.
    async fn decrypt_pre_key_message(
        &self,
        remote: &ProtocolAddress,
        body: &[u8],
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Decrypt an ordinary ciphertext from `remote`.
    async fn decrypt_message(
        &self,
        remote: &ProtocolAddress,
        body: &[u8],
    ) -> Result<Vec<u8>, ProtocolError>;
}
