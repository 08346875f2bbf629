use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ProtocolError;
use crate::messaging::cipher::{ProtocolAddress, SessionCipher};
use crate::messaging::envelope::{CiphertextMessage, WireType};

/// Toy cipher for tests: XORs with a fixed byte, emits a prekey message for
/// the first encryption to each remote and ordinary messages afterwards.
/// Bodies registered with [`StubCipher::poison`] fail to decrypt.
#[derive(Default)]
pub struct StubCipher {
    established: Mutex<HashSet<ProtocolAddress>>,
    poisoned: Mutex<HashSet<Vec<u8>>>,
    pub pre_key_decrypts: Mutex<usize>,
    pub whisper_decrypts: Mutex<usize>,
}

const KEY: u8 = 0x5a;

fn xor(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|b| b ^ KEY).collect()
}

impl StubCipher {
    pub fn poison(&self, body: &[u8]) {
        self.poisoned.lock().insert(body.to_vec());
    }

    fn open(&self, body: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        if self.poisoned.lock().contains(body) {
            return Err(ProtocolError::DecryptFailure("bad MAC".into()));
        }
        Ok(xor(body))
    }
}

#[async_trait]
impl SessionCipher for StubCipher {
    async fn encrypt(
        &self,
        remote: &ProtocolAddress,
        plaintext: &[u8],
    ) -> Result<CiphertextMessage, ProtocolError> {
        let first = self.established.lock().insert(remote.clone());
        let wire_type = if first {
            WireType::PreKey
        } else {
            WireType::Whisper
        };
        Ok(CiphertextMessage::new(wire_type, xor(plaintext)))
    }

    async fn decrypt_pre_key_message(
        &self,
        _remote: &ProtocolAddress,
        body: &[u8],
    ) -> Result<Vec<u8>, ProtocolError> {
        *self.pre_key_decrypts.lock() += 1;
        self.open(body)
    }

    async fn decrypt_message(
        &self,
        _remote: &ProtocolAddress,
        body: &[u8],
    ) -> Result<Vec<u8>, ProtocolError> {
        *self.whisper_decrypts.lock() += 1;
        self.open(body)
    }
}

/// Cipher whose encryption always fails.
pub struct OfflineCipher;

#[async_trait]
impl SessionCipher for OfflineCipher {
    async fn encrypt(
        &self,
        remote: &ProtocolAddress,
        _plaintext: &[u8],
    ) -> Result<CiphertextMessage, ProtocolError> {
        Err(ProtocolError::EncryptFailure(format!("no session with {remote}")))
    }

    async fn decrypt_pre_key_message(
        &self,
        _remote: &ProtocolAddress,
        _body: &[u8],
    ) -> Result<Vec<u8>, ProtocolError> {
        Err(ProtocolError::DecryptFailure("offline".into()))
    }

    async fn decrypt_message(
        &self,
        _remote: &ProtocolAddress,
        _body: &[u8],
    ) -> Result<Vec<u8>, ProtocolError> {
        Err(ProtocolError::DecryptFailure("offline".into()))
    }
}
