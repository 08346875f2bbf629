use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unsupported message type: {0}")]
    UnsupportedMessageType(u32),

    #[error("decryption failed: {0}")]
    DecryptFailure(String),

    #[error("encryption failed: {0}")]
    EncryptFailure(String),

    #[error("plaintext is not valid UTF-8: {0}")]
    Decode(String),

    #[error("no device id known for {0}")]
    MissingDeviceId(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("crypto error: {0}")]
    CryptoError(String),
}

impl From<parley_crypto::CryptoError> for ProtocolError {
    fn from(e: parley_crypto::CryptoError) -> Self {
        Self::CryptoError(e.to_string())
    }
}
