use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("no key bundle stored for peer: {0}")]
    UnknownPeer(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("signing failed: {0}")]
    SigningError(String),

    #[error("verification failed: {0}")]
    VerificationError(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("key storage error: {0}")]
    StorageError(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
