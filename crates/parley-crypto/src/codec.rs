//! Binary <-> text encoding for key material.
//!
//! Every binary field that leaves memory (local storage, JSON transport) is
//! carried as standard padded base64. No other encoding is accepted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::CryptoError;

/// Encode raw bytes as standard base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 text.
///
/// Wrong alphabet, bad padding and truncated input are all rejected; the
/// result is never coerced to an empty buffer.
pub fn decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(text)
        .map_err(|e| CryptoError::Codec(format!("invalid base64: {e}")))
}

/// Serde adapter: `#[serde(with = "parley_crypto::codec::serde_bytes")]`
/// carries a `Vec<u8>` field as base64 text.
pub mod serde_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode(&text).map_err(serde::de::Error::custom)
    }
}
