//! Text-safe mirrors of key bundles and local store entries.
//!
//! Binary fields go through [`codec`](crate::codec); everything else is copied
//! verbatim. `deserialize_*` is the exact inverse of `serialize_*`. Malformed
//! text fails with [`CryptoError::Codec`] instead of producing empty keys.

use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::codec::{decode, encode};
use crate::error::CryptoError;
use crate::signal::prekeys::{
    DeviceBundle, FullDirectoryEntry, KeyPair, PreKey, PreKeyPair, SignedPreKeyPair,
    SignedPublicPreKey,
};
use crate::signal::store::StoreEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializablePreKey {
    pub key_id: u32,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializableSignedPublicPreKey {
    pub key_id: u32,
    pub public_key: String,
    pub signature: String,
}

/// Published bundle as stored or sent to peers. One-time prekeys are listed
/// oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializableFullDirectoryEntry {
    pub registration_id: u32,
    pub identity_pub_key: String,
    pub signed_pre_key: SerializableSignedPublicPreKey,
    pub one_time_pre_keys: Vec<SerializablePreKey>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct SerializedKeyPair {
    pub pub_key: String,
    pub priv_key: String,
}

impl std::fmt::Debug for SerializedKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializedKeyPair")
            .field("pub_key", &self.pub_key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedPreKeyPair {
    pub key_id: u32,
    pub key_pair: SerializedKeyPair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSignedPreKeyPair {
    pub key_id: u32,
    pub key_pair: SerializedKeyPair,
    pub signature: String,
}

/// Private local store entry in text form. Still secret: persist it locally,
/// never publish it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedStoreEntry {
    pub registration_id: u32,
    pub identity_key: SerializedKeyPair,
    pub pre_key: SerializedPreKeyPair,
    pub signed_pre_key: SerializedSignedPreKeyPair,
}

// ── Public bundles ───────────────────────────────────────────────────

pub fn serialize_bundle(bundle: &FullDirectoryEntry) -> SerializableFullDirectoryEntry {
    SerializableFullDirectoryEntry {
        registration_id: bundle.registration_id,
        identity_pub_key: encode(&bundle.identity_pub_key),
        signed_pre_key: SerializableSignedPublicPreKey {
            key_id: bundle.signed_pre_key.key_id,
            public_key: encode(&bundle.signed_pre_key.public_key),
            signature: encode(&bundle.signed_pre_key.signature),
        },
        one_time_pre_keys: bundle
            .one_time_pre_keys
            .iter()
            .map(|key| SerializablePreKey {
                key_id: key.key_id,
                public_key: encode(&key.public_key),
            })
            .collect(),
    }
}

/// Exact inverse of [`serialize_bundle`]; keeps the whole one-time reserve.
pub fn deserialize_full_bundle(
    serialized: &SerializableFullDirectoryEntry,
) -> Result<FullDirectoryEntry, CryptoError> {
    let one_time_pre_keys = serialized
        .one_time_pre_keys
        .iter()
        .map(|key| {
            Ok(PreKey {
                key_id: key.key_id,
                public_key: decode(&key.public_key)?,
            })
        })
        .collect::<Result<_, CryptoError>>()?;

    Ok(FullDirectoryEntry {
        registration_id: serialized.registration_id,
        identity_pub_key: decode(&serialized.identity_pub_key)?,
        signed_pre_key: SignedPublicPreKey {
            key_id: serialized.signed_pre_key.key_id,
            public_key: decode(&serialized.signed_pre_key.public_key)?,
            signature: decode(&serialized.signed_pre_key.signature)?,
        },
        one_time_pre_keys,
    })
}

/// Turn a bundle received from a peer straight into a session-establishment
/// bundle. Exposes exactly one one-time prekey (the oldest), chosen the same
/// way the directory issues them.
pub fn deserialize_bundle(
    serialized: &SerializableFullDirectoryEntry,
) -> Result<DeviceBundle, CryptoError> {
    Ok(deserialize_full_bundle(serialized)?.take_device_bundle())
}

// ── Private store entries ────────────────────────────────────────────

fn serialize_key_pair(pair: &KeyPair) -> SerializedKeyPair {
    SerializedKeyPair {
        pub_key: encode(&pair.public_key),
        priv_key: encode(&pair.private_key),
    }
}

fn deserialize_key_pair(pair: &SerializedKeyPair) -> Result<KeyPair, CryptoError> {
    Ok(KeyPair {
        public_key: decode(&pair.pub_key)?,
        private_key: decode(&pair.priv_key)?,
    })
}

pub fn serialize_store(entry: &StoreEntry) -> SerializedStoreEntry {
    SerializedStoreEntry {
        registration_id: entry.registration_id,
        identity_key: serialize_key_pair(&entry.identity_key),
        pre_key: SerializedPreKeyPair {
            key_id: entry.pre_key.key_id,
            key_pair: serialize_key_pair(&entry.pre_key.key_pair),
        },
        signed_pre_key: SerializedSignedPreKeyPair {
            key_id: entry.signed_pre_key.key_id,
            key_pair: serialize_key_pair(&entry.signed_pre_key.key_pair),
            signature: encode(&entry.signed_pre_key.signature),
        },
    }
}

pub fn deserialize_store(serialized: &SerializedStoreEntry) -> Result<StoreEntry, CryptoError> {
    Ok(StoreEntry {
        registration_id: serialized.registration_id,
        identity_key: deserialize_key_pair(&serialized.identity_key)?,
        pre_key: PreKeyPair {
            key_id: serialized.pre_key.key_id,
            key_pair: deserialize_key_pair(&serialized.pre_key.key_pair)?,
        },
        signed_pre_key: SignedPreKeyPair {
            key_id: serialized.signed_pre_key.key_id,
            key_pair: deserialize_key_pair(&serialized.signed_pre_key.key_pair)?,
            signature: decode(&serialized.signed_pre_key.signature)?,
        },
    })
}
