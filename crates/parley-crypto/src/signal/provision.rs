//! Creation of a fresh local identity and its published bundle.
//!
//! Key generation itself is an external capability ([`KeyHelper`]).
//! [`DalekKeyHelper`] is the default: an Ed25519 identity key that signs
//! X25519 prekeys.
//!
//! Prekey and signed-prekey ids are drawn independently at random from
//! `0..key_id_upper_bound`. Nothing prevents two draws (or two identities)
//! from colliding; a collision silently overwrites in whichever store sees
//! both ids.

use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::Rng;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

use crate::config::ProvisioningConfig;
use crate::error::CryptoError;
use crate::signal::directory::PreKeyDirectory;
use crate::signal::prekeys::{
    FullDirectoryEntry, KeyPair, PreKeyPair, SignedPreKeyPair, SignedPublicPreKey,
};
use crate::signal::store::{populate_store, LocalKeyStore, StoreEntry};

/// Largest registration id handed out (14-bit space, zero excluded).
pub const MAX_REGISTRATION_ID: u32 = 16_380;

/// Key-generation capability used during provisioning.
#[async_trait]
pub trait KeyHelper: Send + Sync {
    fn generate_registration_id(&self) -> u32;

    async fn generate_identity_key_pair(&self) -> Result<KeyPair, CryptoError>;

    async fn generate_pre_key(&self, key_id: u32) -> Result<PreKeyPair, CryptoError>;

    /// Generate a prekey and sign its public half with `identity`.
    async fn generate_signed_pre_key(
        &self,
        identity: &KeyPair,
        key_id: u32,
    ) -> Result<SignedPreKeyPair, CryptoError>;
}

/// Default key generation on `ed25519-dalek` / `x25519-dalek`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DalekKeyHelper;

#[async_trait]
impl KeyHelper for DalekKeyHelper {
    fn generate_registration_id(&self) -> u32 {
        rand::thread_rng().gen_range(1..=MAX_REGISTRATION_ID)
    }

    async fn generate_identity_key_pair(&self) -> Result<KeyPair, CryptoError> {
        let signing_key = SigningKey::generate(&mut OsRng);
        Ok(KeyPair {
            public_key: signing_key.verifying_key().to_bytes().to_vec(),
            private_key: signing_key.to_bytes().to_vec(),
        })
    }

    async fn generate_pre_key(&self, key_id: u32) -> Result<PreKeyPair, CryptoError> {
        Ok(PreKeyPair {
            key_id,
            key_pair: x25519_key_pair(),
        })
    }

    async fn generate_signed_pre_key(
        &self,
        identity: &KeyPair,
        key_id: u32,
    ) -> Result<SignedPreKeyPair, CryptoError> {
        let secret: [u8; 32] = identity.private_key.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidKey("identity key wrong length for signing".into())
        })?;
        let signing_key = SigningKey::from_bytes(&secret);

        let key_pair = x25519_key_pair();
        let signature = signing_key.sign(&key_pair.public_key);

        Ok(SignedPreKeyPair {
            key_id,
            key_pair,
            signature: signature.to_bytes().to_vec(),
        })
    }
}

fn x25519_key_pair() -> KeyPair {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = X25519Public::from(&secret);
    KeyPair {
        public_key: public.as_bytes().to_vec(),
        private_key: secret.to_bytes().to_vec(),
    }
}

/// Check a peer's signed prekey against its Ed25519 identity key.
pub fn verify_signed_pre_key(
    identity_pub_key: &[u8],
    signed_pre_key: &SignedPublicPreKey,
) -> Result<(), CryptoError> {
    let key_bytes: [u8; 32] = identity_pub_key
        .try_into()
        .map_err(|_| CryptoError::InvalidKey("identity key must be 32 bytes".into()))?;
    let verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| CryptoError::VerificationError(format!("invalid identity key: {e}")))?;

    let signature = Signature::from_slice(&signed_pre_key.signature)
        .map_err(|e| CryptoError::VerificationError(format!("malformed signature: {e}")))?;

    verifying_key
        .verify(&signed_pre_key.public_key, &signature)
        .map_err(|e| CryptoError::VerificationError(e.to_string()))
}

/// Private and public halves of a freshly created identity.
#[derive(Debug, Clone)]
pub struct ProvisionedIdentity {
    pub bundle: FullDirectoryEntry,
    pub store_entry: StoreEntry,
}

fn random_key_id(config: &ProvisioningConfig) -> u32 {
    rand::thread_rng().gen_range(0..config.key_id_upper_bound.max(1))
}

/// Generate registration id, identity, one one-time prekey and a signed
/// prekey. Any failing step aborts the whole operation, as does a
/// registration id outside `1..=MAX_REGISTRATION_ID`.
pub async fn create_store_bundle(
    helper: &dyn KeyHelper,
    config: &ProvisioningConfig,
) -> Result<ProvisionedIdentity, CryptoError> {
    let registration_id = helper.generate_registration_id();
    if !(1..=MAX_REGISTRATION_ID).contains(&registration_id) {
        return Err(CryptoError::KeyGeneration(format!(
            "registration id {registration_id} outside 1..={MAX_REGISTRATION_ID}"
        )));
    }
    let identity_key = helper.generate_identity_key_pair().await?;

    let pre_key = helper.generate_pre_key(random_key_id(config)).await?;
    let signed_pre_key = helper
        .generate_signed_pre_key(&identity_key, random_key_id(config))
        .await?;

    let bundle = FullDirectoryEntry {
        registration_id,
        identity_pub_key: identity_key.public_key.clone(),
        signed_pre_key: signed_pre_key.public(),
        one_time_pre_keys: std::iter::once(pre_key.public()).collect(),
    };

    tracing::debug!(
        registration_id,
        identity = %hex::encode(&identity_key.public_key[..identity_key.public_key.len().min(8)]),
        pre_key_id = pre_key.key_id,
        signed_pre_key_id = signed_pre_key.key_id,
        "created store bundle"
    );

    Ok(ProvisionedIdentity {
        bundle,
        store_entry: StoreEntry {
            registration_id,
            identity_key,
            pre_key,
            signed_pre_key,
        },
    })
}

/// Create a new identity, load its private keys into `store` and publish its
/// bundle in `directory` under `name`.
pub async fn create_id(
    directory: &PreKeyDirectory,
    name: &str,
    store: &dyn LocalKeyStore,
    helper: &dyn KeyHelper,
    config: &ProvisioningConfig,
) -> Result<ProvisionedIdentity, CryptoError> {
    let provisioned = create_store_bundle(helper, config).await?;
    populate_store(store, &provisioned.store_entry)?;
    directory.store_key_bundle(name, provisioned.bundle.clone());

    tracing::info!(peer = %name, "identity provisioned");
    Ok(provisioned)
}
