use crate::signal::prekeys::{KeyPair, PreKeyPair, SignedPreKeyPair};
use crate::CryptoError;

/// Private key material for the local device: identity, one one-time prekey
/// and the signed prekey. Never published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub registration_id: u32,
    pub identity_key: KeyPair,
    pub pre_key: PreKeyPair,
    pub signed_pre_key: SignedPreKeyPair,
}

/// Storage trait for the local device's private keys.
///
/// The session cipher reads from this store; provisioning writes to it.
pub trait LocalKeyStore: Send + Sync {
    /// Record our registration ID.
    fn store_registration_id(&self, registration_id: u32) -> Result<(), CryptoError>;

    /// Get our local registration ID, if provisioned.
    fn get_local_registration_id(&self) -> Result<Option<u32>, CryptoError>;

    /// Record our identity key pair.
    fn store_identity_key_pair(&self, key_pair: &KeyPair) -> Result<(), CryptoError>;

    /// Get our identity key pair, if provisioned.
    fn get_identity_key_pair(&self) -> Result<Option<KeyPair>, CryptoError>;

    /// Store a one-time prekey.
    fn store_pre_key(&self, key_id: u32, key_pair: &KeyPair) -> Result<(), CryptoError>;

    /// Load a one-time prekey by ID.
    fn load_pre_key(&self, key_id: u32) -> Result<Option<KeyPair>, CryptoError>;

    /// Remove a consumed one-time prekey.
    fn remove_pre_key(&self, key_id: u32) -> Result<(), CryptoError>;

    /// Store a signed prekey.
    fn store_signed_pre_key(&self, key_id: u32, key_pair: &KeyPair) -> Result<(), CryptoError>;

    /// Load a signed prekey by ID.
    fn load_signed_pre_key(&self, key_id: u32) -> Result<Option<KeyPair>, CryptoError>;
}

/// Write every key of `entry` into `store`.
pub fn populate_store(store: &dyn LocalKeyStore, entry: &StoreEntry) -> Result<(), CryptoError> {
    store.store_registration_id(entry.registration_id)?;
    store.store_identity_key_pair(&entry.identity_key)?;
    store.store_pre_key(entry.pre_key.key_id, &entry.pre_key.key_pair)?;
    store.store_signed_pre_key(entry.signed_pre_key.key_id, &entry.signed_pre_key.key_pair)?;

    tracing::debug!(
        registration_id = entry.registration_id,
        pre_key_id = entry.pre_key.key_id,
        signed_pre_key_id = entry.signed_pre_key.key_id,
        "local key store populated"
    );
    Ok(())
}
