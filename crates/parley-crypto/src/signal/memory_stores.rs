//! In-memory implementation of [`LocalKeyStore`].
//!
//! Suitable for tests and for running before a persistent backend is wired
//! in. Data is lost on process exit; persist through
//! [`serialize_store`](crate::signal::serialize::serialize_store) instead.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::signal::prekeys::KeyPair;
use crate::signal::store::LocalKeyStore;
use crate::CryptoError;

#[derive(Default)]
struct Inner {
    registration_id: Option<u32>,
    identity: Option<KeyPair>,
    pre_keys: HashMap<u32, KeyPair>,
    signed_pre_keys: HashMap<u32, KeyPair>,
}

/// In-memory key store for the local device.
#[derive(Default)]
pub struct MemoryKeyStore {
    inner: Mutex<Inner>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalKeyStore for MemoryKeyStore {
    fn store_registration_id(&self, registration_id: u32) -> Result<(), CryptoError> {
        self.inner.lock().registration_id = Some(registration_id);
        Ok(())
    }

    fn get_local_registration_id(&self) -> Result<Option<u32>, CryptoError> {
        Ok(self.inner.lock().registration_id)
    }

    fn store_identity_key_pair(&self, key_pair: &KeyPair) -> Result<(), CryptoError> {
        self.inner.lock().identity = Some(key_pair.clone());
        Ok(())
    }

    fn get_identity_key_pair(&self) -> Result<Option<KeyPair>, CryptoError> {
        Ok(self.inner.lock().identity.clone())
    }

    fn store_pre_key(&self, key_id: u32, key_pair: &KeyPair) -> Result<(), CryptoError> {
        self.inner.lock().pre_keys.insert(key_id, key_pair.clone());
        Ok(())
    }

    fn load_pre_key(&self, key_id: u32) -> Result<Option<KeyPair>, CryptoError> {
        Ok(self.inner.lock().pre_keys.get(&key_id).cloned())
    }

    fn remove_pre_key(&self, key_id: u32) -> Result<(), CryptoError> {
        self.inner.lock().pre_keys.remove(&key_id);
        Ok(())
    }

    fn store_signed_pre_key(&self, key_id: u32, key_pair: &KeyPair) -> Result<(), CryptoError> {
        self.inner
            .lock()
            .signed_pre_keys
            .insert(key_id, key_pair.clone());
        Ok(())
    }

    fn load_signed_pre_key(&self, key_id: u32) -> Result<Option<KeyPair>, CryptoError> {
        Ok(self.inner.lock().signed_pre_keys.get(&key_id).cloned())
    }
}
