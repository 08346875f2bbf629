pub mod directory;
pub mod memory_stores;
pub mod prekeys;
pub mod provision;
pub mod serialize;
pub mod store;

pub use directory::PreKeyDirectory;
pub use memory_stores::MemoryKeyStore;
pub use prekeys::{
    DeviceBundle, FullDirectoryEntry, KeyPair, OneTimePreKeyQueue, PreKey, PreKeyPair,
    SignedPreKeyPair, SignedPublicPreKey,
};
pub use provision::{
    create_id, create_store_bundle, verify_signed_pre_key, DalekKeyHelper, KeyHelper,
    ProvisionedIdentity,
};
pub use serialize::{
    deserialize_bundle, deserialize_full_bundle, deserialize_store, serialize_bundle,
    serialize_store, SerializableFullDirectoryEntry, SerializedStoreEntry,
};
pub use store::{populate_store, LocalKeyStore, StoreEntry};
