//! Per-peer directory of published key bundles.
//!
//! Issuance of one-time prekeys is serialized per address: each entry sits
//! behind its own mutex, and the outer map lock is only held long enough to
//! find (or insert) that entry. Distinct peers never contend on entry locks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::CryptoError;
use crate::signal::prekeys::{DeviceBundle, FullDirectoryEntry, PreKey};
use crate::signal::serialize::{serialize_bundle, SerializableFullDirectoryEntry};

/// Authoritative map from peer address to that peer's current key bundle.
///
/// Construct one explicitly and share it behind an `Arc`; there is no
/// process-wide instance.
#[derive(Default)]
pub struct PreKeyDirectory {
    entries: RwLock<HashMap<String, Arc<Mutex<FullDirectoryEntry>>>>,
}

impl PreKeyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace the bundle for `address`. No merging.
    pub fn store_key_bundle(&self, address: &str, bundle: FullDirectoryEntry) {
        tracing::debug!(
            peer = %address,
            registration_id = bundle.registration_id,
            one_time_pre_keys = bundle.one_time_pre_keys.len(),
            "storing key bundle"
        );

        let mut entries = self.entries.write();
        match entries.get(address) {
            // Replace in place so a concurrent issuance on the old bundle
            // finishes before the new one becomes visible.
            Some(slot) => *slot.lock() = bundle,
            None => {
                entries.insert(address.to_string(), Arc::new(Mutex::new(bundle)));
            }
        }
    }

    /// Append one-time prekeys to the tail of the peer's reserve.
    pub fn add_one_time_pre_keys<I>(&self, address: &str, keys: I) -> Result<(), CryptoError>
    where
        I: IntoIterator<Item = PreKey>,
    {
        let slot = self.slot(address)?;
        let mut entry = slot.lock();
        let before = entry.one_time_pre_keys.len();
        entry.one_time_pre_keys.extend(keys);

        tracing::debug!(
            peer = %address,
            added = entry.one_time_pre_keys.len() - before,
            remaining = entry.one_time_pre_keys.len(),
            "one-time prekeys added"
        );
        Ok(())
    }

    /// Issue a session-establishment bundle for `address`.
    ///
    /// Every call permanently removes the oldest one-time prekey (if any).
    /// This is not an idempotent read.
    pub fn get_pre_key_bundle(&self, address: &str) -> Result<DeviceBundle, CryptoError> {
        let slot = self.slot(address)?;
        let mut entry = slot.lock();
        let bundle = entry.take_device_bundle();

        match &bundle.pre_key {
            Some(key) => tracing::debug!(
                peer = %address,
                key_id = key.key_id,
                remaining = entry.one_time_pre_keys.len(),
                "issued one-time prekey"
            ),
            None => tracing::debug!(
                peer = %address,
                "one-time prekeys exhausted, issuing signed prekey only"
            ),
        }

        Ok(bundle)
    }

    /// Whether a bundle has been stored for `address`.
    pub fn contains(&self, address: &str) -> bool {
        self.entries.read().contains_key(address)
    }

    /// Number of one-time prekeys still available for `address`.
    pub fn remaining_one_time_pre_keys(&self, address: &str) -> Result<usize, CryptoError> {
        Ok(self.slot(address)?.lock().one_time_pre_keys.len())
    }

    /// Export the full public entry for `address` without consuming anything.
    pub fn serialized_bundle(
        &self,
        address: &str,
    ) -> Result<SerializableFullDirectoryEntry, CryptoError> {
        let slot = self.slot(address)?;
        let entry = slot.lock();
        Ok(serialize_bundle(&entry))
    }

    fn slot(&self, address: &str) -> Result<Arc<Mutex<FullDirectoryEntry>>, CryptoError> {
        self.entries.read().get(address).cloned().ok_or_else(|| {
            tracing::warn!(peer = %address, "no key bundle for peer");
            CryptoError::UnknownPeer(address.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::signal::prekeys::{OneTimePreKeyQueue, SignedPublicPreKey};

    fn key(id: u32) -> PreKey {
        PreKey {
            key_id: id,
            public_key: id.to_le_bytes().to_vec(),
        }
    }

    fn bundle(registration_id: u32, keys: Vec<PreKey>) -> FullDirectoryEntry {
        FullDirectoryEntry {
            registration_id,
            identity_pub_key: vec![0x11; 32],
            signed_pre_key: SignedPublicPreKey {
                key_id: 500,
                public_key: vec![0x22; 32],
                signature: vec![0x33; 64],
            },
            one_time_pre_keys: keys.into_iter().collect::<OneTimePreKeyQueue>(),
        }
    }

    fn issued_id(directory: &PreKeyDirectory, address: &str) -> Option<u32> {
        directory
            .get_pre_key_bundle(address)
            .unwrap()
            .pre_key
            .map(|k| k.key_id)
    }

    #[test]
    fn issues_one_time_keys_in_fifo_order_across_additions() {
        let directory = PreKeyDirectory::new();
        directory.store_key_bundle("bob", bundle(1, vec![key(1), key(2)]));
        directory.add_one_time_pre_keys("bob", vec![key(3)]).unwrap();

        assert_eq!(issued_id(&directory, "bob"), Some(1));
        assert_eq!(issued_id(&directory, "bob"), Some(2));
        assert_eq!(issued_id(&directory, "bob"), Some(3));
        assert_eq!(issued_id(&directory, "bob"), None);
    }

    #[test]
    fn exhausted_reserve_still_yields_identity_and_signed_prekey() {
        let directory = PreKeyDirectory::new();
        directory.store_key_bundle("bob", bundle(42, vec![]));

        let issued = directory.get_pre_key_bundle("bob").unwrap();
        assert_eq!(issued.registration_id, 42);
        assert_eq!(issued.identity_key, vec![0x11; 32]);
        assert_eq!(issued.signed_pre_key.key_id, 500);
        assert!(issued.pre_key.is_none());
    }

    #[test]
    fn unknown_peer_is_reported() {
        let directory = PreKeyDirectory::new();

        assert!(matches!(
            directory.add_one_time_pre_keys("nobody", vec![key(1)]),
            Err(CryptoError::UnknownPeer(addr)) if addr == "nobody"
        ));
        assert!(matches!(
            directory.get_pre_key_bundle("nobody"),
            Err(CryptoError::UnknownPeer(_))
        ));
        assert!(directory.remaining_one_time_pre_keys("nobody").is_err());
        assert!(!directory.contains("nobody"));
    }

    #[test]
    fn store_overwrites_instead_of_merging() {
        let directory = PreKeyDirectory::new();
        directory.store_key_bundle("bob", bundle(1, vec![key(1), key(2)]));
        directory.store_key_bundle("bob", bundle(2, vec![key(9)]));

        let issued = directory.get_pre_key_bundle("bob").unwrap();
        assert_eq!(issued.registration_id, 2);
        assert_eq!(issued.pre_key.map(|k| k.key_id), Some(9));
        assert_eq!(directory.remaining_one_time_pre_keys("bob").unwrap(), 0);
    }

    #[test]
    fn peers_are_independent() {
        let directory = PreKeyDirectory::new();
        directory.store_key_bundle("alice", bundle(1, vec![key(10)]));
        directory.store_key_bundle("bob", bundle(2, vec![key(20)]));

        assert_eq!(issued_id(&directory, "bob"), Some(20));
        assert_eq!(directory.remaining_one_time_pre_keys("alice").unwrap(), 1);
        assert_eq!(issued_id(&directory, "alice"), Some(10));
    }

    #[test]
    fn serialized_export_does_not_consume() {
        let directory = PreKeyDirectory::new();
        directory.store_key_bundle("bob", bundle(1, vec![key(1), key(2)]));

        let exported = directory.serialized_bundle("bob").unwrap();
        assert_eq!(exported.one_time_pre_keys.len(), 2);
        assert_eq!(directory.remaining_one_time_pre_keys("bob").unwrap(), 2);
    }

    #[test]
    fn concurrent_issuance_never_double_issues() {
        let directory = Arc::new(PreKeyDirectory::new());
        directory.store_key_bundle("bob", bundle(1, (0..200).map(key).collect()));

        let issued: Vec<u32> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let directory = Arc::clone(&directory);
                    scope.spawn(move || {
                        (0..40)
                            .filter_map(|_| issued_id(&directory, "bob"))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(issued.len(), 200);
        let unique: HashSet<u32> = issued.iter().copied().collect();
        assert_eq!(unique.len(), 200);
    }

    mod proptests {
        use std::collections::VecDeque;

        use proptest::collection::vec;
        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            /// Append this many fresh keys.
            Add(u32),
            Issue,
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            prop_oneof![(0u32..4).prop_map(Op::Add), Just(Op::Issue)]
        }

        proptest! {
            /// Issuance under any interleaving of additions matches a FIFO
            /// model, and no key is ever handed out twice.
            #[test]
            fn prop_issuance_matches_fifo_model(
                initial in 0u32..5,
                ops in vec(arb_op(), 0..60),
            ) {
                let directory = PreKeyDirectory::new();
                let mut model: VecDeque<u32> = (0..initial).collect();
                let mut next_id = initial;
                directory.store_key_bundle("bob", bundle(1, model.iter().copied().map(key).collect()));

                let mut issued = HashSet::new();
                for op in ops {
                    match op {
                        Op::Add(count) => {
                            let ids: Vec<u32> = (next_id..next_id + count).collect();
                            next_id += count;
                            directory
                                .add_one_time_pre_keys("bob", ids.iter().copied().map(key))
                                .unwrap();
                            model.extend(ids);
                        }
                        Op::Issue => {
                            let got = issued_id(&directory, "bob");
                            prop_assert_eq!(got, model.pop_front());
                            if let Some(id) = got {
                                prop_assert!(issued.insert(id), "key {} issued twice", id);
                            }
                        }
                    }
                }

                prop_assert_eq!(directory.remaining_one_time_pre_keys("bob").unwrap(), model.len());
            }
        }
    }
}
