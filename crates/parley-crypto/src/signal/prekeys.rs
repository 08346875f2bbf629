//! Key material types and the one-time prekey queue.
//!
//! A peer's published keys live in a [`FullDirectoryEntry`]. Handing keys
//! out for session establishment goes through [`OneTimePreKeyQueue`], which
//! releases one-time prekeys strictly in arrival order, each at most once.

use std::collections::VecDeque;

use zeroize::ZeroizeOnDrop;

/// An asymmetric key pair. The private half is wiped on drop.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop)]
pub struct KeyPair {
    pub public_key: Vec<u8>,
    pub private_key: Vec<u8>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(&self.public_key))
            .finish_non_exhaustive()
    }
}

/// Public half of a one-time prekey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreKey {
    pub key_id: u32,
    pub public_key: Vec<u8>,
}

/// A one-time prekey together with its private half (local device only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreKeyPair {
    pub key_id: u32,
    pub key_pair: KeyPair,
}

impl PreKeyPair {
    pub fn public(&self) -> PreKey {
        PreKey {
            key_id: self.key_id,
            public_key: self.key_pair.public_key.clone(),
        }
    }
}

/// Public half of a signed prekey, with the identity key's signature over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPublicPreKey {
    pub key_id: u32,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

/// A signed prekey together with its private half (local device only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPreKeyPair {
    pub key_id: u32,
    pub key_pair: KeyPair,
    pub signature: Vec<u8>,
}

impl SignedPreKeyPair {
    pub fn public(&self) -> SignedPublicPreKey {
        SignedPublicPreKey {
            key_id: self.key_id,
            public_key: self.key_pair.public_key.clone(),
            signature: self.signature.clone(),
        }
    }
}

/// FIFO reserve of one-time prekeys.
///
/// New keys join at the tail; issuance always takes the head. Keys added
/// across several calls therefore come out in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneTimePreKeyQueue {
    keys: VecDeque<PreKey>,
}

impl OneTimePreKeyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the oldest unissued key.
    pub fn pop_oldest(&mut self) -> Option<PreKey> {
        self.keys.pop_front()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in issuance order, oldest first.
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, PreKey> {
        self.keys.iter()
    }
}

impl<'a> IntoIterator for &'a OneTimePreKeyQueue {
    type Item = &'a PreKey;
    type IntoIter = std::collections::vec_deque::Iter<'a, PreKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl Extend<PreKey> for OneTimePreKeyQueue {
    fn extend<I: IntoIterator<Item = PreKey>>(&mut self, keys: I) {
        self.keys.extend(keys);
    }
}

impl FromIterator<PreKey> for OneTimePreKeyQueue {
    fn from_iter<I: IntoIterator<Item = PreKey>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

/// Everything a peer has published: identity, signed prekey and the
/// remaining one-time prekey reserve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullDirectoryEntry {
    pub registration_id: u32,
    pub identity_pub_key: Vec<u8>,
    pub signed_pre_key: SignedPublicPreKey,
    pub one_time_pre_keys: OneTimePreKeyQueue,
}

impl FullDirectoryEntry {
    /// Build a session-establishment bundle, consuming at most one
    /// one-time prekey. The signed prekey is reusable and stays in place.
    pub fn take_device_bundle(&mut self) -> DeviceBundle {
        DeviceBundle {
            registration_id: self.registration_id,
            identity_key: self.identity_pub_key.clone(),
            signed_pre_key: self.signed_pre_key.clone(),
            pre_key: self.one_time_pre_keys.pop_oldest(),
        }
    }
}

/// The minimal key set needed to open a session with one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceBundle {
    pub registration_id: u32,
    pub identity_key: Vec<u8>,
    pub signed_pre_key: SignedPublicPreKey,
    /// Absent once the peer's one-time reserve has run dry.
    pub pre_key: Option<PreKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: u32) -> PreKey {
        PreKey {
            key_id: id,
            public_key: vec![u8::try_from(id).unwrap(); 32],
        }
    }

    fn entry(keys: Vec<PreKey>) -> FullDirectoryEntry {
        FullDirectoryEntry {
            registration_id: 7,
            identity_pub_key: vec![1; 32],
            signed_pre_key: SignedPublicPreKey {
                key_id: 9,
                public_key: vec![2; 32],
                signature: vec![3; 64],
            },
            one_time_pre_keys: keys.into_iter().collect(),
        }
    }

    #[test]
    fn queue_releases_in_arrival_order() {
        let mut queue: OneTimePreKeyQueue = vec![key(1), key(2)].into_iter().collect();
        queue.extend(vec![key(3)]);
        queue.extend(vec![key(4), key(5)]);

        let order: Vec<u32> = std::iter::from_fn(|| queue.pop_oldest())
            .map(|k| k.key_id)
            .collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn take_device_bundle_consumes_one_key() {
        let mut e = entry(vec![key(1), key(2)]);

        let first = e.take_device_bundle();
        assert_eq!(first.pre_key, Some(key(1)));
        assert_eq!(first.registration_id, 7);
        assert_eq!(first.signed_pre_key.key_id, 9);
        assert_eq!(e.one_time_pre_keys.len(), 1);

        let second = e.take_device_bundle();
        assert_eq!(second.pre_key, Some(key(2)));

        let third = e.take_device_bundle();
        assert_eq!(third.pre_key, None);
        // signed prekey is never consumed
        assert_eq!(third.signed_pre_key, first.signed_pre_key);
    }

    #[test]
    fn key_pair_debug_hides_private_half() {
        let pair = KeyPair {
            public_key: vec![0xab],
            private_key: vec![0xcd],
        };
        let rendered = format!("{pair:?}");
        assert!(rendered.contains("ab"));
        assert!(!rendered.contains("cd"));
    }
}
