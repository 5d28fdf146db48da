//! Encryption keys and rotation epochs.
//!
//! A [`KeyRing`] holds the current key plus any retired keys that are still
//! needed to read older blobs. The cipher only ever sees the ring through the
//! [`KeyProvider`] trait.

use crate::crypto::{CryptoError, Result};
use aes_gcm::aead::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Identifier of a key in the rotation history.
pub type KeyEpoch = u32;

/// A 256-bit symmetric key
///
/// Keys built from a secret string also keep that string, so blobs written by
/// passphrase-based clients can be opened. Everything is zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct EncryptionKey {
    key: [u8; 32],
    passphrase: Option<Vec<u8>>,
}

impl EncryptionKey {
    /// Create a key from raw bytes
    pub fn from_bytes(key: [u8; 32]) -> Self {
        Self {
            key,
            passphrase: None,
        }
    }

    /// Build a key from a configured secret string.
    ///
    /// A 64 character hex string is taken as the raw key. Anything else is
    /// hashed with SHA-256.
    pub fn from_secret(secret: &str) -> Result<Self> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(CryptoError::InvalidKey("secret is empty".to_string()));
        }

        if secret.len() == 64 && secret.bytes().all(|b| b.is_ascii_hexdigit()) {
            let mut decoded = hex::decode(secret)
                .map_err(|e| CryptoError::InvalidKey(format!("bad hex key: {}", e)))?;
            let mut key = [0u8; 32];
            key.copy_from_slice(&decoded);
            decoded.zeroize();
            return Ok(Self {
                key,
                passphrase: Some(secret.as_bytes().to_vec()),
            });
        }

        let digest = Sha256::digest(secret.as_bytes());
        Ok(Self {
            key: digest.into(),
            passphrase: Some(secret.as_bytes().to_vec()),
        })
    }

    /// Generate a fresh random key from the OS CSPRNG
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|e| CryptoError::RandomFailed(e.to_string()))?;
        Ok(Self::from_bytes(key))
    }

    /// Hex form accepted back by [`EncryptionKey::from_secret`]
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.key))
    }

    /// Get the raw key bytes (use sparingly)
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// The secret string this key was built from, if any
    pub(crate) fn passphrase(&self) -> Option<&[u8]> {
        self.passphrase.as_deref()
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Source of key material for the cipher
pub trait KeyProvider: Send + Sync {
    /// The key new blobs are written with.
    fn current(&self) -> (KeyEpoch, &EncryptionKey);

    /// Look up a key by its rotation epoch.
    fn key_for_epoch(&self, epoch: KeyEpoch) -> Option<&EncryptionKey>;

    /// All known epochs, newest first.
    fn epochs(&self) -> Vec<KeyEpoch>;
}

/// Current key plus retired keys, indexed by epoch
#[derive(Debug, Clone)]
pub struct KeyRing {
    current_epoch: KeyEpoch,
    keys: BTreeMap<KeyEpoch, EncryptionKey>,
}

impl KeyRing {
    /// Create a ring holding a single key
    pub fn new(current_epoch: KeyEpoch, key: EncryptionKey) -> Self {
        let mut keys = BTreeMap::new();
        keys.insert(current_epoch, key);
        Self {
            current_epoch,
            keys,
        }
    }

    /// Create a ring from a secret string at epoch 0
    pub fn from_secret(secret: &str) -> Result<Self> {
        Ok(Self::new(0, EncryptionKey::from_secret(secret)?))
    }

    /// Add a retired key that is only used for decryption
    pub fn with_retired(mut self, epoch: KeyEpoch, key: EncryptionKey) -> Result<Self> {
        if self.keys.contains_key(&epoch) {
            return Err(CryptoError::InvalidKey(format!(
                "epoch {} is already present in the key ring",
                epoch
            )));
        }
        self.keys.insert(epoch, key);
        Ok(self)
    }

    /// Number of keys in the ring
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// A ring always holds its current key, so it is never empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyProvider for KeyRing {
    fn current(&self) -> (KeyEpoch, &EncryptionKey) {
        // The constructor inserts the current key and nothing removes it.
        let key = &self.keys[&self.current_epoch];
        (self.current_epoch, key)
    }

    fn key_for_epoch(&self, epoch: KeyEpoch) -> Option<&EncryptionKey> {
        self.keys.get(&epoch)
    }

    fn epochs(&self) -> Vec<KeyEpoch> {
        let mut epochs: Vec<KeyEpoch> = self.keys.keys().rev().copied().collect();
        // Current first, then the rest newest to oldest
        epochs.retain(|&e| e != self.current_epoch);
        epochs.insert(0, self.current_epoch);
        epochs
    }
}
