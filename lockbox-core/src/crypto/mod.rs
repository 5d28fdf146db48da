//! Cryptographic primitives for the credential core.
//!
//! This module provides:
//! - AES-256-CBC (legacy) and AES-256-GCM (sealed) secret blobs
//! - Key rings with rotation epochs
//! - Password strength scoring
//! - Password generation

pub mod blob;
pub mod cipher;
pub mod keyring;
pub mod password;
pub mod strength;

pub use blob::{BlobFormat, SecretBlob};
pub use cipher::SecretCipher;
pub use keyring::{EncryptionKey, KeyEpoch, KeyProvider, KeyRing};
pub use password::{generate_memorable_password, generate_random_password, PasswordGeneratorConfig};
pub use strength::{analyze_password, score, MeterLabel, PasswordAnalysis, PasswordStrength, StrengthAssessment};

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Every decryption failure collapses into this variant so callers cannot
    /// tell a malformed blob from a key mismatch.
    #[error("Failed to decrypt password")]
    DecryptionFailed,

    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Random number generation failed: {0}")]
    RandomFailed(String),
}

/// Result type for crypto operations
pub type Result<T> = std::result::Result<T, CryptoError>;
