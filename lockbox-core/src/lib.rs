//! Lockbox credential core
//!
//! Encryption of stored password secrets, password strength scoring, vault
//! health aggregation and password generation.

pub mod config;
pub mod crypto;
pub mod platform;
pub mod vault;

pub use config::{ConfigError, LockboxConfig};
pub use crypto::{
    analyze_password, generate_memorable_password, generate_random_password, score, BlobFormat,
    CryptoError, EncryptionKey, KeyEpoch, KeyProvider, KeyRing, PasswordAnalysis,
    PasswordGeneratorConfig, SecretBlob, SecretCipher, StrengthAssessment,
};
pub use platform::{get_config_dir, get_default_config_path};
pub use vault::{
    compute_health, load_entries, reveal_password, rotate_entries, save_entries, seal_password,
    PasswordEntry, RotationReport, VaultHealthSnapshot, WeakEntry, WeaknessReason,
};

use thiserror::Error;

/// Result type for Lockbox operations
pub type Result<T> = std::result::Result<T, LockboxError>;

/// General error type for Lockbox operations
#[derive(Error, Debug)]
pub enum LockboxError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LockboxError {
    /// Shorthand for an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        LockboxError::InvalidInput(message.into())
    }
}
