//! Runtime configuration
//!
//! A TOML file describes where keys come from and which blob layout to write.
//! Key secrets themselves only ever live in environment variables.

use crate::crypto::{BlobFormat, CryptoError, EncryptionKey, KeyEpoch, KeyRing, SecretCipher};
use crate::platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Environment variable holding the current key secret by default
pub const DEFAULT_KEY_ENV: &str = "LOCKBOX_ENCRYPTION_KEY";

/// Errors raised while loading configuration or building keys from it
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Encryption key is not configured: set the {env} environment variable")]
    MissingEncryptionKey { env: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockboxConfig {
    #[serde(default)]
    pub encryption: EncryptionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[encryption]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptionConfig {
    /// Environment variable holding the current key secret
    #[serde(default = "default_key_env")]
    pub key_env: String,
    #[serde(default)]
    pub current_epoch: KeyEpoch,
    /// Layout used for newly written blobs
    #[serde(default)]
    pub blob_format: BlobFormat,
    /// Keys that are only kept to read older blobs
    #[serde(default)]
    pub retired_keys: Vec<RetiredKeyConfig>,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            key_env: default_key_env(),
            current_epoch: 0,
            blob_format: BlobFormat::default(),
            retired_keys: Vec::new(),
        }
    }
}

fn default_key_env() -> String {
    DEFAULT_KEY_ENV.to_string()
}

/// One `[[encryption.retired_keys]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetiredKeyConfig {
    pub epoch: KeyEpoch,
    pub secret_env: String,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LockboxConfig {
    /// Load configuration from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the platform config directory
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&platform::get_default_config_path())
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let encryption = &self.encryption;

        if encryption.key_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "encryption.key_env must not be empty".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        seen.insert(encryption.current_epoch);
        for retired in &encryption.retired_keys {
            if retired.secret_env.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "retired key for epoch {} has an empty secret_env",
                    retired.epoch
                )));
            }
            if !seen.insert(retired.epoch) {
                return Err(ConfigError::Invalid(format!(
                    "key epoch {} is configured more than once",
                    retired.epoch
                )));
            }
        }

        Ok(())
    }

    /// Build the key ring from the process environment
    pub fn build_key_ring(&self) -> Result<KeyRing, ConfigError> {
        self.build_key_ring_with(|name| std::env::var(name).ok())
    }

    /// Build the key ring, resolving secrets through `lookup`
    ///
    /// The current key is required. A retired key whose variable is unset is
    /// skipped with a warning; blobs under that epoch become unreadable.
    pub fn build_key_ring_with<F>(&self, lookup: F) -> Result<KeyRing, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.validate()?;
        let encryption = &self.encryption;

        let current = read_secret(&lookup, &encryption.key_env).ok_or_else(|| {
            ConfigError::MissingEncryptionKey {
                env: encryption.key_env.clone(),
            }
        })?;
        let key = EncryptionKey::from_secret(&current).map_err(key_error)?;
        let mut ring = KeyRing::new(encryption.current_epoch, key);

        for retired in &encryption.retired_keys {
            let Some(secret) = read_secret(&lookup, &retired.secret_env) else {
                warn!(
                    "Retired key for epoch {} not found in {}, skipping",
                    retired.epoch, retired.secret_env
                );
                continue;
            };
            let key = EncryptionKey::from_secret(&secret).map_err(key_error)?;
            ring = ring.with_retired(retired.epoch, key).map_err(key_error)?;
        }

        info!(
            "Loaded {} encryption key(s), current epoch {}",
            ring.len(),
            encryption.current_epoch
        );

        Ok(ring)
    }

    /// Build a cipher writing the configured blob layout
    pub fn build_cipher(&self) -> Result<SecretCipher, ConfigError> {
        let ring = self.build_key_ring()?;
        Ok(SecretCipher::new(ring).with_format(self.encryption.blob_format))
    }
}

fn read_secret<F>(lookup: &F, name: &str) -> Option<Zeroizing<String>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(Zeroizing::new)
        .filter(|secret| !secret.trim().is_empty())
}

fn key_error(e: CryptoError) -> ConfigError {
    ConfigError::Invalid(e.to_string())
}
