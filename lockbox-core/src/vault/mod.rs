//! Vault entries and the operations that touch their secrets
//!
//! Persistence belongs to the surrounding application. These functions take a
//! cipher and entries explicitly and only ever change the `password` blob and
//! the timestamps that go with it.

pub mod health;

pub use health::{compute_health, HealthAlert, VaultHealthSnapshot, WeakEntry, WeaknessReason};

use crate::crypto::{CryptoError, KeyProvider, SecretBlob, SecretCipher};
use crate::LockboxError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// A stored password entry as the application persists it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordEntry {
    pub id: String,
    pub title: String,
    pub username: String,
    /// Encrypted password blob
    pub password: SecretBlob,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl PasswordEntry {
    /// Create an entry with a freshly encrypted password
    pub fn new<K: KeyProvider>(
        cipher: &SecretCipher<K>,
        id: impl Into<String>,
        title: impl Into<String>,
        username: impl Into<String>,
        plaintext: &str,
    ) -> Result<Self, CryptoError> {
        let now = Utc::now();
        Ok(Self {
            id: id.into(),
            title: title.into(),
            username: username.into(),
            password: cipher.encrypt(plaintext)?,
            url: None,
            notes: None,
            category_id: None,
            created_at: now,
            updated_at: now,
            last_used_at: Some(now),
        })
    }
}

/// Read a JSON array of entries as exported by the store
pub fn load_entries(path: &Path) -> crate::Result<Vec<PasswordEntry>> {
    let contents = std::fs::read_to_string(path)?;
    let entries: Vec<PasswordEntry> = serde_json::from_str(&contents)?;

    let mut ids = HashSet::new();
    for entry in &entries {
        if entry.id.is_empty() {
            return Err(LockboxError::invalid_input("entry with an empty id"));
        }
        if !ids.insert(entry.id.as_str()) {
            return Err(LockboxError::invalid_input(format!(
                "duplicate entry id '{}'",
                entry.id
            )));
        }
    }

    debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Write entries back as a JSON array
///
/// The file is written next to `path` and renamed over it, so an interrupted
/// write never leaves a truncated export behind.
pub fn save_entries(path: &Path, entries: &[PasswordEntry]) -> crate::Result<()> {
    let json = serde_json::to_string_pretty(entries)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| LockboxError::Io(e.error))?;

    debug!("Saved {} entries to {}", entries.len(), path.display());
    Ok(())
}

/// Encrypt a new password into an entry, replacing the previous blob
pub fn seal_password<K: KeyProvider>(
    cipher: &SecretCipher<K>,
    entry: &mut PasswordEntry,
    plaintext: &str,
) -> Result<(), CryptoError> {
    entry.password = cipher.encrypt(plaintext)?;
    entry.updated_at = Utc::now();
    Ok(())
}

/// Decrypt an entry's password for display or copy
///
/// Marks the entry as used on success. The plaintext is zeroized when the
/// returned value is dropped.
pub fn reveal_password<K: KeyProvider>(
    cipher: &SecretCipher<K>,
    entry: &mut PasswordEntry,
) -> Result<Zeroizing<String>, CryptoError> {
    let plaintext = Zeroizing::new(cipher.decrypt(&entry.password)?);
    entry.last_used_at = Some(Utc::now());
    Ok(plaintext)
}

/// Outcome of re-encrypting a batch of entries
#[derive(Debug, Default, Clone, Serialize)]
pub struct RotationReport {
    /// Entries rewritten under the current key and format
    pub rotated: Vec<String>,
    /// Entries that were already current
    pub current: Vec<String>,
    /// Entries whose blob could not be decrypted; left unchanged
    pub failed: Vec<String>,
}

/// Move every entry onto the current key and blob format
///
/// An entry is current only when the current key opens it in the layout the
/// cipher writes. A failing entry is recorded and skipped; the rest of the
/// batch continues.
pub fn rotate_entries<K: KeyProvider>(
    cipher: &SecretCipher<K>,
    entries: &mut [PasswordEntry],
) -> RotationReport {
    let mut report = RotationReport::default();

    for entry in entries.iter_mut() {
        match cipher.rotate(&entry.password) {
            Ok(None) => report.current.push(entry.id.clone()),
            Ok(Some(rotated)) => {
                entry.password = rotated;
                entry.updated_at = Utc::now();
                debug!(entry_id = %entry.id, "Re-encrypted entry");
                report.rotated.push(entry.id.clone());
            }
            Err(_) => {
                warn!(entry_id = %entry.id, "Entry could not be decrypted; left unchanged");
                report.failed.push(entry.id.clone());
            }
        }
    }

    info!(
        "Key rotation finished: {} rotated, {} current, {} failed",
        report.rotated.len(),
        report.current.len(),
        report.failed.len()
    );

    report
}
