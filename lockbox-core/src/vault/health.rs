//! Vault-wide password health
//!
//! Every entry is decrypted and scored on the 0-4 scale. Entries scoring
//! below [`STRONG_SCORE`](strength::STRONG_SCORE) are weak. An entry that
//! cannot be decrypted counts as weak with score 0 so a broken blob can never
//! make a vault look healthier.

use crate::crypto::strength;
use crate::crypto::{KeyProvider, SecretCipher};
use crate::vault::PasswordEntry;
use serde::Serialize;
use tracing::debug;
use zeroize::Zeroizing;

/// Why an entry was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaknessReason {
    /// Decrypted fine but scored below the strong threshold
    LowScore,
    /// The stored blob could not be decrypted
    Undecryptable,
}

/// An entry that should be updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakEntry {
    pub id: String,
    pub title: String,
    pub score: u8,
    pub reason: WeaknessReason,
}

/// Aggregate health of a collection of entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultHealthSnapshot {
    pub weak_count: usize,
    /// Mean score as a percentage of the maximum, 0 for an empty vault
    pub health_percent: u8,
    /// In the order the entries were given
    pub weak_entries: Vec<WeakEntry>,
    pub total: usize,
    pub undecryptable_count: usize,
}

/// A dashboard notice for one weak entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthAlert {
    pub entry_id: String,
    pub title: String,
    pub description: String,
}

impl VaultHealthSnapshot {
    /// Whether any entry needs attention
    pub fn has_weak_entries(&self) -> bool {
        self.weak_count > 0
    }

    /// Render one alert per weak entry
    pub fn alerts(&self) -> Vec<HealthAlert> {
        self.weak_entries
            .iter()
            .map(|weak| match weak.reason {
                WeaknessReason::LowScore => HealthAlert {
                    entry_id: weak.id.clone(),
                    title: "Weak Password Detected".to_string(),
                    description: format!(
                        "Your password for {} is weak and should be updated.",
                        weak.title
                    ),
                },
                WeaknessReason::Undecryptable => HealthAlert {
                    entry_id: weak.id.clone(),
                    title: "Password Unreadable".to_string(),
                    description: format!(
                        "The stored password for {} could not be decrypted and should be reset.",
                        weak.title
                    ),
                },
            })
            .collect()
    }
}

/// Score every entry and summarise the result
pub fn compute_health<K: KeyProvider>(
    cipher: &SecretCipher<K>,
    entries: &[PasswordEntry],
) -> VaultHealthSnapshot {
    let mut snapshot = VaultHealthSnapshot {
        total: entries.len(),
        ..Default::default()
    };

    if entries.is_empty() {
        return snapshot;
    }

    let mut score_sum: u32 = 0;

    for entry in entries {
        let (score, weak, reason) = match cipher.decrypt(&entry.password) {
            Ok(plaintext) => {
                let plaintext = Zeroizing::new(plaintext);
                let assessment = strength::score(&plaintext);
                (assessment.score, assessment.is_weak(), WeaknessReason::LowScore)
            }
            Err(_) => {
                snapshot.undecryptable_count += 1;
                (0, true, WeaknessReason::Undecryptable)
            }
        };

        score_sum += u32::from(score);

        if weak {
            snapshot.weak_entries.push(WeakEntry {
                id: entry.id.clone(),
                title: entry.title.clone(),
                score,
                reason,
            });
        }
    }

    snapshot.weak_count = snapshot.weak_entries.len();
    snapshot.health_percent = health_percent(score_sum, entries.len());

    debug!(
        "Vault health: {} entries, {} weak, {} undecryptable, {}%",
        snapshot.total, snapshot.weak_count, snapshot.undecryptable_count, snapshot.health_percent
    );

    snapshot
}

/// `round(mean / 4 * 100)` in integer arithmetic, rounding half up
fn health_percent(score_sum: u32, count: usize) -> u8 {
    let count = count as u64;
    let scaled = u64::from(score_sum) * 100;
    let denominator = count * 4;
    let percent = (scaled * 2 + denominator) / (denominator * 2);
    percent.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_percent_rounding() {
        assert_eq!(health_percent(0, 3), 0);
        assert_eq!(health_percent(12, 3), 100);
        // mean 2.5 -> 62.5 -> 63
        assert_eq!(health_percent(5, 2), 63);
        // mean 1/3 -> 8.33 -> 8
        assert_eq!(health_percent(1, 3), 8);
        // mean 2/3 -> 16.67 -> 17
        assert_eq!(health_percent(2, 3), 17);
    }

    #[test]
    fn test_alert_text() {
        let snapshot = VaultHealthSnapshot {
            weak_count: 2,
            health_percent: 25,
            weak_entries: vec![
                WeakEntry {
                    id: "a".to_string(),
                    title: "Email".to_string(),
                    score: 1,
                    reason: WeaknessReason::LowScore,
                },
                WeakEntry {
                    id: "b".to_string(),
                    title: "Bank".to_string(),
                    score: 0,
                    reason: WeaknessReason::Undecryptable,
                },
            ],
            total: 2,
            undecryptable_count: 1,
        };

        let alerts = snapshot.alerts();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].title, "Weak Password Detected");
        assert_eq!(
            alerts[0].description,
            "Your password for Email is weak and should be updated."
        );
        assert_eq!(alerts[1].title, "Password Unreadable");
        assert_eq!(alerts[1].entry_id, "b");
    }

    #[test]
    fn test_empty_snapshot_has_no_alerts() {
        let snapshot = VaultHealthSnapshot::default();
        assert!(!snapshot.has_weak_entries());
        assert!(snapshot.alerts().is_empty());
    }
}
