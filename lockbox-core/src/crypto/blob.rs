//! Persisted secret blob format.
//!
//! Layouts found in the `password` column:
//! - legacy: `<ivHex>:<ciphertextHex>` (AES-256-CBC, PKCS7, raw key)
//! - salted: `<ivHex>:<base64>` where the base64 decodes to the OpenSSL
//!   `Salted__` envelope written by CryptoJS passphrase encryption. The key
//!   and IV come from the passphrase and salt; the hex IV is ignored.
//! - sealed: `v1:<epoch>:<nonceHex>:<ciphertextHex>` (AES-256-GCM, tag appended)
//!
//! All are split on the first colon. A 32 hex character head is a legacy IV,
//! the literal `v1` is a sealed header, anything else is malformed. Salted
//! blobs are read-only; new blobs are written as legacy or sealed.

use crate::crypto::keyring::KeyEpoch;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version tag of the sealed layout
pub const SEALED_VERSION: &str = "v1";

const IV_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const GCM_TAG_LEN: usize = 16;
const SALT_LEN: usize = 8;
const CBC_BLOCK_LEN: usize = 16;

/// Magic prefix of the OpenSSL salted envelope
const SALTED_MAGIC: &[u8] = b"Salted__";

/// Which layout [`SecretCipher`](crate::crypto::SecretCipher) writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlobFormat {
    /// `ivHex:ciphertextHex`, AES-256-CBC with PKCS7 padding
    #[default]
    LegacyCbc,
    /// `v1:epoch:nonceHex:ciphertextHex`, AES-256-GCM
    Sealed,
}

impl fmt::Display for BlobFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobFormat::LegacyCbc => f.write_str("legacy-cbc"),
            BlobFormat::Sealed => f.write_str("sealed"),
        }
    }
}

impl FromStr for BlobFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "legacy-cbc" => Ok(BlobFormat::LegacyCbc),
            "sealed" => Ok(BlobFormat::Sealed),
            other => Err(format!("unknown blob format '{}'", other)),
        }
    }
}

/// The opaque string stored in an entry's `password` field
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretBlob(String);

impl SecretBlob {
    /// Wrap a stored blob string
    pub fn new(blob: impl Into<String>) -> Self {
        Self(blob.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the blob into its parts
    pub fn parse(&self) -> std::result::Result<ParsedBlob, BlobError> {
        ParsedBlob::parse(&self.0)
    }
}

impl fmt::Display for SecretBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SecretBlob {
    // Ciphertext is not secret, but it is noise in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBlob({} bytes)", self.0.len())
    }
}

impl From<String> for SecretBlob {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretBlob {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SecretBlob {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a blob could not be parsed. Only ever logged, never returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    MissingSeparator,
    UnknownHeader,
    InvalidIv,
    InvalidEpoch,
    InvalidNonce,
    InvalidCiphertext,
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            BlobError::MissingSeparator => "missing ':' separator",
            BlobError::UnknownHeader => "unrecognised blob header",
            BlobError::InvalidIv => "IV is not 32 hex characters",
            BlobError::InvalidEpoch => "key epoch is not a number",
            BlobError::InvalidNonce => "nonce is not 24 hex characters",
            BlobError::InvalidCiphertext => "ciphertext encoding is invalid",
        };
        f.write_str(reason)
    }
}

/// A blob split into its binary components
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedBlob {
    Legacy {
        iv: [u8; IV_LEN],
        ciphertext: Vec<u8>,
    },
    /// CryptoJS passphrase output; key and IV are derived from the salt
    Salted {
        salt: [u8; SALT_LEN],
        ciphertext: Vec<u8>,
    },
    Sealed {
        epoch: KeyEpoch,
        nonce: [u8; NONCE_LEN],
        /// Ciphertext with the GCM tag appended
        ciphertext: Vec<u8>,
    },
}

impl ParsedBlob {
    pub fn parse(blob: &str) -> std::result::Result<Self, BlobError> {
        let (head, rest) = blob.split_once(':').ok_or(BlobError::MissingSeparator)?;

        if head == SEALED_VERSION {
            return Self::parse_sealed(rest);
        }

        if head.len() != IV_LEN * 2 || !head.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(if head.len() == IV_LEN * 2 {
                BlobError::InvalidIv
            } else {
                BlobError::UnknownHeader
            });
        }

        let mut iv = [0u8; IV_LEN];
        hex::decode_to_slice(head, &mut iv).map_err(|_| BlobError::InvalidIv)?;

        if is_even_hex(rest) {
            let ciphertext = hex::decode(rest).map_err(|_| BlobError::InvalidCiphertext)?;
            return Ok(ParsedBlob::Legacy { iv, ciphertext });
        }

        Self::parse_salted(rest)
    }

    fn parse_salted(encoded: &str) -> std::result::Result<Self, BlobError> {
        let envelope = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| BlobError::InvalidCiphertext)?;

        let body = envelope
            .strip_prefix(SALTED_MAGIC)
            .filter(|body| body.len() >= SALT_LEN + CBC_BLOCK_LEN)
            .ok_or(BlobError::InvalidCiphertext)?;
        let (salt_bytes, ciphertext) = body.split_at(SALT_LEN);

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(salt_bytes);

        Ok(ParsedBlob::Salted {
            salt,
            ciphertext: ciphertext.to_vec(),
        })
    }

    fn parse_sealed(rest: &str) -> std::result::Result<Self, BlobError> {
        let (epoch, rest) = rest.split_once(':').ok_or(BlobError::MissingSeparator)?;
        let (nonce_hex, ciphertext_hex) =
            rest.split_once(':').ok_or(BlobError::MissingSeparator)?;

        let epoch: KeyEpoch = epoch.parse().map_err(|_| BlobError::InvalidEpoch)?;

        let mut nonce = [0u8; NONCE_LEN];
        hex::decode_to_slice(nonce_hex, &mut nonce).map_err(|_| BlobError::InvalidNonce)?;

        let ciphertext =
            hex::decode(ciphertext_hex).map_err(|_| BlobError::InvalidCiphertext)?;
        if ciphertext.len() < GCM_TAG_LEN {
            return Err(BlobError::InvalidCiphertext);
        }

        Ok(ParsedBlob::Sealed {
            epoch,
            nonce,
            ciphertext,
        })
    }

    /// Format the legacy layout
    pub fn format_legacy(iv: &[u8; IV_LEN], ciphertext: &[u8]) -> SecretBlob {
        SecretBlob(format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)))
    }

    /// Header of a sealed blob; also used as associated data
    pub fn sealed_header(epoch: KeyEpoch) -> String {
        format!("{}:{}", SEALED_VERSION, epoch)
    }

    /// Format the sealed layout
    pub fn format_sealed(epoch: KeyEpoch, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> SecretBlob {
        SecretBlob(format!(
            "{}:{}:{}",
            Self::sealed_header(epoch),
            hex::encode(nonce),
            hex::encode(ciphertext)
        ))
    }

    /// The writable layout this blob is in; `None` for read-only salted blobs
    pub fn format(&self) -> Option<BlobFormat> {
        match self {
            ParsedBlob::Legacy { .. } => Some(BlobFormat::LegacyCbc),
            ParsedBlob::Sealed { .. } => Some(BlobFormat::Sealed),
            ParsedBlob::Salted { .. } => None,
        }
    }
}

fn is_even_hex(s: &str) -> bool {
    !s.is_empty() && s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
