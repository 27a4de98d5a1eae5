//! Content fingerprints used as cache keys.
//!
//! A [`Fingerprint`] is the lowercase hex SHA-256 digest of a canonical byte
//! representation of an input. Text is hashed as its UTF-8 bytes; structured
//! values go through [`canonical_json::to_canonical_json`] first so that key
//! order never changes the digest.
//!
//! ```rust
//! use ai_report_rust::hashing::{fingerprint_json, fingerprint_text};
//! use serde_json::json;
//!
//! assert_eq!(fingerprint_text("hello"), fingerprint_text("hello"));
//! assert_eq!(
//!     fingerprint_json(&json!({"a": 1, "b": 2})),
//!     fingerprint_json(&json!({"b": 2, "a": 1})),
//! );
//! ```

pub mod canonical_json;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use canonical_json::to_canonical_json;

/// Hex-encoded SHA-256 digest of an input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fingerprint arbitrary bytes.
pub fn fingerprint(payload: impl AsRef<[u8]>) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_ref());
    let hash: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    Fingerprint(hash)
}

/// Fingerprint text by its UTF-8 bytes.
pub fn fingerprint_text(text: &str) -> Fingerprint {
    fingerprint(text.as_bytes())
}

/// Fingerprint a JSON value by its canonical (sorted-key) serialization.
pub fn fingerprint_json(value: &serde_json::Value) -> Fingerprint {
    fingerprint(to_canonical_json(value).as_bytes())
}

/// Fingerprint any serializable value via canonical JSON.
pub fn fingerprint_serialized<T: Serialize>(value: &T) -> crate::Result<Fingerprint> {
    let value = serde_json::to_value(value)?;
    Ok(fingerprint_json(&value))
}
