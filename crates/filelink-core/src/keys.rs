//! Public key codec.
//!
//! Key format: `{short_hash}{remote_file_id}` where `short_hash` is the last
//! [`SHORT_HASH_LEN`] characters of the decimal form of the remote file identifier.
//! The full identifier is always appended verbatim, so distinct identifiers never
//! share a key; the short hash only makes keys visually distinct at a glance.
//!
//! [`generate`] and [`split`] are a matched pair. `split` relies on `generate`
//! never inserting a separator, so any change to one must be mirrored in the other.

use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

use crate::constants::SHORT_HASH_LEN;
use crate::models::RemoteFileId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Malformed key: {0}")]
    Malformed(String),
}

/// Visible prefix of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortHash(String);

impl ShortHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShortHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Last `SHORT_HASH_LEN` characters of the identifier's decimal form.
///
/// Identifiers shorter than that yield their whole decimal form.
pub fn short_hash(id: RemoteFileId) -> ShortHash {
    let digits = id.to_string();
    let start = digits.len().saturating_sub(SHORT_HASH_LEN);
    ShortHash(digits[start..].to_string())
}

/// Derive the public key for a remote file identifier.
pub fn generate(id: RemoteFileId) -> String {
    let digits = id.to_string();
    let start = digits.len().saturating_sub(SHORT_HASH_LEN);
    let mut key = String::with_capacity(digits.len() * 2);
    key.push_str(&digits[start..]);
    key.push_str(&digits);
    key
}

/// Split a key back into its short hash and remote file identifier.
///
/// The hash length is recovered from the key length: keys built from identifiers of at
/// least `SHORT_HASH_LEN` characters are at least twice that long, shorter ones are
/// exactly the identifier repeated. Anything `generate` could not have produced is
/// rejected.
pub fn split(key: &str) -> Result<(ShortHash, RemoteFileId), KeyError> {
    if key.is_empty() || !key.is_ascii() {
        return Err(KeyError::Malformed(key.to_string()));
    }

    let hash_len = if key.len() >= 2 * SHORT_HASH_LEN {
        SHORT_HASH_LEN
    } else if key.len() % 2 == 0 {
        key.len() / 2
    } else {
        return Err(KeyError::Malformed(key.to_string()));
    };

    let (hash, rest) = key.split_at(hash_len);
    let id: RemoteFileId = rest
        .parse()
        .map_err(|_| KeyError::Malformed(key.to_string()))?;

    // Rejects non-canonical digits such as "+12" or leading zeros.
    if generate(id) != key {
        return Err(KeyError::Malformed(key.to_string()));
    }

    Ok((ShortHash(hash.to_string()), id))
}

/// Reconstruct a key from its parts, used to rebuild direct links from a split key.
pub fn join(hash: &ShortHash, id: RemoteFileId) -> Result<String, KeyError> {
    let key = generate(id);
    if !key.starts_with(hash.as_str()) || short_hash(id) != *hash {
        return Err(KeyError::Malformed(format!("{}{}", hash, id)));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uses_last_six_digits() {
        let key = generate(RemoteFileId::new(5_123_456_789));
        assert_eq!(key, "4567895123456789");
    }

    #[test]
    fn test_split_inverts_generate() {
        let id = RemoteFileId::new(5_123_456_789);
        let (hash, recovered) = split(&generate(id)).unwrap();
        assert_eq!(hash.as_str(), "456789");
        assert_eq!(recovered, id);
    }

    #[test]
    fn test_exactly_six_digits() {
        let id = RemoteFileId::new(123_456);
        let key = generate(id);
        assert_eq!(key, "123456123456");
        assert_eq!(split(&key).unwrap(), (short_hash(id), id));
    }

    #[test]
    fn test_short_identifier_degrades_gracefully() {
        let id = RemoteFileId::new(42);
        let key = generate(id);
        assert_eq!(key, "4242");
        let (hash, recovered) = split(&key).unwrap();
        assert_eq!(hash.as_str(), "42");
        assert_eq!(recovered, id);

        let zero = RemoteFileId::new(0);
        assert_eq!(generate(zero), "00");
        assert_eq!(split("00").unwrap().1, zero);
    }

    #[test]
    fn test_negative_identifier_round_trips() {
        let id = RemoteFileId::new(-9_876_543_210);
        let key = generate(id);
        assert_eq!(key, "543210-9876543210");
        assert_eq!(split(&key).unwrap().1, id);

        let small = RemoteFileId::new(-7);
        assert_eq!(generate(small), "-7-7");
        assert_eq!(split("-7-7").unwrap().1, small);
    }

    #[test]
    fn test_split_rejects_malformed_keys() {
        for bad in ["", "1", "123", "abcdefabcdef", "000001000001", "1234561234567", "ü12345"] {
            assert!(split(bad).is_err(), "expected {:?} to be rejected", bad);
        }
        // Hash that does not match the identifier's tail
        assert!(split("9999995123456789").is_err());
    }

    #[test]
    fn test_join_checks_hash() {
        let id = RemoteFileId::new(5_123_456_789);
        let (hash, _) = split(&generate(id)).unwrap();
        assert_eq!(join(&hash, id).unwrap(), generate(id));
        assert!(join(&hash, RemoteFileId::new(77)).is_err());
    }
}
