//! SHA-256 digest newtype for downloaded asset verification.
//!
//! GitHub publishes a `digest` for each release asset in the form
//! `sha256:<hex>`. When present, the downloaded archive is hashed and compared
//! before it is opened.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Prefix used by the release index for SHA-256 digests.
const SHA256_PREFIX: &str = "sha256:";

/// A validated lowercase hex-encoded SHA-256 digest.
///
/// # Examples
///
/// ```
/// use trimarr_provisioner::digest::Sha256Digest;
///
/// let hex = "a".repeat(64);
/// let digest = Sha256Digest::try_from(hex.as_str()).expect("valid digest");
/// assert_eq!(digest.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

/// A digest string that is not 64 hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid SHA-256 digest \"{value}\": expected 64 hex characters")]
pub struct InvalidDigest {
    /// The rejected value.
    pub value: String,
}

impl Sha256Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a release-index digest field.
    ///
    /// Returns `Ok(None)` for digests using another algorithm, since only
    /// SHA-256 can be verified.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDigest`] when a `sha256:` value is malformed.
    pub fn from_release_field(field: &str) -> Result<Option<Self>, InvalidDigest> {
        field
            .strip_prefix(SHA256_PREFIX)
            .map(Self::try_from)
            .transpose()
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = InvalidDigest;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let valid = value.len() == DIGEST_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(InvalidDigest {
                value: value.to_owned(),
            });
        }
        Ok(Self(value.to_ascii_lowercase()))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the SHA-256 digest of a file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn compute_sha256(path: &Path) -> std::io::Result<Sha256Digest> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(Sha256Digest(format!("{:x}", hasher.finalize())))
}
