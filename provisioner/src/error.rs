//! Error types for the provisioning pipeline.
//!
//! Every variant is terminal for a single provisioning call. Each carries the
//! context needed to diagnose the failure without re-running: the repository,
//! the release tag, the asset or member name, or the destination path.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::download::DownloadError;

/// Errors that can occur while provisioning an external binary.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The release index answered with a non-success status or could not be
    /// reached at all.
    #[error("release index request for {repository} failed: {reason}")]
    RemoteService {
        /// Repository in `owner/name` form.
        repository: String,
        /// HTTP status code, when the service answered.
        status: Option<u16>,
        /// Description of the failure.
        reason: String,
    },

    /// The release index answered but the body does not have the release
    /// shape (missing `tag_name`, `assets`, or asset fields).
    #[error("malformed release metadata for {repository}: {reason}")]
    MalformedResponse {
        /// Repository in `owner/name` form.
        repository: String,
        /// Description of the schema violation.
        reason: String,
    },

    /// The release carries no asset with the requested name.
    #[error("asset '{asset_name}' not found in release '{tag}'")]
    AssetNotFound {
        /// Tag of the release that was searched.
        tag: String,
        /// Exact asset filename that was requested.
        asset_name: String,
    },

    /// The asset could not be transferred into transient storage.
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    /// The downloaded asset does not match the digest the release publishes.
    #[error("checksum mismatch for {asset}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Asset source whose content was verified.
        asset: String,
        /// Digest published alongside the asset.
        expected: String,
        /// Digest of the bytes actually received.
        actual: String,
    },

    /// The downloaded file is not a readable archive of a supported format.
    #[error("cannot read archive {archive}: {reason}")]
    Archive {
        /// Archive source (asset filename).
        archive: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// No regular file with the target basename exists in the archive.
    #[error("could not find '{member}' inside '{archive}'")]
    MemberNotFound {
        /// Basename that was searched for.
        member: String,
        /// Archive source (asset filename).
        archive: String,
    },

    /// An archive entry path escapes the extraction root.
    #[error("unsafe entry '{path}' in archive {archive}")]
    UnsafeArchiveEntry {
        /// The offending entry path as stored in the archive.
        path: String,
        /// Archive source (asset filename).
        archive: String,
    },

    /// The binary could not be written to, or made executable at, its
    /// destination.
    #[error("failed to install {path}: {reason}")]
    Install {
        /// Destination path of the binary.
        path: Utf8PathBuf,
        /// Description of the filesystem failure.
        reason: String,
    },
}

impl ProvisionError {
    /// Build an [`ProvisionError::Install`] from an I/O failure at `path`.
    pub(crate) fn install(path: impl Into<Utf8PathBuf>, err: &std::io::Error) -> Self {
        Self::Install {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Build an [`ProvisionError::Archive`] from any displayable failure.
    pub(crate) fn archive(archive: &str, err: impl std::fmt::Display) -> Self {
        Self::Archive {
            archive: archive.to_owned(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using [`ProvisionError`].
pub type Result<T> = std::result::Result<T, ProvisionError>;
