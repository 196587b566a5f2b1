//! Download-then-extract stage of the pipeline.
//!
//! The asset is streamed into a private temporary directory, optionally
//! verified against its published digest, and searched for the target
//! member. The directory is owned by a [`tempfile::TempDir`] created inside
//! [`ArchiveInstaller::extract_member`], so it is removed on every return
//! path, including every error.

use std::path::Path;

use log::debug;

use crate::digest::{Sha256Digest, compute_sha256};
use crate::download::{AssetDownloader, DownloadError};
use crate::error::{ProvisionError, Result};
use crate::extraction::{ExtractedMember, extract_member};
use crate::release::Asset;

/// Fallback archive filename when the URL has no usable last segment.
const FALLBACK_ARCHIVE_NAME: &str = "asset";

/// Downloads an asset and pulls one member out of it.
pub struct ArchiveInstaller<'a> {
    downloader: &'a dyn AssetDownloader,
}

impl<'a> ArchiveInstaller<'a> {
    /// Create an installer that transfers assets with `downloader`.
    #[must_use]
    pub fn new(downloader: &'a dyn AssetDownloader) -> Self {
        Self { downloader }
    }

    /// Download `asset` and return the first regular member named
    /// `target_basename`.
    ///
    /// The asset name selects the archive decoder. When the release publishes
    /// a SHA-256 digest for the asset, the download is verified before the
    /// archive is opened.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Download`] if the transfer fails,
    /// [`ProvisionError::ChecksumMismatch`] if verification fails, and any
    /// error of [`extract_member`].
    pub fn extract_asset_member(
        &self,
        asset: &Asset,
        target_basename: &str,
    ) -> Result<ExtractedMember> {
        self.extract(
            asset.download_url(),
            asset.name(),
            asset.digest(),
            target_basename,
        )
    }

    /// Download `download_url` and return the first regular member named
    /// `target_basename`.
    ///
    /// The archive format is inferred from the URL's last path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Download`] if the transfer fails and any
    /// error of [`extract_member`].
    pub fn extract_member(
        &self,
        download_url: &str,
        target_basename: &str,
    ) -> Result<ExtractedMember> {
        self.extract(
            download_url,
            archive_name_from_url(download_url),
            None,
            target_basename,
        )
    }

    fn extract(
        &self,
        download_url: &str,
        archive_name: &str,
        digest: Option<&Sha256Digest>,
        target_basename: &str,
    ) -> Result<ExtractedMember> {
        let transient = tempfile::tempdir().map_err(DownloadError::Io)?;
        debug!(
            "staging {archive_name} in transient directory {}",
            transient.path().display()
        );
        let archive_path = transient.path().join(sanitise_filename(archive_name));

        self.downloader.download(download_url, &archive_path)?;
        if let Some(expected) = digest {
            verify_digest(&archive_path, archive_name, expected)?;
        }

        let member = extract_member(&archive_path, archive_name, target_basename)?;
        debug!(
            "extracted {} ({} bytes) from {archive_name}",
            member.path,
            member.bytes.len()
        );
        Ok(member)
    }
}

/// Compare the file at `path` against the published digest.
fn verify_digest(path: &Path, archive_name: &str, expected: &Sha256Digest) -> Result<()> {
    let actual = compute_sha256(path).map_err(DownloadError::Io)?;
    if &actual != expected {
        return Err(ProvisionError::ChecksumMismatch {
            asset: archive_name.to_owned(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    debug!("checksum verified for {archive_name}");
    Ok(())
}

/// Last path segment of `url`, ignoring any query string or fragment.
fn archive_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => FALLBACK_ARCHIVE_NAME,
    }
}

/// Keep only the final component of an asset name so it cannot point
/// outside the transient directory.
fn sanitise_filename(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(FALLBACK_ARCHIVE_NAME)
}
