//! Shared test utilities for the provisioner crate.
//!
//! Builds small archives in every supported format and release-index
//! payloads, so unit and behaviour tests can exercise the real extraction
//! code without network access.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::extraction::ArchiveFormat;

/// One entry to place in a generated archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Entry path, written verbatim (unsafe paths are allowed on purpose).
    pub path: String,
    /// File content; ignored for directories.
    pub data: Vec<u8>,
    /// Unix permission bits.
    pub mode: u32,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl ArchiveEntry {
    /// A regular file with mode `0o644`.
    pub fn file(path: &str, data: &[u8]) -> Self {
        Self {
            path: path.to_owned(),
            data: data.to_vec(),
            mode: 0o644,
            is_dir: false,
        }
    }

    /// A directory entry.
    pub fn dir(path: &str) -> Self {
        Self {
            path: path.to_owned(),
            data: Vec::new(),
            mode: 0o755,
            is_dir: true,
        }
    }

    /// Override the stored permission bits.
    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }
}

/// Write an archive at `path`, choosing the format from its filename.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written or the filename has
/// no recognised archive suffix.
pub fn write_archive(path: &Path, entries: &[ArchiveEntry]) -> io::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = ArchiveFormat::from_filename(&name).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("no archive suffix: {name}"))
    })?;
    let file = File::create(path)?;
    match format {
        ArchiveFormat::TarXz => {
            let encoder = write_tar(xz2::write::XzEncoder::new(file, 6), entries)?;
            encoder.finish()?;
        }
        ArchiveFormat::TarGz => {
            let encoder = write_tar(
                flate2::write::GzEncoder::new(file, flate2::Compression::default()),
                entries,
            )?;
            encoder.finish()?;
        }
        ArchiveFormat::TarZst => {
            let encoder = write_tar(zstd::Encoder::new(file, 0)?, entries)?;
            encoder.finish()?;
        }
        ArchiveFormat::Tar => {
            write_tar(file, entries)?;
        }
        ArchiveFormat::Zip => write_zip(file, entries)?,
    }
    Ok(())
}

/// Create a `.tar.xz` archive in memory.
///
/// # Errors
///
/// Returns an I/O error if encoding fails.
pub fn tar_xz_bytes(entries: &[ArchiveEntry]) -> io::Result<Vec<u8>> {
    let encoder = write_tar(xz2::write::XzEncoder::new(Vec::new(), 6), entries)?;
    encoder.finish()
}

/// Write tar entries into `writer` and return it once the archive is
/// finished.
///
/// Paths are copied into the header byte-for-byte, bypassing the `tar`
/// crate's own path checks, so traversal fixtures can be produced.
fn write_tar<W: Write>(writer: W, entries: &[ArchiveEntry]) -> io::Result<W> {
    let mut builder = tar::Builder::new(writer);
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        let name = entry.path.as_bytes();
        let slot = &mut header.as_old_mut().name;
        if name.len() > slot.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("entry path too long for fixture: {}", entry.path),
            ));
        }
        slot[..name.len()].copy_from_slice(name);
        header.set_mode(entry.mode);
        if entry.is_dir {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
        } else {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(entry.data.len() as u64);
        }
        header.set_cksum();
        builder.append(&header, entry.data.as_slice())?;
    }
    builder.into_inner()
}

fn write_zip(file: File, entries: &[ArchiveEntry]) -> io::Result<()> {
    let mut writer = zip::ZipWriter::new(file);
    for entry in entries {
        let options = zip::write::SimpleFileOptions::default().unix_permissions(entry.mode);
        if entry.is_dir {
            writer
                .add_directory(entry.path.as_str(), options)
                .map_err(io::Error::other)?;
        } else {
            writer
                .start_file(entry.path.as_str(), options)
                .map_err(io::Error::other)?;
            writer.write_all(&entry.data)?;
        }
    }
    writer.finish().map_err(io::Error::other)?;
    Ok(())
}

/// Build a release-index response body.
///
/// Each asset is a `(name, browser_download_url)` pair.
pub fn release_json(tag: &str, assets: &[(&str, &str)]) -> String {
    let assets: Vec<serde_json::Value> = assets
        .iter()
        .map(|(name, url)| serde_json::json!({ "name": name, "browser_download_url": url }))
        .collect();
    serde_json::json!({ "tag_name": tag, "assets": assets }).to_string()
}

/// Build a release-index response body for a single asset that publishes
/// `sha256:{digest}`.
pub fn release_json_with_digest(tag: &str, name: &str, url: &str, digest: &str) -> String {
    serde_json::json!({
        "tag_name": tag,
        "assets": [{
            "name": name,
            "browser_download_url": url,
            "digest": format!("sha256:{digest}"),
        }],
    })
    .to_string()
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    format!("{:x}", Sha256::digest(data))
}
