//! Single-member extraction from downloaded archives.
//!
//! Opens a compressed archive, walks its members lazily and returns the bytes
//! of the first regular file whose basename matches the target, however deep
//! it is nested. Every visited entry path is validated so that an archive
//! carrying `..` segments or absolute paths is rejected (zip-slip).

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path};

use log::trace;

use crate::error::{ProvisionError, Result};

/// Archive container and compression, derived from the asset filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.tar.xz` / `.txz`
    TarXz,
    /// `.tar.gz` / `.tgz`
    TarGz,
    /// `.tar.zst` / `.tzst`
    TarZst,
    /// Uncompressed `.tar`
    Tar,
    /// `.zip`
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from a filename suffix, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use trimarr_provisioner::extraction::ArchiveFormat;
    ///
    /// assert_eq!(
    ///     ArchiveFormat::from_filename("mkvtoolnix-x86_64-linux.tar.xz"),
    ///     Some(ArchiveFormat::TarXz)
    /// );
    /// assert_eq!(ArchiveFormat::from_filename("README.md"), None);
    /// ```
    #[must_use]
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let suffixes: [(&[&str], Self); 5] = [
            (&[".tar.xz", ".txz"], Self::TarXz),
            (&[".tar.gz", ".tgz"], Self::TarGz),
            (&[".tar.zst", ".tzst"], Self::TarZst),
            (&[".tar"], Self::Tar),
            (&[".zip"], Self::Zip),
        ];
        suffixes
            .into_iter()
            .find(|(exts, _)| exts.iter().any(|ext| lower.ends_with(ext)))
            .map(|(_, format)| format)
    }
}

/// Logical view of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Entry path as stored, possibly with directory components.
    pub path: String,
    /// Whether the entry is a regular file (not a directory or link).
    pub is_regular_file: bool,
}

impl ArchiveMember {
    /// Whether this member is a regular file named `basename`.
    ///
    /// Directory depth is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use trimarr_provisioner::extraction::ArchiveMember;
    ///
    /// let member = ArchiveMember {
    ///     path: "tools/subdir/mkvmerge".to_owned(),
    ///     is_regular_file: true,
    /// };
    /// assert!(member.matches_basename("mkvmerge"));
    /// assert!(!member.matches_basename("subdir"));
    /// ```
    #[must_use]
    pub fn matches_basename(&self, basename: &str) -> bool {
        self.is_regular_file && Path::new(&self.path).file_name() == Some(OsStr::new(basename))
    }
}

/// Content of the member selected for installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMember {
    /// Entry path inside the archive.
    pub path: String,
    /// Unix permission bits stored in the archive, when present.
    pub mode: Option<u32>,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

/// Extract the first regular file named `target_basename` from the archive
/// at `archive_path`.
///
/// `source` is the archive's original filename; it selects the decoder and
/// names the archive in errors.
///
/// Entries are path-validated as they are visited and the walk stops at the
/// first match, so entries after the member are never validated. Only the
/// matched member's bytes are read and nothing else is written to disk.
///
/// # Errors
///
/// - [`ProvisionError::Archive`] if the format is unsupported or the archive
///   cannot be decoded.
/// - [`ProvisionError::UnsafeArchiveEntry`] if a visited entry path escapes
///   the extraction root.
/// - [`ProvisionError::MemberNotFound`] if no matching regular file exists.
pub fn extract_member(
    archive_path: &Path,
    source: &str,
    target_basename: &str,
) -> Result<ExtractedMember> {
    let format = ArchiveFormat::from_filename(source).ok_or_else(|| ProvisionError::Archive {
        archive: source.to_owned(),
        reason: "unsupported archive format".to_owned(),
    })?;
    let file = File::open(archive_path).map_err(|e| ProvisionError::archive(source, e))?;
    let reader = BufReader::new(file);
    let search = MemberSearch {
        source,
        target: target_basename,
    };

    let found = match format {
        ArchiveFormat::TarXz => search.in_tar(xz2::read::XzDecoder::new_multi_decoder(reader))?,
        ArchiveFormat::TarGz => search.in_tar(flate2::read::GzDecoder::new(reader))?,
        ArchiveFormat::TarZst => {
            let decoder =
                zstd::Decoder::with_buffer(reader).map_err(|e| ProvisionError::archive(source, e))?;
            search.in_tar(decoder)?
        }
        ArchiveFormat::Tar => search.in_tar(reader)?,
        ArchiveFormat::Zip => search.in_zip(reader)?,
    };

    found.ok_or_else(|| ProvisionError::MemberNotFound {
        member: target_basename.to_owned(),
        archive: source.to_owned(),
    })
}

struct MemberSearch<'a> {
    source: &'a str,
    target: &'a str,
}

impl MemberSearch<'_> {
    fn in_tar<R: Read>(&self, reader: R) -> Result<Option<ExtractedMember>> {
        let mut archive = tar::Archive::new(reader);
        let entries = archive.entries().map_err(|e| self.corrupt(e))?;
        for entry_result in entries {
            let mut entry = entry_result.map_err(|e| self.corrupt(e))?;
            let entry_path = entry.path().map_err(|e| self.corrupt(e))?.into_owned();
            validate_entry_path(&entry_path, self.source)?;

            let member = ArchiveMember {
                path: entry_path.to_string_lossy().into_owned(),
                is_regular_file: entry.header().entry_type().is_file(),
            };
            trace!("{}: visiting {}", self.source, member.path);
            if !member.matches_basename(self.target) {
                continue;
            }

            let mode = entry.header().mode().ok();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(|e| self.corrupt(e))?;
            return Ok(Some(ExtractedMember {
                path: member.path,
                mode,
                bytes,
            }));
        }
        Ok(None)
    }

    fn in_zip<R: Read + std::io::Seek>(&self, reader: R) -> Result<Option<ExtractedMember>> {
        let mut archive = zip::ZipArchive::new(reader).map_err(|e| self.corrupt(e))?;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| self.corrupt(e))?;
            let member = ArchiveMember {
                path: entry.name().to_owned(),
                is_regular_file: entry.is_file(),
            };
            validate_entry_path(Path::new(&member.path), self.source)?;
            trace!("{}: visiting {}", self.source, member.path);
            if !member.matches_basename(self.target) {
                continue;
            }

            let mode = entry.unix_mode();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(|e| self.corrupt(e))?;
            return Ok(Some(ExtractedMember {
                path: member.path,
                mode,
                bytes,
            }));
        }
        Ok(None)
    }

    fn corrupt(&self, err: impl std::fmt::Display) -> ProvisionError {
        ProvisionError::archive(self.source, err)
    }
}

/// Validate that an entry path does not escape the extraction root via `..`
/// components or absolute paths.
fn validate_entry_path(path: &Path, source: &str) -> Result<()> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return Err(ProvisionError::UnsafeArchiveEntry {
            path: path.display().to_string(),
            archive: source.to_owned(),
        });
    }
    Ok(())
}
