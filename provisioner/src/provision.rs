//! Binary provisioning orchestrator.
//!
//! Runs the fail-fast pipeline resolve → locate → download and extract →
//! install. The extracted bytes are written to a temporary file beside the
//! destination and renamed into place, so callers never observe a truncated
//! binary. An advisory lock keyed by the destination serialises concurrent
//! provisioning of the same file.
//!
//! `provision` always re-downloads and overwrites. Skipping work when the
//! binary is already present is the caller's responsibility; use
//! [`installed_binary`] to probe first.

use std::fs::{self, File, OpenOptions};
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use fs2::FileExt;
use log::{debug, info};

use crate::config::ProvisionConfig;
use crate::download::{AssetDownloader, HttpDownloader};
use crate::error::{ProvisionError, Result};
use crate::installer::ArchiveInstaller;
use crate::locate::locate_asset;
use crate::release::{GithubReleaseIndex, ReleaseIndex, resolve};

/// Execute bits for owner, group and others.
pub const EXECUTE_BITS: u32 = 0o111;

/// Mode applied when the archive stores no permission bits.
const DEFAULT_MODE: u32 = 0o755;

/// Archived bits that survive installation; group and other write are dropped.
const CARRIED_BITS: u32 = 0o755;

/// Owner read, required to run the installed binary.
const OWNER_READ: u32 = 0o400;

/// What to provision and where to put it.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionRequest<'a> {
    /// Repository publishing the tool, in `owner/name` form.
    pub repository: &'a str,
    /// Exact filename of the release asset holding the binary.
    pub asset_name: &'a str,
    /// Basename of the binary inside the asset archive.
    pub target_basename: &'a str,
    /// Directory the binary is installed into.
    pub destination_dir: &'a Utf8Path,
}

impl ProvisionRequest<'_> {
    /// Final location of the installed binary.
    #[must_use]
    pub fn destination(&self) -> Utf8PathBuf {
        self.destination_dir.join(self.target_basename)
    }
}

/// A binary that has been installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    /// Path of the installed file.
    pub path: Utf8PathBuf,
    /// Whether owner, group and others may execute it.
    pub executable: bool,
}

/// Provision a binary using the production HTTP implementations.
///
/// # Errors
///
/// Returns the first [`ProvisionError`] raised by any pipeline stage.
pub fn provision(
    config: &ProvisionConfig,
    request: &ProvisionRequest<'_>,
) -> Result<InstalledBinary> {
    let index = GithubReleaseIndex::new(config);
    let downloader = HttpDownloader::new(config);
    provision_with(&index, &downloader, request)
}

/// Testable inner function with injected dependencies.
///
/// The production entry point [`provision`] delegates here with real
/// implementations; tests inject doubles.
///
/// # Errors
///
/// Returns the first [`ProvisionError`] raised by any pipeline stage. Nothing
/// is installed on error.
pub fn provision_with(
    index: &dyn ReleaseIndex,
    downloader: &dyn AssetDownloader,
    request: &ProvisionRequest<'_>,
) -> Result<InstalledBinary> {
    let destination = request.destination();
    validate_basename(request.target_basename, &destination)?;

    fs::create_dir_all(request.destination_dir)
        .map_err(|e| ProvisionError::install(request.destination_dir, &e))?;
    let _lock = DestinationLock::acquire(request.destination_dir, request.target_basename)?;

    info!(
        "provisioning {} from the latest release of {}",
        request.target_basename, request.repository
    );
    let release = resolve(index, request.repository)?;
    let asset = locate_asset(&release, request.asset_name)?;
    debug!("using asset {} of release {}", asset.name(), release.tag());
    let member =
        ArchiveInstaller::new(downloader).extract_asset_member(asset, request.target_basename)?;

    write_atomically(&destination, &member.bytes, install_mode(member.mode))?;
    info!(
        "installed {} ({} bytes) from release {}",
        destination,
        member.bytes.len(),
        release.tag()
    );

    Ok(InstalledBinary {
        path: destination,
        executable: true,
    })
}

/// Report an already-installed binary at `destination_dir/name`.
///
/// Returns `None` when nothing, or something other than a regular file,
/// occupies the path.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use trimarr_provisioner::provision::installed_binary;
///
/// assert!(installed_binary(Utf8Path::new("/nonexistent/dir"), "mkvmerge").is_none());
/// ```
#[must_use]
pub fn installed_binary(destination_dir: &Utf8Path, name: &str) -> Option<InstalledBinary> {
    let path = destination_dir.join(name);
    let metadata = fs::metadata(&path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    Some(InstalledBinary {
        executable: is_executable(&metadata),
        path,
    })
}

/// Permission bits for the installed file: the archived read bits and owner
/// write, plus owner read and execute for everyone.
fn install_mode(stored: Option<u32>) -> u32 {
    stored.map_or(DEFAULT_MODE, |mode| mode & CARRIED_BITS) | OWNER_READ | EXECUTE_BITS
}

/// Reject names that would place the binary outside `destination_dir`.
fn validate_basename(name: &str, destination: &Utf8Path) -> Result<()> {
    let plain = !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\']);
    if !plain {
        return Err(ProvisionError::Install {
            path: destination.to_owned(),
            reason: format!("'{name}' is not a plain file name"),
        });
    }
    Ok(())
}

/// Write `bytes` to `destination` via a sibling temporary file and an atomic
/// rename. The temporary file is removed if any step fails.
fn write_atomically(destination: &Utf8Path, bytes: &[u8], mode: u32) -> Result<()> {
    let dir = destination.parent().unwrap_or(Utf8Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".trimarr-")
        .tempfile_in(dir)
        .map_err(|e| ProvisionError::install(destination, &e))?;

    staged
        .write_all(bytes)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| ProvisionError::install(destination, &e))?;
    set_mode(staged.as_file(), mode).map_err(|e| ProvisionError::install(destination, &e))?;

    staged
        .persist(destination)
        .map_err(|e| ProvisionError::install(destination, &e.error))?;
    debug!("wrote {destination} with mode {mode:o}");
    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & EXECUTE_BITS == EXECUTE_BITS
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

/// Exclusive advisory lock on `destination_dir/.{name}.lock`, held until
/// dropped.
struct DestinationLock {
    _file: File,
}

impl DestinationLock {
    fn acquire(destination_dir: &Utf8Path, name: &str) -> Result<Self> {
        let path = destination_dir.join(format!(".{name}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| ProvisionError::install(path.as_path(), &e))?;
        debug!("waiting for lock {path}");
        FileExt::lock_exclusive(&file).map_err(|e| ProvisionError::install(path.as_path(), &e))?;
        Ok(Self { _file: file })
    }
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
