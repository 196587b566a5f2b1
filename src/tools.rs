//! Third-party tools trimarr depends on, and how to make them available.
//!
//! The provisioner always downloads; deciding whether that is necessary
//! happens here. A tool that is already installed and executable is left
//! alone unless a fresh copy is forced.

use std::io::Write;

use camino::Utf8Path;
use log::{debug, warn};
use trimarr_provisioner::download::{AssetDownloader, HttpDownloader};
use trimarr_provisioner::provision::provision_with;
use trimarr_provisioner::release::{GithubReleaseIndex, ReleaseIndex};
use trimarr_provisioner::{InstalledBinary, ProvisionRequest, installed_binary};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::output::write_stderr_line;

/// Where a tool is published and what it is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    /// Repository publishing the tool, in `owner/name` form.
    pub repository: &'static str,
    /// Release asset holding the tool.
    pub asset_name: &'static str,
    /// Basename of the executable inside the asset.
    pub binary: &'static str,
}

/// Static Linux build of `mkvmerge` from MKVToolNix.
pub const MKVMERGE: ToolSpec = ToolSpec {
    repository: "Jesseatgao/MKVToolNix-static-builds",
    asset_name: "mkvtoolnix-x86_64-linux.tar.xz",
    binary: "mkvmerge",
};

impl ToolSpec {
    /// A provisioning request installing this tool into `bin_dir`.
    #[must_use]
    pub const fn request<'a>(&'a self, bin_dir: &'a Utf8Path) -> ProvisionRequest<'a> {
        ProvisionRequest {
            repository: self.repository,
            asset_name: self.asset_name,
            target_basename: self.binary,
            destination_dir: bin_dir,
        }
    }
}

/// Outcome of [`ensure_tool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// The tool was already installed and nothing was downloaded.
    Present(InstalledBinary),
    /// The tool was downloaded and installed.
    Provisioned(InstalledBinary),
}

impl ToolStatus {
    /// The installed binary, however it got there.
    #[must_use]
    pub const fn binary(&self) -> &InstalledBinary {
        match self {
            Self::Present(binary) | Self::Provisioned(binary) => binary,
        }
    }
}

/// Options for [`ensure_tool_with`].
#[derive(Debug, Clone, Copy)]
pub struct EnsureOptions<'a> {
    /// Directory the tool is installed into.
    pub bin_dir: &'a Utf8Path,
    /// Download even if the tool is already installed.
    pub force: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

/// Make `tool` available in the configured binary directory, downloading it
/// over HTTP if needed.
///
/// # Errors
///
/// Returns [`AppError::ToolProvisioning`] if the tool had to be provisioned
/// and provisioning failed.
pub fn ensure_tool(
    config: &AppConfig,
    tool: &ToolSpec,
    force: bool,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<ToolStatus> {
    let index = GithubReleaseIndex::new(&config.provision);
    let downloader = HttpDownloader::new(&config.provision);
    let options = EnsureOptions {
        bin_dir: &config.bin_dir,
        force,
        quiet,
    };
    ensure_tool_with(tool, &options, &index, &downloader, stderr)
}

/// Testable inner function with injected dependencies.
///
/// # Errors
///
/// Returns [`AppError::ToolProvisioning`] if provisioning was attempted and
/// failed.
pub fn ensure_tool_with(
    tool: &ToolSpec,
    options: &EnsureOptions<'_>,
    index: &dyn ReleaseIndex,
    downloader: &dyn AssetDownloader,
    stderr: &mut dyn Write,
) -> Result<ToolStatus> {
    if !options.force {
        match installed_binary(options.bin_dir, tool.binary) {
            Some(binary) if binary.executable => {
                debug!("{} already installed at {}", tool.binary, binary.path);
                return Ok(ToolStatus::Present(binary));
            }
            Some(binary) => warn!("{} is not executable; reinstalling", binary.path),
            None => debug!("{} not found in {}", tool.binary, options.bin_dir),
        }
    }

    if !options.quiet {
        write_stderr_line(
            stderr,
            format!("Downloading {} from {}...", tool.binary, tool.repository),
        );
    }
    let binary = provision_with(index, downloader, &tool.request(options.bin_dir)).map_err(
        |source| AppError::ToolProvisioning {
            tool: tool.binary.to_owned(),
            source,
        },
    )?;
    if !options.quiet {
        write_stderr_line(stderr, format!("Installed {} to {}", tool.binary, binary.path));
    }
    Ok(ToolStatus::Provisioned(binary))
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
