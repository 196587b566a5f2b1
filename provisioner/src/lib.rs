//! Trimarr tool provisioner.
//!
//! Fetches a command-line tool such as `mkvmerge` from the latest published
//! release of a source-hosting repository and installs it as an executable
//! file in a local directory. The pipeline is fail-fast: the first error
//! aborts the run and nothing is left at the destination.
//!
//! # Modules
//!
//! - [`config`] - Endpoint, timeout and transfer settings
//! - [`digest`] - SHA-256 digests published alongside release assets
//! - [`download`] - Streaming HTTP download of release assets
//! - [`error`] - Provisioning error taxonomy
//! - [`extraction`] - Single-member extraction from tar and zip archives
//! - [`installer`] - Download-then-extract with transient storage
//! - [`locate`] - Exact-name asset lookup within a release
//! - [`provision`] - Pipeline orchestration and atomic installation
//! - [`release`] - Latest-release resolution through the index API

pub mod config;
pub mod digest;
pub mod download;
pub mod error;
pub mod extraction;
pub mod installer;
pub mod locate;
pub mod provision;
pub mod release;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use error::ProvisionError;
pub use provision::{InstalledBinary, ProvisionRequest, installed_binary, provision};
