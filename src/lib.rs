//! trimarr library.
//!
//! Trims unwanted tracks from media containers using `mkvmerge`. This crate
//! holds the CLI definitions, configuration layering and the logic that makes
//! sure required tools are installed; downloading and installing them is
//! delegated to [`trimarr_provisioner`].
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Layered application configuration
//! - [`dirs`] - Platform directory lookup
//! - [`error`] - CLI error types
//! - [`logging`] - Console logger setup
//! - [`output`] - Console output helpers
//! - [`tools`] - Required tools and the ensure-installed flow

pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod logging;
pub mod output;
pub mod tools;

pub use config::AppConfig;
pub use error::AppError;
