//! Error types for the trimarr CLI.
//!
//! Library failures from the provisioner are wrapped with the tool they were
//! provisioning; configuration problems carry the offending path.

use camino::Utf8PathBuf;
use thiserror::Error;
use trimarr_provisioner::ProvisionError;

/// Errors that end a trimarr invocation.
#[derive(Debug, Error)]
pub enum AppError {
    /// The configuration file could not be read.
    #[error("cannot read configuration file {path}: {reason}")]
    ConfigRead {
        /// Path passed via `--config`.
        path: Utf8PathBuf,
        /// Description of the I/O failure.
        reason: String,
    },

    /// The configuration file is not valid TOML or has unknown keys.
    #[error("invalid configuration file {path}: {reason}")]
    ConfigParse {
        /// Path passed via `--config`.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// No platform data directory is available for the default paths.
    #[error("cannot determine a data directory: {reason}; pass --database-path and --bin-dir")]
    DataDirUnavailable {
        /// Why the directory could not be determined.
        reason: String,
    },

    /// Provisioning a required tool failed.
    #[error("could not provision {tool}: {source}")]
    ToolProvisioning {
        /// Basename of the tool being installed.
        tool: String,
        /// Underlying pipeline failure.
        #[source]
        source: ProvisionError,
    },
}

/// Convenience alias for CLI results.
pub type Result<T> = std::result::Result<T, AppError>;
