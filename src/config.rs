//! Application configuration.
//!
//! [`AppConfig`] is built once in `main` and passed down explicitly. Values
//! are layered in increasing precedence: built-in defaults derived from the
//! platform data directory, an optional TOML file named by `--config`, then
//! command-line flags.
//!
//! ```toml
//! database_path = "/srv/trimarr/trimarr.db"
//! bin_dir = "/srv/trimarr/bin"
//! log_level = "debug"
//!
//! [provision]
//! api_base = "https://api.github.com"
//! request_timeout_secs = 30
//! download_timeout_secs = 120
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use trimarr_provisioner::config::ProvisionConfig;

use crate::cli::Cli;
use crate::dirs::BaseDirs;
use crate::error::{AppError, Result};
use crate::logging::LogLevel;

/// Default database filename, relative to the trimarr data directory.
const DATABASE_FILE: &str = "db/trimarr.db";

/// Default binary directory, relative to the trimarr data directory.
const BIN_DIR: &str = "bin";

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Database file for tracking processed media.
    pub database_path: Utf8PathBuf,
    /// Directory holding provisioned tools.
    pub bin_dir: Utf8PathBuf,
    /// Console verbosity.
    pub log_level: LogLevel,
    /// Network settings for tool provisioning.
    pub provision: ProvisionConfig,
}

/// Contents of a configuration file. Every key is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Overrides [`AppConfig::database_path`].
    pub database_path: Option<Utf8PathBuf>,
    /// Overrides [`AppConfig::bin_dir`].
    pub bin_dir: Option<Utf8PathBuf>,
    /// Overrides [`AppConfig::log_level`].
    pub log_level: Option<LogLevel>,
    /// Overrides for the provisioning client.
    pub provision: ProvisionOverrides,
}

/// The `[provision]` table of a configuration file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionOverrides {
    /// Base URL of the release index.
    pub api_base: Option<String>,
    /// Release-metadata request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Asset download timeout in seconds.
    pub download_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Built-in defaults rooted at the trimarr data directory.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DataDirUnavailable`] if the platform has no data
    /// directory or its path is not valid UTF-8.
    pub fn defaults(dirs: &dyn BaseDirs) -> Result<Self> {
        let native = dirs
            .trimarr_data_dir()
            .ok_or_else(|| AppError::DataDirUnavailable {
                reason: "no home directory found".to_owned(),
            })?;
        let data_dir = Utf8PathBuf::try_from(native).map_err(|e| AppError::DataDirUnavailable {
            reason: format!("data directory is not valid UTF-8: {e}"),
        })?;
        Ok(Self::rooted_at(&data_dir))
    }

    /// Defaults with every path under `data_dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use trimarr::config::AppConfig;
    ///
    /// let config = AppConfig::rooted_at(Utf8Path::new("/data/trimarr"));
    /// assert_eq!(config.database_path, "/data/trimarr/db/trimarr.db");
    /// assert_eq!(config.bin_dir, "/data/trimarr/bin");
    /// ```
    #[must_use]
    pub fn rooted_at(data_dir: &Utf8Path) -> Self {
        Self {
            database_path: data_dir.join(DATABASE_FILE),
            bin_dir: data_dir.join(BIN_DIR),
            log_level: LogLevel::default(),
            provision: ProvisionConfig::default(),
        }
    }

    /// Resolve the configuration for `cli`.
    ///
    /// The platform data directory is consulted only when neither the file
    /// nor the flags supply both paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed,
    /// or if a default path is needed and no data directory is available.
    pub fn load(cli: &Cli, dirs: &dyn BaseDirs) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => read_file_config(path)?,
            None => FileConfig::default(),
        };

        let database_override = cli.database_path.clone().or_else(|| file.database_path.clone());
        let bin_override = cli.bin_dir.clone().or_else(|| file.bin_dir.clone());
        let mut config = match (database_override, bin_override) {
            (Some(database_path), Some(bin_dir)) => Self {
                database_path,
                bin_dir,
                ..Self::rooted_at(Utf8Path::new("."))
            },
            (database_path, bin_dir) => {
                let defaults = Self::defaults(dirs)?;
                Self {
                    database_path: database_path.unwrap_or(defaults.database_path),
                    bin_dir: bin_dir.unwrap_or(defaults.bin_dir),
                    ..defaults
                }
            }
        };

        config.apply_provision_overrides(&file.provision);
        config.log_level = cli.log_level.or(file.log_level).unwrap_or_default();
        Ok(config)
    }

    fn apply_provision_overrides(&mut self, overrides: &ProvisionOverrides) {
        if let Some(api_base) = &overrides.api_base {
            self.provision = self.provision.clone().with_api_base(api_base);
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.provision.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = overrides.download_timeout_secs {
            self.provision.download_timeout = Duration::from_secs(secs);
        }
    }
}

/// Read and parse a configuration file.
///
/// # Errors
///
/// Returns [`AppError::ConfigRead`] if the file cannot be read and
/// [`AppError::ConfigParse`] if it is not valid TOML or contains unknown
/// keys.
pub fn read_file_config(path: &Utf8Path) -> Result<FileConfig> {
    let source = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;
    toml::from_str(&source).map_err(|e| AppError::ConfigParse {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
