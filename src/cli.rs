//! CLI argument definitions for trimarr.
//!
//! Global options may be given before or after the subcommand. Running
//! without a subcommand behaves like `trimarr run`.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::logging::LogLevel;

/// Trim unwanted tracks from media containers.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "trimarr")]
#[command(version, about)]
#[command(long_about = concat!(
    "Trim unwanted tracks from media containers.\n\n",
    "trimarr relies on mkvmerge from MKVToolNix. When mkvmerge is missing from the ",
    "binary directory, a static Linux build is downloaded from the latest release of ",
    "Jesseatgao/MKVToolNix-static-builds and installed there.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Ensure mkvmerge is installed and run:\n",
    "    $ trimarr\n\n",
    "  Re-download mkvmerge even if present:\n",
    "    $ trimarr provision --force\n\n",
    "  Show where trimarr keeps its files:\n",
    "    $ trimarr where",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// TOML configuration file.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Path to the database file for tracking processed media [default: platform-specific].
    #[arg(long, value_name = "FILE", global = true)]
    pub database_path: Option<Utf8PathBuf>,

    /// Logging level for console output [default: info].
    #[arg(long, value_enum, ignore_case = true, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Directory holding provisioned tools [default: platform-specific].
    #[arg(long, value_name = "DIR", global = true)]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Suppress progress output.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// The subcommand to run, defaulting to [`Command::Run`].
    #[must_use]
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ensure required tools are present, then trim tracks (default).
    Run,

    /// Install required tools.
    Provision(ProvisionArgs),

    /// Print the configured database and binary paths.
    Where,
}

/// Arguments for the provision command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionArgs {
    /// Download again even if the tool is already installed.
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
