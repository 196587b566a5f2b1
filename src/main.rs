//! trimarr CLI entrypoint.
//!
//! Resolves configuration, installs the console logger and dispatches the
//! selected subcommand. Every command that needs `mkvmerge` makes sure it is
//! installed first.

use clap::Parser;
use log::{debug, info, warn};
use std::io::Write;
use trimarr::cli::{Cli, Command};
use trimarr::config::AppConfig;
use trimarr::dirs::SystemBaseDirs;
use trimarr::error::Result;
use trimarr::logging;
use trimarr::output::{locations_text, write_stderr_line};
use trimarr::tools::{MKVMERGE, ToolStatus, ensure_tool};

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = AppConfig::load(cli, &SystemBaseDirs)?;
    if logging::init(config.log_level).is_err() {
        // A logger is already installed; keep it.
    }
    debug!("resolved configuration: {config:?}");

    match cli.selected_command() {
        Command::Run => run_trim(&config, cli.quiet, stderr),
        Command::Provision(args) => {
            let status = ensure_tool(&config, &MKVMERGE, args.force, cli.quiet, stderr)?;
            if let ToolStatus::Present(binary) = &status
                && !cli.quiet
            {
                write_stderr_line(
                    stderr,
                    format!("{} is already installed at {}", MKVMERGE.binary, binary.path),
                );
            }
            Ok(())
        }
        Command::Where => {
            let binary_path = config.bin_dir.join(MKVMERGE.binary);
            write_stderr_line(
                stderr,
                locations_text(&config.database_path, MKVMERGE.binary, &binary_path),
            );
            Ok(())
        }
    }
}

/// Ensures `mkvmerge` is installed, then trims tracks.
fn run_trim(config: &AppConfig, quiet: bool, stderr: &mut dyn Write) -> Result<()> {
    let status = ensure_tool(config, &MKVMERGE, false, quiet, stderr)?;
    info!("using {} at {}", MKVMERGE.binary, status.binary().path);
    debug!("database path: {}", config.database_path);
    warn!("track trimming is not yet implemented");
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
