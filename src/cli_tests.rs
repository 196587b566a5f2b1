//! Tests for trimarr CLI parsing and default behaviours.

use super::*;
use clap::CommandFactory;
use rstest::rstest;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["trimarr"]);
    assert!(cli.command.is_none());
    assert!(cli.config.is_none());
    assert!(cli.database_path.is_none());
    assert!(cli.log_level.is_none());
    assert!(cli.bin_dir.is_none());
    assert!(!cli.quiet);
    assert_eq!(cli.selected_command(), Command::Run);
}

#[test]
fn cli_parses_paths() {
    let cli = Cli::parse_from([
        "trimarr",
        "--database-path",
        "/tmp/trimarr.db",
        "--bin-dir",
        "/tmp/bin",
        "--config",
        "/etc/trimarr.toml",
    ]);
    assert_eq!(cli.database_path, Some(Utf8PathBuf::from("/tmp/trimarr.db")));
    assert_eq!(cli.bin_dir, Some(Utf8PathBuf::from("/tmp/bin")));
    assert_eq!(cli.config, Some(Utf8PathBuf::from("/etc/trimarr.toml")));
}

#[rstest]
#[case::upper("DEBUG", LogLevel::Debug)]
#[case::lower("info", LogLevel::Info)]
#[case::mixed("Success", LogLevel::Success)]
#[case::warning("WARNING", LogLevel::Warning)]
#[case::error("error", LogLevel::Error)]
fn cli_parses_log_level_case_insensitively(#[case] input: &str, #[case] expected: LogLevel) {
    let cli = Cli::parse_from(["trimarr", "--log-level", input]);
    assert_eq!(cli.log_level, Some(expected));
}

#[test]
fn cli_rejects_unknown_log_level() {
    let result = Cli::try_parse_from(["trimarr", "--log-level", "trace"]);
    assert!(result.is_err());
}

#[rstest]
#[case::run(&["trimarr", "run"], Command::Run)]
#[case::provision(&["trimarr", "provision"], Command::Provision(ProvisionArgs { force: false }))]
#[case::force(&["trimarr", "provision", "--force"], Command::Provision(ProvisionArgs { force: true }))]
#[case::where_(&["trimarr", "where"], Command::Where)]
fn cli_parses_subcommands(#[case] args: &[&str], #[case] expected: Command) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.selected_command(), expected);
}

#[test]
fn global_options_follow_the_subcommand() {
    let cli = Cli::parse_from(["trimarr", "provision", "-q", "--bin-dir", "/opt/bin"]);
    assert!(cli.quiet);
    assert_eq!(cli.bin_dir, Some(Utf8PathBuf::from("/opt/bin")));
}
