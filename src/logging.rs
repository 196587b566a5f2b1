//! Console logging setup.
//!
//! Library crates log through the `log` facade; the binary installs
//! `env_logger` once at start-up with the level chosen on the command line or
//! in the configuration file. `RUST_LOG`, when set, takes precedence.

use std::io::Write;

use clap::ValueEnum;
use log::LevelFilter;
use serde::Deserialize;

/// Console verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Pipeline steps and diagnostics.
    Debug,
    /// Progress messages.
    #[default]
    Info,
    /// Alias of `info`.
    Success,
    /// Warnings and errors only.
    Warning,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// The `log` filter this level maps to.
    ///
    /// # Examples
    ///
    /// ```
    /// use log::LevelFilter;
    /// use trimarr::logging::LogLevel;
    ///
    /// assert_eq!(LogLevel::Success.filter(), LevelFilter::Info);
    /// ```
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::Debug,
            Self::Info | Self::Success => LevelFilter::Info,
            Self::Warning => LevelFilter::Warn,
            Self::Error => LevelFilter::Error,
        }
    }
}

/// Install the global logger.
///
/// Lines are rendered as `timestamp | LEVEL    | message` on stderr.
///
/// # Errors
///
/// Returns an error if a logger has already been installed.
pub fn init(level: LogLevel) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(level.filter())
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} | {:<8} | {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::debug(LogLevel::Debug, LevelFilter::Debug)]
    #[case::info(LogLevel::Info, LevelFilter::Info)]
    #[case::success(LogLevel::Success, LevelFilter::Info)]
    #[case::warning(LogLevel::Warning, LevelFilter::Warn)]
    #[case::error(LogLevel::Error, LevelFilter::Error)]
    fn maps_to_log_filter(#[case] level: LogLevel, #[case] expected: LevelFilter) {
        assert_eq!(level.filter(), expected);
    }

    #[rstest]
    #[case("DEBUG", LogLevel::Debug)]
    #[case("Warning", LogLevel::Warning)]
    #[case("success", LogLevel::Success)]
    fn parses_case_insensitively(#[case] input: &str, #[case] expected: LogLevel) {
        let parsed = LogLevel::from_str(input, true).expect("valid level");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(LogLevel::from_str("verbose", true).is_err());
    }

    #[test]
    fn deserialises_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }

        let wrapper: Wrapper = toml::from_str("level = \"warning\"").expect("valid TOML");
        assert_eq!(wrapper.level, LogLevel::Warning);
    }
}
