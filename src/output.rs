//! Console output helpers for the CLI.

use std::fmt::Display;
use std::io::Write;

use camino::Utf8Path;

/// Write `message` and a newline to `stderr`.
///
/// Output is best-effort; write failures are ignored.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Describe the configured file locations, one per line.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use trimarr::output::locations_text;
///
/// let text = locations_text(
///     Utf8Path::new("/d/trimarr.db"),
///     "mkvmerge",
///     Utf8Path::new("/d/bin/mkvmerge"),
/// );
/// assert!(text.contains("Database: /d/trimarr.db"));
/// ```
#[must_use]
pub fn locations_text(database_path: &Utf8Path, tool: &str, binary_path: &Utf8Path) -> String {
    format!("Database: {database_path}\n{tool}: {binary_path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_stderr_line_appends_newline() {
        let mut buffer = Vec::new();
        write_stderr_line(&mut buffer, "installed");
        assert_eq!(buffer, b"installed\n");
    }

    #[test]
    fn locations_text_lists_both_paths() {
        let text = locations_text(
            Utf8Path::new("/a.db"),
            "mkvmerge",
            Utf8Path::new("/bin/mkvmerge"),
        );
        assert_eq!(text, "Database: /a.db\nmkvmerge: /bin/mkvmerge");
    }
}
