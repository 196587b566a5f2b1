//! Platform directory lookup.
//!
//! Default paths are derived from the user's data directory. The lookup sits
//! behind [`BaseDirs`] so configuration tests can supply fixed directories.

use std::path::PathBuf;

/// Source of platform base directories.
pub trait BaseDirs {
    /// The user's data directory, e.g. `~/.local/share` on Linux.
    fn data_dir(&self) -> Option<PathBuf>;

    /// The trimarr subdirectory of [`Self::data_dir`].
    fn trimarr_data_dir(&self) -> Option<PathBuf> {
        self.data_dir().map(|dir| dir.join("trimarr"))
    }
}

/// [`BaseDirs`] backed by `directories-next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn data_dir(&self) -> Option<PathBuf> {
        directories_next::BaseDirs::new().map(|dirs| dirs.data_dir().to_path_buf())
    }
}
