//! File system utility functions
//!
//! Removal helpers that treat an already-absent path as done.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, instrument};

/// Utility struct for file system operations
#[derive(Debug)]
pub struct FileSystemUtils;

impl FileSystemUtils {
    /// Create a new file system utilities instance
    pub fn new() -> Self {
        Self
    }

    /// Remove a file if it exists
    #[instrument(skip(self))]
    pub fn remove_file_if_exists<P: AsRef<Path> + std::fmt::Debug>(
        &self,
        path: P,
    ) -> io::Result<bool> {
        let path = path.as_ref();

        match fs::remove_file(path) {
            Ok(()) => {
                debug!("Removed file: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("File does not exist: {}", path.display());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Remove a directory and all its contents if it exists
    #[instrument(skip(self))]
    pub fn remove_dir_all_if_exists<P: AsRef<Path> + std::fmt::Debug>(
        &self,
        path: P,
    ) -> io::Result<bool> {
        let path = path.as_ref();

        match fs::remove_dir_all(path) {
            Ok(()) => {
                debug!("Removed directory: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Directory does not exist: {}", path.display());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Remove whatever sits at `path`, file or directory
    pub fn remove_path_if_exists<P: AsRef<Path> + std::fmt::Debug>(
        &self,
        path: P,
    ) -> io::Result<bool> {
        let path = path.as_ref();

        match fs::symlink_metadata(path) {
            Ok(metadata) if metadata.is_dir() => self.remove_dir_all_if_exists(path),
            Ok(_) => self.remove_file_if_exists(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove every visible entry inside a directory, keeping the directory
    ///
    /// Dot-entries (`.gitkeep` and the like) stay, the way `rm -rf dir/*`
    /// leaves them. Returns how many entries were removed; a missing
    /// directory counts as empty.
    #[instrument(skip(self))]
    pub fn clear_dir<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> io::Result<usize> {
        let path = path.as_ref();

        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Directory does not exist: {}", path.display());
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                debug!("Keeping hidden entry: {}", entry.path().display());
                continue;
            }
            if self.remove_path_if_exists(entry.path())? {
                removed += 1;
            }
        }

        debug!("Removed {} entries from {}", removed, path.display());
        Ok(removed)
    }
}

impl Default for FileSystemUtils {
    fn default() -> Self {
        Self::new()
    }
}
