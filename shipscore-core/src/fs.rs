//! Filesystem abstractions used for indexing.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Directories the index walk never descends into. Hidden directories are
/// skipped separately.
const VENDOR_DIRS: &[&str] = &["node_modules", "vendor", "bower_components", "target"];

/// Abstraction over filesystem access for testability.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem: Send + Sync {
    /// List all files reachable from the root path, skipping hidden and
    /// vendor directories, in a deterministic order. Hidden files are kept:
    /// committed `.env` and `.gitignore` files matter to scoring.
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>>;
    /// Read a file into a string.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create a new standard filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries: Vec<PathBuf> = Vec::new();
            for entry in std::fs::read_dir(&dir)? {
                entries.push(entry?.path());
            }
            entries.sort();
            for path in entries {
                if path.is_dir() {
                    if !is_hidden(&path) && !is_vendor_dir(&path) {
                        pending.push(path);
                    }
                } else if path.is_file() {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_vendor_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| VENDOR_DIRS.contains(&name))
        .unwrap_or(false)
}
