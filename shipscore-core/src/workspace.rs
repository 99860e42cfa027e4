//! Isolated, single-scan checkout directories.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;

/// An exclusively-owned scan directory. Lifetime is one scan: provisioned by
/// the fetch stage, read by everything downstream, reclaimed when the scan
/// ends however it ends. Paths are uuid-named, so no two scans ever share one.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    reclaimed: bool,
}

impl Workspace {
    /// Create a fresh workspace directory under `root`.
    pub fn provision(root: &Path) -> Result<Self> {
        let path = root.join(format!("shipscore-{}", Uuid::new_v4().simple()));
        std::fs::create_dir_all(&path)?;
        Ok(Self {
            path,
            reclaimed: false,
        })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the workspace tree if it still exists. Never fails: the scan is
    /// already over by the time cleanup runs, so deletion problems are logged
    /// and swallowed. Safe to call more than once.
    pub fn reclaim(&mut self) {
        self.reclaimed = true;
        if !self.path.exists() {
            return;
        }
        if let Err(err) = std::fs::remove_dir_all(&self.path) {
            log::warn!(
                "failed to reclaim workspace {}: {err}",
                self.path.display()
            );
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.reclaimed {
            self.reclaim();
        }
    }
}
