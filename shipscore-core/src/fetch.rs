//! Source-fetch capability: shallow, bounded checkouts.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Result, ScanError, TimeoutStage};
use crate::reference::RepoReference;

/// Something that can materialize a validated reference as a local directory
/// tree under caller-imposed limits. The default is a `git` subprocess; an
/// alternate mechanism (a tarball download, a fixture copier in tests) can be
/// substituted without touching scoring logic.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Populate `dest` with a fresh checkout of `reference`.
    async fn fetch(&self, reference: &RepoReference, dest: &Path) -> Result<()>;
}

/// Fetcher backed by a shallow `git clone` subprocess.
#[derive(Debug, Clone)]
pub struct GitSourceFetcher {
    clone_timeout: Duration,
    max_repo_bytes: u64,
}

impl GitSourceFetcher {
    /// Create a fetcher with the given clone ceiling and byte ceiling.
    pub fn new(clone_timeout: Duration, max_repo_bytes: u64) -> Self {
        Self {
            clone_timeout,
            max_repo_bytes,
        }
    }
}

#[async_trait]
impl SourceFetcher for GitSourceFetcher {
    async fn fetch(&self, reference: &RepoReference, dest: &Path) -> Result<()> {
        // Argv only: the url is rebuilt from validated segments and never
        // passes through a shell.
        let mut command = Command::new("git");
        command
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--single-branch")
            .arg(reference.clone_url())
            .arg(dest)
            // Private repositories must fail, not sit on a credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.clone_timeout, command.output())
            .await
            .map_err(|_| ScanError::Timeout(TimeoutStage::Clone))?
            .map_err(|err| ScanError::Unreachable(format!("git unavailable: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::info!(
                "clone failed for {}/{}: {stderr}",
                reference.owner(),
                reference.name()
            );
            return Err(ScanError::Unreachable(stderr));
        }

        match tree_size_within(dest, self.max_repo_bytes)? {
            SizeCheck::Within(bytes) => {
                log::debug!("checkout of {}/{} is {bytes} bytes", reference.owner(), reference.name());
                Ok(())
            }
            SizeCheck::Exceeded => Err(ScanError::TooLarge {
                limit_bytes: self.max_repo_bytes,
            }),
        }
    }
}

/// Outcome of the bounded size walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCheck {
    /// Total size of the tree, within the ceiling.
    Within(u64),
    /// The running total crossed the ceiling; the walk stopped there.
    Exceeded,
}

/// Accumulate the byte size of the tree at `root`, returning the instant the
/// running total crosses `ceiling` rather than sizing the whole tree first.
/// Every entry counts, hidden ones included: the ceiling bounds host
/// resources, not scoring cost.
pub fn tree_size_within(root: &Path, ceiling: u64) -> Result<SizeCheck> {
    let mut total: u64 = 0;
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                total = total.saturating_add(entry.metadata()?.len());
                if total > ceiling {
                    return Ok(SizeCheck::Exceeded);
                }
            }
        }
    }

    Ok(SizeCheck::Within(total))
}
