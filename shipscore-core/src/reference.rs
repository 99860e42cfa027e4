//! Repository reference validation.
//!
//! The reference is later placed on a `git` command line, so validation is
//! the primary injection defense: only `https://github.com/<owner>/<name>`
//! survives, decomposed by plain string handling with a strict character
//! allow-list. Nothing here ever reaches a shell.

use crate::error::{Result, ScanError};

const ALLOWED_HOST_PREFIX: &str = "https://github.com/";

/// A validated public-repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReference {
    owner: String,
    name: String,
}

impl RepoReference {
    /// Parse and validate a raw reference string.
    ///
    /// Accepts an optional trailing `/` or `.git` suffix; rejects anything
    /// outside the host/owner/name shape before any external process runs.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let rest = trimmed
            .strip_prefix(ALLOWED_HOST_PREFIX)
            .ok_or_else(|| ScanError::InvalidReference(trimmed.to_string()))?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let mut segments = rest.split('/');
        let owner = segments.next().unwrap_or_default();
        let name = segments.next().unwrap_or_default();
        if segments.next().is_some() {
            return Err(ScanError::InvalidReference(trimmed.to_string()));
        }
        let name = name.strip_suffix(".git").unwrap_or(name);

        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(ScanError::InvalidReference(trimmed.to_string()));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Repository owner segment.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical clone URL. Built from the validated segments, never from
    /// the raw input.
    pub fn clone_url(&self) -> String {
        format!("{ALLOWED_HOST_PREFIX}{}/{}.git", self.owner, self.name)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
