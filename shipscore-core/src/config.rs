//! Scan limits and tunables.

use std::path::PathBuf;
use std::time::Duration;

/// Resource bounds and tunables for one scanner instance.
///
/// Defaults match the documented contract; every field can be overridden from
/// the environment via [`ScanConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Admissions allowed per client within the trailing window.
    pub rate_quota: usize,
    /// Length of the trailing admission window.
    pub rate_window: Duration,
    /// Wall-clock ceiling for the shallow clone.
    pub clone_timeout: Duration,
    /// Wall-clock ceiling for the whole scan, clone included.
    pub scan_timeout: Duration,
    /// Byte ceiling for the checked-out tree.
    pub max_repo_bytes: u64,
    /// Maximum candidate files read by one content search.
    pub file_scan_cap: usize,
    /// Minimum length for the generic opaque-token secret pattern.
    ///
    /// The fallback pattern is deliberately broad and will flag long
    /// non-secret identifiers; raising this trades recall for precision.
    pub generic_token_min_len: usize,
    /// Parent directory for scan workspaces.
    pub workspace_root: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rate_quota: 10,
            rate_window: Duration::from_secs(60 * 60),
            clone_timeout: Duration::from_secs(30),
            scan_timeout: Duration::from_secs(60),
            max_repo_bytes: 100 * 1024 * 1024,
            file_scan_cap: 50,
            generic_token_min_len: 32,
            workspace_root: std::env::temp_dir(),
        }
    }
}

impl ScanConfig {
    /// Build a config from `SHIPSCORE_*` environment variables, falling back
    /// to the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rate_quota: env_parse("SHIPSCORE_RATE_QUOTA").unwrap_or(defaults.rate_quota),
            rate_window: env_secs("SHIPSCORE_RATE_WINDOW_SECS").unwrap_or(defaults.rate_window),
            clone_timeout: env_secs("SHIPSCORE_CLONE_TIMEOUT_SECS")
                .unwrap_or(defaults.clone_timeout),
            scan_timeout: env_secs("SHIPSCORE_SCAN_TIMEOUT_SECS").unwrap_or(defaults.scan_timeout),
            max_repo_bytes: env_parse("SHIPSCORE_MAX_REPO_BYTES").unwrap_or(defaults.max_repo_bytes),
            file_scan_cap: env_parse("SHIPSCORE_FILE_SCAN_CAP").unwrap_or(defaults.file_scan_cap),
            generic_token_min_len: env_parse("SHIPSCORE_TOKEN_MIN_LEN")
                .unwrap_or(defaults.generic_token_min_len),
            workspace_root: std::env::var("SHIPSCORE_WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_root),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::ScanConfig;
    use std::time::Duration;

    #[test]
    fn defaults_match_documented_limits() {
        let config = ScanConfig::default();
        assert_eq!(config.rate_quota, 10);
        assert_eq!(config.rate_window, Duration::from_secs(3600));
        assert_eq!(config.clone_timeout, Duration::from_secs(30));
        assert_eq!(config.scan_timeout, Duration::from_secs(60));
        assert_eq!(config.max_repo_bytes, 100 * 1024 * 1024);
        assert_eq!(config.file_scan_cap, 50);
        assert_eq!(config.generic_token_min_len, 32);
    }

    #[test]
    fn from_env_falls_back_on_garbage() {
        // Unset or malformed variables must not break startup.
        unsafe { std::env::set_var("SHIPSCORE_RATE_QUOTA", "not-a-number") };
        let config = ScanConfig::from_env();
        assert_eq!(config.rate_quota, 10);
        unsafe { std::env::remove_var("SHIPSCORE_RATE_QUOTA") };
    }
}
