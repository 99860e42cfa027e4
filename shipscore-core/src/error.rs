//! Error types for ShipScore core.

use std::{error::Error, fmt, io, time::Duration};

/// Pipeline stage that exceeded its wall-clock ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutStage {
    /// The shallow clone ran past the fetch ceiling.
    Clone,
    /// The overall scan ran past the scan ceiling.
    Scan,
}

/// Error type for ShipScore core operations.
///
/// `Display` renders the stable, caller-facing message for each kind; detail
/// fields (underlying command output, paths, I/O errors) are kept for logging
/// via `Debug` and are never part of the displayed message.
#[derive(Debug)]
pub enum ScanError {
    /// The repository reference did not match the allow-list shape.
    InvalidReference(String),
    /// The admission guard rejected the request.
    RateLimited {
        /// Seconds until a slot frees in the client's window.
        retry_after_secs: u64,
    },
    /// The repository could not be fetched (private, deleted, network).
    Unreachable(String),
    /// The checkout exceeded the configured byte ceiling.
    TooLarge {
        /// The ceiling that was exceeded, in bytes.
        limit_bytes: u64,
    },
    /// The clone or the overall scan exceeded its wall-clock ceiling.
    Timeout(TimeoutStage),
    /// An unexpected condition in indexing or scoring.
    Internal(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReference(_) => write!(
                f,
                "invalid repository reference: expected https://github.com/<owner>/<name>"
            ),
            Self::RateLimited { retry_after_secs } => {
                write!(f, "rate limit exceeded, retry after {retry_after_secs}s")
            }
            Self::Unreachable(_) => write!(f, "repository could not be fetched"),
            Self::TooLarge { limit_bytes } => {
                write!(f, "repository exceeds the {limit_bytes} byte limit")
            }
            Self::Timeout(TimeoutStage::Clone) => write!(f, "repository fetch timed out"),
            Self::Timeout(TimeoutStage::Scan) => write!(f, "scan timed out"),
            Self::Internal(_) => write!(f, "unexpected internal failure"),
        }
    }
}

impl Error for ScanError {}

impl From<io::Error> for ScanError {
    fn from(value: io::Error) -> Self {
        Self::Internal(format!("io error: {value}"))
    }
}

impl ScanError {
    /// A rejected admission, rounding the wait up to a whole second so a
    /// caller that sleeps the reported value is always admitted.
    pub fn rate_limited(retry_after: Duration) -> Self {
        let mut secs = retry_after.as_secs();
        if retry_after.subsec_nanos() > 0 {
            secs += 1;
        }
        Self::RateLimited {
            retry_after_secs: secs,
        }
    }
}

/// Convenience result type for ShipScore core.
pub type Result<T> = std::result::Result<T, ScanError>;
