//! Per-client admission control for the scan pipeline.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of an admission attempt. Rejection is a normal outcome, not an
/// error: the boundary layer translates it into a backoff signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may enter the pipeline.
    Allowed,
    /// Quota exhausted for the trailing window.
    Rejected {
        /// Time until the oldest counted admission leaves the window.
        retry_after: Duration,
    },
}

/// Storage for per-client admission logs.
///
/// The guard's contract stays the same whatever backs it; a multi-instance
/// deployment can substitute a shared store without touching callers. The
/// clock is a parameter so window behavior is testable without sleeping.
pub trait AdmissionStore: Send + Sync {
    /// Purge entries older than `window`, then admit iff fewer than `quota`
    /// remain, recording `now` on success.
    fn admit(&self, client_key: &str, now: Instant, window: Duration, quota: usize) -> Admission;
}

/// Process-lifetime store: one mutex-guarded map of client key to admission
/// timestamps. State resets on restart, which is accepted: the guard is
/// advisory flood control, not a security boundary.
#[derive(Debug, Default)]
pub struct InMemoryAdmissionStore {
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl InMemoryAdmissionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdmissionStore for InMemoryAdmissionStore {
    fn admit(&self, client_key: &str, now: Instant, window: Duration, quota: usize) -> Admission {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            // A poisoned lock means a panic mid-update; the log is advisory,
            // so keep serving with whatever state survived.
            Err(poisoned) => poisoned.into_inner(),
        };
        let log = entries.entry(client_key.to_string()).or_default();
        log.retain(|stamp| now.duration_since(*stamp) < window);

        if log.len() < quota {
            log.push(now);
            return Admission::Allowed;
        }

        let retry_after = log
            .iter()
            .min()
            .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(window);
        Admission::Rejected { retry_after }
    }
}

/// Sliding-window rate gate in front of the scan pipeline.
pub struct AdmissionGuard {
    store: Box<dyn AdmissionStore>,
    window: Duration,
    quota: usize,
}

impl AdmissionGuard {
    /// Guard backed by the in-memory store.
    pub fn new(window: Duration, quota: usize) -> Self {
        Self::with_store(Box::new(InMemoryAdmissionStore::new()), window, quota)
    }

    /// Guard backed by a caller-provided store.
    pub fn with_store(store: Box<dyn AdmissionStore>, window: Duration, quota: usize) -> Self {
        Self {
            store,
            window,
            quota,
        }
    }

    /// Attempt to admit one request for `client_key`.
    pub fn admit(&self, client_key: &str) -> Admission {
        self.store
            .admit(client_key, Instant::now(), self.window, self.quota)
    }
}
