//! Scan orchestration: admission through aggregation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;

use crate::admission::{Admission, AdmissionGuard};
use crate::aggregate::{CategoryWeights, aggregate};
use crate::config::ScanConfig;
use crate::error::{Result, ScanError, TimeoutStage};
use crate::fetch::{GitSourceFetcher, SourceFetcher};
use crate::fs::{FileSystem, StdFileSystem};
use crate::index::FileIndex;
use crate::languages;
use crate::reference::RepoReference;
use crate::report::{Category, CategoryScore, ShipScoreReport};
use crate::scorers::{ScorerOptions, score_category};
use crate::stack::{self, StackDetection};
use crate::workspace::Workspace;

/// One scanner instance: admission guard, fetch capability, scoring weights.
///
/// Safe to share across concurrent scans; the admission log is the only
/// mutable state and lives behind its own lock. Each scan gets an exclusive
/// workspace that is reclaimed on every exit path.
pub struct Scanner {
    config: ScanConfig,
    guard: AdmissionGuard,
    fetcher: Arc<dyn SourceFetcher>,
    weights: CategoryWeights,
}

impl Scanner {
    /// Scanner backed by the git fetch capability.
    pub fn new(config: ScanConfig) -> Self {
        let fetcher = Arc::new(GitSourceFetcher::new(
            config.clone_timeout,
            config.max_repo_bytes,
        ));
        Self::with_fetcher(config, fetcher)
    }

    /// Scanner with a substituted fetch capability.
    pub fn with_fetcher(config: ScanConfig, fetcher: Arc<dyn SourceFetcher>) -> Self {
        let guard = AdmissionGuard::new(config.rate_window, config.rate_quota);
        Self {
            config,
            guard,
            fetcher,
            weights: CategoryWeights::default(),
        }
    }

    /// Replace the admission guard, e.g. to back it with a shared store.
    pub fn with_guard(mut self, guard: AdmissionGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Replace the aggregation weights.
    pub fn with_weights(mut self, weights: CategoryWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Run one scan: admit, validate, fetch into a fresh workspace, index,
    /// detect, score all categories, aggregate. The workspace is reclaimed
    /// whether the scan completes, fails, or hits the deadline.
    pub async fn scan(&self, reference: &str, client_key: &str) -> Result<ShipScoreReport> {
        match self.guard.admit(client_key) {
            Admission::Allowed => {}
            Admission::Rejected { retry_after } => {
                return Err(ScanError::rate_limited(retry_after));
            }
        }

        let reference = RepoReference::parse(reference)?;
        let deadline = Deadline::after(self.config.scan_timeout);

        let mut workspace = Workspace::provision(&self.config.workspace_root)?;
        let outcome = tokio::time::timeout(
            deadline.remaining(),
            self.run(&reference, &workspace, &deadline),
        )
        .await;
        workspace.reclaim();

        match outcome {
            Ok(result) => result,
            Err(_) => Err(ScanError::Timeout(TimeoutStage::Scan)),
        }
    }

    async fn run(
        &self,
        reference: &RepoReference,
        workspace: &Workspace,
        deadline: &Deadline,
    ) -> Result<ShipScoreReport> {
        self.fetcher.fetch(reference, workspace.path()).await?;
        deadline.check()?;

        let index = {
            let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem::new());
            let root = workspace.path().to_path_buf();
            tokio::task::spawn_blocking(move || FileIndex::build(fs, &root))
                .await
                .map_err(|err| ScanError::Internal(format!("index task failed: {err}")))??
        };
        let index = Arc::new(index);
        let stack = Arc::new(stack::detect(&index));
        deadline.check()?;

        let options = ScorerOptions {
            file_scan_cap: self.config.file_scan_cap,
            generic_token_min_len: self.config.generic_token_min_len,
        };

        let mut tasks = JoinSet::new();
        for category in Category::ALL {
            let index = index.clone();
            let stack = stack.clone();
            tasks.spawn_blocking(move || score_category(category, &stack, &index, &options));
        }

        let mut scores: Vec<CategoryScore> = Vec::with_capacity(Category::ALL.len());
        while let Some(result) = tasks.join_next().await {
            let score = result
                .map_err(|err| ScanError::Internal(format!("scorer task failed: {err}")))?;
            scores.push(score);
        }
        deadline.check()?;

        let ship_score = aggregate(&scores, &self.weights);

        let languages = {
            let index = index.clone();
            tokio::task::spawn_blocking(move || languages::distribution(&index))
                .await
                .unwrap_or_else(|err| {
                    log::warn!("language overview failed: {err}");
                    Default::default()
                })
        };

        let stack = Arc::try_unwrap(stack).unwrap_or_else(|shared| (*shared).clone());
        build_report(ship_score, stack, scores, languages)
    }
}

/// Cooperative deadline checked at stage boundaries; the enclosing
/// `tokio::time::timeout` is the hard bound.
struct Deadline {
    at: Instant,
}

impl Deadline {
    fn after(ttl: Duration) -> Self {
        Self {
            at: Instant::now() + ttl,
        }
    }

    fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    fn check(&self) -> Result<()> {
        if self.remaining().is_zero() {
            Err(ScanError::Timeout(TimeoutStage::Scan))
        } else {
            Ok(())
        }
    }
}

fn build_report(
    ship_score: u8,
    stack: StackDetection,
    scores: Vec<CategoryScore>,
    languages: crate::report::LanguageDistribution,
) -> Result<ShipScoreReport> {
    let mut slots: [Option<CategoryScore>; 7] = Default::default();
    for score in scores {
        let position = Category::ALL
            .iter()
            .position(|category| *category == score.category)
            .ok_or_else(|| ScanError::Internal("unknown category score".to_string()))?;
        slots[position] = Some(score);
    }

    let [frontend, backend, authentication, database, payments, security, deployment] = slots;
    Ok(ShipScoreReport {
        ship_score,
        stack,
        frontend: require(frontend)?,
        backend: require(backend)?,
        authentication: require(authentication)?,
        database: require(database)?,
        payments: require(payments)?,
        security: require(security)?,
        deployment: require(deployment)?,
        languages,
    })
}

fn require(slot: Option<CategoryScore>) -> Result<CategoryScore> {
    slot.ok_or_else(|| ScanError::Internal("missing category score".to_string()))
}
