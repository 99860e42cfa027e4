#![deny(missing_docs)]
//! ShipScore core library.
//!
//! This crate contains the scan pipeline and heuristic scoring engine that
//! power the broader ShipScore platform: admission control, bounded fetching
//! of untrusted repositories into isolated workspaces, filesystem indexing,
//! stack detection, the seven category scorers, and score aggregation.

pub mod admission;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod index;
pub mod languages;
pub mod pipeline;
pub mod reference;
pub mod report;
/// Category scorers and their rule tables.
pub mod scorers;
pub mod secrets;
pub mod stack;
pub mod workspace;

pub use admission::{Admission, AdmissionGuard, AdmissionStore, InMemoryAdmissionStore};
pub use aggregate::{CategoryWeights, aggregate};
pub use config::ScanConfig;
pub use error::{Result, ScanError, TimeoutStage};
pub use fetch::{GitSourceFetcher, SourceFetcher};
pub use fs::{FileSystem, StdFileSystem};
pub use index::{FileIndex, FileIndexEntry, PackageManifest};
pub use pipeline::Scanner;
pub use reference::RepoReference;
pub use report::{
    Category, CategoryScore, Finding, LanguageDistribution, ShipScoreReport, Status,
    format_language_stats, render_json, render_report_markdown,
};
pub use scorers::{ScorerOptions, StatusThresholds, score_category};
pub use stack::{StackDetection, detect};
pub use workspace::Workspace;
