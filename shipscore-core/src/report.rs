//! Report types and formatting for ShipScore outputs.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::stack::StackDetection;

/// A mapping of language names to their percentage of indexed files.
pub type LanguageDistribution = BTreeMap<String, f64>;

/// One heuristic observation supporting a category's score.
pub type Finding = String;

/// The seven readiness dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// UI layer: framework, build tooling, styling.
    Frontend,
    /// Server entry points, server frameworks, routes.
    Backend,
    /// Auth libraries and login/session/token markers.
    Authentication,
    /// ORMs, database clients, schema files.
    Database,
    /// Payment-provider integrations.
    Payments,
    /// Committed secrets and ignore-rule hygiene.
    Security,
    /// Build/start scripts, port binding, containerization.
    DeploymentReadiness,
}

impl Category {
    /// All categories, in report order.
    pub const ALL: [Category; 7] = [
        Category::Frontend,
        Category::Backend,
        Category::Authentication,
        Category::Database,
        Category::Payments,
        Category::Security,
        Category::DeploymentReadiness,
    ];

    /// Human-readable category name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Frontend => "Frontend",
            Category::Backend => "Backend",
            Category::Authentication => "Authentication",
            Category::Database => "Database",
            Category::Payments => "Payments",
            Category::Security => "Security",
            Category::DeploymentReadiness => "Deployment Readiness",
        }
    }
}

/// Status derived from a category score via fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// At or above the pass threshold.
    Pass,
    /// Between the warn and pass thresholds.
    Warning,
    /// Below the warn threshold.
    Critical,
}

/// Score and findings for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    /// Which category this score belongs to.
    pub category: Category,
    /// Points accumulated from the category's checks, clamped to 0-100.
    pub score: u8,
    /// Status derived from the score.
    pub status: Status,
    /// Observations supporting the score, in check order.
    pub findings: Vec<Finding>,
    /// What to do about the biggest gap.
    pub suggestion: String,
    /// Whether an automated fix exists for the gap.
    pub fix_available: bool,
}

/// The complete readiness report for one scan. Immutable once produced; the
/// sole artifact that crosses the core's output boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipScoreReport {
    /// Weighted composite readiness score, 0-100.
    pub ship_score: u8,
    /// Technologies inferred for the repository.
    pub stack: StackDetection,
    /// Frontend category score.
    pub frontend: CategoryScore,
    /// Backend category score.
    pub backend: CategoryScore,
    /// Authentication category score.
    pub authentication: CategoryScore,
    /// Database category score.
    pub database: CategoryScore,
    /// Payments category score.
    pub payments: CategoryScore,
    /// Security category score.
    pub security: CategoryScore,
    /// Deployment-readiness category score.
    pub deployment: CategoryScore,
    /// Language share of indexed files; empty when unavailable.
    pub languages: LanguageDistribution,
}

impl ShipScoreReport {
    /// The seven category scores in report order.
    pub fn categories(&self) -> [&CategoryScore; 7] {
        [
            &self.frontend,
            &self.backend,
            &self.authentication,
            &self.database,
            &self.payments,
            &self.security,
            &self.deployment,
        ]
    }
}

/// Render a report as Markdown.
pub fn render_report_markdown(report: &ShipScoreReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# ShipScore Report\n");
    let _ = writeln!(output, "**Ship score: {}/100**\n", report.ship_score);

    let _ = writeln!(output, "## Stack");
    match &report.stack.framework {
        Some(framework) => {
            let _ = writeln!(output, "- Framework: {framework}");
        }
        None => {
            let _ = writeln!(output, "- Framework: none detected");
        }
    }
    match &report.stack.build_tool {
        Some(tool) => {
            let _ = writeln!(output, "- Build tool: {tool}");
        }
        None => {
            let _ = writeln!(output, "- Build tool: none detected");
        }
    }
    let detected: Vec<&str> = report
        .stack
        .technologies
        .iter()
        .filter(|(_, present)| **present)
        .map(|(name, _)| name.as_str())
        .collect();
    if !detected.is_empty() {
        let _ = writeln!(output, "- Detected: {}", detected.join(", "));
    }
    let _ = writeln!(output);

    for score in report.categories() {
        let _ = writeln!(
            output,
            "## {}: {}/100 ({})",
            score.category.as_str(),
            score.score,
            status_label(score.status)
        );
        if score.findings.is_empty() {
            let _ = writeln!(output, "No findings.\n");
        } else {
            for finding in &score.findings {
                let _ = writeln!(output, "- {finding}");
            }
            let _ = writeln!(output);
        }
        if !score.suggestion.is_empty() {
            let _ = writeln!(output, "Suggestion: {}\n", score.suggestion);
        }
    }

    if !report.languages.is_empty() {
        let _ = writeln!(output, "## Languages");
        for (language, percent) in format_language_stats(&report.languages) {
            let _ = writeln!(output, "- {language}: {percent:.2}%");
        }
        let _ = writeln!(output);
    }

    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Format language stats sorted by percentage.
pub fn format_language_stats(stats: &LanguageDistribution) -> Vec<(String, f64)> {
    let mut items: Vec<(String, f64)> = stats.iter().map(|(k, v)| (k.clone(), *v)).collect();
    items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    items
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pass => "pass",
        Status::Warning => "warning",
        Status::Critical => "critical",
    }
}
