//! The seven category scorers.
//!
//! Each scorer is an independent rule set over the same read-only inputs and
//! may run concurrently with the others. Every dependency list, marker, point
//! value, and threshold lives in the tables below; the scorer bodies are
//! plain accumulate-and-clamp evaluators over that data.

use crate::index::FileIndex;
use crate::report::{Category, CategoryScore, Status};
use crate::secrets::{self, IgnoreCoverage};
use crate::stack::StackDetection;

/// Limits threaded from the scan configuration into content-reading rules.
#[derive(Debug, Clone, Copy)]
pub struct ScorerOptions {
    /// Maximum candidate files read by one content search.
    pub file_scan_cap: usize,
    /// Minimum length for the generic opaque-token secret pattern.
    pub generic_token_min_len: usize,
}

impl Default for ScorerOptions {
    fn default() -> Self {
        Self {
            file_scan_cap: 50,
            generic_token_min_len: 32,
        }
    }
}

/// Pass/warn boundaries for one category. Scores below `warn` are critical.
#[derive(Debug, Clone, Copy)]
pub struct StatusThresholds {
    /// Minimum score for pass.
    pub pass: u8,
    /// Minimum score for warning.
    pub warn: u8,
}

impl StatusThresholds {
    fn status_for(&self, score: u8) -> Status {
        if score >= self.pass {
            Status::Pass
        } else if score >= self.warn {
            Status::Warning
        } else {
            Status::Critical
        }
    }
}

const FRONTEND_THRESHOLDS: StatusThresholds = StatusThresholds { pass: 70, warn: 40 };
const BACKEND_THRESHOLDS: StatusThresholds = StatusThresholds { pass: 70, warn: 30 };
const AUTH_THRESHOLDS: StatusThresholds = StatusThresholds { pass: 70, warn: 40 };
const DATABASE_THRESHOLDS: StatusThresholds = StatusThresholds { pass: 70, warn: 30 };
const PAYMENTS_THRESHOLDS: StatusThresholds = StatusThresholds { pass: 70, warn: 70 };
const SECURITY_THRESHOLDS: StatusThresholds = StatusThresholds { pass: 80, warn: 50 };
const DEPLOYMENT_THRESHOLDS: StatusThresholds = StatusThresholds { pass: 70, warn: 40 };

// Frontend rule table.
const FRAMEWORK_POINTS: i32 = 40;
const STATIC_MARKUP_POINTS: i32 = 20;
const BUILD_TOOL_POINTS: i32 = 20;
const STYLING_POINTS: i32 = 20;
const RESPONSIVE_POINTS: i32 = 20;
const STYLING_TECHNOLOGIES: &[&str] = &["Tailwind CSS", "styled-components", "Sass", "Bootstrap"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];

// Backend rule table.
const SERVER_ENTRY_POINTS: i32 = 30;
const SERVER_FRAMEWORK_POINTS: i32 = 40;
const SERVER_CALL_POINTS: i32 = 25;
const ROUTE_POINTS: i32 = 30;
const SERVER_TECHNOLOGIES: &[&str] = &["Express", "Fastify", "Koa", "NestJS", "Hapi"];
const SERVER_ENTRY_HINTS: &[&str] = &["server", "app", "main", "index"];
const SERVER_CALL_MARKERS: &[&str] = &[".listen(", "createServer"];
const ROUTE_PATH_MARKERS: &[&str] = &["routes/", "api/", "controllers/"];
const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

// Authentication rule table.
const AUTH_DEPENDENCY_POINTS: i32 = 50;
const LOGIN_FLOW_POINTS: i32 = 25;
const SESSION_MARKER_POINTS: i32 = 25;
const AUTH_DEPENDENCIES: &[&str] = &[
    "next-auth",
    "@auth/core",
    "passport",
    "jsonwebtoken",
    "bcrypt",
    "bcryptjs",
    "@clerk/nextjs",
    "lucia",
    "express-session",
    "firebase",
];
const AUTH_CONTENT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "py", "html"];
const SESSION_MARKERS: &[&str] = &["jwt", "session"];

// Database rule table.
const ORM_POINTS: i32 = 40;
const DB_CLIENT_POINTS: i32 = 30;
const SCHEMA_POINTS: i32 = 30;
const ORM_DEPENDENCIES: &[&str] = &[
    "prisma",
    "@prisma/client",
    "mongoose",
    "sequelize",
    "typeorm",
    "drizzle-orm",
    "knex",
];
const DB_CLIENT_DEPENDENCIES: &[&str] = &[
    "pg",
    "mysql",
    "mysql2",
    "sqlite3",
    "better-sqlite3",
    "mongodb",
    "redis",
    "@supabase/supabase-js",
];
const SCHEMA_PATH_MARKERS: &[&str] = &["migrations/", "models/"];

// Payments rule table: binary, declared integration or nothing.
const PAYMENT_DEPENDENCIES: &[&str] = &[
    "stripe",
    "@stripe/stripe-js",
    "@paypal/checkout-server-sdk",
    "paypal-rest-sdk",
    "square",
    "braintree",
    "razorpay",
    "@lemonsqueezy/lemonsqueezy.js",
];

// Security deductions. Dotenv files and secret literals force critical;
// ignore-rule gaps cap out at warning through the numeric thresholds alone.
const DOTENV_DEDUCTION: i32 = 60;
const SECRET_LITERAL_DEDUCTION: i32 = 40;
const MISSING_IGNORE_DEDUCTION: i32 = 30;
const INCOMPLETE_IGNORE_DEDUCTION: i32 = 25;

// Deployment-readiness rule table.
const BUILD_SCRIPT_POINTS: i32 = 25;
const START_SCRIPT_POINTS: i32 = 25;
const ENV_PORT_POINTS: i32 = 20;
const CONTAINER_POINTS: i32 = 30;
const ENV_PORT_MARKER: &str = "process.env.port";
const PLATFORM_CONFIGS: &[&str] = &[
    "vercel.json",
    "netlify.toml",
    "Procfile",
    "fly.toml",
    "render.yaml",
];

/// Run one category's scorer. Used by the pipeline fan-out.
pub fn score_category(
    category: Category,
    stack: &StackDetection,
    index: &FileIndex,
    options: &ScorerOptions,
) -> CategoryScore {
    match category {
        Category::Frontend => score_frontend(stack, index, options),
        Category::Backend => score_backend(stack, index, options),
        Category::Authentication => score_authentication(stack, index, options),
        Category::Database => score_database(stack, index, options),
        Category::Payments => score_payments(stack, index, options),
        Category::Security => score_security(stack, index, options),
        Category::DeploymentReadiness => score_deployment(stack, index, options),
    }
}

/// Frontend: framework or static markup, build tooling, styling, responsive
/// markers.
pub fn score_frontend(
    stack: &StackDetection,
    index: &FileIndex,
    options: &ScorerOptions,
) -> CategoryScore {
    let mut tally = Tally::new();
    let mut static_only = false;

    if let Some(framework) = &stack.framework {
        tally.add(FRAMEWORK_POINTS, format!("{framework} framework detected"));
    } else if stack.has("Static HTML") {
        static_only = true;
        tally.add(
            STATIC_MARKUP_POINTS,
            "Static markup only, no framework detected",
        );
    }

    if let Some(tool) = &stack.build_tool {
        tally.add(BUILD_TOOL_POINTS, format!("{tool} build tooling configured"));
    }

    let styled = STYLING_TECHNOLOGIES.iter().any(|name| stack.has(name))
        || !index
            .find_by_extension_and_name(STYLE_EXTENSIONS, None)
            .is_empty();
    if styled {
        tally.add(STYLING_POINTS, "Styling layer present");
    }

    let responsive = index.content_contains("viewport", &["html"], options.file_scan_cap)
        || index.content_contains("@media", STYLE_EXTENSIONS, options.file_scan_cap);
    if responsive {
        tally.add(RESPONSIVE_POINTS, "Responsive markup markers found");
    }

    let score = tally.score();
    let mut status = FRONTEND_THRESHOLDS.status_for(score);
    // A plain static site is a thin-but-working frontend, not a broken one.
    if static_only && status == Status::Critical {
        status = Status::Warning;
    }

    finish(
        Category::Frontend,
        tally,
        status,
        FRONTEND_THRESHOLDS,
        "Adopt a frontend framework with a build tool for a production UI.",
        false,
    )
}

/// Backend: server entry files, server-framework markers, route structure.
pub fn score_backend(
    stack: &StackDetection,
    index: &FileIndex,
    options: &ScorerOptions,
) -> CategoryScore {
    let mut tally = Tally::new();

    let entries = index.find_by_extension_and_name(SCRIPT_EXTENSIONS, Some(SERVER_ENTRY_HINTS));
    if !entries.is_empty() {
        tally.add(SERVER_ENTRY_POINTS, "Server entry file present");
    }

    if let Some(name) = SERVER_TECHNOLOGIES.iter().find(|name| stack.has(name)) {
        tally.add(
            SERVER_FRAMEWORK_POINTS,
            format!("{name} server framework declared"),
        );
    } else if SERVER_CALL_MARKERS
        .iter()
        .any(|marker| index.content_contains(marker, SCRIPT_EXTENSIONS, options.file_scan_cap))
    {
        tally.add(SERVER_CALL_POINTS, "Server bootstrap call found");
    }

    let routed = index.entries().iter().any(|entry| {
        ROUTE_PATH_MARKERS
            .iter()
            .any(|marker| entry.relative_path.contains(marker))
    }) || index.content_contains("router.", SCRIPT_EXTENSIONS, options.file_scan_cap);
    if routed {
        tally.add(ROUTE_POINTS, "Route definitions found");
    }

    let score = tally.score();
    let status = BACKEND_THRESHOLDS.status_for(score);
    finish(
        Category::Backend,
        tally,
        status,
        BACKEND_THRESHOLDS,
        "Add a server entry point with a web framework and route handlers.",
        false,
    )
}

/// Authentication: known auth libraries, login/password flows, token or
/// session handling.
pub fn score_authentication(
    _stack: &StackDetection,
    index: &FileIndex,
    options: &ScorerOptions,
) -> CategoryScore {
    let mut tally = Tally::new();

    if let Some(name) = index.manifest().any_dependency(AUTH_DEPENDENCIES) {
        tally.add(AUTH_DEPENDENCY_POINTS, format!("{name} dependency declared"));
    }

    let login_flow = index.content_contains("login", AUTH_CONTENT_EXTENSIONS, options.file_scan_cap)
        && index.content_contains("password", AUTH_CONTENT_EXTENSIONS, options.file_scan_cap);
    if login_flow {
        tally.add(LOGIN_FLOW_POINTS, "Login and password handling found");
    }

    if SESSION_MARKERS
        .iter()
        .any(|marker| index.content_contains(marker, AUTH_CONTENT_EXTENSIONS, options.file_scan_cap))
    {
        tally.add(SESSION_MARKER_POINTS, "Token or session handling found");
    }

    let score = tally.score();
    let status = AUTH_THRESHOLDS.status_for(score);
    finish(
        Category::Authentication,
        tally,
        status,
        AUTH_THRESHOLDS,
        "Wire up an authentication library with session or token handling.",
        true,
    )
}

/// Database: ORM dependencies, client drivers, schema files.
pub fn score_database(
    _stack: &StackDetection,
    index: &FileIndex,
    _options: &ScorerOptions,
) -> CategoryScore {
    let mut tally = Tally::new();

    if let Some(name) = index.manifest().any_dependency(ORM_DEPENDENCIES) {
        tally.add(ORM_POINTS, format!("{name} ORM declared"));
    }
    if let Some(name) = index.manifest().any_dependency(DB_CLIENT_DEPENDENCIES) {
        tally.add(DB_CLIENT_POINTS, format!("{name} database client declared"));
    }

    let schema = index.exists("prisma/schema.prisma")
        || !index.find_by_extension_and_name(&["sql"], None).is_empty()
        || index.entries().iter().any(|entry| {
            SCHEMA_PATH_MARKERS
                .iter()
                .any(|marker| entry.relative_path.contains(marker))
                || entry.base_name.contains("schema")
        });
    if schema {
        tally.add(SCHEMA_POINTS, "Schema or migration files present");
    }

    let score = tally.score();
    let status = DATABASE_THRESHOLDS.status_for(score);
    finish(
        Category::Database,
        tally,
        status,
        DATABASE_THRESHOLDS,
        "Add a database layer: an ORM or client plus schema files.",
        false,
    )
}

/// Payments: binary. A declared provider integration is full score; none is
/// zero, and zero is a warning rather than critical because payments are
/// optional for many projects.
pub fn score_payments(
    _stack: &StackDetection,
    index: &FileIndex,
    _options: &ScorerOptions,
) -> CategoryScore {
    let mut tally = Tally::new();

    if let Some(name) = index.manifest().any_dependency(PAYMENT_DEPENDENCIES) {
        tally.add(100, format!("{name} payment integration declared"));
    } else {
        tally.note("No payment provider integration detected");
    }

    let score = tally.score();
    let status = if score == 0 {
        Status::Warning
    } else {
        PAYMENTS_THRESHOLDS.status_for(score)
    };
    finish(
        Category::Payments,
        tally,
        status,
        PAYMENTS_THRESHOLDS,
        "Integrate a payment provider if the product charges users.",
        true,
    )
}

/// Security: starts at 100 and deducts. Committed dotenv files and
/// secret-shaped literals force critical regardless of the numeric score;
/// ignore-rule gaps deduct less and stay at warning.
pub fn score_security(
    _stack: &StackDetection,
    index: &FileIndex,
    options: &ScorerOptions,
) -> CategoryScore {
    let mut tally = Tally::starting_at(100);
    let mut force_critical = false;

    for file in secrets::committed_env_files(index) {
        force_critical = true;
        tally.deduct(
            DOTENV_DEDUCTION,
            format!("Secret file {file} is committed to the repository"),
        );
    }

    for hit in
        secrets::scan_for_secret_literals(index, options.file_scan_cap, options.generic_token_min_len)
    {
        force_critical = true;
        tally.deduct(
            SECRET_LITERAL_DEDUCTION,
            format!("Potential {} found in {}", hit.provider, hit.file),
        );
    }

    match secrets::ignore_coverage(index) {
        IgnoreCoverage::Covered => {}
        IgnoreCoverage::Incomplete => tally.deduct(
            INCOMPLETE_IGNORE_DEDUCTION,
            "Ignore rules do not cover secret files",
        ),
        IgnoreCoverage::Missing => {
            tally.deduct(MISSING_IGNORE_DEDUCTION, "No ignore-rules file present")
        }
    }

    let score = tally.score();
    let status = if force_critical {
        Status::Critical
    } else {
        SECURITY_THRESHOLDS.status_for(score)
    };
    finish(
        Category::Security,
        tally,
        status,
        SECURITY_THRESHOLDS,
        "Remove committed secrets and ignore dotenv files before shipping.",
        false,
    )
}

/// Deployment readiness: build/start scripts, environment-driven port
/// binding, containerization, platform config.
pub fn score_deployment(
    stack: &StackDetection,
    index: &FileIndex,
    options: &ScorerOptions,
) -> CategoryScore {
    let mut tally = Tally::new();
    let manifest = index.manifest();

    if manifest.has_script("build") {
        tally.add(BUILD_SCRIPT_POINTS, "Build script declared");
    }
    if manifest.has_script("start") {
        tally.add(START_SCRIPT_POINTS, "Start script declared");
    }

    if index.content_contains(ENV_PORT_MARKER, SCRIPT_EXTENSIONS, options.file_scan_cap) {
        tally.add(ENV_PORT_POINTS, "Port read from the environment");
    }

    if stack.has("Docker") {
        tally.add(CONTAINER_POINTS, "Container descriptor present");
    }

    // Noted, not scored: a platform config means a deployment target was
    // already chosen.
    if let Some(config) = PLATFORM_CONFIGS.iter().find(|name| index.exists(name)) {
        tally.note(format!("Platform config {config} present"));
    }

    let score = tally.score();
    let status = DEPLOYMENT_THRESHOLDS.status_for(score);
    finish(
        Category::DeploymentReadiness,
        tally,
        status,
        DEPLOYMENT_THRESHOLDS,
        "Declare build and start scripts and add a container descriptor.",
        true,
    )
}

/// Point accumulator with clamping to [0, 100].
struct Tally {
    points: i32,
    findings: Vec<String>,
}

impl Tally {
    fn new() -> Self {
        Self::starting_at(0)
    }

    fn starting_at(points: i32) -> Self {
        Self {
            points,
            findings: Vec::new(),
        }
    }

    fn add(&mut self, points: i32, finding: impl Into<String>) {
        self.points += points;
        self.findings.push(finding.into());
    }

    fn deduct(&mut self, points: i32, finding: impl Into<String>) {
        self.points -= points;
        self.findings.push(finding.into());
    }

    fn note(&mut self, finding: impl Into<String>) {
        self.findings.push(finding.into());
    }

    fn score(&self) -> u8 {
        self.points.clamp(0, 100) as u8
    }
}

fn finish(
    category: Category,
    tally: Tally,
    status: Status,
    thresholds: StatusThresholds,
    suggestion: &str,
    fixer_exists: bool,
) -> CategoryScore {
    let score = tally.score();
    let below_pass = score < thresholds.pass;
    CategoryScore {
        category,
        score,
        status,
        findings: tally.findings,
        suggestion: if below_pass {
            suggestion.to_string()
        } else {
            String::new()
        },
        fix_available: fixer_exists && below_pass,
    }
}
