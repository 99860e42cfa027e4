#![deny(missing_docs)]
//! ShipScore command-line interface.
//!
//! Scans a public repository and renders its readiness report.

use clap::{Args, Parser, Subcommand, ValueEnum};
use shipscore_core::{
    ScanConfig, Scanner, ShipScoreReport, Status, format_language_stats, render_json,
    render_report_markdown,
};
use std::fmt::Write;
use std::path::PathBuf;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "shipscore", version, about = "ShipScore CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a public repository and report its readiness.
    Scan {
        /// Repository URL, https://github.com/<owner>/<name>.
        #[arg(long)]
        url: String,
        /// Client key used for rate limiting.
        #[arg(long, env = "SHIPSCORE_CLIENT_KEY", default_value = "local")]
        client_key: String,
        #[command(flatten)]
        report: OutputArgs,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan {
            url,
            client_key,
            report,
        } => run_scan(url, client_key, report).await?,
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

async fn run_scan(url: String, client_key: String, output: OutputArgs) -> CliResult<()> {
    let scanner = Scanner::new(ScanConfig::from_env());
    match scanner.scan(&url, &client_key).await {
        Ok(report) => emit_report(&report, &output).await,
        Err(err) => {
            // Detail stays in the logs; the displayed message is the stable
            // category text.
            log::debug!("scan failed: {err:?}");
            Err(err.to_string().into())
        }
    }
}

async fn emit_report(report: &ShipScoreReport, output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_report_text(report),
        OutputFormat::Markdown => render_report_markdown(report),
        OutputFormat::Json => render_json(report)?,
    };
    emit_output(output, contents).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_report_text(report: &ShipScoreReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Ship score: {}/100", report.ship_score);

    match &report.stack.framework {
        Some(framework) => {
            let _ = writeln!(output, "Framework: {framework}");
        }
        None => {
            let _ = writeln!(output, "Framework: none detected");
        }
    }
    match &report.stack.build_tool {
        Some(tool) => {
            let _ = writeln!(output, "Build tool: {tool}");
        }
        None => {
            let _ = writeln!(output, "Build tool: none detected");
        }
    }
    let _ = writeln!(output);

    for score in report.categories() {
        let _ = writeln!(
            output,
            "{}: {}/100 ({})",
            score.category.as_str(),
            score.score,
            status_label(score.status)
        );
        for finding in &score.findings {
            let _ = writeln!(output, "- {finding}");
        }
        if !score.suggestion.is_empty() {
            let _ = writeln!(output, "Suggestion: {}", score.suggestion);
        }
        let _ = writeln!(output);
    }

    if report.languages.is_empty() {
        let _ = writeln!(output, "Languages: none detected");
    } else {
        let _ = writeln!(output, "Languages:");
        for (language, percent) in format_language_stats(&report.languages) {
            let _ = writeln!(output, "- {language}: {percent:.2}%");
        }
    }

    output
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pass => "pass",
        Status::Warning => "warning",
        Status::Critical => "critical",
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, OutputArgs, OutputFormat, emit_report, render_report_text, run_scan};
    use shipscore_core::{
        Category, CategoryScore, ShipScoreReport, StackDetection, Status,
    };
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn sample_score(category: Category, score: u8, status: Status) -> CategoryScore {
        CategoryScore {
            category,
            score,
            status,
            findings: vec![format!("{} finding", category.as_str())],
            suggestion: if score < 70 {
                "Do something about it.".to_string()
            } else {
                String::new()
            },
            fix_available: false,
        }
    }

    fn sample_report() -> ShipScoreReport {
        let mut languages = BTreeMap::new();
        languages.insert("JavaScript".to_string(), 100.0);
        ShipScoreReport {
            ship_score: 54,
            stack: StackDetection {
                technologies: BTreeMap::new(),
                framework: Some("Vue".to_string()),
                build_tool: None,
            },
            frontend: sample_score(Category::Frontend, 80, Status::Pass),
            backend: sample_score(Category::Backend, 55, Status::Warning),
            authentication: sample_score(Category::Authentication, 0, Status::Critical),
            database: sample_score(Category::Database, 70, Status::Pass),
            payments: sample_score(Category::Payments, 0, Status::Warning),
            security: sample_score(Category::Security, 75, Status::Warning),
            deployment: sample_score(Category::DeploymentReadiness, 50, Status::Warning),
            languages,
        }
    }

    #[test]
    fn render_text_covers_branches() {
        let output = render_report_text(&sample_report());

        assert!(output.contains("Ship score: 54/100"));
        assert!(output.contains("Framework: Vue"));
        assert!(output.contains("Build tool: none detected"));
        assert!(output.contains("Frontend: 80/100 (pass)"));
        assert!(output.contains("Authentication: 0/100 (critical)"));
        assert!(output.contains("Suggestion: Do something about it."));
        assert!(output.contains("- JavaScript: 100.00%"));
    }

    #[test]
    fn render_text_handles_empty_languages() {
        let mut report = sample_report();
        report.languages.clear();
        let output = render_report_text(&report);
        assert!(output.contains("Languages: none detected"));
    }

    #[tokio::test]
    async fn emit_report_supports_formats_and_file_output() {
        let root = std::env::temp_dir().join(unique_dir_name());

        let markdown_path = root.join("out/report.md");
        let output = OutputArgs {
            format: OutputFormat::Markdown,
            report_output: Some(markdown_path.clone()),
        };
        emit_report(&sample_report(), &output)
            .await
            .expect("emit markdown");
        let contents = std::fs::read_to_string(&markdown_path).expect("read markdown");
        assert!(contents.contains("# ShipScore Report"));

        let json_path = root.join("out/report.json");
        let output = OutputArgs {
            format: OutputFormat::Json,
            report_output: Some(json_path.clone()),
        };
        emit_report(&sample_report(), &output)
            .await
            .expect("emit json");
        let contents = std::fs::read_to_string(&json_path).expect("read json");
        assert!(contents.contains("\"shipScore\""));

        let output = OutputArgs {
            format: OutputFormat::Text,
            report_output: None,
        };
        emit_report(&sample_report(), &output)
            .await
            .expect("emit text");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn cli_args_are_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn run_scan_surfaces_the_stable_error_message() {
        let output = OutputArgs {
            format: OutputFormat::Text,
            report_output: None,
        };
        let err = run_scan(
            "https://example.com/owner/repo".to_string(),
            "cli".to_string(),
            output,
        )
        .await
        .expect_err("wrong host must be rejected");

        assert_eq!(
            err.to_string(),
            "invalid repository reference: expected https://github.com/<owner>/<name>"
        );
    }

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        PathBuf::from(format!("shipscore_cli_test_{nanos}"))
    }
}
