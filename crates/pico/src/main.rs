use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use pico_analysis::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "pico")]
#[command(about = "PICO object-mutability type checker", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Checker configuration (JSON, or TOML with a .toml extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a JSON declaration model
    Check {
        /// Model file
        model: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also report qualifier coverage metrics
        #[arg(long)]
        metrics: bool,
    },
    /// Verify the qualifier lattice and adaptation laws
    Verify {
        /// Random cases per sampled property
        #[arg(long, default_value_t = 500)]
        samples: u64,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Check { model, format, metrics } => check_command(config, &model, format, metrics),
        Commands::Verify { samples, format } => verify_command(samples, format),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn setup_logging(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second init (tests) is harmless
    let _ = tracing_subscriber::registry().with(filter).with(formatter).try_init();
}

fn load_config(path: Option<&Path>) -> Result<CheckerConfig> {
    match path {
        Some(path) => {
            let config = CheckerConfig::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?;
            info!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        None => Ok(CheckerConfig::default()),
    }
}

fn check_command(config: CheckerConfig, model: &Path, format: OutputFormat, with_metrics: bool) -> Result<ExitCode> {
    let factory = QualifierFactory::new(config);
    let report = pico_analysis::check_file(&factory, model)?;
    let metrics = with_metrics.then(|| Analyzer::new().analyze(&report));
    debug!(diagnostics = report.diagnostics.len(), "check complete");

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "model": model.display().to_string(),
                "report": report,
                "metrics": metrics,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => print_report(model, &report, metrics.as_ref()),
    }

    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(model: &Path, report: &CheckReport, metrics: Option<&AnalysisResult>) {
    for located in &report.diagnostics {
        println!(
            "{}: {}: {} ({}) {}",
            model.display(),
            located.location,
            "error:".red().bold(),
            located.diagnostic.kind.key(),
            located.diagnostic.message
        );
    }
    for summary in report.constructors.iter().filter(|s| !s.uninitialized.is_empty()) {
        println!(
            "{}: {}: {} fields not initialized: {}",
            model.display(),
            summary.location,
            "note:".cyan(),
            summary.uninitialized.join(", ")
        );
    }

    if let Some(metrics) = metrics {
        println!();
        println!("{}", "Qualifier coverage".bold());
        println!(
            "  positions: {} (explicit {}, defaulted {}, refined {})",
            metrics.coverage.total_positions,
            metrics.coverage.explicit,
            metrics.coverage.defaulted,
            metrics.coverage.refined
        );
        println!("  explicit coverage: {:.1}%", metrics.coverage.coverage_percentage);
        for (qualifier, count) in metrics.distribution.counts.iter().filter(|(_, c)| **c > 0) {
            println!("  {qualifier}: {count}");
        }
    }

    let count = report.diagnostics.len();
    if count == 0 {
        println!("{}", "No qualifier errors".green());
    } else {
        println!("{}", format!("{count} error(s)").red().bold());
    }
}

fn verify_command(samples: u64, format: OutputFormat) -> Result<ExitCode> {
    let results = PropertyVerifier::new().with_sample_tests(samples).verify_all();
    let failed = results.iter().filter(|r| !r.is_proven()).count();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            for result in &results {
                let status = if result.is_proven() {
                    "proven".green()
                } else {
                    "VIOLATED".red().bold()
                };
                let method = match result.method {
                    VerificationMethod::Exhaustive => "exhaustive".to_string(),
                    VerificationMethod::Sampled { tests } => format!("{tests} samples"),
                };
                println!("{:<40} {status} ({method})", result.property);
                if let Some(counterexample) = &result.counterexample {
                    println!("    counterexample: {counterexample}");
                }
            }
            println!("{} properties, {failed} violated", results.len());
        }
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
