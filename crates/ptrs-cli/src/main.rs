mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::annotate::AnnotateArgs;
use commands::metrics::MetricsArgs;
use commands::payment_time::PaymentTimeArgs;
use commands::report::ReportArgs;
use commands::sample::SampleArgs;

/// Payment Times Reporting Scheme calculations
#[derive(Parser)]
#[command(
    name = "ptrs",
    version,
    about = "Payment Times Reporting Scheme calculations",
    long_about = "Computes per-invoice payment times and the aggregate payment metrics \
                  (mode of terms, range, mean, median, 80th/95th percentiles) reported \
                  under the Payment Times Reporting Scheme."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug detail to stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment time for a single record
    PaymentTime(PaymentTimeArgs),
    /// Annotate a batch of records with payment times
    Annotate(AnnotateArgs),
    /// Aggregate metrics over resolved payment terms and times
    Metrics(MetricsArgs),
    /// Full report: annotate, filter and aggregate raw records
    Report(ReportArgs),
    /// Generate seeded sample records
    Sample(SampleArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::PaymentTime(args) => commands::payment_time::run_payment_time(args),
        Commands::Annotate(args) => commands::annotate::run_annotate(args),
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Report(args) => commands::report::run_report(args),
        Commands::Sample(args) => commands::sample::run_sample(args),
        Commands::Version => {
            println!("ptrs {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
