use clap::Args;
use serde_json::Value;

use ptrs_core::metrics::{self, MetricsInput, MetricsRecord};

use super::policy::{ComparisonArg, TieBreakArg};
use crate::input;

/// Arguments for aggregate metrics
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to resolved rows (payment_term, payment_time): JSON/YAML or CSV
    #[arg(long)]
    pub input: Option<String>,

    /// Tie-break for the most common payment term
    #[arg(long, value_enum)]
    pub tie_break: Option<TieBreakArg>,

    /// Receivable term comparison supplied by the entity
    #[arg(long, value_enum)]
    pub receivable_comparison: Option<ComparisonArg>,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let document = input::read_batch::<MetricsRecord>(args.input.as_deref())?
        .ok_or("records are required: provide --input or pipe JSON on stdin")?;
    let mut metrics_input: MetricsInput = serde_json::from_value(document)?;

    if let Some(tie_break) = args.tie_break {
        metrics_input.config.mode_tie_break = tie_break.into();
    }
    if let Some(comparison) = args.receivable_comparison {
        metrics_input.config.receivable_term_comparison = comparison.into();
    }

    let output = metrics::calculate_metrics(&metrics_input)?;
    Ok(serde_json::to_value(output)?)
}
