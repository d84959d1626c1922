use clap::Args;
use serde_json::Value;

use ptrs_core::payment_time::RawInvoiceRecord;
use ptrs_core::report::{self, ReportInput, UnresolvedPolicy};

use super::policy::{ComparisonArg, DayCountArg, TieBreakArg};
use crate::input;

/// Arguments for the full payment-times report
#[derive(Args)]
pub struct ReportArgs {
    /// Path to raw records: JSON/YAML (array or full report input) or CSV
    #[arg(long)]
    pub input: Option<String>,

    /// Day-count policy
    #[arg(long, value_enum)]
    pub day_count: Option<DayCountArg>,

    /// Tie-break for the most common payment term
    #[arg(long, value_enum)]
    pub tie_break: Option<TieBreakArg>,

    /// Receivable term comparison supplied by the entity
    #[arg(long, value_enum)]
    pub receivable_comparison: Option<ComparisonArg>,

    /// Only include records flagged as small business suppliers
    #[arg(long)]
    pub small_business_only: bool,

    /// Fail instead of excluding records without a payment time
    #[arg(long)]
    pub reject_unresolved: bool,
}

pub fn run_report(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let document = input::read_batch::<RawInvoiceRecord>(args.input.as_deref())?
        .ok_or("records are required: provide --input or pipe JSON on stdin")?;
    let mut report_input: ReportInput = serde_json::from_value(document)?;

    if let Some(day_count) = args.day_count {
        report_input.day_count = day_count.into();
    }
    if let Some(tie_break) = args.tie_break {
        report_input.metrics.mode_tie_break = tie_break.into();
    }
    if let Some(comparison) = args.receivable_comparison {
        report_input.metrics.receivable_term_comparison = comparison.into();
    }
    if args.small_business_only {
        report_input.small_business_only = true;
    }
    if args.reject_unresolved {
        report_input.unresolved = UnresolvedPolicy::Reject;
    }

    let output = report::build_report(&report_input)?;
    Ok(serde_json::to_value(output)?)
}
