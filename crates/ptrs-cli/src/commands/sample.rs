use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;

use ptrs_core::sample::{self, SampleConfig};

/// Arguments for sample record generation
#[derive(Args)]
pub struct SampleArgs {
    /// RNG seed; the same seed always yields the same records
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of records
    #[arg(long, default_value_t = 100)]
    pub count: usize,

    /// Earliest supply date (YYYY-MM-DD)
    #[arg(long)]
    pub base_date: Option<NaiveDate>,

    /// Share of self-billed (RCTI) records, 0-1
    #[arg(long)]
    pub rcti_share: Option<f64>,

    /// Share of unpaid records, 0-1
    #[arg(long)]
    pub unpaid_share: Option<f64>,

    /// Share of records flagged as small business, 0-1
    #[arg(long)]
    pub sbi_share: Option<f64>,
}

pub fn run_sample(args: SampleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let defaults = SampleConfig::default();
    let config = SampleConfig {
        seed: args.seed,
        count: args.count,
        base_date: args.base_date.unwrap_or(defaults.base_date),
        rcti_share: args.rcti_share.unwrap_or(defaults.rcti_share),
        unpaid_share: args.unpaid_share.unwrap_or(defaults.unpaid_share),
        sbi_share: args.sbi_share.unwrap_or(defaults.sbi_share),
    };

    let records = sample::generate_records(&config)?;
    Ok(serde_json::to_value(records)?)
}
