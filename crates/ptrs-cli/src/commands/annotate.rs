use clap::Args;
use serde_json::Value;

use ptrs_core::payment_time::{self, PaymentTimeInput, RawInvoiceRecord};

use super::policy::DayCountArg;
use crate::input;

/// Arguments for batch annotation
#[derive(Args)]
pub struct AnnotateArgs {
    /// Path to records: JSON/YAML (array or {records}) or CSV
    #[arg(long)]
    pub input: Option<String>,

    /// Day-count policy (overrides the input file)
    #[arg(long, value_enum)]
    pub day_count: Option<DayCountArg>,
}

pub fn run_annotate(args: AnnotateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let document = input::read_batch::<RawInvoiceRecord>(args.input.as_deref())?
        .ok_or("records are required: provide --input or pipe JSON on stdin")?;
    let mut batch: PaymentTimeInput = serde_json::from_value(document)?;

    if let Some(day_count) = args.day_count {
        batch.day_count = day_count.into();
    }

    let output = payment_time::annotate_payment_times(&batch)?;
    Ok(serde_json::to_value(output)?)
}
