use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use ptrs_core::payment_time::{self, PaymentTimeInput, RawInvoiceRecord};

use super::policy::DayCountArg;
use crate::input;

/// Arguments for a single-record payment time
#[derive(Args)]
pub struct PaymentTimeArgs {
    /// Path to a JSON/YAML record (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Self-billed under a Recipient Created Tax Invoice
    #[arg(long)]
    pub rcti: bool,

    /// Invoice issue date (ISO-8601)
    #[arg(long)]
    pub invoice_issue_date: Option<String>,

    /// Invoice receipt date (ISO-8601)
    #[arg(long)]
    pub invoice_receipt_date: Option<String>,

    /// Notice for payment issue date (ISO-8601)
    #[arg(long, alias = "notice-date")]
    pub notice_for_payment_issue_date: Option<String>,

    /// Date of supply (ISO-8601)
    #[arg(long)]
    pub supply_date: Option<String>,

    /// Date payment was made (ISO-8601)
    #[arg(long)]
    pub payment_date: Option<String>,

    /// Payment term in days
    #[arg(long)]
    pub payment_term: Option<Decimal>,

    /// Day-count policy
    #[arg(long, value_enum)]
    pub day_count: Option<DayCountArg>,
}

pub fn run_payment_time(args: PaymentTimeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: RawInvoiceRecord = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RawInvoiceRecord {
            rcti: args.rcti,
            invoice_issue_date: args.invoice_issue_date,
            invoice_receipt_date: args.invoice_receipt_date,
            notice_for_payment_issue_date: args.notice_for_payment_issue_date,
            supply_date: args.supply_date,
            payment_date: args.payment_date,
            payment_term: args.payment_term.unwrap_or_default(),
            sbi: None,
        }
    };

    let batch = PaymentTimeInput {
        records: vec![record],
        day_count: args.day_count.map(Into::into).unwrap_or_default(),
    };
    let output = payment_time::annotate_payment_times(&batch)?;

    // Report the lone record as the result rather than a one-element batch
    let mut value = serde_json::to_value(&output)?;
    if let Some(first) = value.pointer("/result/records/0").cloned() {
        value["result"] = first;
    }
    Ok(value)
}
