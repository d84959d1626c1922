//! Deterministic sample records for demos and tests.
//!
//! Everything flows from one seeded generator, so the same [`SampleConfig`]
//! always yields the same records.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PtrsError;
use crate::payment_time::RawInvoiceRecord;
use crate::PtrsResult;

const PAYMENT_TERMS: [i64; 5] = [14, 20, 30, 45, 60];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub seed: u64,
    pub count: usize,
    /// Earliest supply date
    pub base_date: NaiveDate,
    /// Probability a record is self-billed
    pub rcti_share: f64,
    /// Probability a record has no payment date yet
    pub unpaid_share: f64,
    /// Probability a record carries `sbi = true`
    pub sbi_share: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        SampleConfig {
            seed: 42,
            count: 100,
            base_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            rcti_share: 0.1,
            unpaid_share: 0.05,
            sbi_share: 0.6,
        }
    }
}

/// Generate `config.count` raw records from `config.seed`.
pub fn generate_records(config: &SampleConfig) -> PtrsResult<Vec<RawInvoiceRecord>> {
    validate_share("rcti_share", config.rcti_share)?;
    validate_share("unpaid_share", config.unpaid_share)?;
    validate_share("sbi_share", config.sbi_share)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let records = (0..config.count)
        .map(|_| sample_record(&mut rng, config))
        .collect::<PtrsResult<Vec<_>>>()?;

    tracing::debug!(seed = config.seed, count = records.len(), "generated sample records");
    Ok(records)
}

fn sample_record(rng: &mut StdRng, config: &SampleConfig) -> PtrsResult<RawInvoiceRecord> {
    let term = PAYMENT_TERMS[rng.gen_range(0..PAYMENT_TERMS.len())];
    let supply = shift(config.base_date, rng.gen_range(0..180))?;
    let rcti = rng.gen_bool(config.rcti_share);

    let mut record = RawInvoiceRecord {
        rcti,
        supply_date: Some(iso(supply)),
        payment_term: Decimal::from(term),
        sbi: Some(rng.gen_bool(config.sbi_share)),
        ..Default::default()
    };

    let trigger = if rcti {
        let issue = shift(supply, rng.gen_range(0..=5))?;
        record.invoice_issue_date = Some(iso(issue));
        issue
    } else {
        match rng.gen_range(0..20) {
            // Regular invoice, sometimes with a later receipt date
            0..=13 => {
                let issue = shift(supply, rng.gen_range(0..=10))?;
                record.invoice_issue_date = Some(iso(issue));
                if rng.gen_bool(0.5) {
                    let receipt = shift(issue, rng.gen_range(0..=7))?;
                    record.invoice_receipt_date = Some(iso(receipt));
                }
                issue
            }
            14..=16 => {
                let notice = shift(supply, rng.gen_range(0..=10))?;
                record.notice_for_payment_issue_date = Some(iso(notice));
                notice
            }
            _ => supply,
        }
    };

    if !rng.gen_bool(config.unpaid_share) {
        let paid = shift(trigger, rng.gen_range(0..=term * 2))?;
        record.payment_date = Some(iso(paid));
    }
    Ok(record)
}

/// `date + days`, failing instead of panicking past the calendar's end.
fn shift(date: NaiveDate, days: i64) -> PtrsResult<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| PtrsError::InvalidInput {
            field: "base_date".into(),
            reason: format!("{date} + {days} days is past the last representable date"),
        })
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn validate_share(field: &str, value: f64) -> PtrsResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PtrsError::InvalidInput {
            field: field.into(),
            reason: format!("must be between 0 and 1, got {value}"),
        });
    }
    Ok(())
}
