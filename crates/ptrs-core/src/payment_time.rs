use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::dates::{self, days_between, DayCountPolicy};
use crate::types::{with_metadata, ComputationOutput, Days, PaymentTerm};
use crate::PtrsResult;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One invoice/payment record with typed dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Recipient Created Tax Invoice (self-billed) arrangement
    #[serde(default)]
    pub rcti: bool,
    #[serde(default, with = "dates::optional_datetime")]
    pub invoice_issue_date: Option<NaiveDateTime>,
    #[serde(default, with = "dates::optional_datetime")]
    pub invoice_receipt_date: Option<NaiveDateTime>,
    #[serde(default, with = "dates::optional_datetime")]
    pub notice_for_payment_issue_date: Option<NaiveDateTime>,
    #[serde(default, with = "dates::optional_datetime")]
    pub supply_date: Option<NaiveDateTime>,
    /// Absent while the invoice is unpaid
    #[serde(default, with = "dates::optional_datetime")]
    pub payment_date: Option<NaiveDateTime>,
    /// Allowed days to pay, derived upstream
    #[serde(default)]
    pub payment_term: PaymentTerm,
    /// Small Business Identification flag; not read by the calculator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sbi: Option<bool>,
}

/// Wire form of [`InvoiceRecord`] with dates as unparsed strings.
///
/// Use [`RawInvoiceRecord::parse`] when the data has not been validated: an
/// unparseable date is treated as absent and reported as a [`DateIssue`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInvoiceRecord {
    #[serde(default)]
    pub rcti: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_issue_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_receipt_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice_for_payment_issue_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub payment_term: PaymentTerm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sbi: Option<bool>,
}

/// A date field that failed to parse and was treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateIssue {
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl RawInvoiceRecord {
    /// Convert to a typed record, collecting unparseable dates instead of failing.
    pub fn parse(&self) -> (InvoiceRecord, Vec<DateIssue>) {
        let mut issues = Vec::new();
        let mut field = |name: &str, raw: &Option<String>| -> Option<NaiveDateTime> {
            match dates::parse_optional_date(name, raw.as_deref()) {
                Ok(value) => value,
                Err(e) => {
                    issues.push(DateIssue {
                        field: name.to_string(),
                        value: raw.clone().unwrap_or_default(),
                        reason: e.to_string(),
                    });
                    None
                }
            }
        };

        let record = InvoiceRecord {
            rcti: self.rcti,
            invoice_issue_date: field("invoice_issue_date", &self.invoice_issue_date),
            invoice_receipt_date: field("invoice_receipt_date", &self.invoice_receipt_date),
            notice_for_payment_issue_date: field(
                "notice_for_payment_issue_date",
                &self.notice_for_payment_issue_date,
            ),
            supply_date: field("supply_date", &self.supply_date),
            payment_date: field("payment_date", &self.payment_date),
            payment_term: self.payment_term,
            sbi: self.sbi,
        };
        (record, issues)
    }
}

impl From<&InvoiceRecord> for RawInvoiceRecord {
    fn from(record: &InvoiceRecord) -> Self {
        let render = |value: &Option<NaiveDateTime>| value.as_ref().map(dates::format_date);
        RawInvoiceRecord {
            rcti: record.rcti,
            invoice_issue_date: render(&record.invoice_issue_date),
            invoice_receipt_date: render(&record.invoice_receipt_date),
            notice_for_payment_issue_date: render(&record.notice_for_payment_issue_date),
            supply_date: render(&record.supply_date),
            payment_date: render(&record.payment_date),
            payment_term: record.payment_term,
            sbi: record.sbi,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The rule that determines which date starts the payment-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTimeBranch {
    /// Self-billed: invoice issue date
    Rcti,
    /// Earlier-resolving of invoice issue / receipt date
    Invoice,
    /// Notice for payment issue date
    NoticeForPayment,
    /// Fallback: date of supply
    Supply,
}

/// Pick the applicable rule. Conditions are evaluated in order and the first
/// match wins.
pub fn classify(record: &InvoiceRecord) -> PaymentTimeBranch {
    if record.rcti {
        PaymentTimeBranch::Rcti
    } else if record.invoice_issue_date.is_some() || record.invoice_receipt_date.is_some() {
        PaymentTimeBranch::Invoice
    } else if record.notice_for_payment_issue_date.is_some() {
        PaymentTimeBranch::NoticeForPayment
    } else {
        PaymentTimeBranch::Supply
    }
}

/// Branch taken and the resulting payment time for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTimeEvaluation {
    pub branch: PaymentTimeBranch,
    pub payment_time: Option<Days>,
}

/// Classify and compute in one pass.
pub fn evaluate(record: &InvoiceRecord, policy: DayCountPolicy) -> PaymentTimeEvaluation {
    let branch = classify(record);
    let paid = record.payment_date;

    let payment_time = match branch {
        PaymentTimeBranch::Rcti => days_between(record.invoice_issue_date, paid, policy),
        PaymentTimeBranch::Invoice => {
            let from_issue = days_between(record.invoice_issue_date, paid, policy);
            let from_receipt = days_between(record.invoice_receipt_date, paid, policy);
            match (from_issue, from_receipt) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            }
        }
        PaymentTimeBranch::NoticeForPayment => {
            days_between(record.notice_for_payment_issue_date, paid, policy)
        }
        PaymentTimeBranch::Supply => days_between(record.supply_date, paid, policy),
    };

    tracing::trace!(?branch, ?payment_time, "evaluated payment time");
    PaymentTimeEvaluation {
        branch,
        payment_time,
    }
}

/// Days between the triggering event and payment, or `None` when the record
/// is unpaid or its triggering date is missing.
pub fn compute_payment_time(record: &InvoiceRecord, policy: DayCountPolicy) -> Option<Days> {
    evaluate(record, policy).payment_time
}

// ---------------------------------------------------------------------------
// Batch annotation
// ---------------------------------------------------------------------------

/// Input for annotating a batch of raw records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentTimeInput {
    pub records: Vec<RawInvoiceRecord>,
    #[serde(default)]
    pub day_count: DayCountPolicy,
}

/// One annotated record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    /// Position in the input batch (0-based)
    pub index: usize,
    pub branch: PaymentTimeBranch,
    pub payment_time: Option<Days>,
    pub payment_term: PaymentTerm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sbi: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub date_issues: Vec<DateIssue>,
}

/// Record counts per classification branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCounts {
    pub rcti: usize,
    pub invoice: usize,
    pub notice_for_payment: usize,
    pub supply: usize,
}

impl BranchCounts {
    pub fn record(&mut self, branch: PaymentTimeBranch) {
        match branch {
            PaymentTimeBranch::Rcti => self.rcti += 1,
            PaymentTimeBranch::Invoice => self.invoice += 1,
            PaymentTimeBranch::NoticeForPayment => self.notice_for_payment += 1,
            PaymentTimeBranch::Supply => self.supply += 1,
        }
    }
}

/// Output of batch annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTimeOutput {
    pub records: Vec<AnnotatedRecord>,
    pub resolved: usize,
    pub unresolved: usize,
    pub branch_counts: BranchCounts,
}

/// Annotate a batch of raw records with payment times.
pub fn annotate_payment_times(
    input: &PaymentTimeInput,
) -> PtrsResult<ComputationOutput<PaymentTimeOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let records = annotate_records(&input.records, input.day_count, &mut warnings);

    let mut branch_counts = BranchCounts::default();
    for r in &records {
        branch_counts.record(r.branch);
    }
    let resolved = records.iter().filter(|r| r.payment_time.is_some()).count();
    let unresolved = records.len() - resolved;
    if unresolved > 0 {
        warnings.push(format!(
            "{unresolved} of {} records have no computable payment time (unpaid or missing trigger date)",
            records.len()
        ));
    }

    let output = PaymentTimeOutput {
        records,
        resolved,
        unresolved,
        branch_counts,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!(
            "PTRS payment time per record ({})",
            input.day_count.label()
        ),
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Parse and evaluate each raw record, pushing a warning per unparseable date.
pub(crate) fn annotate_records(
    raw: &[RawInvoiceRecord],
    policy: DayCountPolicy,
    warnings: &mut Vec<String>,
) -> Vec<AnnotatedRecord> {
    raw.iter()
        .enumerate()
        .map(|(index, raw_record)| {
            let (record, date_issues) = raw_record.parse();
            for issue in &date_issues {
                warnings.push(format!(
                    "Record {index}: {} '{}' could not be parsed and was treated as absent",
                    issue.field, issue.value
                ));
            }
            let evaluation = evaluate(&record, policy);
            AnnotatedRecord {
                index,
                branch: evaluation.branch,
                payment_time: evaluation.payment_time,
                payment_term: record.payment_term,
                sbi: record.sbi,
                date_issues,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dt(s: &str) -> Option<NaiveDateTime> {
        Some(dates::parse_date("test", s).unwrap())
    }

    fn paid(on: &str) -> InvoiceRecord {
        InvoiceRecord {
            payment_date: dt(on),
            payment_term: dec!(30),
            ..Default::default()
        }
    }

    #[test]
    fn test_rcti_uses_issue_date_only() {
        let record = InvoiceRecord {
            rcti: true,
            invoice_issue_date: dt("2024-01-01"),
            invoice_receipt_date: dt("2024-01-20"),
            supply_date: dt("2023-12-01"),
            ..paid("2024-01-31")
        };
        assert_eq!(classify(&record), PaymentTimeBranch::Rcti);
        assert_eq!(compute_payment_time(&record, DayCountPolicy::ExclusiveCeiling), Some(30));
        assert_eq!(compute_payment_time(&record, DayCountPolicy::InclusiveFloor), Some(31));
    }

    #[test]
    fn test_rcti_without_issue_date_is_undefined() {
        // Does not fall through to the later rules
        let record = InvoiceRecord {
            rcti: true,
            supply_date: dt("2024-01-01"),
            ..paid("2024-01-31")
        };
        assert_eq!(classify(&record), PaymentTimeBranch::Rcti);
        assert_eq!(compute_payment_time(&record, DayCountPolicy::default()), None);
    }

    #[test]
    fn test_invoice_takes_minimum() {
        let record = InvoiceRecord {
            invoice_issue_date: dt("2024-01-01"),
            invoice_receipt_date: dt("2024-01-11"),
            ..paid("2024-01-31")
        };
        assert_eq!(compute_payment_time(&record, DayCountPolicy::default()), Some(20));
    }

    #[test]
    fn test_invoice_single_date() {
        let receipt_only = InvoiceRecord {
            invoice_receipt_date: dt("2024-01-21"),
            notice_for_payment_issue_date: dt("2023-12-01"),
            ..paid("2024-01-31")
        };
        assert_eq!(classify(&receipt_only), PaymentTimeBranch::Invoice);
        assert_eq!(compute_payment_time(&receipt_only, DayCountPolicy::default()), Some(10));
    }

    #[test]
    fn test_notice_for_payment() {
        let record = InvoiceRecord {
            notice_for_payment_issue_date: dt("2024-01-16"),
            supply_date: dt("2024-01-01"),
            ..paid("2024-01-31")
        };
        assert_eq!(classify(&record), PaymentTimeBranch::NoticeForPayment);
        assert_eq!(compute_payment_time(&record, DayCountPolicy::default()), Some(15));
    }

    #[test]
    fn test_supply_fallback() {
        let record = InvoiceRecord {
            supply_date: dt("2024-01-01"),
            ..paid("2024-03-01")
        };
        assert_eq!(classify(&record), PaymentTimeBranch::Supply);
        assert_eq!(compute_payment_time(&record, DayCountPolicy::default()), Some(60));
    }

    #[test]
    fn test_unpaid_is_undefined() {
        let record = InvoiceRecord {
            invoice_issue_date: dt("2024-01-01"),
            ..Default::default()
        };
        assert_eq!(compute_payment_time(&record, DayCountPolicy::default()), None);
    }

    #[test]
    fn test_no_dates_at_all() {
        let record = InvoiceRecord::default();
        assert_eq!(classify(&record), PaymentTimeBranch::Supply);
        assert_eq!(compute_payment_time(&record, DayCountPolicy::default()), None);
    }

    #[test]
    fn test_raw_parse_treats_bad_date_as_absent() {
        let raw = RawInvoiceRecord {
            invoice_issue_date: Some("not a date".into()),
            supply_date: Some("2024-01-01".into()),
            payment_date: Some("2024-01-11".into()),
            ..Default::default()
        };
        let (record, issues) = raw.parse();
        assert_eq!(record.invoice_issue_date, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "invoice_issue_date");
        assert_eq!(classify(&record), PaymentTimeBranch::Supply);
        assert_eq!(compute_payment_time(&record, DayCountPolicy::default()), Some(10));
    }

    #[test]
    fn test_annotate_counts_and_warnings() {
        let input = PaymentTimeInput {
            records: vec![
                RawInvoiceRecord {
                    rcti: true,
                    invoice_issue_date: Some("2024-01-01".into()),
                    payment_date: Some("2024-01-31".into()),
                    payment_term: dec!(30),
                    ..Default::default()
                },
                RawInvoiceRecord {
                    supply_date: Some("2024-01-01".into()),
                    payment_term: dec!(60),
                    ..Default::default()
                },
                RawInvoiceRecord {
                    notice_for_payment_issue_date: Some("garbage".into()),
                    payment_date: Some("2024-01-31".into()),
                    ..Default::default()
                },
            ],
            day_count: DayCountPolicy::ExclusiveCeiling,
        };

        let output = annotate_payment_times(&input).unwrap();
        let result = &output.result;
        assert_eq!(result.resolved, 1);
        assert_eq!(result.unresolved, 2);
        assert_eq!(result.records[0].payment_time, Some(30));
        assert_eq!(result.records[1].branch, PaymentTimeBranch::Supply);
        assert_eq!(result.records[2].date_issues.len(), 1);
        assert_eq!(result.branch_counts.rcti, 1);
        assert_eq!(result.branch_counts.supply, 2);
        assert_eq!(output.warnings.len(), 2);
    }

    #[test]
    fn test_typed_record_deserializes_iso_strings() {
        let json = r#"{
            "rcti": false,
            "invoice_receipt_date": "2024-05-01",
            "payment_date": "2024-05-15T10:30:00Z",
            "payment_term": "30"
        }"#;
        let record: InvoiceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.payment_term, dec!(30));
        assert_eq!(compute_payment_time(&record, DayCountPolicy::ExclusiveCeiling), Some(15));
        assert_eq!(compute_payment_time(&record, DayCountPolicy::InclusiveFloor), Some(15));
    }

    #[test]
    fn test_typed_record_rejects_bad_date() {
        let json = r#"{"payment_date": "yesterday"}"#;
        assert!(serde_json::from_str::<InvoiceRecord>(json).is_err());
    }

    #[test]
    fn test_typed_record_date_error_names_value_not_placeholder_field() {
        let json = r#"{"invoice_issue_date": "31/02/2024"}"#;
        let message = serde_json::from_str::<InvoiceRecord>(json)
            .unwrap_err()
            .to_string();
        assert!(message.contains("invalid date '31/02/2024'"), "{message}");
        assert!(!message.contains("in date"), "{message}");
    }
}
