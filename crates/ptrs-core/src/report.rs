use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::dates::DayCountPolicy;
use crate::error::PtrsError;
use crate::metrics::{compute_metrics, MetricsConfig, MetricsRecord, MetricsSummary};
use crate::payment_time::{annotate_records, AnnotatedRecord, BranchCounts, RawInvoiceRecord};
use crate::types::{with_metadata, ComputationOutput, Days, Percent};
use crate::PtrsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What to do with records whose payment time cannot be computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Leave them out of the metrics and warn
    #[default]
    Exclude,
    /// Fail the report with `MissingInput`
    Reject,
}

/// Input for a full payment-times report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInput {
    pub records: Vec<RawInvoiceRecord>,
    #[serde(default)]
    pub day_count: DayCountPolicy,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub unresolved: UnresolvedPolicy,
    /// Only report on records flagged as small business suppliers
    #[serde(default)]
    pub small_business_only: bool,
}

/// Count and share of included records in one payment-time band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTimeBand {
    pub label: String,
    pub min_days: Days,
    /// Inclusive upper bound; `None` for the open-ended top band
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_days: Option<Days>,
    pub count: usize,
    pub share_pct: Percent,
}

/// Full report output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub record_count: usize,
    pub excluded_non_sbi: usize,
    pub excluded_unresolved: usize,
    pub included_count: usize,
    pub branch_counts: BranchCounts,
    pub metrics: MetricsSummary,
    pub payment_time_bands: Vec<PaymentTimeBand>,
    /// Share of included records paid within their payment term
    pub paid_within_terms_pct: Percent,
}

/// (label, min, max) for the reporting bands.
const BANDS: [(&str, Days, Option<Days>); 6] = [
    ("Within 20 days", 0, Some(20)),
    ("21 to 30 days", 21, Some(30)),
    ("31 to 60 days", 31, Some(60)),
    ("61 to 90 days", 61, Some(90)),
    ("91 to 120 days", 91, Some(120)),
    ("Over 120 days", 121, None),
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Annotate raw records with payment times and aggregate them into the
/// report metrics, distribution bands and on-time share.
pub fn build_report(input: &ReportInput) -> PtrsResult<ComputationOutput<ReportOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let annotated = annotate_records(&input.records, input.day_count, &mut warnings);
    let record_count = annotated.len();

    let (in_scope, excluded_non_sbi): (Vec<AnnotatedRecord>, usize) = if input.small_business_only
    {
        let (keep, other): (Vec<_>, Vec<_>) =
            annotated.into_iter().partition(|r| r.sbi == Some(true));
        (keep, other.len())
    } else {
        (annotated, 0)
    };

    let mut branch_counts = BranchCounts::default();
    let mut resolved: Vec<MetricsRecord> = Vec::with_capacity(in_scope.len());
    let mut excluded_unresolved = 0usize;

    for r in &in_scope {
        branch_counts.record(r.branch);
        match input.unresolved {
            UnresolvedPolicy::Reject => {
                resolved.push(MetricsRecord::from_evaluation(
                    r.index,
                    r.payment_term,
                    r.payment_time,
                )?);
            }
            UnresolvedPolicy::Exclude => match r.payment_time {
                Some(days) => resolved.push(MetricsRecord::new(r.payment_term, days)),
                None => excluded_unresolved += 1,
            },
        }
    }

    if excluded_non_sbi > 0 {
        warnings.push(format!(
            "{excluded_non_sbi} records excluded: not flagged as small business"
        ));
    }
    if excluded_unresolved > 0 {
        warnings.push(format!(
            "{excluded_unresolved} records excluded: unpaid or missing triggering date"
        ));
    }
    tracing::debug!(
        record_count,
        excluded_non_sbi,
        excluded_unresolved,
        included = resolved.len(),
        "resolved report records"
    );

    if resolved.is_empty() {
        return Err(PtrsError::EmptyDataset(format!(
            "no reportable records out of {record_count}"
        )));
    }

    let metrics = compute_metrics(&resolved, &input.metrics)?;
    let payment_time_bands = band_distribution(&resolved);
    let paid_within_terms_pct = share_pct(
        resolved
            .iter()
            .filter(|r| r.payment_time <= r.payment_term)
            .count(),
        resolved.len(),
    );

    let output = ReportOutput {
        record_count,
        excluded_non_sbi,
        excluded_unresolved,
        included_count: resolved.len(),
        branch_counts,
        metrics,
        payment_time_bands,
        paid_within_terms_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!(
            "PTRS payment times report ({}, {:?} unresolved records)",
            input.day_count.label(),
            input.unresolved
        ),
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn band_distribution(records: &[MetricsRecord]) -> Vec<PaymentTimeBand> {
    BANDS
        .iter()
        .map(|&(label, min_days, max_days)| {
            let lower = Decimal::from(min_days);
            let count = records
                .iter()
                .filter(|r| {
                    // Partial-day times from upstream land in the band their ceiling falls in
                    let days = r.payment_time.ceil();
                    days >= lower && max_days.map_or(true, |max| days <= Decimal::from(max))
                })
                .count();
            PaymentTimeBand {
                label: label.to_string(),
                min_days,
                max_days,
                count,
                share_pct: share_pct(count, records.len()),
            }
        })
        .collect()
}

fn share_pct(part: usize, whole: usize) -> Percent {
    if whole == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part as u64) * dec!(100) / Decimal::from(whole as u64))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
