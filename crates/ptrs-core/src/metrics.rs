use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::PtrsError;
use crate::types::{with_metadata, ComputationOutput, Days, PaymentTerm};
use crate::PtrsResult;

pub const MEDIAN: Decimal = dec!(0.50);
pub const P80: Decimal = dec!(0.80);
pub const P95: Decimal = dec!(0.95);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A record with both payment term and payment time resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub payment_term: PaymentTerm,
    /// Days taken to pay
    pub payment_time: Decimal,
}

impl MetricsRecord {
    pub fn new(payment_term: PaymentTerm, payment_time: Days) -> Self {
        MetricsRecord {
            payment_term,
            payment_time: Decimal::from(payment_time),
        }
    }

    /// Build from an annotated record, failing when the payment time is
    /// still undefined.
    pub fn from_evaluation(
        index: usize,
        payment_term: PaymentTerm,
        payment_time: Option<Days>,
    ) -> PtrsResult<Self> {
        match payment_time {
            Some(days) => Ok(MetricsRecord::new(payment_term, days)),
            None => Err(PtrsError::MissingInput {
                field: "payment_time".into(),
                context: format!("record {index} is unpaid or has no triggering date"),
            }),
        }
    }
}

/// How to choose between payment terms that share the highest count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeTieBreak {
    #[default]
    Smallest,
    Largest,
    /// The tied value that appears earliest in the input
    FirstEncountered,
}

/// How the entity's payment terms compare with the terms it receives from
/// its own customers. Supplied by the reporting entity; never computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceivableTermComparison {
    Shorter,
    Same,
    Longer,
    #[default]
    NotAssessed,
}

/// Policy knobs for the aggregate metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub mode_tie_break: ModeTieBreak,
    #[serde(default)]
    pub receivable_term_comparison: ReceivableTermComparison,
}

/// Report-level payment metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub record_count: usize,
    pub most_common_payment_term: PaymentTerm,
    pub receivable_term_comparison: ReceivableTermComparison,
    pub range_min: PaymentTerm,
    pub range_max: PaymentTerm,
    /// Mean payment time, 2 dp
    pub average_payment_time: Decimal,
    pub median_payment_time: Decimal,
    pub percentile_80: Decimal,
    pub percentile_95: Decimal,
}

/// Input for the enveloped [`calculate_metrics`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsInput {
    pub records: Vec<MetricsRecord>,
    #[serde(default)]
    pub config: MetricsConfig,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Aggregate resolved records into the report metrics.
pub fn compute_metrics(
    records: &[MetricsRecord],
    config: &MetricsConfig,
) -> PtrsResult<MetricsSummary> {
    if records.is_empty() {
        return Err(PtrsError::EmptyDataset(
            "payment metrics require at least one resolved record".into(),
        ));
    }
    validate_records(records)?;

    let terms: Vec<PaymentTerm> = records.iter().map(|r| r.payment_term).collect();
    let mut times: Vec<Decimal> = records.iter().map(|r| r.payment_time).collect();
    times.sort();

    let most_common_payment_term = mode(&terms, config.mode_tie_break)?;
    let (range_min, range_max) = range(&terms)?;

    let summary = MetricsSummary {
        record_count: records.len(),
        most_common_payment_term,
        receivable_term_comparison: config.receivable_term_comparison,
        range_min,
        range_max,
        average_payment_time: average(&times)?,
        median_payment_time: nearest_rank_percentile(&times, MEDIAN)?,
        percentile_80: nearest_rank_percentile(&times, P80)?,
        percentile_95: nearest_rank_percentile(&times, P95)?,
    };

    tracing::debug!(
        records = summary.record_count,
        average = %summary.average_payment_time,
        median = %summary.median_payment_time,
        "computed payment metrics"
    );
    Ok(summary)
}

/// [`compute_metrics`] wrapped in the standard output envelope.
pub fn calculate_metrics(input: &MetricsInput) -> PtrsResult<ComputationOutput<MetricsSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let summary = compute_metrics(&input.records, &input.config)?;

    if summary.receivable_term_comparison == ReceivableTermComparison::NotAssessed {
        warnings.push("Receivable term comparison was not supplied".into());
    }
    if summary.record_count < 20 {
        warnings.push(format!(
            "Only {} records: percentiles are coarse at this sample size",
            summary.record_count
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "PTRS payment metrics (mode, range, mean, nearest-rank percentiles)",
        input,
        warnings,
        elapsed,
        summary,
    ))
}

/// Nearest-rank percentile of an ascending slice: the element at
/// `ceil(p * n) - 1`, clamped to the slice bounds.
pub fn nearest_rank_percentile(sorted: &[Decimal], p: Decimal) -> PtrsResult<Decimal> {
    if sorted.is_empty() {
        return Err(PtrsError::EmptyDataset("percentile of an empty set".into()));
    }
    if p <= Decimal::ZERO || p > Decimal::ONE {
        return Err(PtrsError::InvalidInput {
            field: "percentile".into(),
            reason: format!("must be in (0, 1], got {p}"),
        });
    }

    let n = Decimal::from(sorted.len() as u64);
    let rank = (p * n).ceil().to_usize().unwrap_or(sorted.len());
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    Ok(sorted[index])
}

/// Most frequent value, ties resolved by `tie_break`.
pub fn mode(values: &[Decimal], tie_break: ModeTieBreak) -> PtrsResult<Decimal> {
    // value -> (count, first position)
    let mut frequencies: BTreeMap<Decimal, (usize, usize)> = BTreeMap::new();
    for (position, value) in values.iter().enumerate() {
        frequencies
            .entry(value.normalize())
            .or_insert((0, position))
            .0 += 1;
    }

    let max_count = frequencies
        .values()
        .map(|(count, _)| *count)
        .max()
        .ok_or_else(|| PtrsError::EmptyDataset("mode of an empty set".into()))?;

    // BTreeMap iterates in ascending value order
    let mut tied = frequencies
        .into_iter()
        .filter(|(_, (count, _))| *count == max_count);

    let chosen = match tie_break {
        ModeTieBreak::Smallest => tied.next().map(|(value, _)| value),
        ModeTieBreak::Largest => tied.last().map(|(value, _)| value),
        ModeTieBreak::FirstEncountered => tied
            .min_by_key(|(_, (_, first))| *first)
            .map(|(value, _)| value),
    };
    chosen.ok_or_else(|| PtrsError::EmptyDataset("mode of an empty set".into()))
}

/// Arithmetic mean rounded to 2 dp, midpoint away from zero.
pub fn average(values: &[Decimal]) -> PtrsResult<Decimal> {
    if values.is_empty() {
        return Err(PtrsError::EmptyDataset("average of an empty set".into()));
    }
    let total = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| PtrsError::InvalidInput {
            field: "payment_time".into(),
            reason: "sum of payment times exceeds the representable range".into(),
        })?;
    let mean = total / Decimal::from(values.len() as u64);
    Ok(mean.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn range(values: &[Decimal]) -> PtrsResult<(Decimal, Decimal)> {
    let min = values.iter().min().copied();
    let max = values.iter().max().copied();
    match (min, max) {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(PtrsError::EmptyDataset("range of an empty set".into())),
    }
}

fn validate_records(records: &[MetricsRecord]) -> PtrsResult<()> {
    for (i, r) in records.iter().enumerate() {
        if r.payment_term < Decimal::ZERO {
            return Err(PtrsError::InvalidInput {
                field: format!("records[{i}].payment_term"),
                reason: "Payment term cannot be negative".into(),
            });
        }
        if r.payment_time < Decimal::ZERO {
            return Err(PtrsError::InvalidInput {
                field: format!("records[{i}].payment_time"),
                reason: "Payment time cannot be negative".into(),
            });
        }
    }
    Ok(())
}
