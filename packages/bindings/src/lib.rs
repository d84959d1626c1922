use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use ptrs_core::dates::DayCountPolicy;
use ptrs_core::payment_time::RawInvoiceRecord;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct PaymentTimeRequest {
    record: RawInvoiceRecord,
    #[serde(default)]
    day_count: DayCountPolicy,
}

// ---------------------------------------------------------------------------
// Payment time
// ---------------------------------------------------------------------------

/// `{record, day_count?}` -> `{branch, payment_time, date_issues}`.
/// `payment_time` is `null` when the record is unpaid or has no trigger date.
#[napi]
pub fn compute_payment_time(input_json: String) -> NapiResult<String> {
    let request: PaymentTimeRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let (record, date_issues) = request.record.parse();
    let evaluation = ptrs_core::payment_time::evaluate(&record, request.day_count);
    let output = serde_json::json!({
        "branch": evaluation.branch,
        "payment_time": evaluation.payment_time,
        "date_issues": date_issues,
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn annotate_payment_times(input_json: String) -> NapiResult<String> {
    let input: ptrs_core::payment_time::PaymentTimeInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        ptrs_core::payment_time::annotate_payment_times(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Metrics and report
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_metrics(input_json: String) -> NapiResult<String> {
    let input: ptrs_core::metrics::MetricsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = ptrs_core::metrics::calculate_metrics(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_report(input_json: String) -> NapiResult<String> {
    let input: ptrs_core::report::ReportInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = ptrs_core::report::build_report(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_sample_records(input_json: String) -> NapiResult<String> {
    let config: ptrs_core::sample::SampleConfig =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let records = ptrs_core::sample::generate_records(&config).map_err(to_napi_error)?;
    serde_json::to_string(&records).map_err(to_napi_error)
}
