use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::PtrsError;
use crate::types::Days;
use crate::PtrsResult;

const SECONDS_PER_DAY: i64 = 86_400;

// ---------------------------------------------------------------------------
// Day-count policy
// ---------------------------------------------------------------------------

/// How the elapsed time between two instants is turned into a day count.
///
/// Both policies are clamped at zero, so a payment recorded before its
/// triggering event counts as zero days rather than a negative number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCountPolicy {
    /// `ceil((end - start) / 1 day)`. 1 Jan → 31 Jan is 30 days.
    #[default]
    ExclusiveCeiling,
    /// `floor((end - start) / 1 day) + 1`, the spreadsheet-style count that
    /// includes both endpoints. 1 Jan → 31 Jan is 31 days.
    InclusiveFloor,
}

impl DayCountPolicy {
    /// Day count between two present instants.
    pub fn count(self, start: NaiveDateTime, end: NaiveDateTime) -> Days {
        let seconds = (end - start).num_seconds();
        let days = match self {
            DayCountPolicy::ExclusiveCeiling => -(-seconds).div_euclid(SECONDS_PER_DAY),
            DayCountPolicy::InclusiveFloor => seconds.div_euclid(SECONDS_PER_DAY) + 1,
        };
        days.max(0)
    }

    pub fn label(self) -> &'static str {
        match self {
            DayCountPolicy::ExclusiveCeiling => "exclusive count, partial days rounded up",
            DayCountPolicy::InclusiveFloor => "inclusive count, whole days plus one",
        }
    }
}

/// Days elapsed from `start` to `end`, or `None` when either is absent.
pub fn days_between(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    policy: DayCountPolicy,
) -> Option<Days> {
    let (start, end) = (start?, end?);
    Some(policy.count(start, end))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 date or date-time.
///
/// Accepts `YYYY-MM-DD`, local date-times with `T` or space separators, and
/// RFC 3339 timestamps with an offset (normalised to UTC). Date-only values
/// map to midnight.
pub fn parse_date(field: &str, raw: &str) -> PtrsResult<NaiveDateTime> {
    let value = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.naive_utc()),
        Err(e) => Err(PtrsError::InvalidDate {
            field: field.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Parse an optional raw value; blank strings count as absent.
pub fn parse_optional_date(field: &str, raw: Option<&str>) -> PtrsResult<Option<NaiveDateTime>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(field, value).map(Some),
    }
}

/// Render a date-time, dropping the time component at midnight.
pub fn format_date(value: &NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Serde adapter for `Option<NaiveDateTime>` fields using [`parse_date`].
pub mod optional_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::error::PtrsError;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_some(&super::format_date(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse_date("", value).map(Some).map_err(|e| match e {
                PtrsError::InvalidDate { value, reason, .. } => {
                    serde::de::Error::custom(format!("invalid date '{value}': {reason}"))
                }
                other => serde::de::Error::custom(other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDateTime {
        parse_date("test", s).unwrap()
    }

    #[test]
    fn test_january_exclusive_vs_inclusive() {
        let start = Some(d("2024-01-01"));
        let end = Some(d("2024-01-31"));
        assert_eq!(days_between(start, end, DayCountPolicy::ExclusiveCeiling), Some(30));
        assert_eq!(days_between(start, end, DayCountPolicy::InclusiveFloor), Some(31));
    }

    #[test]
    fn test_partial_day_rounding() {
        let start = d("2024-03-01T09:00:00");
        let end = d("2024-03-03T08:00:00");
        // 1 day 23 hours
        assert_eq!(DayCountPolicy::ExclusiveCeiling.count(start, end), 2);
        assert_eq!(DayCountPolicy::InclusiveFloor.count(start, end), 2);
    }

    #[test]
    fn test_same_day() {
        let day = d("2024-06-30");
        assert_eq!(DayCountPolicy::ExclusiveCeiling.count(day, day), 0);
        assert_eq!(DayCountPolicy::InclusiveFloor.count(day, day), 1);
    }

    #[test]
    fn test_payment_before_trigger_clamps_to_zero() {
        let start = d("2024-02-10");
        let end = d("2024-02-01");
        assert_eq!(DayCountPolicy::ExclusiveCeiling.count(start, end), 0);
        assert_eq!(DayCountPolicy::InclusiveFloor.count(start, end), 0);
    }

    #[test]
    fn test_absent_inputs() {
        let day = Some(d("2024-01-01"));
        assert_eq!(days_between(None, day, DayCountPolicy::default()), None);
        assert_eq!(days_between(day, None, DayCountPolicy::default()), None);
        assert_eq!(days_between(None, None, DayCountPolicy::InclusiveFloor), None);
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(format_date(&d("2024-01-05")), "2024-01-05");
        assert_eq!(format_date(&d("2024-01-05T13:45:00")), "2024-01-05T13:45:00");
        assert_eq!(format_date(&d("2024-01-05 13:45:00")), "2024-01-05T13:45:00");
        assert_eq!(format_date(&d("2024-01-05T13:45:00+10:00")), "2024-01-05T03:45:00");
        assert_eq!(format_date(&d(" 2024-01-05 ")), "2024-01-05");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        match parse_date("payment_date", "31/02/2024") {
            Err(PtrsError::InvalidDate { field, value, .. }) => {
                assert_eq!(field, "payment_date");
                assert_eq!(value, "31/02/2024");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
        assert!(parse_date("payment_date", "2024-02-30").is_err());
    }

    #[test]
    fn test_blank_is_absent() {
        assert_eq!(parse_optional_date("supply_date", Some("  ")).unwrap(), None);
        assert_eq!(parse_optional_date("supply_date", None).unwrap(), None);
    }
}
