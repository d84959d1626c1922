use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use ptrs_core::dates::{days_between, DayCountPolicy};
use ptrs_core::payment_time::{
    classify, compute_payment_time, evaluate, InvoiceRecord, PaymentTimeBranch,
};
use rust_decimal_macros::dec;

fn day(offset: i64) -> NaiveDateTime {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (base + Duration::days(offset)).and_time(NaiveTime::MIN)
}

fn policy_strategy() -> impl Strategy<Value = DayCountPolicy> {
    prop_oneof![
        Just(DayCountPolicy::ExclusiveCeiling),
        Just(DayCountPolicy::InclusiveFloor),
    ]
}

fn optional_day() -> impl Strategy<Value = Option<NaiveDateTime>> {
    proptest::option::of((-60i64..400).prop_map(day))
}

// ---------------------------------------------------------------------------
// Worked examples
// ---------------------------------------------------------------------------

#[test]
fn test_rcti_january_under_both_policies() {
    let record = InvoiceRecord {
        rcti: true,
        invoice_issue_date: Some(day(0)),
        payment_date: Some(day(30)),
        payment_term: dec!(30),
        ..Default::default()
    };
    assert_eq!(
        compute_payment_time(&record, DayCountPolicy::ExclusiveCeiling),
        Some(30)
    );
    assert_eq!(
        compute_payment_time(&record, DayCountPolicy::InclusiveFloor),
        Some(31)
    );
}

#[test]
fn test_default_policy_is_exclusive() {
    assert_eq!(DayCountPolicy::default(), DayCountPolicy::ExclusiveCeiling);
}

#[test]
fn test_invoice_branch_beats_notice_and_supply() {
    let record = InvoiceRecord {
        invoice_issue_date: Some(day(10)),
        notice_for_payment_issue_date: Some(day(0)),
        supply_date: Some(day(0)),
        payment_date: Some(day(40)),
        ..Default::default()
    };
    let evaluation = evaluate(&record, DayCountPolicy::default());
    assert_eq!(evaluation.branch, PaymentTimeBranch::Invoice);
    assert_eq!(evaluation.payment_time, Some(30));
}

#[test]
fn test_invoice_branch_with_missing_payment() {
    let record = InvoiceRecord {
        invoice_issue_date: Some(day(10)),
        invoice_receipt_date: Some(day(12)),
        ..Default::default()
    };
    assert_eq!(compute_payment_time(&record, DayCountPolicy::default()), None);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_rcti_depends_only_on_issue_and_payment(
        issue in optional_day(),
        paid in optional_day(),
        receipt_a in optional_day(),
        receipt_b in optional_day(),
        notice in optional_day(),
        supply in optional_day(),
        policy in policy_strategy(),
    ) {
        let bare = InvoiceRecord {
            rcti: true,
            invoice_issue_date: issue,
            payment_date: paid,
            invoice_receipt_date: receipt_a,
            ..Default::default()
        };
        let noisy = InvoiceRecord {
            invoice_receipt_date: receipt_b,
            notice_for_payment_issue_date: notice,
            supply_date: supply,
            payment_term: dec!(60),
            ..bare.clone()
        };
        prop_assert_eq!(classify(&noisy), PaymentTimeBranch::Rcti);
        prop_assert_eq!(
            compute_payment_time(&bare, policy),
            compute_payment_time(&noisy, policy)
        );
        prop_assert_eq!(
            compute_payment_time(&bare, policy),
            days_between(issue, paid, policy)
        );
    }

    #[test]
    fn prop_issue_and_receipt_take_minimum(
        issue in -60i64..400,
        receipt in -60i64..400,
        paid in -60i64..400,
        policy in policy_strategy(),
    ) {
        let record = InvoiceRecord {
            invoice_issue_date: Some(day(issue)),
            invoice_receipt_date: Some(day(receipt)),
            payment_date: Some(day(paid)),
            ..Default::default()
        };
        let expected = days_between(Some(day(issue)), Some(day(paid)), policy)
            .unwrap()
            .min(days_between(Some(day(receipt)), Some(day(paid)), policy).unwrap());
        prop_assert_eq!(compute_payment_time(&record, policy), Some(expected));
    }

    #[test]
    fn prop_days_between_monotonic_and_non_negative(
        start in -400i64..400,
        end in -400i64..400,
        extra in 0i64..400,
        policy in policy_strategy(),
    ) {
        let earlier = days_between(Some(day(start)), Some(day(end)), policy).unwrap();
        let later = days_between(Some(day(start)), Some(day(end + extra)), policy).unwrap();
        prop_assert!(earlier >= 0);
        prop_assert!(later >= earlier);
    }

    #[test]
    fn prop_days_between_undefined_iff_absent(
        start in optional_day(),
        end in optional_day(),
        policy in policy_strategy(),
    ) {
        let result = days_between(start, end, policy);
        prop_assert_eq!(result.is_none(), start.is_none() || end.is_none());
    }

    #[test]
    fn prop_unpaid_is_always_undefined(
        rcti in any::<bool>(),
        issue in optional_day(),
        receipt in optional_day(),
        notice in optional_day(),
        supply in optional_day(),
        policy in policy_strategy(),
    ) {
        let record = InvoiceRecord {
            rcti,
            invoice_issue_date: issue,
            invoice_receipt_date: receipt,
            notice_for_payment_issue_date: notice,
            supply_date: supply,
            payment_date: None,
            ..Default::default()
        };
        prop_assert_eq!(compute_payment_time(&record, policy), None);
    }
}
