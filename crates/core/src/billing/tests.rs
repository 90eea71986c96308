//! Tests for due amounts and billing summaries.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::summary::BillingService;
use super::types::{Bill, BillStatus};
use crate::month::Month;

fn bill(month: Month, year: i32, status: BillStatus, amount: Decimal, balance: Decimal) -> Bill {
    Bill {
        month,
        year,
        cubic_meters: dec!(10),
        rate_per_cubic_meter: dec!(28),
        amount,
        status,
        balance,
    }
}

#[test]
fn due_amount_zero_when_paid() {
    let b = bill(Month::March, 2024, BillStatus::Paid, dec!(500), dec!(120));
    assert_eq!(BillingService::due_amount(&b), Decimal::ZERO);
}

#[test]
fn due_amount_prefers_positive_balance() {
    let b = bill(Month::March, 2024, BillStatus::Balance, dec!(500), dec!(120));
    assert_eq!(BillingService::due_amount(&b), dec!(120));
}

#[test]
fn due_amount_falls_back_to_amount() {
    let b = bill(Month::March, 2024, BillStatus::Pending, dec!(500), dec!(0));
    assert_eq!(BillingService::due_amount(&b), dec!(500));

    let odd = bill(
        Month::March,
        2024,
        BillStatus::Other("Disputed".into()),
        dec!(500),
        dec!(0),
    );
    assert_eq!(BillingService::due_amount(&odd), dec!(500));
}

#[test]
fn summarize_empty_is_all_zero() {
    let summary = BillingService::summarize(&[], Month::June);
    assert_eq!(summary.totals.amount, Decimal::ZERO);
    assert_eq!(summary.totals.cubic_meters, Decimal::ZERO);
    assert_eq!(summary.totals.outstanding, Decimal::ZERO);
    assert_eq!(summary.balance_summary.current_balance, Decimal::ZERO);
    assert_eq!(summary.balance_summary.previous_balance, Decimal::ZERO);
    assert_eq!(summary.balance_summary.total_balance, Decimal::ZERO);
    assert_eq!(summary.balance_summary.current_month, "June");
}

#[test]
fn summarize_splits_current_and_previous() {
    let bills = vec![
        bill(Month::May, 2024, BillStatus::Pending, dec!(300), dec!(0)),
        bill(Month::June, 2024, BillStatus::Pending, dec!(450), dec!(0)),
        bill(Month::April, 2024, BillStatus::Paid, dec!(280), dec!(0)),
    ];

    let summary = BillingService::summarize(&bills, Month::June);
    assert_eq!(summary.balance_summary.current_balance, dec!(450));
    assert_eq!(summary.balance_summary.previous_balance, dec!(300));
    assert_eq!(summary.balance_summary.total_balance, dec!(750));
    assert_eq!(summary.totals.amount, dec!(1030));
    assert_eq!(summary.totals.outstanding, dec!(750));
}

/// Pins the year-ignoring current-month match. A June bill from a prior
/// year is classified as current when today is any June.
#[test]
fn current_month_match_ignores_year() {
    let bills = vec![bill(
        Month::June,
        2023,
        BillStatus::Pending,
        dec!(999),
        dec!(0),
    )];

    let summary = BillingService::summarize(&bills, Month::June);
    assert_eq!(summary.balance_summary.current_balance, dec!(999));
    assert_eq!(summary.balance_summary.previous_balance, Decimal::ZERO);
}

fn arb_status() -> impl Strategy<Value = BillStatus> {
    prop_oneof![
        Just(BillStatus::Paid),
        Just(BillStatus::Pending),
        Just(BillStatus::Balance),
        Just(BillStatus::Other("Overdue".into())),
    ]
}

fn arb_bill() -> impl Strategy<Value = Bill> {
    (
        1i16..=12,
        2020i32..=2030,
        0i64..1_000_000,
        0i64..1_000_000,
        arb_status(),
    )
        .prop_map(|(month, year, amount, balance, status)| Bill {
            month: Month::from_index(month).unwrap(),
            year,
            cubic_meters: Decimal::from(amount % 500),
            rate_per_cubic_meter: dec!(28),
            amount: Decimal::from(amount),
            status,
            balance: Decimal::from(balance),
        })
}

proptest! {
    /// due_amount is bounded by [0, max(amount, balance)] and is zero
    /// exactly when the bill is Paid or both figures are zero.
    #[test]
    fn prop_due_amount_bounds(bill in arb_bill()) {
        let due = BillingService::due_amount(&bill);

        prop_assert!(due >= Decimal::ZERO);
        prop_assert!(due <= bill.amount.max(bill.balance));

        if bill.status.is_paid() {
            prop_assert_eq!(due, Decimal::ZERO);
        }
    }

    /// previous_balance + current_balance == total_balance, always.
    #[test]
    fn prop_balance_identity(bills in prop::collection::vec(arb_bill(), 0..12), month in 1i16..=12) {
        let current = Month::from_index(month).unwrap();
        let summary = BillingService::summarize(&bills, current);

        prop_assert_eq!(
            summary.balance_summary.total_balance,
            summary.balance_summary.previous_balance + summary.balance_summary.current_balance
        );
    }

    /// Outstanding equals the sum of per-bill due amounts.
    #[test]
    fn prop_outstanding_is_due_sum(bills in prop::collection::vec(arb_bill(), 0..12)) {
        let summary = BillingService::summarize(&bills, Month::January);
        let expected: Decimal = bills.iter().map(BillingService::due_amount).sum();

        prop_assert_eq!(summary.totals.outstanding, expected);
    }
}
