//! Water-supply cutoff evaluation.
//!
//! A consumer is cut off while any bill from before the current month is
//! unpaid. The decision is a pure function of the bill list and today's
//! date; the persisted consumer status column is only a cache that callers
//! overwrite with the result. Re-running the evaluation with unchanged
//! bills always yields the same status, so concurrent evaluations for the
//! same consumer race harmlessly (last write wins).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::billing::Bill;
use crate::month::Month;

/// Consumer supply status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyStatus {
    /// Water supply connected.
    Active,
    /// Water supply suspended for nonpayment.
    CutOff,
}

impl SupplyStatus {
    /// Returns the status as stored text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::CutOff => "cut_off",
        }
    }

    /// Parses stored text. Anything unrecognized is treated as active.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "cut_off" { Self::CutOff } else { Self::Active }
    }
}

impl std::fmt::Display for SupplyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluates the supply status a consumer should have as of `today`.
///
/// Order of checks:
/// 1. A bill for exactly the previous (month, year) that is not Paid
///    cuts the supply.
/// 2. Otherwise any unpaid bill strictly before the current (year, month)
///    cuts the supply.
/// 3. Otherwise the supply is active.
///
/// Callers persist the result over the cached status column whenever it
/// differs from the stored value.
#[must_use]
pub fn evaluate_supply_status(bills: &[Bill], today: NaiveDate) -> SupplyStatus {
    let (prev_month, prev_year) = Month::previous(today);
    let prev_month_bill = bills
        .iter()
        .find(|b| b.month == prev_month && b.year == prev_year);
    if let Some(bill) = prev_month_bill
        && !bill.status.is_paid()
    {
        return SupplyStatus::CutOff;
    }

    let current = (today.year(), Month::of(today));
    let has_older_unpaid = bills
        .iter()
        .any(|b| !b.status.is_paid() && (b.year, b.month) < current);
    if has_older_unpaid {
        return SupplyStatus::CutOff;
    }

    SupplyStatus::Active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::BillStatus;
    use rust_decimal_macros::dec;

    fn bill(month: Month, year: i32, status: BillStatus) -> Bill {
        Bill {
            month,
            year,
            cubic_meters: dec!(12),
            rate_per_cubic_meter: dec!(28),
            amount: dec!(336),
            status,
            balance: dec!(0),
        }
    }

    fn date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 10).unwrap()
    }

    #[test]
    fn no_bills_is_active() {
        assert_eq!(evaluate_supply_status(&[], date(2024, 2)), SupplyStatus::Active);
    }

    #[test]
    fn unpaid_previous_month_cuts_off() {
        let bills = vec![bill(Month::January, 2024, BillStatus::Pending)];
        assert_eq!(
            evaluate_supply_status(&bills, date(2024, 2)),
            SupplyStatus::CutOff
        );
    }

    #[test]
    fn paid_previous_month_stays_active() {
        let bills = vec![bill(Month::January, 2024, BillStatus::Paid)];
        assert_eq!(
            evaluate_supply_status(&bills, date(2024, 2)),
            SupplyStatus::Active
        );
    }

    #[test]
    fn older_unpaid_bill_cuts_off() {
        // Previous month is paid but an older bill is not.
        let bills = vec![
            bill(Month::January, 2024, BillStatus::Paid),
            bill(Month::October, 2023, BillStatus::Balance),
        ];
        assert_eq!(
            evaluate_supply_status(&bills, date(2024, 2)),
            SupplyStatus::CutOff
        );
    }

    #[test]
    fn previous_year_rollover() {
        // Today is January; previous month is December of last year.
        let bills = vec![bill(Month::December, 2023, BillStatus::Pending)];
        assert_eq!(
            evaluate_supply_status(&bills, date(2024, 1)),
            SupplyStatus::CutOff
        );
    }

    #[test]
    fn current_month_unpaid_does_not_cut_off() {
        let bills = vec![bill(Month::February, 2024, BillStatus::Pending)];
        assert_eq!(
            evaluate_supply_status(&bills, date(2024, 2)),
            SupplyStatus::Active
        );
    }

    #[test]
    fn future_unpaid_does_not_cut_off() {
        let bills = vec![bill(Month::March, 2024, BillStatus::Pending)];
        assert_eq!(
            evaluate_supply_status(&bills, date(2024, 2)),
            SupplyStatus::Active
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let bills = vec![
            bill(Month::January, 2024, BillStatus::Pending),
            bill(Month::February, 2024, BillStatus::Paid),
        ];
        let first = evaluate_supply_status(&bills, date(2024, 2));
        let second = evaluate_supply_status(&bills, date(2024, 2));
        assert_eq!(first, second);
    }

    #[test]
    fn settling_all_bills_restores_active() {
        let bills = vec![
            bill(Month::December, 2023, BillStatus::Paid),
            bill(Month::January, 2024, BillStatus::Paid),
        ];
        assert_eq!(
            evaluate_supply_status(&bills, date(2024, 2)),
            SupplyStatus::Active
        );
    }

    #[test]
    fn parse_round_trip() {
        assert_eq!(SupplyStatus::parse("cut_off"), SupplyStatus::CutOff);
        assert_eq!(SupplyStatus::parse("active"), SupplyStatus::Active);
        assert_eq!(SupplyStatus::parse("garbage"), SupplyStatus::Active);
    }
}
