//! Due-amount calculation and billing summaries.

use rust_decimal::Decimal;

use super::types::{BalanceSummary, Bill, BillingSummary, BillingTotals};
use crate::month::Month;

/// Stateless billing calculations.
pub struct BillingService;

impl BillingService {
    /// Returns the amount still owed on a bill.
    ///
    /// Rule: `Paid` owes nothing; a positive manual balance overrides the
    /// billed amount; otherwise the full amount is due.
    #[must_use]
    pub fn due_amount(bill: &Bill) -> Decimal {
        if bill.status.is_paid() {
            return Decimal::ZERO;
        }
        if bill.balance > Decimal::ZERO {
            return bill.balance;
        }
        bill.amount
    }

    /// Aggregates a consumer's bills into totals and a balance breakdown.
    ///
    /// The current-month match is by month name only, ignoring year: a bill
    /// from the same-named month of a different year is treated as current.
    /// That mirrors the behavior consumers have been shown to date; the
    /// first match in input order wins.
    #[must_use]
    pub fn summarize(bills: &[Bill], current_month: Month) -> BillingSummary {
        let mut totals = BillingTotals {
            amount: Decimal::ZERO,
            cubic_meters: Decimal::ZERO,
            outstanding: Decimal::ZERO,
        };
        for bill in bills {
            totals.amount += bill.amount;
            totals.cubic_meters += bill.cubic_meters;
            totals.outstanding += Self::due_amount(bill);
        }

        let current_bill = bills.iter().find(|b| b.month == current_month);
        let current_balance = current_bill.map_or(Decimal::ZERO, Self::due_amount);
        let previous_balance: Decimal = bills
            .iter()
            .filter(|b| b.month != current_month)
            .map(Self::due_amount)
            .sum();

        BillingSummary {
            totals,
            balance_summary: BalanceSummary {
                previous_balance,
                current_month: current_month.name().to_string(),
                current_balance,
                total_balance: previous_balance + current_balance,
            },
        }
    }
}
