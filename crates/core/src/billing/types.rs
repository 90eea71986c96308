//! Billing data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::month::Month;

/// Payment status of a bill.
///
/// Stored as free text by admin tooling; only `Paid` and `Balance` carry
/// meaning for the due-amount rule, everything else behaves like `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillStatus {
    /// Bill fully settled.
    Paid,
    /// Bill issued, nothing received yet.
    Pending,
    /// Partially paid; the `balance` field holds the residual.
    Balance,
    /// Any other free-text status.
    Other(String),
}

impl BillStatus {
    /// Parses a status string. Never fails; unknown text becomes `Other`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Paid" => Self::Paid,
            "Pending" => Self::Pending,
            "Balance" => Self::Balance,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the status as stored text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Paid => "Paid",
            Self::Pending => "Pending",
            Self::Balance => "Balance",
            Self::Other(s) => s,
        }
    }

    /// Returns true if the bill is fully settled.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl From<String> for BillStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<BillStatus> for String {
    fn from(status: BillStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A consumer's charge record for one month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Billing month.
    pub month: Month,
    /// Billing year.
    pub year: i32,
    /// Metered water usage in cubic meters.
    pub cubic_meters: Decimal,
    /// Rate per cubic meter at billing time.
    pub rate_per_cubic_meter: Decimal,
    /// Billed amount. Stored independently of usage x rate and editable.
    pub amount: Decimal,
    /// Payment status.
    pub status: BillStatus,
    /// Manually-set residual amount; meaningful only when status is Balance.
    pub balance: Decimal,
}

/// Totals across all of a consumer's bills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingTotals {
    /// Sum of billed amounts.
    pub amount: Decimal,
    /// Sum of metered usage.
    pub cubic_meters: Decimal,
    /// Sum of due amounts.
    pub outstanding: Decimal,
}

/// Previous/current/total balance view of a consumer's bills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    /// Sum of due amounts on bills outside the current month.
    pub previous_balance: Decimal,
    /// Name of the month treated as current.
    pub current_month: String,
    /// Due amount on the current-month bill, if any.
    pub current_balance: Decimal,
    /// `previous_balance + current_balance`.
    pub total_balance: Decimal,
}

/// Aggregated billing view for a consumer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    /// Totals across all bills.
    pub totals: BillingTotals,
    /// Balance breakdown.
    pub balance_summary: BalanceSummary,
}
