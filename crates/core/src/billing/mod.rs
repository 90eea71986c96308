//! Due amounts and balance summaries.

pub mod summary;
pub mod types;

#[cfg(test)]
mod tests;

pub use summary::BillingService;
pub use types::{BalanceSummary, Bill, BillStatus, BillingSummary, BillingTotals};
