//! Usage growth estimation.
//!
//! Compares the three most recent billing months against the three before
//! them and classifies the trend.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::billing::Bill;

/// Direction of recent usage relative to prior usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthTrend {
    /// Recent average more than 5% above the prior average.
    Increasing,
    /// Recent average more than 5% below the prior average.
    Decreasing,
    /// Within the ±5% band, or not enough data to tell.
    Stable,
}

/// Usage trend classification for a consumer.
#[derive(Debug, Clone, Serialize)]
pub struct UsageGrowth {
    /// Trend direction.
    pub trend: GrowthTrend,
    /// Percent change of recent vs prior average, one decimal place.
    pub percentage: Decimal,
    /// Human-readable summary.
    pub message: String,
}

impl UsageGrowth {
    fn stable(message: &str) -> Self {
        Self {
            trend: GrowthTrend::Stable,
            percentage: Decimal::ZERO,
            message: message.to_string(),
        }
    }
}

const TREND_THRESHOLD_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

fn average_usage(bills: &[&Bill]) -> Decimal {
    if bills.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = bills.iter().map(|b| b.cubic_meters).sum();
    total / Decimal::from(bills.len())
}

/// Classifies the usage trend from a consumer's full bill list.
///
/// Bills are ordered newest first by (year, month index); the first three
/// form the recent window and the next three the prior window. Fewer than
/// two bills, an empty prior window, or a zero prior average all yield a
/// stable result with an informational message.
#[must_use]
pub fn estimate_usage_growth(bills: &[Bill]) -> UsageGrowth {
    if bills.len() < 2 {
        return UsageGrowth::stable("Insufficient data");
    }

    let mut sorted: Vec<&Bill> = bills.iter().collect();
    sorted.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));

    let recent: Vec<&Bill> = sorted.iter().take(3).copied().collect();
    let previous: Vec<&Bill> = sorted.iter().skip(3).take(3).copied().collect();

    if previous.is_empty() {
        return UsageGrowth::stable("Insufficient data");
    }

    let previous_avg = average_usage(&previous);
    if previous_avg == Decimal::ZERO {
        return UsageGrowth::stable("No previous data");
    }
    let recent_avg = average_usage(&recent);

    let percentage =
        ((recent_avg - previous_avg) / previous_avg * Decimal::ONE_HUNDRED).round_dp(1);

    let (trend, message) = if percentage > TREND_THRESHOLD_PERCENT {
        (GrowthTrend::Increasing, "Water usage is increasing")
    } else if percentage < -TREND_THRESHOLD_PERCENT {
        (GrowthTrend::Decreasing, "Water usage is decreasing")
    } else {
        (GrowthTrend::Stable, "Water usage is stable")
    };

    UsageGrowth {
        trend,
        percentage,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::BillStatus;
    use crate::month::Month;
    use rust_decimal_macros::dec;

    fn bill(month: Month, year: i32, cubic_meters: Decimal) -> Bill {
        Bill {
            month,
            year,
            cubic_meters,
            rate_per_cubic_meter: dec!(28),
            amount: cubic_meters * dec!(28),
            status: BillStatus::Pending,
            balance: dec!(0),
        }
    }

    #[test]
    fn fewer_than_two_bills_is_stable() {
        assert_eq!(estimate_usage_growth(&[]).trend, GrowthTrend::Stable);

        let one = vec![bill(Month::May, 2024, dec!(20))];
        let growth = estimate_usage_growth(&one);
        assert_eq!(growth.trend, GrowthTrend::Stable);
        assert_eq!(growth.percentage, Decimal::ZERO);
        assert_eq!(growth.message, "Insufficient data");
    }

    #[test]
    fn empty_previous_window_is_stable() {
        // Two or three bills fill only the recent window.
        let bills = vec![
            bill(Month::April, 2024, dec!(20)),
            bill(Month::May, 2024, dec!(30)),
        ];
        let growth = estimate_usage_growth(&bills);
        assert_eq!(growth.trend, GrowthTrend::Stable);
        assert_eq!(growth.message, "Insufficient data");
    }

    #[test]
    fn zero_previous_average_is_stable() {
        let bills = vec![
            bill(Month::January, 2024, dec!(0)),
            bill(Month::February, 2024, dec!(0)),
            bill(Month::March, 2024, dec!(0)),
            bill(Month::April, 2024, dec!(15)),
            bill(Month::May, 2024, dec!(18)),
            bill(Month::June, 2024, dec!(21)),
        ];
        let growth = estimate_usage_growth(&bills);
        assert_eq!(growth.trend, GrowthTrend::Stable);
        assert_eq!(growth.message, "No previous data");
    }

    #[test]
    fn strictly_decreasing_usage_is_decreasing() {
        let bills = vec![
            bill(Month::January, 2024, dec!(60)),
            bill(Month::February, 2024, dec!(50)),
            bill(Month::March, 2024, dec!(40)),
            bill(Month::April, 2024, dec!(30)),
            bill(Month::May, 2024, dec!(20)),
            bill(Month::June, 2024, dec!(10)),
        ];
        let growth = estimate_usage_growth(&bills);
        assert_eq!(growth.trend, GrowthTrend::Decreasing);
        assert!(growth.percentage < Decimal::ZERO);
        assert_eq!(growth.message, "Water usage is decreasing");
    }

    #[test]
    fn growing_usage_is_increasing() {
        let bills = vec![
            bill(Month::January, 2024, dec!(10)),
            bill(Month::February, 2024, dec!(10)),
            bill(Month::March, 2024, dec!(10)),
            bill(Month::April, 2024, dec!(20)),
            bill(Month::May, 2024, dec!(20)),
            bill(Month::June, 2024, dec!(20)),
        ];
        let growth = estimate_usage_growth(&bills);
        assert_eq!(growth.trend, GrowthTrend::Increasing);
        assert_eq!(growth.percentage, dec!(100.0));
    }

    #[test]
    fn within_band_is_stable() {
        let bills = vec![
            bill(Month::January, 2024, dec!(100)),
            bill(Month::February, 2024, dec!(100)),
            bill(Month::March, 2024, dec!(100)),
            bill(Month::April, 2024, dec!(102)),
            bill(Month::May, 2024, dec!(101)),
            bill(Month::June, 2024, dec!(103)),
        ];
        let growth = estimate_usage_growth(&bills);
        assert_eq!(growth.trend, GrowthTrend::Stable);
        assert_eq!(growth.message, "Water usage is stable");
    }

    #[test]
    fn sorting_crosses_year_boundary() {
        // Input out of order; December 2023 must sort before January 2024.
        let bills = vec![
            bill(Month::February, 2024, dec!(10)),
            bill(Month::November, 2023, dec!(40)),
            bill(Month::January, 2024, dec!(10)),
            bill(Month::December, 2023, dec!(40)),
            bill(Month::October, 2023, dec!(40)),
            bill(Month::March, 2024, dec!(10)),
        ];
        let growth = estimate_usage_growth(&bills);
        assert_eq!(growth.trend, GrowthTrend::Decreasing);
        assert_eq!(growth.percentage, dec!(-75.0));
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        let bills = vec![
            bill(Month::January, 2024, dec!(30)),
            bill(Month::February, 2024, dec!(30)),
            bill(Month::March, 2024, dec!(30)),
            bill(Month::April, 2024, dec!(40)),
            bill(Month::May, 2024, dec!(40)),
            bill(Month::June, 2024, dec!(40)),
        ];
        let growth = estimate_usage_growth(&bills);
        // (40 - 30) / 30 * 100 = 33.333... -> 33.3
        assert_eq!(growth.percentage, dec!(33.3));
    }
}
