//! Calendar month ordering and naming.
//!
//! Bills are keyed by month index rather than month name so that ordering
//! comparisons never depend on string equality against English names.
//! Names appear only at the API boundary.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month with a fixed 12-month ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum Month {
    /// January (1).
    January = 1,
    /// February (2).
    February = 2,
    /// March (3).
    March = 3,
    /// April (4).
    April = 4,
    /// May (5).
    May = 5,
    /// June (6).
    June = 6,
    /// July (7).
    July = 7,
    /// August (8).
    August = 8,
    /// September (9).
    September = 9,
    /// October (10).
    October = 10,
    /// November (11).
    November = 11,
    /// December (12).
    December = 12,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Self; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    /// Returns the 1-based month index.
    #[must_use]
    pub const fn index(self) -> i16 {
        self as i16
    }

    /// Looks up a month by its 1-based index.
    #[must_use]
    pub fn from_index(index: i16) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Returns the English month name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }

    /// Parses an English month name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Returns the month of the given date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        // month() is always 1-12
        Self::from_index(i16::try_from(date.month()).unwrap_or(1)).unwrap_or(Self::January)
    }

    /// Returns the previous (month, year) for the given date.
    #[must_use]
    pub fn previous(date: NaiveDate) -> (Self, i32) {
        match Self::of(date) {
            Self::January => (Self::December, date.year() - 1),
            m => (
                Self::from_index(m.index() - 1).unwrap_or(Self::December),
                date.year(),
            ),
        }
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_index_round_trip() {
        for month in Month::ALL {
            assert_eq!(Month::from_index(month.index()), Some(month));
        }
        assert_eq!(Month::from_index(0), None);
        assert_eq!(Month::from_index(13), None);
    }

    #[rstest]
    #[case("January", Some(Month::January))]
    #[case("december", Some(Month::December))]
    #[case("  March ", Some(Month::March))]
    #[case("Marzo", None)]
    fn test_from_name(#[case] name: &str, #[case] expected: Option<Month>) {
        assert_eq!(Month::from_name(name), expected);
    }

    #[test]
    fn test_ordering_within_year() {
        assert!(Month::December > Month::January);
        assert!(Month::February < Month::March);
    }

    #[test]
    fn test_previous_rolls_over_year() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(Month::previous(jan), (Month::December, 2023));

        let feb = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        assert_eq!(Month::previous(feb), (Month::January, 2024));
    }
}
